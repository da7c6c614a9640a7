//! MsgPack codec using `rmp-serde`.
//!
//! Structs go out through `to_vec_named` so peers see maps keyed by field
//! name (`{"i":..,"m":..,"p":..}`), the same shape the JSON packager emits.
//!
//! JSON numbers are kept as text (`arbitrary_precision`), which serde_json
//! serializes as a one-entry map keyed by a private token. Such maps are
//! lowered to native MessagePack numbers before the bytes leave the codec.

use rmpv::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, YarError};

/// Struct name serde_json uses for arbitrary-precision numbers
const JSON_NUMBER_TOKEN: &str = "$serde_json::private::Number";

/// MessagePack codec for envelope bodies.
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Encode a value to MsgPack bytes (struct-as-map).
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
        let bytes = rmp_serde::to_vec_named(value)?;
        if !contains(&bytes, JSON_NUMBER_TOKEN.as_bytes()) {
            return Ok(bytes);
        }

        let mut tree = rmpv::decode::read_value(&mut &bytes[..])
            .map_err(|e| YarError::Packager(format!("msgpack re-read: {}", e)))?;
        lower_json_numbers(&mut tree);

        let mut lowered = Vec::with_capacity(bytes.len());
        rmpv::encode::write_value(&mut lowered, &tree)
            .map_err(|e| YarError::Packager(format!("msgpack re-write: {}", e)))?;
        Ok(lowered)
    }

    /// Decode MsgPack bytes to a value.
    #[inline]
    pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

fn lower_json_numbers(value: &mut Value) {
    match value {
        Value::Map(entries) => {
            if let Some(number) = json_number(entries) {
                *value = number;
                return;
            }
            for (key, item) in entries.iter_mut() {
                lower_json_numbers(key);
                lower_json_numbers(item);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(lower_json_numbers),
        _ => {}
    }
}

fn json_number(entries: &[(Value, Value)]) -> Option<Value> {
    match entries {
        [(Value::String(key), Value::String(text))] if key.as_str() == Some(JSON_NUMBER_TOKEN) => {
            text.as_str().map(parse_number)
        }
        _ => None,
    }
}

/// Integers that fit 64 bits stay integers; anything else becomes a double,
/// or a string if it does not even parse as one.
fn parse_number(text: &str) -> Value {
    if let Ok(n) = text.parse::<u64>() {
        return Value::from(n);
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::from(n);
    }
    match text.parse::<f64>() {
        Ok(f) => Value::F64(f),
        Err(_) => Value::from(text),
    }
}
