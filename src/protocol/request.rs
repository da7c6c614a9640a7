//! Request definitions
//!
//! Outbound call description. Serialized by the active packager as
//! `{"i": id, "m": method, "p": [params...]}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, YarError};

use super::Header;

/// A method invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Correlation id, mirrored into the header
    #[serde(rename = "i")]
    pub id: u32,

    /// Name of the remote method
    #[serde(rename = "m")]
    pub method: String,

    /// Ordered arguments; empty when the call takes none
    #[serde(rename = "p", default)]
    pub params: Vec<Value>,

    /// Envelope header, not part of the packed body
    #[serde(skip)]
    pub header: Header,
}

impl Request {
    /// Build a request
    ///
    /// Fails with a param error if `method` is empty.
    pub fn new(id: u32, method: impl Into<String>, params: Vec<Value>) -> Result<Self> {
        let method = method.into();
        if method.is_empty() {
            return Err(YarError::Param("call empty method".to_string()));
        }

        let mut header = Header::new();
        header.id = id;

        Ok(Self {
            id,
            method,
            params,
            header,
        })
    }
}

// The header is envelope metadata and is never packed, so it takes no part
// in request identity.
impl PartialEq for Request {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.method == other.method && self.params == other.params
    }
}
