//! yar-cli
//!
//! Command-line interface for calling YAR services.

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};
use yar_client::{Client, ClientConfig, Packager};

/// yar-cli
#[derive(Parser, Debug)]
#[command(name = "yar-cli")]
#[command(about = "CLI for YAR RPC services")]
#[command(version)]
struct Args {
    /// Service URL
    #[arg(short, long, default_value = "http://127.0.0.1:8080/")]
    url: String,

    /// Body packager
    #[arg(short, long, value_enum, default_value = "json")]
    packager: PackagerArg,

    /// Request timeout in milliseconds
    #[arg(short, long, default_value = "1000")]
    timeout_ms: u64,

    /// Log every call phase
    #[arg(long)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PackagerArg {
    Json,
    Msgpack,
}

impl From<PackagerArg> for Packager {
    fn from(arg: PackagerArg) -> Self {
        match arg {
            PackagerArg::Json => Packager::Json,
            PackagerArg::Msgpack => Packager::MsgPack,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Call a remote method
    Call {
        /// Method name
        method: String,

        /// Parameters, each a JSON value (bare words are taken as strings)
        params: Vec<String>,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,yar_client=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = ClientConfig::builder()
        .packager(args.packager.into())
        .timeout_ms(args.timeout_ms)
        .trace_calls(args.trace)
        .build();

    let client = match Client::new(&args.url, config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to create client: {}", e);
            std::process::exit(1);
        }
    };

    match args.command {
        Commands::Call { method, params } => {
            let params = params.iter().map(|p| parse_param(p)).collect();

            match client.call::<Value>(&method, params) {
                Ok(ret) => match serde_json::to_string_pretty(&ret) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        tracing::error!("Failed to print result: {}", e);
                        std::process::exit(1);
                    }
                },
                Err(e) => {
                    tracing::error!("Call failed ({:?}): {}", e.kind(), e);
                    std::process::exit(1);
                }
            }
        }
    }
}

/// JSON if it parses, otherwise the raw string
fn parse_param(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
