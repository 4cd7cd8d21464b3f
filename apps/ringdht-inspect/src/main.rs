use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ringdht_codec::announcement::{ServiceAnnouncement, ANNOUNCEMENT_TYPE_ID};
use ringdht_codec::{CodecError, Serializable, TypeRegistry, Value, ValueId, ValueTypeId};
use ringdht_core::InfoHash;
use ringdht_crypto::signing::{Ed25519Signer, Ed25519Verifier};
use ringdht_crypto::{sign_value, SealError};
use ringdht_node::logging::init_tracing;
use ringdht_node::{Admission, AdmissionDecision, NodeConfig};
use thiserror::Error;
use tracing::error;

mod config;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one or more packed values from hex and print them
    Decode { hex: String },
    /// Build a packed service announcement value
    Announce {
        #[arg(long)]
        port: u16,
        #[arg(long, default_value_t = 1)]
        id: ValueId,
        /// Address to announce; receivers replace it with the observed source
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Sign a value with a hex Ed25519 secret and print it packed
    Sign {
        #[arg(long)]
        secret: String,
        #[arg(long = "type", default_value_t = 0)]
        value_type: ValueTypeId,
        #[arg(long, default_value_t = 0)]
        seq: u16,
        #[arg(long, default_value_t = 1)]
        id: ValueId,
        data: String,
    },
    /// Run store admission on a packed value as a node would
    Check {
        hex: String,
        /// Storage key; defaults to the hash of the value bytes
        #[arg(long)]
        key: Option<InfoHash>,
        #[arg(long, default_value = "127.0.0.1:4222")]
        source: SocketAddr,
    },
}

#[derive(Debug, Error)]
enum InspectError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("secret must be 32 bytes, got {0}")]
    SecretLength(usize),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("sign failed: {0}")]
    Seal(#[from] SealError),
}

fn decode(raw_hex: &str) -> Result<Vec<String>, InspectError> {
    let bytes = hex::decode(raw_hex.trim())?;
    let mut lines = Vec::new();
    for value in Value::unpack_all(&bytes)? {
        lines.push(value.to_string());
        if value.value_type() == ANNOUNCEMENT_TYPE_ID {
            if let Some(Ok(sa)) = value.data().map(ServiceAnnouncement::unpack_blob) {
                lines.push(format!("  {sa}"));
            }
        }
    }
    Ok(lines)
}

fn announce(port: u16, id: ValueId, addr: Option<SocketAddr>) -> Result<String, InspectError> {
    let mut sa = match addr {
        Some(addr) => ServiceAnnouncement::from_socket_addr(&addr),
        None => ServiceAnnouncement::new(port),
    };
    sa.set_port(port);
    let value = Value::from_payload(&ServiceAnnouncement::value_type(), &sa, id)?;
    Ok(hex::encode(value.pack()?))
}

fn sign(
    secret_hex: &str,
    value_type: ValueTypeId,
    seq: u16,
    id: ValueId,
    data: &str,
) -> Result<String, InspectError> {
    let secret = hex::decode(secret_hex.trim())?;
    let secret: [u8; 32] = secret
        .as_slice()
        .try_into()
        .map_err(|_| InspectError::SecretLength(secret.len()))?;
    let signer = Ed25519Signer::from_secret(secret);
    let value = Value::new(value_type, data.as_bytes().to_vec())
        .with_id(id)
        .with_seq(seq);
    Ok(hex::encode(sign_value(value, &signer)?.pack()?))
}

fn check(
    cfg: NodeConfig,
    raw_hex: &str,
    key: Option<InfoHash>,
    source: SocketAddr,
) -> Result<AdmissionDecision, InspectError> {
    let bytes = hex::decode(raw_hex.trim())?;
    let key = key.unwrap_or_else(|| InfoHash::get(&bytes));
    let source_id = InfoHash::get(source.to_string().as_bytes());
    let admission = Admission::new(TypeRegistry::default(), cfg, Ed25519Verifier);
    Ok(admission.ingest(&key, &bytes, &source_id, &source))
}

fn run(cli: Cli, cfg: NodeConfig) -> Result<i32, InspectError> {
    match cli.command {
        Commands::Decode { hex } => {
            for line in decode(&hex)? {
                println!("{line}");
            }
        }
        Commands::Announce { port, id, addr } => println!("{}", announce(port, id, addr)?),
        Commands::Sign {
            secret,
            value_type,
            seq,
            id,
            data,
        } => println!("{}", sign(&secret, value_type, seq, id, &data)?),
        Commands::Check { hex, key, source } => match check(cfg, &hex, key, source)? {
            AdmissionDecision::Accepted(value) => println!("accepted: {value}"),
            AdmissionDecision::Rejected(reason) => {
                println!("rejected: {reason:?}");
                return Ok(2);
            }
        },
    }
    Ok(0)
}

fn main() {
    let cli = Cli::parse();

    let cfg = match config::load(cli.config.clone()) {
        Ok(cfg) => cfg,
        Err(err) => {
            let _ = init_tracing("info");
            error!("config load failed: {err}");
            std::process::exit(1);
        }
    };
    init_tracing(&cfg.log_filter);

    match run(cli, cfg) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    }
}
