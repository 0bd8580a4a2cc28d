//! Deployment configuration
//!
//! Read from `FACEPAY_*` environment variables with defaults suitable
//! for local development. The currency is fixed per deployment, never
//! taken from a request.

use match_engine::DEFAULT_THRESHOLD;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    /// Base URL of the face embedding service
    pub embedder_url: String,
    /// Base URL of the payment ledger backend
    pub ledger_url: String,
    /// Directory holding the attempt journal and identity file
    pub data_dir: PathBuf,
    /// Template dimensionality D, fixed per deployment
    pub embedding_dim: usize,
    /// Match distance threshold (false-accept vs. false-reject trade-off)
    pub match_threshold: f32,
    pub currency: String,
    /// Bound on every external call (embedder, ledger)
    pub call_timeout: Duration,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: parse_var("FACEPAY_BIND_ADDR", "0.0.0.0:8080")?,
            embedder_url: string_var("FACEPAY_EMBEDDER_URL", "http://localhost:8100"),
            ledger_url: string_var("FACEPAY_LEDGER_URL", "http://localhost:5000"),
            data_dir: PathBuf::from(string_var("FACEPAY_DATA_DIR", "data")),
            embedding_dim: parse_var("FACEPAY_EMBEDDING_DIM", "128")?,
            match_threshold: parse_var(
                "FACEPAY_MATCH_THRESHOLD",
                &DEFAULT_THRESHOLD.to_string(),
            )?,
            currency: string_var("FACEPAY_CURRENCY", "GBP"),
            call_timeout: Duration::from_secs(parse_var("FACEPAY_CALL_TIMEOUT_SECS", "15")?),
        })
    }
}

fn string_var(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(var: &'static str, default: &str) -> Result<T, ConfigError> {
    let raw = env::var(var).unwrap_or_else(|_| default.to_string());
    raw.parse().map_err(|_| ConfigError::Invalid {
        var,
        value: raw.clone(),
    })
}
