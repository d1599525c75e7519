//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `SENTINEL_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_CACHE_CAPACITY, DEFAULT_EMBEDDING_DIM, DEFAULT_MAX_SEQ_LEN,
};
use crate::scoring::DistanceMetric;

/// Service and pipeline configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `SENTINEL_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Sentence-encoder model directory. Unset means the stub encoder is used.
    pub model_path: Option<PathBuf>,

    /// Token budget per text. Default: `128`.
    pub max_seq_len: usize,

    /// Embedding width. Default: `384`.
    pub embedding_dim: usize,

    /// Run the encoder in half precision when a GPU device is available. Default: `true`.
    pub use_fp16: bool,

    /// Texts per encoder forward pass. Default: `64`.
    pub batch_size: usize,

    /// Distance used for scoring. Default: euclidean.
    pub distance_metric: DistanceMetric,

    /// Max entries in the shared embedding cache. Default: `100_000`.
    pub cache_capacity: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            model_path: None,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            use_fp16: true,
            batch_size: DEFAULT_BATCH_SIZE,
            distance_metric: DistanceMetric::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "SENTINEL_PORT";
    const ENV_BIND_ADDR: &'static str = "SENTINEL_BIND_ADDR";
    const ENV_MODEL_PATH: &'static str = "SENTINEL_MODEL_PATH";
    const ENV_MAX_SEQ_LEN: &'static str = "SENTINEL_MAX_SEQ_LEN";
    const ENV_EMBEDDING_DIM: &'static str = "SENTINEL_EMBEDDING_DIM";
    const ENV_USE_FP16: &'static str = "SENTINEL_USE_FP16";
    const ENV_BATCH_SIZE: &'static str = "SENTINEL_BATCH_SIZE";
    const ENV_DISTANCE_METRIC: &'static str = "SENTINEL_DISTANCE_METRIC";
    const ENV_CACHE_CAPACITY: &'static str = "SENTINEL_CACHE_CAPACITY";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let model_path = Self::parse_optional_path_from_env(Self::ENV_MODEL_PATH);
        let max_seq_len = Self::parse_usize_from_env(Self::ENV_MAX_SEQ_LEN, defaults.max_seq_len)?;
        let embedding_dim =
            Self::parse_usize_from_env(Self::ENV_EMBEDDING_DIM, defaults.embedding_dim)?;
        let use_fp16 = Self::parse_bool_from_env(Self::ENV_USE_FP16, defaults.use_fp16)?;
        let batch_size = Self::parse_usize_from_env(Self::ENV_BATCH_SIZE, defaults.batch_size)?;
        let distance_metric = Self::parse_metric_from_env(defaults.distance_metric)?;
        let cache_capacity =
            Self::parse_u64_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity);

        Ok(Self {
            port,
            bind_addr,
            model_path,
            max_seq_len,
            embedding_dim,
            use_fp16,
            batch_size,
            distance_metric,
            cache_capacity,
        })
    }

    /// Validates paths and numeric invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref path) = self.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        for (name, value) in [
            (Self::ENV_MAX_SEQ_LEN, self.max_seq_len),
            (Self::ENV_EMBEDDING_DIM, self.embedding_dim),
            (Self::ENV_BATCH_SIZE, self.batch_size),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroValue { name });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_metric_from_env(default: DistanceMetric) -> Result<DistanceMetric, ConfigError> {
        match env::var(Self::ENV_DISTANCE_METRIC) {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::UnsupportedMetric { value }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_usize_from_env(var_name: &'static str, default: usize) -> Result<usize, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidNumber {
                    name: var_name,
                    value,
                    source: e,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(var_name) {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidBool {
                    name: var_name,
                    value,
                }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
