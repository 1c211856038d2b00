use std::path::PathBuf;

use thiserror::Error;

/// Rejection of a batch call before any target is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("port must be within 1-65535, got {0}")]
    PortOutOfRange(u32),
    #[error("per-check timeout must be greater than zero")]
    ZeroTimeout,
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("concurrency must be at most {max}, got {0}", max = crate::checks::MAX_CONCURRENCY)]
    ConcurrencyTooHigh(usize),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
