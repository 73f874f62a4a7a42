use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
    #[error("{name} must be within [0.0, 1.0], got {value}")]
    Probability { name: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot install log subscriber: {0}")]
    Logging(Box<dyn std::error::Error + Send + Sync>),
    #[error("cannot open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },
}
