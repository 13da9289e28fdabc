use thiserror::Error;

/// Rejected session configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cell scale must be at least 1")]
    ZeroUnit,
    #[error("grid {width}x{height} too small: need at least {min}x{min} for scale {unit}")]
    GridTooSmall {
        width: usize,
        height: usize,
        unit: usize,
        min: usize,
    },
    #[error("{0} interval must be greater than zero")]
    ZeroInterval(&'static str),
    #[error("clear threshold must be 1..=100 percent, got {0}")]
    InvalidThreshold(u8),
}
