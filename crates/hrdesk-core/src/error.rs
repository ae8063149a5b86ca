use thiserror::Error;

/// Top-level error type for HR Desk.
///
/// Covers configuration and static-data loading. The chat crate defines
/// its own `ChatError` and converts from this type so `?` works across the
/// crate boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HrDeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rule set error: {0}")]
    Rules(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for HrDeskError {
    fn from(err: toml::de::Error) -> Self {
        HrDeskError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for HrDeskError {
    fn from(err: toml::ser::Error) -> Self {
        HrDeskError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for HrDeskError {
    fn from(err: serde_json::Error) -> Self {
        HrDeskError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for HR Desk operations.
pub type Result<T> = std::result::Result<T, HrDeskError>;
