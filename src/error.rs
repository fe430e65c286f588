use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Why a handler was not admitted into the registry.
///
/// Rejections are ordinary outcomes, not faults: the caller checks the result
/// and decides what to do.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("handler id {0:?} is empty or contains whitespace")]
    InvalidId(String),
    #[error("handler {0} is disabled by configuration")]
    Disabled(String),
    #[error("handler {0} is already present in its type group")]
    Duplicate(String),
}

pub type Result<T> = std::result::Result<T, BrokerError>;
