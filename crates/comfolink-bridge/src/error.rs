use comfolink_core::{CommunicationError, DefinitionError, ValueError};
use thiserror::Error;

/// Bridge-level errors.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Communication error: {0}")]
    Communication(#[from] CommunicationError),

    #[error("Value error: {0}")]
    Value(#[from] ValueError),

    #[error("Register map error: {0}")]
    Definition(#[from] DefinitionError),

    #[error("Unknown point: {0}")]
    UnknownKey(String),

    #[error("Point {0} is read-only")]
    ReadOnly(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
