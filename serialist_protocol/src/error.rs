// Errors raised while decoding client frames or building server messages.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message has no type field")]
    MissingType,
    #[error("Unknown message type: {0}")]
    UnknownType(String),
    #[error("{factor} must be between {min} and {max}, got {value}")]
    FactorOutOfRange {
        factor: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}
