//! Harness error type.

use thiserror::Error;
use valore_core::EngineError;
use valore_env::EnvError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Settings error: {0}")]
    Settings(#[from] EnvError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stream sink closed")]
    SinkClosed,
}
