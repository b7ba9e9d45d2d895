//! Errors raised while wiring up a client.

use kitstore_core::ConfigError;
use thiserror::Error;

/// Setup failures. Store operations report [`kitstore_core::KitStoreError`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(String),

    #[error("Failed to init subscriber: {0}")]
    Telemetry(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
