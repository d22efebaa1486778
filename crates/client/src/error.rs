//! Unified error type for [`Storefront`](crate::Storefront) operations.

use thiserror::Error;

use crate::cart::CommitError;
use crate::config::ConfigError;
use crate::gateway::GatewayError;

/// Any error a storefront operation can return.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A backend call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Saving pending cart quantities failed.
    #[error(transparent)]
    Commit(#[from] CommitError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// The underlying gateway error, if the failure came from the backend.
    #[must_use]
    pub const fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            Self::Gateway(err) => Some(err),
            Self::Commit(err) => err.gateway_error(),
            Self::Config(_) => None,
        }
    }

    /// Whether retrying the operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.gateway_error().is_some_and(GatewayError::is_retryable)
    }
}
