//! Subcommand implementations.

pub mod cart;
pub mod catalog;
pub mod search;

use thiserror::Error;

use cartwheel_client::{ClientConfig, ClientError, RestGateway, Storefront};

/// A storefront session over the REST backend.
pub type Store = Storefront<RestGateway>;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Client operation failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The named cart line is not in the cart.
    #[error("No cart line with ID {0}")]
    UnknownLine(String),
}

/// Load configuration and open a session.
///
/// # Errors
///
/// Returns an error if configuration is missing or the HTTP client cannot be built.
pub fn connect() -> Result<Store, CommandError> {
    let config = ClientConfig::from_env().map_err(ClientError::from)?;
    tracing::debug!(?config, "Loaded configuration");
    let gateway = RestGateway::new(&config).map_err(ClientError::from)?;
    Ok(Storefront::new(gateway, &config))
}
