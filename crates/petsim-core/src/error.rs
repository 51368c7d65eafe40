//! Top-level error for the engine facade.
//!
//! [`EngineError`] wraps every failure that can stop an engine from
//! starting, so callers can propagate with `?`.

use petsim_pets::CatalogError;

use crate::config::ConfigError;
use crate::registry::RegistryError;

/// Top-level engine error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration was invalid.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The configured item catalog was rejected.
    #[error("catalog error: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: CatalogError,
    },

    /// A registry operation failed.
    #[error("registry error: {source}")]
    Registry {
        /// The underlying registry error.
        #[from]
        source: RegistryError,
    },
}
