use thiserror::Error;

use convgen_core::ConversionError;
use convgen_registry::RegistryError;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, Error>;

/// Any failure surfaced by the [`Generator`](crate::Generator).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl Error {
    /// Whether this is a per-field conversion failure rather than misuse or bad
    /// configuration.
    pub fn is_conversion(&self) -> bool {
        matches!(self, Error::Conversion(_))
    }
}
