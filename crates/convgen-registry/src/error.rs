use thiserror::Error;

/// Lifecycle misuse of a [`ConverterRegistry`](crate::ConverterRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Setup operation attempted after `init_all`.
    #[error("registry is sealed: converters were already initialized for this run")]
    Sealed,

    /// `init_all` called twice without an intervening `clear`.
    #[error("init_all was already called for this run")]
    AlreadyInitialized,

    /// Resolution attempted before `init_all`.
    #[error("converters have not been initialized; call init_all first")]
    NotInitialized,
}
