//! convgen converter registry.
//!
//! ## Lifecycle
//!
//! A [`ConverterRegistry`] is owned by one generation run and goes through two
//! phases:
//!
//! - **Setup**: [`clear`](ConverterRegistry::clear) →
//!   [`register`](ConverterRegistry::register) /
//!   [`register_builtin`](ConverterRegistry::register_builtin) →
//!   [`reprioritize_by_patterns`](ConverterRegistry::reprioritize_by_patterns) →
//!   [`init_all`](ConverterRegistry::init_all)
//! - **Resolution**: [`resolve`](ConverterRegistry::resolve) and nested
//!   [`LookupContext::look_up`] calls. Only the lookup cache changes.
//!
//! ## Modules
//!
//! - [`converter`]: the [`Converter`] capability and its init environment
//! - [`lookup`]: scoped lookup contexts and resolved handles
//! - [`pattern`]: priority pattern matching
//! - [`registry`]: the registry itself

mod cache;
pub mod converter;
mod error;
pub mod lookup;
pub mod pattern;
pub mod registry;

pub use cache::CacheStats;
pub use converter::{Converter, ConverterId, InitEnv};
pub use error::RegistryError;
pub use lookup::{LookupContext, Resolved};
pub use pattern::PriorityPatterns;
pub use registry::{ConverterDescription, ConverterEntry, ConverterRegistry, DEFAULT_MAX_LOOKUP_DEPTH};

pub use convgen_core::ConversionError;
