//! convgen - type-directed conversion resolution and code synthesis.
//!
//! Given a target type and a source type, convgen finds the first registered
//! conversion rule that applies, possibly chaining through intermediate types,
//! and emits the code that performs the conversion.
//!
//! ## Crates
//!
//! - [`convgen_core`]: type descriptors, symbols and the emitted code model
//! - [`convgen_registry`]: the priority-ordered registry and scoped lookups
//! - [`convgen_converters`]: built-in converters, orchestrators and interceptors
//!
//! This crate ties them together behind a [`Generator`] configured from TOML.
//!
//! ## Example
//!
//! ```
//! use convgen::{Generator, GeneratorConfig};
//! use convgen_core::{Symbol, TypeDesc, TypeTable};
//!
//! let mut generator = Generator::new(GeneratorConfig::default())?;
//! generator.init(&TypeTable::new())?;
//!
//! let int = TypeDesc::scalar("int");
//! let mut ctx = generator.emit_context();
//! let code = generator.convert(
//!     &mut ctx,
//!     &Symbol::field("out", "Age", TypeDesc::pointer(int.clone())),
//!     &Symbol::field("in", "Age", int),
//! )?;
//! assert_eq!(code.to_string(), "out.Age = &in.Age\n");
//! # Ok::<(), convgen::Error>(())
//! ```

mod config;
mod error;
mod generator;

use std::sync::Once;

pub use config::{ConfigError, GeneratorConfig};
pub use error::{Error, Result};
pub use generator::{Field, Generator, MappingOutput, MappingSummary, Unconvertible};

pub use convgen_converters;
pub use convgen_core;
pub use convgen_registry;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set. Safe to call more than once.
/// `RUST_LOG=convgen_registry=trace` shows every lookup.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .try_init();
        }
    });
}
