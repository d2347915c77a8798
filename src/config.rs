//! Generator configuration.
//!
//! Loaded from TOML. Every key is optional; unknown keys are rejected.
//!
//! ```toml
//! enabled = ["identical", "pointer_wrap", "numeric"]
//! bridge_functions = ["example.com/conv.ParseID"]
//! priority_patterns = ["*::NumericConverter"]
//! lookup_cache = true
//! max_lookup_depth = 32
//! nil_collapse = false
//! trace = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use convgen_converters::BuiltinKind;
use convgen_core::FunctionRef;
use convgen_registry::DEFAULT_MAX_LOOKUP_DEPTH;

/// Failure to load or interpret a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("bridge function `{0}` is not of the form import/path.Name")]
    InvalidBridgeFunction(String),
}

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Built-in converters to register, each at its default priority.
    pub enabled: Vec<BuiltinKind>,
    /// Package-level `func(A) B` functions usable as conversion bridges.
    pub bridge_functions: Vec<String>,
    /// Ordered name patterns; earlier patterns resolve first.
    pub priority_patterns: Vec<String>,
    pub lookup_cache: bool,
    pub max_lookup_depth: usize,
    /// Map zero scalars to `nil` when wrapping them in pointers.
    pub nil_collapse: bool,
    /// Precede each emitted hop with a comment naming its converter.
    pub trace: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            enabled: BuiltinKind::ALL.to_vec(),
            bridge_functions: Vec::new(),
            priority_patterns: Vec::new(),
            lookup_cache: true,
            max_lookup_depth: DEFAULT_MAX_LOOKUP_DEPTH,
            nil_collapse: false,
            trace: false,
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// The configured bridge functions, parsed.
    pub fn bridge_function_refs(&self) -> Result<Vec<FunctionRef>, ConfigError> {
        self.bridge_functions
            .iter()
            .map(|spelling| {
                FunctionRef::parse(spelling)
                    .ok_or_else(|| ConfigError::InvalidBridgeFunction(spelling.clone()))
            })
            .collect()
    }
}
