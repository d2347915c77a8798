//! Catalogue of built-in converters.
//!
//! Built-ins take small fixed priorities so that user converters, registered
//! afterwards, always come later unless priority patterns say otherwise.

use serde::{Deserialize, Serialize};
use tracing::debug;

use convgen_registry::{ConverterId, ConverterRegistry, RegistryError};

use crate::adapters::{ProtoWrapperConverter, SqlNullConverter};
use crate::conversion::{
    FunctionConverter, IdenticalConverter, NumericConverter, PointerUnwrapConverter,
    PointerWrapConverter, SliceConverter,
};

/// A built-in converter, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinKind {
    Identical,
    PointerWrap,
    PointerUnwrap,
    Slice,
    Numeric,
    Function,
    SqlNull,
    ProtoWrapper,
}

impl BuiltinKind {
    /// Every kind, in default priority order.
    pub const ALL: [BuiltinKind; 8] = [
        BuiltinKind::Identical,
        BuiltinKind::PointerWrap,
        BuiltinKind::PointerUnwrap,
        BuiltinKind::Slice,
        BuiltinKind::Numeric,
        BuiltinKind::Function,
        BuiltinKind::SqlNull,
        BuiltinKind::ProtoWrapper,
    ];

    pub const fn default_priority(self) -> i64 {
        match self {
            BuiltinKind::Identical => 0,
            BuiltinKind::PointerWrap => 10,
            BuiltinKind::PointerUnwrap => 11,
            BuiltinKind::Slice => 20,
            BuiltinKind::Numeric => 30,
            BuiltinKind::Function => 40,
            BuiltinKind::SqlNull => 50,
            BuiltinKind::ProtoWrapper => 51,
        }
    }

    /// Configuration spelling.
    pub const fn name(self) -> &'static str {
        match self {
            BuiltinKind::Identical => "identical",
            BuiltinKind::PointerWrap => "pointer_wrap",
            BuiltinKind::PointerUnwrap => "pointer_unwrap",
            BuiltinKind::Slice => "slice",
            BuiltinKind::Numeric => "numeric",
            BuiltinKind::Function => "function",
            BuiltinKind::SqlNull => "sql_null",
            BuiltinKind::ProtoWrapper => "proto_wrapper",
        }
    }

    fn register(self, registry: &mut ConverterRegistry) -> Result<ConverterId, RegistryError> {
        let priority = self.default_priority();
        match self {
            BuiltinKind::Identical => registry.register_builtin(IdenticalConverter, priority),
            BuiltinKind::PointerWrap => registry.register_builtin(PointerWrapConverter, priority),
            BuiltinKind::PointerUnwrap => {
                registry.register_builtin(PointerUnwrapConverter, priority)
            }
            BuiltinKind::Slice => registry.register_builtin(SliceConverter, priority),
            BuiltinKind::Numeric => registry.register_builtin(NumericConverter::new(), priority),
            BuiltinKind::Function => registry.register_builtin(FunctionConverter::new(), priority),
            BuiltinKind::SqlNull => registry.register_builtin(SqlNullConverter::new(), priority),
            BuiltinKind::ProtoWrapper => {
                registry.register_builtin(ProtoWrapperConverter::new(), priority)
            }
        }
    }
}

impl std::fmt::Display for BuiltinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Register each kind once, at its default priority.
pub fn register_builtins(
    registry: &mut ConverterRegistry,
    kinds: impl IntoIterator<Item = BuiltinKind>,
) -> Result<Vec<ConverterId>, RegistryError> {
    let mut seen = Vec::new();
    let mut ids = Vec::new();
    for kind in kinds {
        if seen.contains(&kind) {
            debug!(%kind, "built-in listed twice, skipping");
            continue;
        }
        seen.push(kind);
        ids.push(kind.register(registry)?);
    }
    Ok(ids)
}
