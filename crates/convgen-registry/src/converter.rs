//! The converter capability.

use std::any::Any;
use std::fmt;

use convgen_core::{Block, ConversionError, EmitContext, FunctionRef, Symbol, TypeDesc, TypeProvider};

use crate::lookup::LookupContext;

/// Identity of a registered converter instance.
///
/// Assigned in insertion order and stable across re-sorting, so it doubles as
/// the final tie-breaker between equal priorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConverterId(pub u32);

impl fmt::Display for ConverterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Dependencies handed to every converter by
/// [`init_all`](crate::ConverterRegistry::init_all).
#[derive(Clone, Copy)]
pub struct InitEnv<'a> {
    /// Descriptors for well-known types and bridge function signatures.
    pub types: &'a dyn TypeProvider,
    /// Configured bridge functions, in discovery order.
    pub bridge_functions: &'a [FunctionRef],
}

impl<'a> InitEnv<'a> {
    pub fn new(types: &'a dyn TypeProvider, bridge_functions: &'a [FunctionRef]) -> Self {
        Self {
            types,
            bridge_functions,
        }
    }
}

/// A conversion rule.
///
/// `can_convert` decides applicability; `emit` produces the code. Both receive a
/// [`LookupContext`] that already excludes this converter and every other
/// instance of the same implementation type, so a converter can ask for bridges
/// without ever resolving to itself.
///
/// `emit` is only called for pairs `can_convert` accepted, but it may still
/// fail when an inner hop produces no code.
pub trait Converter: Any {
    /// Precompute whatever the converter needs. Called once per run.
    fn init(&mut self, _env: &InitEnv<'_>) {}

    /// Whether a value of `source` can be converted into `target`.
    fn can_convert(&self, lookup: &LookupContext<'_>, target: &TypeDesc, source: &TypeDesc)
    -> bool;

    /// Emit the code assigning the converted `source` into `target`.
    fn emit(
        &self,
        lookup: &LookupContext<'_>,
        ctx: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError>;

    /// Human-readable summary for diagnostics, e.g. `T -> *T`.
    fn short_form(&self) -> String;
}
