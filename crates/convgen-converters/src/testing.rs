//! Registry fixtures shared by the unit tests.

use convgen_core::{EmitContext, FunctionRef, Symbol, TypeTable};
use convgen_registry::{ConverterRegistry, InitEnv};

use crate::{BuiltinKind, register_builtins};

/// An initialized registry holding `kinds` at their default priorities.
pub(crate) fn registry(kinds: &[BuiltinKind]) -> ConverterRegistry {
    registry_with(kinds, &TypeTable::new(), &[])
}

pub(crate) fn registry_with(
    kinds: &[BuiltinKind],
    types: &TypeTable,
    bridges: &[FunctionRef],
) -> ConverterRegistry {
    let mut registry = ConverterRegistry::new();
    register_builtins(&mut registry, kinds.iter().copied()).unwrap();
    registry.init_all(&InitEnv::new(types, bridges)).unwrap();
    registry
}

/// Resolve and render the conversion of `source` into `target`.
pub(crate) fn render(registry: &ConverterRegistry, target: Symbol, source: Symbol) -> String {
    registry
        .resolve(&target.ty, &source.ty)
        .unwrap()
        .emit(&mut EmitContext::new(), &target, &source)
        .unwrap()
        .to_string()
}
