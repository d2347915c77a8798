//! Library-specific single-value adapters.
//!
//! Each adapter owns one orchestrator per wrapper type it knows and answers
//! with the first orchestrator that finds a route.

mod proto_wrapper;
mod sql_null;

pub use proto_wrapper::ProtoWrapperConverter;
pub use sql_null::SqlNullConverter;

use convgen_core::{Block, ConversionError, EmitContext, Symbol, TypeDesc};
use convgen_registry::LookupContext;

use crate::orchestrator::{Orchestrator, Routing};

/// The first orchestrator with a route for `source -> target`.
fn first_route<'o, 'r, O: Orchestrator>(
    orchestrators: &'o [O],
    lookup: &LookupContext<'r>,
    target: &TypeDesc,
    source: &TypeDesc,
) -> Option<(&'o O, Routing<'r>)> {
    orchestrators.iter().find_map(|orchestrator| {
        let routing = orchestrator.routing(lookup, target, source);
        (!routing.is_none()).then_some((orchestrator, routing))
    })
}

fn emit_first<O: Orchestrator>(
    orchestrators: &[O],
    lookup: &LookupContext<'_>,
    ctx: &mut EmitContext,
    target: &Symbol,
    source: &Symbol,
) -> Result<Block, ConversionError> {
    let (orchestrator, routing) = first_route(orchestrators, lookup, &target.ty, &source.ty)
        .ok_or_else(|| ConversionError::not_found(&target.ty, &source.ty))?;
    orchestrator.emit(&routing, ctx, target, source)
}

/// Look up `package.name` through the provider, falling back to a struct.
fn well_known(env: &convgen_registry::InitEnv<'_>, package: &str, name: &str) -> TypeDesc {
    env.types
        .named_type(package, name)
        .unwrap_or_else(|| TypeDesc::struct_type(package, name))
}
