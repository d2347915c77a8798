//! Orchestration around generated types.

use convgen_core::{Block, ConversionError, EmitContext, Symbol, TypeDesc};
use convgen_registry::LookupContext;

use super::{Orchestrator, RouteSet, Routing, StandardConversionOrchestrator};

/// A [`StandardConversionOrchestrator`] limited to the routes that keep the
/// generated type as an endpoint of the requested pair.
///
/// Generated code (protobuf messages, for instance) is only ever read from or
/// written to, never used as a stepping stone between two other types.
#[derive(Debug)]
pub struct GeneratedTypeOrchestrator {
    inner: StandardConversionOrchestrator,
}

impl GeneratedTypeOrchestrator {
    /// The routes with the generated type as source or target.
    pub const ROUTES: RouteSet = RouteSet::DIRECT
        .union(RouteSet::AFTER_BRIDGE)
        .union(RouteSet::REVERSE_DIRECT)
        .union(RouteSet::REVERSE_BEFORE_BRIDGE);

    pub fn new(
        generated: TypeDesc,
        general: TypeDesc,
        forward: impl Fn(&mut EmitContext, &Symbol, &Symbol) -> Block + 'static,
        reverse: impl Fn(&mut EmitContext, &Symbol, &Symbol) -> Block + 'static,
    ) -> Self {
        Self {
            inner: StandardConversionOrchestrator::new(generated, general, forward, reverse)
                .with_routes(Self::ROUTES),
        }
    }

    pub fn generated(&self) -> &TypeDesc {
        self.inner.special()
    }

    pub fn general(&self) -> &TypeDesc {
        self.inner.general()
    }
}

impl Orchestrator for GeneratedTypeOrchestrator {
    fn routing<'r>(
        &self,
        lookup: &LookupContext<'r>,
        target: &TypeDesc,
        source: &TypeDesc,
    ) -> Routing<'r> {
        self.inner.routing(lookup, target, source)
    }

    fn emit(
        &self,
        routing: &Routing<'_>,
        ctx: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError> {
        self.inner.emit(routing, ctx, target, source)
    }
}
