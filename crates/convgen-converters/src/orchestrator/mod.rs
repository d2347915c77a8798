//! Eight-route conversion policy.
//!
//! Library adapters convert between one *special* type (a wrapper such as
//! `sql.NullString`) and one *general* type (`string`). They provide two
//! primitives, forward (`special -> general`) and reverse
//! (`general -> special`); the orchestrator decides how to reach a requested
//! pair from them, bridging through other converters where needed:
//!
//! | Route                 | Shape                                  |
//! |-----------------------|----------------------------------------|
//! | `Direct`              | special -> general                     |
//! | `BeforeBridge`        | source -> special -> general           |
//! | `AfterBridge`         | special -> general -> target           |
//! | `BothBridges`         | source -> special -> general -> target |
//! | `ReverseDirect`       | general -> special                     |
//! | `ReverseBeforeBridge` | source -> general -> special           |
//! | `ReverseAfterBridge`  | general -> special -> target           |
//! | `ReverseBothBridges`  | source -> general -> special -> target |
//!
//! Routes are tried in table order and the first whose bridges resolve wins.
//! Bridges are looked up with the adapter hidden at every depth, so a route
//! never passes through the same adapter twice.

mod generated;

pub use generated::GeneratedTypeOrchestrator;

use bitflags::bitflags;

use convgen_core::{Block, ConversionError, EmitContext, Symbol, TypeDesc};
use convgen_registry::{LookupContext, Resolved};

bitflags! {
    /// A mask of enabled routes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RouteSet: u8 {
        const DIRECT = 1 << 0;
        const BEFORE_BRIDGE = 1 << 1;
        const AFTER_BRIDGE = 1 << 2;
        const BOTH_BRIDGES = 1 << 3;
        const REVERSE_DIRECT = 1 << 4;
        const REVERSE_BEFORE_BRIDGE = 1 << 5;
        const REVERSE_AFTER_BRIDGE = 1 << 6;
        const REVERSE_BOTH_BRIDGES = 1 << 7;

        const FORWARD = Self::DIRECT.bits()
            | Self::BEFORE_BRIDGE.bits()
            | Self::AFTER_BRIDGE.bits()
            | Self::BOTH_BRIDGES.bits();
        const REVERSE = Self::REVERSE_DIRECT.bits()
            | Self::REVERSE_BEFORE_BRIDGE.bits()
            | Self::REVERSE_AFTER_BRIDGE.bits()
            | Self::REVERSE_BOTH_BRIDGES.bits();
    }
}

/// How a requested pair is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    None,
    Direct,
    BeforeBridge,
    AfterBridge,
    BothBridges,
    ReverseDirect,
    ReverseBeforeBridge,
    ReverseAfterBridge,
    ReverseBothBridges,
}

impl Route {
    /// Evaluation order.
    pub const ORDER: [Route; 8] = [
        Route::Direct,
        Route::BeforeBridge,
        Route::AfterBridge,
        Route::BothBridges,
        Route::ReverseDirect,
        Route::ReverseBeforeBridge,
        Route::ReverseAfterBridge,
        Route::ReverseBothBridges,
    ];

    pub const fn flag(self) -> RouteSet {
        match self {
            Route::None => RouteSet::empty(),
            Route::Direct => RouteSet::DIRECT,
            Route::BeforeBridge => RouteSet::BEFORE_BRIDGE,
            Route::AfterBridge => RouteSet::AFTER_BRIDGE,
            Route::BothBridges => RouteSet::BOTH_BRIDGES,
            Route::ReverseDirect => RouteSet::REVERSE_DIRECT,
            Route::ReverseBeforeBridge => RouteSet::REVERSE_BEFORE_BRIDGE,
            Route::ReverseAfterBridge => RouteSet::REVERSE_AFTER_BRIDGE,
            Route::ReverseBothBridges => RouteSet::REVERSE_BOTH_BRIDGES,
        }
    }

    /// Whether the route uses the reverse primitive.
    pub const fn is_reverse(self) -> bool {
        matches!(
            self,
            Route::ReverseDirect
                | Route::ReverseBeforeBridge
                | Route::ReverseAfterBridge
                | Route::ReverseBothBridges
        )
    }

    /// Whether the source is bridged into the primitive's input type.
    pub const fn bridges_source(self) -> bool {
        matches!(
            self,
            Route::BeforeBridge
                | Route::BothBridges
                | Route::ReverseBeforeBridge
                | Route::ReverseBothBridges
        )
    }

    /// Whether the primitive's output is bridged into the target.
    pub const fn bridges_target(self) -> bool {
        matches!(
            self,
            Route::AfterBridge
                | Route::BothBridges
                | Route::ReverseAfterBridge
                | Route::ReverseBothBridges
        )
    }
}

/// The outcome of routing one pair: a route and the bridges it needs.
#[derive(Debug, Clone, Copy)]
pub struct Routing<'r> {
    pub route: Route,
    /// `source -> primitive input`, for routes that bridge the source.
    pub before: Option<Resolved<'r>>,
    /// `primitive output -> target`, for routes that bridge the target.
    pub after: Option<Resolved<'r>>,
}

impl Routing<'_> {
    pub fn none() -> Self {
        Self {
            route: Route::None,
            before: None,
            after: None,
        }
    }

    pub fn is_none(&self) -> bool {
        self.route == Route::None
    }
}

/// Routing policy around one special type.
pub trait Orchestrator {
    /// Choose a route for `source -> target`. Computed fresh on every call.
    fn routing<'r>(
        &self,
        lookup: &LookupContext<'r>,
        target: &TypeDesc,
        source: &TypeDesc,
    ) -> Routing<'r>;

    /// Emit the conversion along a route returned by [`Orchestrator::routing`].
    fn emit(
        &self,
        routing: &Routing<'_>,
        ctx: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError>;
}

/// A primitive conversion: `(ctx, target, source) -> code`.
pub type Primitive = Box<dyn Fn(&mut EmitContext, &Symbol, &Symbol) -> Block>;

/// All eight routes around a special/general type pair.
pub struct StandardConversionOrchestrator {
    special: TypeDesc,
    general: TypeDesc,
    forward: Primitive,
    reverse: Primitive,
    routes: RouteSet,
}

impl StandardConversionOrchestrator {
    pub fn new(
        special: TypeDesc,
        general: TypeDesc,
        forward: impl Fn(&mut EmitContext, &Symbol, &Symbol) -> Block + 'static,
        reverse: impl Fn(&mut EmitContext, &Symbol, &Symbol) -> Block + 'static,
    ) -> Self {
        Self {
            special,
            general,
            forward: Box::new(forward),
            reverse: Box::new(reverse),
            routes: RouteSet::all(),
        }
    }

    /// Restrict the routes considered.
    pub fn with_routes(mut self, routes: RouteSet) -> Self {
        self.routes = routes;
        self
    }

    pub fn special(&self) -> &TypeDesc {
        &self.special
    }

    pub fn general(&self) -> &TypeDesc {
        &self.general
    }

    pub fn routes(&self) -> RouteSet {
        self.routes
    }

    /// Input and output types of the primitive a route uses.
    fn endpoints(&self, route: Route) -> (&TypeDesc, &TypeDesc) {
        if route.is_reverse() {
            (&self.general, &self.special)
        } else {
            (&self.special, &self.general)
        }
    }

    fn try_route<'r>(
        &self,
        route: Route,
        lookup: &LookupContext<'r>,
        target: &TypeDesc,
        source: &TypeDesc,
    ) -> Option<Routing<'r>> {
        let (input, output) = self.endpoints(route);
        if !route.bridges_source() && !source.is_identical(input) {
            return None;
        }
        if !route.bridges_target() && !target.is_identical(output) {
            return None;
        }
        let bridges = lookup.without_reentry();
        let before = route
            .bridges_source()
            .then(|| bridges.look_up(input, source))
            .transpose()
            .ok()?;
        let after = route
            .bridges_target()
            .then(|| bridges.look_up(target, output))
            .transpose()
            .ok()?;
        Some(Routing {
            route,
            before,
            after,
        })
    }
}

impl Orchestrator for StandardConversionOrchestrator {
    fn routing<'r>(
        &self,
        lookup: &LookupContext<'r>,
        target: &TypeDesc,
        source: &TypeDesc,
    ) -> Routing<'r> {
        Route::ORDER
            .into_iter()
            .filter(|route| self.routes.contains(route.flag()))
            .find_map(|route| self.try_route(route, lookup, target, source))
            .unwrap_or_else(Routing::none)
    }

    fn emit(
        &self,
        routing: &Routing<'_>,
        ctx: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError> {
        if routing.is_none() {
            return Err(ConversionError::not_found(&target.ty, &source.ty));
        }
        let (input, output) = self.endpoints(routing.route);
        let primitive = if routing.route.is_reverse() {
            &self.reverse
        } else {
            &self.forward
        };

        let mut block = Block::new();
        let input = match &routing.before {
            Some(before) => {
                let temp = ctx.declare_temp(input.clone(), &mut block);
                block.append(before.emit(ctx, &temp, source)?);
                temp
            }
            None => source.clone(),
        };
        match &routing.after {
            Some(after) => {
                let temp = ctx.declare_temp(output.clone(), &mut block);
                block.append(primitive(ctx, &temp, &input));
                block.append(after.emit(ctx, target, &temp)?);
            }
            None => block.append(primitive(ctx, target, &input)),
        }
        Ok(block)
    }
}

impl std::fmt::Debug for StandardConversionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardConversionOrchestrator")
            .field("special", &self.special)
            .field("general", &self.general)
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}
