//! Scoped lookups and resolved handles.

use std::any::TypeId;
use std::fmt;

use tracing::{trace, warn};

use convgen_core::{Block, ConversionError, EmitContext, QualifiedName, Symbol, TypeDesc};

use crate::converter::{Converter, ConverterId};
use crate::registry::{ConverterEntry, ConverterRegistry};

/// A view of the registry for one lookup.
///
/// The root context sees every converter. The context handed to a converter
/// hides that converter and every other instance of its implementation type.
/// Kinds barred with [`LookupContext::without_reentry`] stay hidden for every
/// nested lookup as well.
#[derive(Clone, Copy)]
pub struct LookupContext<'r> {
    registry: &'r ConverterRegistry,
    excluding: Option<(ConverterId, TypeId, u64)>,
    barred: u64,
    depth: usize,
}

impl<'r> LookupContext<'r> {
    pub(crate) fn root(registry: &'r ConverterRegistry) -> Self {
        Self {
            registry,
            excluding: None,
            barred: 0,
            depth: 0,
        }
    }

    pub(crate) fn scoped(
        registry: &'r ConverterRegistry,
        entry: &ConverterEntry,
        barred: u64,
        depth: usize,
    ) -> Self {
        Self {
            registry,
            excluding: Some((entry.id(), entry.kind(), entry.kind_bit())),
            barred,
            depth,
        }
    }

    /// This context, with the excluded converter's kind also hidden from every
    /// lookup nested under it.
    ///
    /// Adapters use it for their bridges so a bridge never routes back
    /// through the adapter.
    pub fn without_reentry(&self) -> Self {
        let bit = self.excluding.map_or(0, |(_, _, bit)| bit);
        Self {
            barred: self.barred | bit,
            ..*self
        }
    }

    pub fn registry(&self) -> &'r ConverterRegistry {
        self.registry
    }

    /// Nesting level; the root context is 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The converter this context was handed to, if any.
    pub fn excluding(&self) -> Option<ConverterId> {
        self.excluding.map(|(id, _, _)| id)
    }

    fn admits(&self, entry: &ConverterEntry) -> bool {
        if entry.kind_bit() & self.barred != 0 {
            return false;
        }
        match self.excluding {
            None => true,
            Some((id, kind, _)) => entry.id() != id && entry.kind() != kind,
        }
    }

    /// Find the first visible converter for `source -> target`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn look_up(
        &self,
        target: &TypeDesc,
        source: &TypeDesc,
    ) -> Result<Resolved<'r>, ConversionError> {
        let registry = self.registry;
        if self.depth >= registry.max_lookup_depth() {
            registry.guard().borrow_mut().note_cut();
            warn!(depth = self.depth, %target, %source, "lookup depth bound reached");
            return Err(ConversionError::not_found(target, source));
        }

        let excluded_kind = self.excluding.map(|(_, kind, _)| kind);
        let barred = self.barred;
        let caching = registry.cache().borrow().is_enabled();
        if caching {
            let candidates = registry.cache().borrow().candidates(excluded_kind, barred, target, source);
            for id in candidates {
                let Some(position) = registry.position_of(id) else {
                    continue;
                };
                if self.admits(&registry.entries()[position]) {
                    registry.cache().borrow_mut().note_hit();
                    trace!(%id, %target, %source, depth = self.depth, "lookup cache hit");
                    return Ok(Resolved::new(registry, position, barred, self.depth + 1));
                }
            }
            registry.cache().borrow_mut().note_miss();
        }

        let key = (excluded_kind, barred, target.clone(), source.clone());
        let cuts_before = registry.guard().borrow().cuts();
        if !registry.guard().borrow_mut().enter(&key) {
            trace!(%target, %source, depth = self.depth, "lookup already in progress or failed");
            return Err(ConversionError::not_found(target, source));
        }

        let found = registry
            .entries()
            .iter()
            .enumerate()
            .find(|(_, entry)| {
                self.admits(entry)
                    && entry.converter().can_convert(
                        &LookupContext::scoped(registry, entry, barred, self.depth + 1),
                        target,
                        source,
                    )
            })
            .map(|(position, entry)| (position, entry.id()));
        let mut guard = registry.guard().borrow_mut();
        // a result that leaned on a cut lookup is only good for this resolve
        let complete = guard.cuts() == cuts_before;
        guard.leave(key, found.is_some(), complete);
        drop(guard);

        let Some((position, id)) = found else {
            trace!(%target, %source, depth = self.depth, "no converter");
            return Err(ConversionError::not_found(target, source));
        };
        trace!(
            converter = %registry.entries()[position].qualified_name(),
            %target,
            %source,
            depth = self.depth,
            "resolved"
        );
        if caching && complete {
            registry
                .cache()
                .borrow_mut()
                .record(excluded_kind, barred, target, source, id);
        }
        Ok(Resolved::new(registry, position, barred, self.depth + 1))
    }
}

impl fmt::Debug for LookupContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupContext")
            .field("excluding", &self.excluding())
            .field("barred", &format_args!("{:#x}", self.barred))
            .field("depth", &self.depth)
            .finish()
    }
}

/// A converter chosen for a pair, ready to emit.
#[derive(Clone, Copy)]
pub struct Resolved<'r> {
    registry: &'r ConverterRegistry,
    position: usize,
    barred: u64,
    depth: usize,
}

impl<'r> Resolved<'r> {
    fn new(registry: &'r ConverterRegistry, position: usize, barred: u64, depth: usize) -> Self {
        Self {
            registry,
            position,
            barred,
            depth,
        }
    }

    pub fn entry(&self) -> &'r ConverterEntry {
        &self.registry.entries()[self.position]
    }

    pub fn id(&self) -> ConverterId {
        self.entry().id()
    }

    pub fn qualified_name(&self) -> &'r QualifiedName {
        self.entry().qualified_name()
    }

    pub fn short_form(&self) -> String {
        self.entry().converter().short_form()
    }

    /// Whether the chosen converter is an instance of `C`.
    pub fn is<C: Converter>(&self) -> bool {
        self.entry().kind() == TypeId::of::<C>()
    }

    fn scope(&self) -> LookupContext<'r> {
        LookupContext::scoped(self.registry, self.entry(), self.barred, self.depth)
    }

    /// Ask the chosen converter about another pair, under its own exclusions.
    pub fn can_convert(&self, target: &TypeDesc, source: &TypeDesc) -> bool {
        self.entry().converter().can_convert(&self.scope(), target, source)
    }

    /// Emit the assignment of `source` into `target`.
    ///
    /// A converter that returns an empty block fails with
    /// [`ConversionError::EmissionFailed`].
    pub fn emit(
        &self,
        ctx: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError> {
        if self.depth == 1 {
            // top-level emission starts a fresh resolution
            self.registry.guard().borrow_mut().reset();
        }
        let mut block = Block::new();
        ctx.annotate(&mut block, || {
            format!("{} <- {}: {}", target.path(), source.path(), self.short_form())
        });
        let code = self.entry().converter().emit(&self.scope(), ctx, target, source)?;
        if code.code_len() == 0 {
            return Err(ConversionError::emission_failed(
                self.qualified_name().to_string(),
                &target.ty,
                &source.ty,
            ));
        }
        block.append(code);
        Ok(block)
    }
}

impl fmt::Debug for Resolved<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("id", &self.id())
            .field("converter", &self.qualified_name().to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InitEnv;
    use convgen_core::{Expr, Stmt, TypeTable};

    /// `*T <- T` by asking for `T <- U` first, like a pointer wrapper.
    struct Wrap;

    /// `T <- T`.
    struct Plain;

    /// Accepts anything and emits nothing.
    struct Silent;

    /// Recurses forever through another instance of a different kind.
    struct Loop<const N: u8>;

    impl Converter for Wrap {
        fn can_convert(&self, lookup: &LookupContext<'_>, target: &TypeDesc, source: &TypeDesc) -> bool {
            target
                .pointee()
                .is_some_and(|inner| lookup.look_up(inner, source).is_ok())
        }

        fn emit(
            &self,
            lookup: &LookupContext<'_>,
            ctx: &mut EmitContext,
            target: &Symbol,
            source: &Symbol,
        ) -> Result<Block, ConversionError> {
            let Some(inner) = target.ty.pointee() else {
                return Err(ConversionError::not_found(&target.ty, &source.ty));
            };
            let mut block = Block::new();
            let temp = ctx.declare_temp(inner.clone(), &mut block);
            block.append(lookup.look_up(inner, &source.ty)?.emit(ctx, &temp, source)?);
            block.push(Stmt::assign(target.expr(), temp.expr().address_of()));
            Ok(block)
        }

        fn short_form(&self) -> String {
            "T -> *T".into()
        }
    }

    impl Converter for Plain {
        fn can_convert(&self, _: &LookupContext<'_>, target: &TypeDesc, source: &TypeDesc) -> bool {
            target == source
        }

        fn emit(
            &self,
            _: &LookupContext<'_>,
            _: &mut EmitContext,
            target: &Symbol,
            source: &Symbol,
        ) -> Result<Block, ConversionError> {
            Ok(Block::of(Stmt::assign(target.expr(), source.expr())))
        }

        fn short_form(&self) -> String {
            "T -> T".into()
        }
    }

    impl Converter for Silent {
        fn can_convert(&self, _: &LookupContext<'_>, _: &TypeDesc, _: &TypeDesc) -> bool {
            true
        }

        fn emit(
            &self,
            _: &LookupContext<'_>,
            _: &mut EmitContext,
            _: &Symbol,
            _: &Symbol,
        ) -> Result<Block, ConversionError> {
            Ok(Block::of(Stmt::comment("nothing")))
        }

        fn short_form(&self) -> String {
            "silent".into()
        }
    }

    impl<const N: u8> Converter for Loop<N> {
        fn can_convert(&self, lookup: &LookupContext<'_>, target: &TypeDesc, source: &TypeDesc) -> bool {
            lookup.look_up(target, source).is_ok()
        }

        fn emit(
            &self,
            _: &LookupContext<'_>,
            _: &mut EmitContext,
            target: &Symbol,
            _: &Symbol,
        ) -> Result<Block, ConversionError> {
            Ok(Block::of(Stmt::assign(target.expr(), Expr::Nil)))
        }

        fn short_form(&self) -> String {
            format!("loop {N}")
        }
    }

    fn init(mut registry: ConverterRegistry) -> ConverterRegistry {
        registry.init_all(&InitEnv::new(&TypeTable::new(), &[])).unwrap();
        registry
    }

    #[test]
    fn nested_lookup_emits_through_bridge() {
        let mut registry = ConverterRegistry::new();
        registry.register_builtin(Plain, 0).unwrap();
        registry.register_builtin(Wrap, 1).unwrap();
        let registry = init(registry);

        let int = TypeDesc::scalar("int");
        let target_ty = TypeDesc::pointer(int.clone());
        let resolved = registry.resolve(&target_ty, &int).unwrap();
        assert!(resolved.is::<Wrap>());
        assert!(!resolved.is::<Plain>());

        let mut ctx = EmitContext::new();
        let block = resolved
            .emit(
                &mut ctx,
                &Symbol::field("t", "A", target_ty),
                &Symbol::field("s", "A", int),
            )
            .unwrap();
        assert_eq!(block.to_string(), "var v0 int\nv0 = s.A\nt.A = &v0\n");
    }

    #[test]
    fn self_recursion_is_excluded() {
        let mut registry = ConverterRegistry::new();
        registry.register_builtin(Plain, 0).unwrap();
        registry.register_builtin(Wrap, 1).unwrap();
        let registry = init(registry);

        let int = TypeDesc::scalar("int");
        // **int <- int would need Wrap twice
        let twice = TypeDesc::pointer(TypeDesc::pointer(int.clone()));
        assert!(matches!(
            registry.resolve(&twice, &int),
            Err(ConversionError::NoConverterFound { .. })
        ));
    }

    #[test]
    fn empty_emission_fails() {
        let mut registry = ConverterRegistry::new();
        registry.register_builtin(Silent, 0).unwrap();
        let registry = init(registry);

        let int = TypeDesc::scalar("int");
        let resolved = registry.resolve(&int, &int).unwrap();
        let err = resolved
            .emit(
                &mut EmitContext::new(),
                &Symbol::variable("t", int.clone()),
                &Symbol::variable("s", int.clone()),
            )
            .unwrap_err();
        assert!(matches!(err, ConversionError::EmissionFailed { .. }));
    }

    #[test]
    fn trace_annotations_precede_code() {
        let mut registry = ConverterRegistry::new();
        registry.register_builtin(Plain, 0).unwrap();
        let registry = init(registry);

        let int = TypeDesc::scalar("int");
        let block = registry
            .resolve(&int, &int)
            .unwrap()
            .emit(
                &mut EmitContext::new().with_trace(true),
                &Symbol::variable("t", int.clone()),
                &Symbol::variable("s", int.clone()),
            )
            .unwrap();
        assert_eq!(block.len(), 2);
        assert_eq!(block.code_len(), 1);
        assert!(block.to_string().starts_with("// t <- s: T -> T"));
    }

    #[test]
    fn mutual_recursion_terminates() {
        let mut registry = ConverterRegistry::new();
        registry.register_builtin(Loop::<0>, 0).unwrap();
        registry.register_builtin(Loop::<1>, 1).unwrap();
        let registry = init(registry);

        let int = TypeDesc::scalar("int");
        // each kind only hides itself, so the two keep asking each other
        assert!(registry.resolve(&int, &int).is_err());
        assert!(registry.resolve(&int, &int).is_err());
    }

    #[test]
    fn depth_bound_limits_nesting() {
        let int = TypeDesc::scalar("int");
        let target = TypeDesc::pointer(int.clone());

        for (bound, expected) in [(1, false), (2, true)] {
            let mut registry = ConverterRegistry::new();
            registry.set_max_lookup_depth(bound);
            registry.register_builtin(Plain, 0).unwrap();
            registry.register_builtin(Wrap, 1).unwrap();
            let registry = init(registry);
            assert_eq!(registry.resolve(&target, &int).is_ok(), expected, "bound {bound}");
        }
    }

    #[test]
    fn barred_kinds_stay_hidden_when_nested() {
        let mut registry = ConverterRegistry::new();
        registry.register_builtin(Plain, 0).unwrap();
        registry.register_builtin(Wrap, 1).unwrap();
        let registry = init(registry);

        let int = TypeDesc::scalar("int");
        let pointer = TypeDesc::pointer(int.clone());
        let plain = &registry.entries()[0];

        // Wrap reaches Plain again through its own scope
        let open = LookupContext::scoped(&registry, plain, 0, 1);
        assert!(open.look_up(&pointer, &int).is_ok());

        let closed = open.without_reentry();
        assert!(closed.look_up(&pointer, &int).is_err());
        assert_eq!(closed.excluding(), open.excluding());
    }

    #[test]
    fn root_context_excludes_nothing() {
        let registry = init(ConverterRegistry::new());
        let root = LookupContext::root(&registry);
        assert_eq!(root.excluding(), None);
        assert_eq!(root.depth(), 0);
    }
}
