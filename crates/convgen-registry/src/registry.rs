//! ConverterRegistry - the ordered list of conversion rules for one run.
//!
//! Entries are kept sorted by ascending priority; ties keep insertion order.
//! Resolution walks the entries front to back and the first converter that
//! accepts the pair wins, so order is the whole policy.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = ConverterRegistry::new();
//! registry.register_builtin(IdenticalConverter, 0)?;
//! registry.register(MyConverter::default())?;
//! registry.reprioritize_by_patterns(&["my_crate::*"])?;
//! registry.init_all(&InitEnv::new(&types, &[]))?;
//!
//! let resolved = registry.resolve(&target_ty, &source_ty)?;
//! let code = resolved.emit(&mut EmitContext::new(), &target, &source)?;
//! ```

use std::any::TypeId;
use std::cell::RefCell;
use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use convgen_core::{ConversionError, QualifiedName, TypeDesc};

use crate::cache::{CacheStats, LookupCache, LookupGuard};
use crate::converter::{Converter, ConverterId, InitEnv};
use crate::error::RegistryError;
use crate::lookup::{LookupContext, Resolved};
use crate::pattern::PriorityPatterns;

/// Default bound on nested lookups.
pub const DEFAULT_MAX_LOOKUP_DEPTH: usize = 32;

/// A registered converter with its identity and priority.
pub struct ConverterEntry {
    converter: Box<dyn Converter>,
    id: ConverterId,
    kind: TypeId,
    kind_bit: u64,
    qualified_name: QualifiedName,
    priority: i64,
    is_built_in: bool,
}

impl ConverterEntry {
    pub fn id(&self) -> ConverterId {
        self.id
    }

    /// Identity of the implementation type.
    pub fn kind(&self) -> TypeId {
        self.kind
    }

    /// One bit per implementation type, shared by every instance of it. Zero
    /// past the 64th distinct type.
    pub(crate) fn kind_bit(&self) -> u64 {
        self.kind_bit
    }

    pub fn qualified_name(&self) -> &QualifiedName {
        &self.qualified_name
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    pub fn is_built_in(&self) -> bool {
        self.is_built_in
    }

    pub fn converter(&self) -> &dyn Converter {
        self.converter.as_ref()
    }
}

impl fmt::Debug for ConverterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterEntry")
            .field("id", &self.id)
            .field("qualified_name", &self.qualified_name.to_string())
            .field("priority", &self.priority)
            .field("is_built_in", &self.is_built_in)
            .finish()
    }
}

/// One line of the diagnostic listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterDescription {
    /// Position in resolution order.
    pub position: usize,
    pub id: ConverterId,
    pub priority: i64,
    pub is_built_in: bool,
    pub qualified_name: String,
    pub short_form: String,
}

impl fmt::Display for ConverterDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>3}  priority {:>3}  {:<7}  {}  ({})",
            self.position,
            self.priority,
            if self.is_built_in { "builtin" } else { "user" },
            self.short_form,
            self.qualified_name
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Setup,
    Ready,
}

/// Priority-ordered converter registry.
pub struct ConverterRegistry {
    entries: Vec<ConverterEntry>,
    positions: FxHashMap<ConverterId, usize>,
    next_id: u32,
    phase: Phase,
    max_lookup_depth: usize,
    cache: RefCell<LookupCache>,
    guard: RefCell<LookupGuard>,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterRegistry {
    /// Create an empty registry with the lookup cache enabled.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            positions: FxHashMap::default(),
            next_id: 0,
            phase: Phase::Setup,
            max_lookup_depth: DEFAULT_MAX_LOOKUP_DEPTH,
            cache: RefCell::new(LookupCache::new(true)),
            guard: RefCell::new(LookupGuard::default()),
        }
    }

    /// Enable or disable the lookup cache.
    pub fn with_lookup_cache(mut self, enabled: bool) -> Self {
        self.set_lookup_cache(enabled);
        self
    }

    pub fn set_lookup_cache(&mut self, enabled: bool) {
        self.cache.get_mut().set_enabled(enabled);
    }

    pub fn lookup_cache_enabled(&self) -> bool {
        self.cache.borrow().is_enabled()
    }

    /// Bound nested lookups. Pairs beyond the bound resolve as not found.
    pub fn set_max_lookup_depth(&mut self, depth: usize) {
        self.max_lookup_depth = depth;
    }

    pub fn max_lookup_depth(&self) -> usize {
        self.max_lookup_depth
    }

    // ==========================================================================
    // Setup phase
    // ==========================================================================

    /// Register a user converter in the next free priority slot.
    pub fn register<C: Converter>(&mut self, converter: C) -> Result<ConverterId, RegistryError> {
        self.ensure_setup()?;
        let priority = self
            .entries
            .iter()
            .map(|e| e.priority)
            .max()
            .map_or(0, |p| p + 1);
        Ok(self.push(converter, priority, false))
    }

    /// Register a user converter at an explicit priority.
    pub fn register_with_priority<C: Converter>(
        &mut self,
        converter: C,
        priority: i64,
    ) -> Result<ConverterId, RegistryError> {
        self.ensure_setup()?;
        let id = self.push(converter, priority, false);
        self.sort_by_priority();
        Ok(id)
    }

    /// Register a built-in converter at an explicit priority.
    pub fn register_builtin<C: Converter>(
        &mut self,
        converter: C,
        priority: i64,
    ) -> Result<ConverterId, RegistryError> {
        self.ensure_setup()?;
        let id = self.push(converter, priority, true);
        self.sort_by_priority();
        Ok(id)
    }

    /// Reassign priorities from an ordered list of patterns.
    ///
    /// A converter matched by a pattern takes that pattern's index as its
    /// priority; an unmatched one keeps its current position. Converters sharing
    /// a priority are ordered by qualified name.
    pub fn reprioritize_by_patterns<S: AsRef<str>>(
        &mut self,
        patterns: &[S],
    ) -> Result<(), RegistryError> {
        self.ensure_setup()?;
        let patterns = PriorityPatterns::new(patterns);

        let mut keyed: Vec<(i64, String, ConverterEntry)> = self
            .entries
            .drain(..)
            .enumerate()
            .map(|(position, entry)| {
                let name = entry.qualified_name.to_string();
                let key = patterns.best_match(&name).unwrap_or(position) as i64;
                (key, name, entry)
            })
            .collect();
        keyed.sort_by(|(ka, na, ea), (kb, nb, eb)| {
            ka.cmp(kb).then_with(|| na.cmp(nb)).then_with(|| ea.id.cmp(&eb.id))
        });

        self.entries = keyed
            .into_iter()
            .map(|(key, _, mut entry)| {
                entry.priority = key;
                entry
            })
            .collect();
        self.rebuild_positions();
        self.cache.get_mut().clear();

        debug!(
            patterns = patterns.len(),
            order = ?self.entries.iter().map(|e| e.qualified_name.simple_name()).collect::<Vec<_>>(),
            "reprioritized converters"
        );
        Ok(())
    }

    /// Initialize every converter. Ends the setup phase.
    pub fn init_all(&mut self, env: &InitEnv<'_>) -> Result<(), RegistryError> {
        if self.phase == Phase::Ready {
            return Err(RegistryError::AlreadyInitialized);
        }
        for entry in &mut self.entries {
            entry.converter.init(env);
        }
        self.phase = Phase::Ready;
        debug!(converters = self.entries.len(), "initialized converters");
        Ok(())
    }

    /// Remove every converter and cached lookup, returning to the setup phase.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
        self.next_id = 0;
        self.phase = Phase::Setup;
        self.cache.get_mut().clear();
        self.guard.get_mut().reset();
    }

    fn ensure_setup(&self) -> Result<(), RegistryError> {
        match self.phase {
            Phase::Setup => Ok(()),
            Phase::Ready => Err(RegistryError::Sealed),
        }
    }

    fn push<C: Converter>(&mut self, converter: C, priority: i64, is_built_in: bool) -> ConverterId {
        let id = ConverterId(self.next_id);
        self.next_id += 1;
        let qualified_name = QualifiedName::of::<C>();
        let kind = TypeId::of::<C>();
        let kind_bit = self.kind_bit_for(kind);
        debug!(%id, name = %qualified_name, priority, is_built_in, "registered converter");
        self.entries.push(ConverterEntry {
            converter: Box::new(converter),
            id,
            kind,
            kind_bit,
            qualified_name,
            priority,
            is_built_in,
        });
        self.positions.insert(id, self.entries.len() - 1);
        id
    }

    fn kind_bit_for(&self, kind: TypeId) -> u64 {
        if let Some(entry) = self.entries.iter().find(|e| e.kind == kind) {
            return entry.kind_bit;
        }
        let distinct = self
            .entries
            .iter()
            .map(|e| e.kind)
            .collect::<FxHashSet<_>>()
            .len();
        let bit = 1u64.checked_shl(distinct as u32).unwrap_or(0);
        if bit == 0 {
            warn!(distinct, "out of kind bits, adapters of this kind can be re-entered");
        }
        bit
    }

    fn sort_by_priority(&mut self) {
        // stable: equal priorities keep insertion order
        self.entries.sort_by_key(|e| e.priority);
        self.rebuild_positions();
    }

    fn rebuild_positions(&mut self) {
        self.positions = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.id, position))
            .collect();
    }

    // ==========================================================================
    // Resolution phase
    // ==========================================================================

    /// Whether `init_all` has run.
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Find the first converter, in priority order, for `source -> target`.
    ///
    /// Requires [`init_all`](Self::init_all). Before it, nothing resolves.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve(
        &self,
        target: &TypeDesc,
        source: &TypeDesc,
    ) -> Result<Resolved<'_>, ConversionError> {
        if !self.is_ready() {
            warn!(%target, %source, "resolve called before init_all");
            return Err(ConversionError::not_found(target, source));
        }
        self.guard.borrow_mut().reset();
        LookupContext::root(self).look_up(target, source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in resolution order.
    pub fn entries(&self) -> &[ConverterEntry] {
        &self.entries
    }

    pub fn get(&self, id: ConverterId) -> Option<&ConverterEntry> {
        self.position_of(id).map(|p| &self.entries[p])
    }

    pub(crate) fn position_of(&self, id: ConverterId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub(crate) fn cache(&self) -> &RefCell<LookupCache> {
        &self.cache
    }

    pub(crate) fn guard(&self) -> &RefCell<LookupGuard> {
        &self.guard
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.borrow().stats()
    }

    /// Every registered converter in resolution order, for operator output.
    pub fn describe(&self) -> Vec<ConverterDescription> {
        self.entries
            .iter()
            .enumerate()
            .map(|(position, entry)| ConverterDescription {
                position,
                id: entry.id,
                priority: entry.priority,
                is_built_in: entry.is_built_in,
                qualified_name: entry.qualified_name.to_string(),
                short_form: entry.converter.short_form(),
            })
            .collect()
    }
}
