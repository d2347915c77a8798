//! Lookup cache and cycle guard.
//!
//! Records successful `(converter, target, source)` matches per excluded
//! converter kind and barred kinds. A record is only reused for the same
//! exclusions, and the
//! caller still checks the converter is reachable before trusting it.
//!
//! The guard is separate from the cache and always on: it tracks lookups in
//! progress so a lookup that needs itself fails instead of recursing, and it
//! remembers failures until the next top-level resolve.

use std::any::TypeId;

use rustc_hash::{FxHashMap, FxHashSet};

use convgen_core::{TypeDesc, TypeHash};

use crate::ConverterId;

#[derive(Debug, Clone)]
struct CachedMatch {
    converter: ConverterId,
    target: TypeDesc,
    source: TypeDesc,
}

type CacheKey = (Option<TypeId>, u64, TypeHash);

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug, Default)]
pub(crate) struct LookupCache {
    enabled: bool,
    matches: FxHashMap<CacheKey, Vec<CachedMatch>>,
    hits: u64,
    misses: u64,
}

impl LookupCache {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.clear();
        }
    }

    /// Candidates recorded for this exclusion and pair, in recording order.
    pub(crate) fn candidates(
        &self,
        excluded: Option<TypeId>,
        barred: u64,
        target: &TypeDesc,
        source: &TypeDesc,
    ) -> Vec<ConverterId> {
        let key = (excluded, barred, TypeHash::of_pair(target, source));
        self.matches
            .get(&key)
            .map(|records| {
                records
                    .iter()
                    // hash collisions are possible, identity is structural
                    .filter(|r| r.target == *target && r.source == *source)
                    .map(|r| r.converter)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn record(
        &mut self,
        excluded: Option<TypeId>,
        barred: u64,
        target: &TypeDesc,
        source: &TypeDesc,
        converter: ConverterId,
    ) {
        let key = (excluded, barred, TypeHash::of_pair(target, source));
        self.matches.entry(key).or_default().push(CachedMatch {
            converter,
            target: target.clone(),
            source: source.clone(),
        });
    }

    pub(crate) fn note_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn note_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.matches.values().map(Vec::len).sum(),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.matches.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

pub(crate) type PairKey = (Option<TypeId>, u64, TypeDesc, TypeDesc);

/// Lookups in progress and failures seen during one top-level resolve.
///
/// A lookup that was cut short, by a cycle or by the depth bound, is
/// incomplete: a later lookup of the same pair from elsewhere might succeed.
/// `cuts` counts those events so callers can tell whether a result they just
/// computed depended on one.
#[derive(Debug, Default)]
pub(crate) struct LookupGuard {
    active: FxHashSet<PairKey>,
    /// Failed pairs, and whether the failure was complete.
    failed: FxHashMap<PairKey, bool>,
    cuts: u64,
}

impl LookupGuard {
    /// Forget remembered failures.
    pub(crate) fn reset(&mut self) {
        self.failed.clear();
    }

    pub(crate) fn cuts(&self) -> u64 {
        self.cuts
    }

    pub(crate) fn note_cut(&mut self) {
        self.cuts += 1;
    }

    /// Mark `key` as in progress. False when it already is, or already failed.
    pub(crate) fn enter(&mut self, key: &PairKey) -> bool {
        if let Some(complete) = self.failed.get(key) {
            if !complete {
                self.cuts += 1;
            }
            return false;
        }
        if self.active.insert(key.clone()) {
            true
        } else {
            self.cuts += 1;
            false
        }
    }

    pub(crate) fn leave(&mut self, key: PairKey, found: bool, complete: bool) {
        self.active.remove(&key);
        if !found {
            self.failed.insert(key, complete);
        }
    }
}
