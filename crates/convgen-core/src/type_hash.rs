//! Deterministic structural hashing of type descriptors.
//!
//! [`TypeHash`] is a 64-bit hash computed from a descriptor's structure, so two
//! independently constructed descriptors of the same type hash identically. The
//! lookup cache keys on `(target, source)` hash pairs and re-checks structural
//! equality on a hit.
//!
//! # Hash Computation
//!
//! Uses XXHash64 with a domain constant per descriptor tag, so `*T` and `[]T`
//! never collide by construction.
//!
//! # Examples
//!
//! ```
//! use convgen_core::{TypeDesc, TypeHash};
//!
//! let a = TypeHash::of_desc(&TypeDesc::pointer(TypeDesc::scalar("int")));
//! let b = TypeHash::of_desc(&TypeDesc::pointer(TypeDesc::scalar("int")));
//! assert_eq!(a, b);
//!
//! let c = TypeHash::of_desc(&TypeDesc::slice(TypeDesc::scalar("int")));
//! assert_ne!(a, c);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

use crate::{NamedKind, TypeDesc};

/// Domain-specific mixing constants.
mod hash_constants {
    /// Separator constant for path components
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for scalar types
    pub const SCALAR: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for pointer types
    pub const POINTER: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for slice types
    pub const SLICE: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for named types
    pub const NAMED: u64 = 0x3e9f5d2a8c7b1403;

    /// Domain marker for function signatures
    pub const FUNCTION: u64 = 0x9a7f3d5e2b8c4601;

    /// Separates parameters from results in a signature
    pub const RESULTS: u64 = 0x1a095090689d4647;

    /// Domain marker for (target, source) pairs
    pub const PAIR: u64 = 0x9e3779b97f4a7c15;
}

/// A deterministic 64-bit hash of a type descriptor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Hash a descriptor structurally.
    pub fn of_desc(desc: &TypeDesc) -> Self {
        use hash_constants::*;

        let hash = match desc {
            TypeDesc::Scalar(name) => SCALAR ^ xxh64(name.as_bytes(), 0),
            TypeDesc::Pointer(inner) => mix(POINTER, Self::of_desc(inner).0),
            TypeDesc::Slice(inner) => mix(SLICE, Self::of_desc(inner).0),
            TypeDesc::Named {
                package,
                name,
                kind,
            } => {
                let kind_marker = match kind {
                    NamedKind::Struct => 1,
                    NamedKind::Interface => 2,
                    NamedKind::Opaque => 3,
                };
                let hash = mix(NAMED ^ kind_marker, xxh64(package.as_bytes(), 0));
                mix(hash, xxh64(name.as_bytes(), 0))
            }
            TypeDesc::Function { params, results } => {
                let mut hash = FUNCTION;
                for param in params {
                    hash = mix(hash, Self::of_desc(param).0);
                }
                hash = mix(hash, RESULTS);
                for result in results {
                    hash = mix(hash, Self::of_desc(result).0);
                }
                hash
            }
        };
        TypeHash(hash)
    }

    /// Hash an ordered `(target, source)` pair.
    #[inline]
    pub fn of_pair(target: &TypeDesc, source: &TypeDesc) -> Self {
        TypeHash(mix(
            mix(hash_constants::PAIR, Self::of_desc(target).0),
            Self::of_desc(source).0,
        ))
    }
}

// wrapping_mul keeps the combination order-sensitive, unlike a plain XOR
#[inline]
fn mix(acc: u64, value: u64) -> u64 {
    acc.wrapping_mul(hash_constants::SEP).wrapping_add(value)
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinism() {
        let a = TypeDesc::slice(TypeDesc::struct_type("example.com/m", "User"));
        let b = TypeDesc::slice(TypeDesc::struct_type("example.com/m", "User"));
        assert_eq!(TypeHash::of_desc(&a), TypeHash::of_desc(&b));
    }

    #[test]
    fn tags_do_not_collide() {
        let int = TypeDesc::scalar("int");
        let ptr = TypeDesc::pointer(int.clone());
        let slice = TypeDesc::slice(int.clone());
        assert_ne!(TypeHash::of_desc(&int), TypeHash::of_desc(&ptr));
        assert_ne!(TypeHash::of_desc(&ptr), TypeHash::of_desc(&slice));
    }

    #[test]
    fn pair_order_matters() {
        let a = TypeDesc::scalar("int");
        let b = TypeDesc::scalar("string");
        assert_ne!(TypeHash::of_pair(&a, &b), TypeHash::of_pair(&b, &a));
    }

    #[test]
    fn signature_params_and_results_are_distinct() {
        let s = TypeDesc::scalar("string");
        let f1 = TypeDesc::function(vec![s.clone()], vec![]);
        let f2 = TypeDesc::function(vec![], vec![s]);
        assert_ne!(TypeHash::of_desc(&f1), TypeHash::of_desc(&f2));
    }

    #[test]
    fn display_format() {
        let hash = TypeHash(0x1234);
        assert_eq!(hash.to_string(), "0x0000000000001234");
        assert_eq!(format!("{hash:?}"), "TypeHash(0x0000000000001234)");
    }
}
