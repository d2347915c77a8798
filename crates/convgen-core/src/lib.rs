//! convgen core types.
//!
//! Leaf types shared by the registry, the converters and the generator:
//!
//! - [`TypeDesc`]: structural type descriptors (scalar, pointer, slice, named, function)
//! - [`NumericKind`]: the twelve numeric scalar kinds
//! - [`TypeHash`]: deterministic structural hash of a descriptor
//! - [`QualifiedName`]: `::`-separated names of converter implementations
//! - [`Symbol`]: read/write endpoints of a conversion
//! - [`Block`], [`Stmt`], [`Expr`]: the emitted code model
//! - [`EmitContext`]: temporary allocation and trace annotations
//! - [`TypeProvider`], [`TypeTable`]: type introspection boundary
//! - [`ConversionError`]: resolution and emission failures

mod code;
mod emit_context;
mod error;
mod numeric_kind;
mod qualified_name;
mod symbol;
mod type_desc;
mod type_hash;
mod type_provider;
mod zero_value;

pub use code::{Block, Expr, Stmt};
pub use emit_context::EmitContext;
pub use error::ConversionError;
pub use numeric_kind::NumericKind;
pub use qualified_name::QualifiedName;
pub use symbol::{Symbol, SymbolFlags};
pub use type_desc::{NamedKind, TypeDesc, package_alias};
pub use type_hash::TypeHash;
pub use type_provider::{FunctionRef, TypeProvider, TypeTable};
pub use zero_value::{is_comparable_scalar, zero_value};
