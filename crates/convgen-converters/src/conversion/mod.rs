//! General conversions.
//!
//! These converters know nothing about particular libraries. They cover:
//!
//! 1. Identity (structurally identical types)
//! 2. Pointer wrap and unwrap (`T -> *T`, `*T -> T`)
//! 3. Slices, element by element (`[]A -> []B`)
//! 4. Numeric casts, optionally bridged through a numeric kind
//! 5. User bridge functions (`func(A) B`), optionally extended on either side
//!
//! Every converter receives a scoped [`LookupContext`](convgen_registry::LookupContext)
//! and uses it for bridges; none of them can resolve to itself.

mod function;
mod identical;
mod numeric;
mod pointer;
mod slice;

pub use function::FunctionConverter;
pub use identical::IdenticalConverter;
pub use numeric::NumericConverter;
pub use pointer::{PointerUnwrapConverter, PointerWrapConverter};
pub use slice::SliceConverter;

use convgen_core::{Block, ConversionError, Expr, Stmt, Symbol};

/// `target = value`
pub(crate) fn assign(target: &Symbol, value: Expr) -> Block {
    Block::of(Stmt::assign(target.expr(), value))
}

/// Report a failed inner hop as an emission failure of the outer conversion.
pub(crate) fn hop_failed<'a>(
    converter: &'static str,
    target: &'a Symbol,
    source: &'a Symbol,
) -> impl FnOnce(ConversionError) -> ConversionError + 'a {
    move |err| match err {
        ConversionError::NoConverterFound { .. } => {
            ConversionError::emission_failed(converter, &target.ty, &source.ty)
        }
        err => err,
    }
}
