//! Decorators over a resolved converter's emission.

use convgen_core::{
    Block, ConversionError, EmitContext, Expr, Stmt, Symbol, is_comparable_scalar, zero_value,
};
use convgen_registry::Resolved;

use crate::conversion::PointerWrapConverter;

/// Wraps the emission of one field conversion.
///
/// The resolved converter carries its own lookup scope, so an interceptor that
/// delegates gets exactly the code the converter would have produced.
pub trait FieldInterceptor {
    fn intercept(
        &self,
        converter: &Resolved<'_>,
        ctx: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError>;
}

/// Emits through the converter unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectEmit;

impl FieldInterceptor for DirectEmit {
    fn intercept(
        &self,
        converter: &Resolved<'_>,
        ctx: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError> {
        converter.emit(ctx, target, source)
    }
}

/// Maps the zero value of a scalar to `nil` when wrapping it in a pointer.
///
/// `t = &s` becomes `if s == 0 { t = nil } else { t = &s }`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NilCollapseInterceptor;

impl FieldInterceptor for NilCollapseInterceptor {
    fn intercept(
        &self,
        converter: &Resolved<'_>,
        ctx: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError> {
        if !converter.is::<PointerWrapConverter>() || !is_comparable_scalar(&source.ty) {
            return converter.emit(ctx, target, source);
        }
        let wrapped = converter.emit(ctx, target, source)?;
        let cleared = Block::of(Stmt::assign(target.expr(), Expr::Nil));
        Ok(Block::of(Stmt::if_else(
            source.expr().equals(zero_value(&source.ty)),
            cleared,
            wrapped,
        )))
    }
}
