//! Pointer wrap and unwrap.
//!
//! Interface-like types are never wrapped or unwrapped: a pointer to an
//! interface is almost never what the caller meant.

use convgen_core::{Block, ConversionError, EmitContext, Stmt, Symbol, TypeDesc, zero_value};
use convgen_registry::{Converter, LookupContext};

use super::assign;

/// `T -> *T` by taking the address of the source.
#[derive(Debug, Default, Clone, Copy)]
pub struct PointerWrapConverter;

impl Converter for PointerWrapConverter {
    fn can_convert(&self, _: &LookupContext<'_>, target: &TypeDesc, source: &TypeDesc) -> bool {
        target
            .pointee()
            .is_some_and(|inner| inner.is_identical(source) && !inner.is_interface_like())
    }

    fn emit(
        &self,
        _: &LookupContext<'_>,
        _: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError> {
        Ok(assign(target, source.expr().address_of()))
    }

    fn short_form(&self) -> String {
        "T -> *T".into()
    }
}

/// `*T -> T`, falling back to the zero value of `T` for `nil`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PointerUnwrapConverter;

impl Converter for PointerUnwrapConverter {
    fn can_convert(&self, _: &LookupContext<'_>, target: &TypeDesc, source: &TypeDesc) -> bool {
        source
            .pointee()
            .is_some_and(|inner| inner.is_identical(target) && !inner.is_interface_like())
    }

    fn emit(
        &self,
        _: &LookupContext<'_>,
        _: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError> {
        let unwrapped = Block::of(Stmt::assign(target.expr(), source.expr().deref()));
        // a zeroed target needs no nil branch
        if target.has_known_zero() {
            return Ok(Block::of(Stmt::if_then(source.expr().not_nil(), unwrapped)));
        }
        let zeroed = Block::of(Stmt::assign(target.expr(), zero_value(&target.ty)));
        Ok(Block::of(Stmt::if_else(source.expr().is_nil(), zeroed, unwrapped)))
    }

    fn short_form(&self) -> String {
        "*T -> T".into()
    }
}
