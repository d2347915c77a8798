//! Numeric conversions.
//!
//! Four shapes, tried in this order:
//!
//! 1. Both sides numeric: a cast (or a plain assignment for the same kind).
//! 2. Source numeric: cast to a kind `N` that some converter turns into the target.
//! 3. Target numeric: let some converter produce a kind `N`, then cast.
//! 4. Neither numeric: `source -> A`, cast `A -> B`, `B -> target`.
//!
//! Bridge kinds are searched in [`NumericKind::PREFERRED`] order, first hit
//! wins. A bridge kind equal to the numeric side is used without a cast.
//!
//! Casts are not range checked.

use convgen_core::{Block, ConversionError, EmitContext, Expr, NumericKind, Symbol, TypeDesc};
use convgen_registry::{Converter, InitEnv, LookupContext};

use super::{assign, hop_failed};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Plan {
    Cast,
    CastThenBridge(TypeDesc),
    BridgeThenCast(TypeDesc),
    Chain { from: TypeDesc, to: TypeDesc },
}

/// Casts between numeric kinds and bridges through them.
#[derive(Debug, Default, Clone)]
pub struct NumericConverter {
    kinds: Vec<TypeDesc>,
}

impl NumericConverter {
    pub fn new() -> Self {
        Self::default()
    }

    fn plan(&self, lookup: &LookupContext<'_>, target: &TypeDesc, source: &TypeDesc) -> Option<Plan> {
        match (source.is_numeric(), target.is_numeric()) {
            (true, true) => Some(Plan::Cast),
            (true, false) => self
                .kinds
                .iter()
                .find(|kind| lookup.look_up(target, kind).is_ok())
                .map(|kind| Plan::CastThenBridge(kind.clone())),
            (false, true) => self
                .kinds
                .iter()
                .find(|kind| lookup.look_up(kind, source).is_ok())
                .map(|kind| Plan::BridgeThenCast(kind.clone())),
            (false, false) => {
                let from = self.kinds.iter().find(|kind| lookup.look_up(kind, source).is_ok())?;
                let to = self.kinds.iter().find(|kind| lookup.look_up(target, kind).is_ok())?;
                Some(Plan::Chain {
                    from: from.clone(),
                    to: to.clone(),
                })
            }
        }
    }

    fn emit_plan(
        &self,
        plan: Plan,
        lookup: &LookupContext<'_>,
        ctx: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError> {
        match plan {
            Plan::Cast => Ok(assign(target, cast(source, &target.ty))),
            Plan::CastThenBridge(kind) => {
                let bridge = lookup.look_up(&target.ty, &kind)?;
                if kind == source.ty {
                    return bridge.emit(ctx, target, source);
                }
                let mut block = Block::new();
                let temp = ctx.declare_temp(kind, &mut block);
                block.append(assign(&temp, cast(source, &temp.ty)));
                block.append(bridge.emit(ctx, target, &temp)?);
                Ok(block)
            }
            Plan::BridgeThenCast(kind) => {
                let bridge = lookup.look_up(&kind, &source.ty)?;
                if kind == target.ty {
                    return bridge.emit(ctx, target, source);
                }
                let mut block = Block::new();
                let temp = ctx.declare_temp(kind, &mut block);
                block.append(bridge.emit(ctx, &temp, source)?);
                block.append(assign(target, cast(&temp, &target.ty)));
                Ok(block)
            }
            Plan::Chain { from, to } => {
                let before = lookup.look_up(&from, &source.ty)?;
                let after = lookup.look_up(&target.ty, &to)?;
                let mut block = Block::new();
                let first = ctx.declare_temp(from, &mut block);
                block.append(before.emit(ctx, &first, source)?);
                let second = if first.ty == to {
                    first
                } else {
                    let second = ctx.declare_temp(to, &mut block);
                    block.append(assign(&second, cast(&first, &second.ty)));
                    second
                };
                block.append(after.emit(ctx, target, &second)?);
                Ok(block)
            }
        }
    }
}

/// `T(value)`, or `value` when it already has kind `T`.
fn cast(value: &Symbol, ty: &TypeDesc) -> Expr {
    if value.ty.numeric_kind() == ty.numeric_kind() {
        value.expr()
    } else {
        value.expr().cast(ty.clone())
    }
}

impl Converter for NumericConverter {
    fn init(&mut self, _env: &InitEnv<'_>) {
        self.kinds = NumericKind::PREFERRED
            .iter()
            .map(|kind| TypeDesc::numeric(*kind))
            .collect();
    }

    fn can_convert(&self, lookup: &LookupContext<'_>, target: &TypeDesc, source: &TypeDesc) -> bool {
        self.plan(lookup, target, source).is_some()
    }

    fn emit(
        &self,
        lookup: &LookupContext<'_>,
        ctx: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError> {
        let plan = self
            .plan(lookup, &target.ty, &source.ty)
            .ok_or_else(|| ConversionError::not_found(&target.ty, &source.ty))?;
        self.emit_plan(plan, lookup, ctx, target, source)
            .map_err(hop_failed("numeric", target, source))
    }

    fn short_form(&self) -> String {
        "numeric -> numeric".into()
    }
}
