//! Conversions through user bridge functions.
//!
//! A bridge function is any package-level `func(A) B` named in the
//! configuration. For each function, in configuration order, the converter
//! tries:
//!
//! 1. exact: `A` is the source and `B` the target
//! 2. source side: another converter turns the source into `A`
//! 3. target side: another converter turns `B` into the target
//! 4. both sides
//!
//! The first function and shape that works wins.

use tracing::{debug, warn};

use convgen_core::{Block, ConversionError, EmitContext, Expr, FunctionRef, Stmt, Symbol, TypeDesc};
use convgen_registry::{Converter, InitEnv, LookupContext};

use super::hop_failed;

#[derive(Debug, Clone)]
struct BridgeFunction {
    func: FunctionRef,
    param: TypeDesc,
    result: TypeDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extension {
    Exact,
    SourceSide,
    TargetSide,
    BothSides,
}

impl Extension {
    fn bridges_source(self) -> bool {
        matches!(self, Extension::SourceSide | Extension::BothSides)
    }

    fn bridges_target(self) -> bool {
        matches!(self, Extension::TargetSide | Extension::BothSides)
    }
}

/// Converts by calling a configured bridge function.
#[derive(Debug, Default, Clone)]
pub struct FunctionConverter {
    functions: Vec<BridgeFunction>,
}

impl FunctionConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of usable bridge functions found at init.
    pub fn bridge_count(&self) -> usize {
        self.functions.len()
    }

    fn plan(
        &self,
        lookup: &LookupContext<'_>,
        target: &TypeDesc,
        source: &TypeDesc,
    ) -> Option<(&BridgeFunction, Extension)> {
        self.functions.iter().find_map(|f| {
            let takes_source = f.param.is_identical(source);
            let gives_target = f.result.is_identical(target);
            let extension = if takes_source && gives_target {
                Extension::Exact
            } else if gives_target && lookup.look_up(&f.param, source).is_ok() {
                Extension::SourceSide
            } else if takes_source && lookup.look_up(target, &f.result).is_ok() {
                Extension::TargetSide
            } else if lookup.look_up(&f.param, source).is_ok()
                && lookup.look_up(target, &f.result).is_ok()
            {
                Extension::BothSides
            } else {
                return None;
            };
            Some((f, extension))
        })
    }

    fn emit_call(
        &self,
        f: &BridgeFunction,
        extension: Extension,
        lookup: &LookupContext<'_>,
        ctx: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError> {
        let mut block = Block::new();

        let argument = if extension.bridges_source() {
            let before = lookup.look_up(&f.param, &source.ty)?;
            let temp = ctx.declare_temp(f.param.clone(), &mut block);
            block.append(before.emit(ctx, &temp, source)?);
            temp.expr()
        } else {
            source.expr()
        };
        let call = Expr::package_call(&f.func.package, &f.func.name, vec![argument]);

        if extension.bridges_target() {
            let after = lookup.look_up(&target.ty, &f.result)?;
            let temp = ctx.declare_temp(f.result.clone(), &mut block);
            block.push(Stmt::assign(temp.expr(), call));
            block.append(after.emit(ctx, target, &temp)?);
        } else {
            block.push(Stmt::assign(target.expr(), call));
        }
        Ok(block)
    }
}

impl Converter for FunctionConverter {
    fn init(&mut self, env: &InitEnv<'_>) {
        self.functions.clear();
        for func in env.bridge_functions {
            let Some(signature) = env.types.function(func) else {
                warn!(%func, "bridge function not found, ignoring");
                continue;
            };
            match signature.signature() {
                Some(([param], [result])) => self.functions.push(BridgeFunction {
                    func: func.clone(),
                    param: param.clone(),
                    result: result.clone(),
                }),
                _ => debug!(%func, %signature, "bridge function is not func(A) B, ignoring"),
            }
        }
        debug!(count = self.functions.len(), "bridge functions ready");
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
        let (f, extension) = self
            .plan(lookup, &target.ty, &source.ty)
            .ok_or_else(|| ConversionError::not_found(&target.ty, &source.ty))?;
        self.emit_call(f, extension, lookup, ctx, target, source)
            .map_err(hop_failed("function", target, source))
    }

    fn short_form(&self) -> String {
        format!("func(A) B ({} bridges)", self.functions.len())
    }
}
