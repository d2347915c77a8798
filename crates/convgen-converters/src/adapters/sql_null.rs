//! `database/sql` nullable wrappers.
//!
//! `sql.NullX{X: v, Valid: ok}` converts to its value type by reading `X` when
//! `Valid` is set and the zero value otherwise; the value type converts back to
//! a valid wrapper.

use tracing::debug;

use convgen_core::{Block, ConversionError, EmitContext, Expr, Stmt, Symbol, TypeDesc, zero_value};
use convgen_registry::{Converter, InitEnv, LookupContext};

use super::{emit_first, first_route, well_known};
use crate::orchestrator::StandardConversionOrchestrator;

const SQL_PACKAGE: &str = "database/sql";

/// Wrapper type, value field, value type.
const NULL_TYPES: [(&str, &str, &str); 8] = [
    ("NullString", "String", "string"),
    ("NullInt64", "Int64", "int64"),
    ("NullInt32", "Int32", "int32"),
    ("NullInt16", "Int16", "int16"),
    ("NullByte", "Byte", "uint8"),
    ("NullFloat64", "Float64", "float64"),
    ("NullBool", "Bool", "bool"),
    ("NullTime", "Time", "time.Time"),
];

/// Converts between `sql.NullX` and its value type.
#[derive(Debug, Default)]
pub struct SqlNullConverter {
    orchestrators: Vec<StandardConversionOrchestrator>,
}

impl SqlNullConverter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn value_type(env: &InitEnv<'_>, spelling: &str) -> TypeDesc {
    match spelling.split_once('.') {
        Some((package, name)) => well_known(env, package, name),
        None => TypeDesc::scalar(spelling),
    }
}

fn orchestrator(wrapper: TypeDesc, field: &'static str, value: TypeDesc) -> StandardConversionOrchestrator {
    let wrapper_ty = wrapper.clone();
    StandardConversionOrchestrator::new(
        wrapper,
        value,
        move |_, target, source| {
            let valid = source.expr().field("Valid");
            let read = Block::of(Stmt::assign(target.expr(), source.expr().field(field)));
            if target.has_known_zero() {
                Block::of(Stmt::if_then(valid, read))
            } else {
                let zeroed = Block::of(Stmt::assign(target.expr(), zero_value(&target.ty)));
                Block::of(Stmt::if_else(valid, read, zeroed))
            }
        },
        move |_, target, source| {
            Block::of(Stmt::assign(
                target.expr(),
                Expr::composite(
                    wrapper_ty.clone(),
                    vec![
                        (field.to_string(), source.expr()),
                        ("Valid".to_string(), Expr::lit("true")),
                    ],
                ),
            ))
        },
    )
}

impl Converter for SqlNullConverter {
    fn init(&mut self, env: &InitEnv<'_>) {
        self.orchestrators = NULL_TYPES
            .iter()
            .map(|&(name, field, value)| {
                orchestrator(well_known(env, SQL_PACKAGE, name), field, value_type(env, value))
            })
            .collect();
        debug!(wrappers = self.orchestrators.len(), "sql null wrappers ready");
    }

    fn can_convert(&self, lookup: &LookupContext<'_>, target: &TypeDesc, source: &TypeDesc) -> bool {
        first_route(&self.orchestrators, lookup, target, source).is_some()
    }

    fn emit(
        &self,
        lookup: &LookupContext<'_>,
        ctx: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError> {
        emit_first(&self.orchestrators, lookup, ctx, target, source)
    }

    fn short_form(&self) -> String {
        "sql.NullX <-> X".into()
    }
}
