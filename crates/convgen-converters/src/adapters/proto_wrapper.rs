//! Protobuf well-known wrappers.
//!
//! `*wrapperspb.XValue` reads through its nil-safe `GetValue()` and is built
//! with the package constructor (`wrapperspb.String(v)`). `*timestamppb.Timestamp`
//! and `*durationpb.Duration` map to `time.Time` and `time.Duration`.
//!
//! These are generated types: they are only ever the source or the target of
//! a conversion, never a hop between two other types.

use tracing::debug;

use convgen_core::{
    Block, ConversionError, EmitContext, Expr, NamedKind, Stmt, Symbol, TypeDesc, zero_value,
};
use convgen_registry::{Converter, InitEnv, LookupContext};

use super::{emit_first, first_route, well_known};
use crate::orchestrator::GeneratedTypeOrchestrator;

const WRAPPERS_PACKAGE: &str = "google.golang.org/protobuf/types/known/wrapperspb";
const TIMESTAMP_PACKAGE: &str = "google.golang.org/protobuf/types/known/timestamppb";
const DURATION_PACKAGE: &str = "google.golang.org/protobuf/types/known/durationpb";

/// Message, constructor, value type.
const WRAPPERS: [(&str, &str, &str); 9] = [
    ("DoubleValue", "Double", "float64"),
    ("FloatValue", "Float", "float32"),
    ("Int64Value", "Int64", "int64"),
    ("UInt64Value", "UInt64", "uint64"),
    ("Int32Value", "Int32", "int32"),
    ("UInt32Value", "UInt32", "uint32"),
    ("BoolValue", "Bool", "bool"),
    ("StringValue", "String", "string"),
    ("BytesValue", "Bytes", "[]uint8"),
];

/// Converts between protobuf well-known messages and their Go values.
#[derive(Debug, Default)]
pub struct ProtoWrapperConverter {
    orchestrators: Vec<GeneratedTypeOrchestrator>,
}

impl ProtoWrapperConverter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn value_type(spelling: &str) -> TypeDesc {
    match spelling.strip_prefix("[]") {
        Some(element) => TypeDesc::slice(TypeDesc::scalar(element)),
        None => TypeDesc::scalar(spelling),
    }
}

fn construct(
    package: &'static str,
    constructor: &'static str,
) -> impl Fn(&mut EmitContext, &Symbol, &Symbol) -> Block {
    move |_, target, source| {
        Block::of(Stmt::assign(
            target.expr(),
            Expr::package_call(package, constructor, vec![source.expr()]),
        ))
    }
}

fn read(method: &'static str) -> impl Fn(&mut EmitContext, &Symbol, &Symbol) -> Block {
    move |_, target, source| {
        Block::of(Stmt::assign(target.expr(), source.expr().method(method, vec![])))
    }
}

fn wrapper(
    env: &InitEnv<'_>,
    message: &str,
    constructor: &'static str,
    value: &str,
) -> GeneratedTypeOrchestrator {
    GeneratedTypeOrchestrator::new(
        TypeDesc::pointer(well_known(env, WRAPPERS_PACKAGE, message)),
        value_type(value),
        read("GetValue"),
        construct(WRAPPERS_PACKAGE, constructor),
    )
}

fn timestamp(env: &InitEnv<'_>) -> GeneratedTypeOrchestrator {
    let time = well_known(env, "time", "Time");
    GeneratedTypeOrchestrator::new(
        TypeDesc::pointer(well_known(env, TIMESTAMP_PACKAGE, "Timestamp")),
        time,
        // AsTime on nil is the Unix epoch, not the zero time
        |_, target, source| {
            let read = Block::of(Stmt::assign(target.expr(), source.expr().method("AsTime", vec![])));
            if target.has_known_zero() {
                Block::of(Stmt::if_then(source.expr().not_nil(), read))
            } else {
                let zeroed = Block::of(Stmt::assign(target.expr(), zero_value(&target.ty)));
                Block::of(Stmt::if_else(source.expr().not_nil(), read, zeroed))
            }
        },
        construct(TIMESTAMP_PACKAGE, "New"),
    )
}

fn duration(env: &InitEnv<'_>) -> GeneratedTypeOrchestrator {
    let duration = env
        .types
        .named_type("time", "Duration")
        .unwrap_or_else(|| TypeDesc::named("time", "Duration", NamedKind::Opaque));
    GeneratedTypeOrchestrator::new(
        TypeDesc::pointer(well_known(env, DURATION_PACKAGE, "Duration")),
        duration,
        read("AsDuration"),
        construct(DURATION_PACKAGE, "New"),
    )
}

impl Converter for ProtoWrapperConverter {
    fn init(&mut self, env: &InitEnv<'_>) {
        self.orchestrators = WRAPPERS
            .iter()
            .map(|&(message, constructor, value)| wrapper(env, message, constructor, value))
            .chain([timestamp(env), duration(env)])
            .collect();
        debug!(messages = self.orchestrators.len(), "protobuf wrappers ready");
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
        "*wrapperspb.XValue <-> X".into()
    }
}
