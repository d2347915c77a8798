//! End-to-end tests driving the generator from fixture configurations.

use std::path::PathBuf;

use convgen::convgen_core::{
    Block, ConversionError, EmitContext, Expr, FunctionRef, NamedKind, Stmt, Symbol, TypeDesc,
    TypeTable,
};
use convgen::convgen_converters::BuiltinKind;
use convgen::convgen_registry::{Converter, LookupContext};
use convgen::{ConfigError, Error, Field, Generator, GeneratorConfig};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn fixture(name: &str) -> GeneratorConfig {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    GeneratorConfig::load(&path).unwrap_or_else(|e| panic!("failed to load {}: {e}", path.display()))
}

fn id() -> TypeDesc {
    TypeDesc::named("example.com/model", "ID", NamedKind::Opaque)
}

fn scalar(name: &str) -> TypeDesc {
    TypeDesc::scalar(name)
}

fn types() -> TypeTable {
    let mut types = TypeTable::new();
    types.add_function(
        FunctionRef::new("example.com/conv", "ParseID"),
        vec![scalar("string")],
        vec![id()],
    );
    types
}

fn generator(config: GeneratorConfig) -> Generator {
    let mut generator = Generator::new(config).unwrap();
    generator.init(&types()).unwrap();
    generator
}

/// Renders any non-string value with `fmt.Sprint`.
struct Stringify;

impl Converter for Stringify {
    fn can_convert(&self, _: &LookupContext<'_>, target: &TypeDesc, source: &TypeDesc) -> bool {
        *target == scalar("string") && *source != scalar("string")
    }

    fn emit(
        &self,
        _: &LookupContext<'_>,
        _: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError> {
        Ok(Block::of(Stmt::assign(
            target.expr(),
            Expr::package_call("fmt", "Sprint", vec![source.expr()]),
        )))
    }

    fn short_form(&self) -> String {
        "any -> string".into()
    }
}

// =============================================================================
// Struct mapping
// =============================================================================

#[test]
fn maps_a_struct() {
    let generator = generator(fixture("mapping.toml"));
    let target = [
        Field::new("ID", id()),
        Field::new("Name", scalar("string")),
        Field::new("Age", TypeDesc::pointer(scalar("int"))),
        Field::new("Tags", TypeDesc::slice(scalar("string"))),
        Field::new("Score", scalar("float64")),
        Field::new("Nickname", scalar("string")),
        Field::new("Payload", scalar("chan int")),
    ];
    let source = [
        Field::new("Payload", scalar("string")),
        Field::new("Score", scalar("int32")),
        Field::new("Tags", TypeDesc::slice(scalar("string"))),
        Field::new("Age", scalar("int")),
        Field::new("Name", TypeDesc::struct_type("database/sql", "NullString")),
        Field::new("ID", scalar("string")),
    ];

    let output = generator.map_fields("out", &target, "in", &source).unwrap();
    let expected = "\
out.ID = conv.ParseID(in.ID)
if in.Name.Valid {
\tout.Name = in.Name.String
} else {
\tout.Name = \"\"
}
if in.Age == 0 {
\tout.Age = nil
} else {
\tout.Age = &in.Age
}
out.Tags = in.Tags
out.Score = float64(in.Score)
";
    assert_eq!(output.block.to_string(), expected);

    let summary = &output.summary;
    assert_eq!(summary.converted, vec!["ID", "Name", "Age", "Tags", "Score"]);
    assert_eq!(summary.unmatched, vec!["Nickname"]);
    assert_eq!(summary.unconvertible.len(), 1);
    assert_eq!(summary.unconvertible[0].field, "Payload");
    assert_eq!(
        summary.unconvertible[0].reason,
        ConversionError::not_found(&scalar("chan int"), &scalar("string"))
    );
    assert!(!summary.is_complete());
}

#[test]
fn temporaries_are_unique_across_fields() {
    let generator = generator(fixture("mapping.toml"));
    let ptr = |name: &str| TypeDesc::pointer(scalar(name));
    let target = [Field::new("A", scalar("int64")), Field::new("B", scalar("int64"))];
    let source = [Field::new("A", ptr("int32")), Field::new("B", ptr("int32"))];
    let code = generator
        .map_fields("out", &target, "in", &source)
        .unwrap()
        .block
        .to_string();
    assert!(code.contains("var v0 int32\n"), "{code}");
    assert!(code.contains("var v1 int32\n"), "{code}");
    assert!(code.contains("out.B = int64(v1)\n"), "{code}");
}

/// `int64 <- Raw` through a named call.
struct RawToLong;

impl Converter for RawToLong {
    fn can_convert(&self, _: &LookupContext<'_>, target: &TypeDesc, source: &TypeDesc) -> bool {
        *target == scalar("int64") && *source == raw()
    }

    fn emit(
        &self,
        _: &LookupContext<'_>,
        _: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError> {
        Ok(Block::of(Stmt::assign(
            target.expr(),
            Expr::call("rawToLong", vec![source.expr()]),
        )))
    }

    fn short_form(&self) -> String {
        "Raw -> int64".into()
    }
}

/// Claims `Cooked <- int64` but never produces code.
struct HollowCook;

impl Converter for HollowCook {
    fn can_convert(&self, _: &LookupContext<'_>, target: &TypeDesc, source: &TypeDesc) -> bool {
        *target == cooked() && *source == scalar("int64")
    }

    fn emit(
        &self,
        _: &LookupContext<'_>,
        _: &mut EmitContext,
        _: &Symbol,
        _: &Symbol,
    ) -> Result<Block, ConversionError> {
        Ok(Block::new())
    }

    fn short_form(&self) -> String {
        "int64 -> Cooked".into()
    }
}

fn raw() -> TypeDesc {
    TypeDesc::named("example.com/model", "Raw", NamedKind::Opaque)
}

fn cooked() -> TypeDesc {
    TypeDesc::named("example.com/model", "Cooked", NamedKind::Opaque)
}

#[test]
fn failed_emission_marks_the_field_unconvertible() {
    let mut generator = Generator::new(GeneratorConfig {
        enabled: vec![BuiltinKind::Identical, BuiltinKind::Numeric],
        ..GeneratorConfig::default()
    })
    .unwrap();
    generator.register(RawToLong).unwrap();
    generator.register(HollowCook).unwrap();
    generator.init(&types()).unwrap();

    let target = [Field::new("Count", cooked()), Field::new("Label", scalar("string"))];
    let source = [Field::new("Count", raw()), Field::new("Label", scalar("string"))];
    let output = generator.map_fields("out", &target, "in", &source).unwrap();

    assert_eq!(output.block.to_string(), "out.Label = in.Label\n");
    assert_eq!(output.summary.converted, vec!["Label"]);
    assert_eq!(output.summary.unconvertible.len(), 1);
    assert_eq!(output.summary.unconvertible[0].field, "Count");
    assert!(matches!(
        output.summary.unconvertible[0].reason,
        ConversionError::EmissionFailed { .. }
    ));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn priority_patterns_reorder_user_converters() {
    let int = scalar("int");
    let text = scalar("string");

    let mut plain = Generator::new(GeneratorConfig {
        priority_patterns: Vec::new(),
        ..fixture("prioritized.toml")
    })
    .unwrap();
    plain.register(Stringify).unwrap();
    plain.init(&types()).unwrap();
    let resolved = plain.resolve(&text, &int).unwrap();
    assert_eq!(resolved.qualified_name().simple_name(), "NumericConverter");

    let mut prioritized = Generator::new(fixture("prioritized.toml")).unwrap();
    prioritized.register(Stringify).unwrap();
    prioritized.init(&types()).unwrap();
    let resolved = prioritized.resolve(&text, &int).unwrap();
    assert_eq!(resolved.qualified_name().simple_name(), "Stringify");

    // identical still comes first for T -> T
    let listing = prioritized.describe();
    assert_eq!(listing[0].short_form, "T -> T");
    assert_eq!(listing[1].short_form, "any -> string");
}

#[test]
fn trace_comments_name_each_hop() {
    let generator = generator(fixture("traced.toml"));
    let mut ctx = generator.emit_context();
    let code = generator
        .convert(
            &mut ctx,
            &Symbol::field("out", "Name", TypeDesc::pointer(scalar("string"))),
            &Symbol::field("in", "Name", TypeDesc::struct_type("database/sql", "NullString")),
        )
        .unwrap();
    let expected = "\
// out.Name <- in.Name: sql.NullX <-> X
var v0 string
if in.Name.Valid {
\tv0 = in.Name.String
}
// out.Name <- v0: T -> *T
out.Name = &v0
";
    assert_eq!(code.to_string(), expected);
}

#[test]
fn unknown_config_keys_are_rejected() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/unknown_key.toml");
    assert!(matches!(GeneratorConfig::load(path), Err(ConfigError::Parse(_))));
}

#[test]
fn malformed_bridge_function_fails_setup() {
    for spelling in ["", "example.com/conv"] {
        let config = GeneratorConfig {
            bridge_functions: vec![spelling.into()],
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            Generator::new(config),
            Err(Error::Config(ConfigError::InvalidBridgeFunction(_)))
        ));
    }
}

#[test]
fn disabling_the_cache_changes_nothing_but_stats() {
    let cached = generator(fixture("mapping.toml"));
    let uncached = generator(GeneratorConfig {
        lookup_cache: false,
        ..fixture("mapping.toml")
    });
    let target = TypeDesc::pointer(id());
    let source = TypeDesc::pointer(scalar("string"));
    for _ in 0..2 {
        assert_eq!(
            cached.resolve(&target, &source).unwrap().id(),
            uncached.resolve(&target, &source).unwrap().id()
        );
    }
    assert!(cached.registry().cache_stats().entries > 0);
    assert_eq!(uncached.registry().cache_stats().entries, 0);
}

// =============================================================================
// Properties
// =============================================================================

fn type_pool() -> Vec<TypeDesc> {
    vec![
        scalar("int"),
        scalar("int64"),
        scalar("string"),
        scalar("bool"),
        id(),
        TypeDesc::pointer(scalar("string")),
        TypeDesc::slice(scalar("int32")),
        TypeDesc::slice(scalar("float64")),
        TypeDesc::struct_type("database/sql", "NullInt64"),
        TypeDesc::pointer(TypeDesc::struct_type(
            "google.golang.org/protobuf/types/known/wrapperspb",
            "StringValue",
        )),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn resolution_is_deterministic(t in 0..10usize, s in 0..10usize) {
        let pool = type_pool();
        let warm = generator(fixture("mapping.toml"));
        let first = warm.resolve(&pool[t], &pool[s]).map(|r| r.id()).ok();
        let second = warm.resolve(&pool[t], &pool[s]).map(|r| r.id()).ok();
        prop_assert_eq!(first, second);

        let fresh = generator(fixture("mapping.toml"));
        let third = fresh.resolve(&pool[t], &pool[s]).map(|r| r.id()).ok();
        prop_assert_eq!(first, third);
    }

    #[test]
    fn identical_types_resolve_to_identical(t in 0..10usize) {
        let pool = type_pool();
        let generator = generator(fixture("mapping.toml"));
        let resolved = generator.resolve(&pool[t], &pool[t]).unwrap();
        prop_assert_eq!(resolved.qualified_name().simple_name(), "IdenticalConverter");
    }
}
