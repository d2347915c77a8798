//! Resolution and emission throughput.
//!
//! - `resolve/*`: cold and warm lookups against the full built-in registry
//! - `map_fields/*`: a representative struct mapping end to end
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- map_fields
//! ```
//!
//! Prints the time spent in each profiled top-level scope after the run.

use std::hint::black_box;

use convgen::convgen_core::{FunctionRef, NamedKind, TypeDesc, TypeTable};
use convgen::{Field, Generator, GeneratorConfig};
use criterion::{Criterion, criterion_group, criterion_main};

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// Total time per top-level scope across the recorded frames.
#[cfg(feature = "profile-with-puffin")]
fn print_profiling_stats() {
    use puffin::Reader;
    use std::collections::BTreeMap;

    let Some(frame_view) = FRAME_VIEW.get() else {
        return;
    };
    let view = frame_view.lock();
    let scopes = view.scope_collection();
    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    let mut frames = 0i64;

    for frame in view.recent_frames() {
        frames += 1;
        let Ok(unpacked) = frame.unpacked() else {
            continue;
        };
        for stream_info in unpacked.thread_streams.values() {
            let Ok(top) = Reader::from_start(&stream_info.stream).read_top_scopes() else {
                continue;
            };
            for scope in top {
                if let Some(details) = scopes.fetch_by_id(&scope.id) {
                    *totals.entry(details.name().to_string()).or_insert(0) +=
                        scope.record.duration_ns;
                }
            }
        }
    }

    println!("\n=== scopes over {frames} frames ===");
    for (name, ns) in totals {
        let avg = if frames > 0 { ns / frames } else { ns };
        println!("  {name:40} {:>10.2?}", std::time::Duration::from_nanos(avg as u64));
    }
}

#[cfg(not(feature = "profile-with-puffin"))]
fn print_profiling_stats() {}

fn id() -> TypeDesc {
    TypeDesc::named("example.com/model", "ID", NamedKind::Opaque)
}

fn generator() -> Generator {
    let mut types = TypeTable::new();
    types.add_function(
        FunctionRef::new("example.com/conv", "ParseID"),
        vec![TypeDesc::scalar("string")],
        vec![id()],
    );
    let config = GeneratorConfig {
        bridge_functions: vec!["example.com/conv.ParseID".into()],
        ..GeneratorConfig::default()
    };
    let mut generator = Generator::new(config).expect("default config is valid");
    generator.init(&types).expect("fresh generator initializes");
    generator
}

fn pairs() -> Vec<(&'static str, TypeDesc, TypeDesc)> {
    let text = TypeDesc::scalar("string");
    vec![
        ("identical", text.clone(), text.clone()),
        ("pointer_wrap", TypeDesc::pointer(text.clone()), text.clone()),
        (
            "numeric_cast",
            TypeDesc::scalar("float64"),
            TypeDesc::scalar("int16"),
        ),
        ("function_both_sides", TypeDesc::pointer(id()), TypeDesc::pointer(text.clone())),
        (
            "sql_null",
            text.clone(),
            TypeDesc::struct_type("database/sql", "NullString"),
        ),
        ("unconvertible", TypeDesc::scalar("chan int"), text),
    ]
}

fn resolve_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let warm = generator();
    let pairs = pairs();
    let mut group = c.benchmark_group("resolve");

    for (name, target, source) in &pairs {
        group.bench_function(format!("warm/{name}"), |b| {
            b.iter(|| {
                let resolved = warm.resolve(black_box(target), black_box(source));
                black_box(resolved.map(|r| r.id()).ok())
            });
        });
    }

    // a fresh registry per iteration, so nothing is cached
    let (_, target, source) = &pairs[3];
    group.bench_function("cold/function_both_sides", |b| {
        b.iter(|| {
            let cold = generator();
            black_box(cold.resolve(target, source).map(|r| r.id()).ok())
        });
    });

    group.finish();
}

fn mapping_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let generator = generator();
    let text = TypeDesc::scalar("string");
    let target = [
        Field::new("ID", id()),
        Field::new("Name", text.clone()),
        Field::new("Age", TypeDesc::pointer(TypeDesc::scalar("int"))),
        Field::new("Tags", TypeDesc::slice(text.clone())),
        Field::new("Scores", TypeDesc::slice(TypeDesc::scalar("float64"))),
    ];
    let source = [
        Field::new("ID", text.clone()),
        Field::new("Name", TypeDesc::struct_type("database/sql", "NullString")),
        Field::new("Age", TypeDesc::scalar("int")),
        Field::new("Tags", TypeDesc::slice(text)),
        Field::new("Scores", TypeDesc::slice(TypeDesc::scalar("int32"))),
    ];

    c.bench_function("map_fields/user", |b| {
        b.iter(|| {
            let output = generator
                .map_fields("out", black_box(&target), "in", black_box(&source))
                .expect("generator is ready");
            end_profiling_frame();
            black_box(output.summary.converted.len())
        });
    });

    print_profiling_stats();
}

criterion_group!(benches, resolve_benchmarks, mapping_benchmarks);
criterion_main!(benches);
