// benches/error_performance.rs
//! Benchmarks for xerror construction, rendering and reporting.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::thread;
use xerror::ring_buffer::RingBufferLogger;
use xerror::{
    CodeRadix, Identity, ProcessRng, RecordedResponse, Report, TokenSource, XError, errorf,
    template, xerror,
};

// ============================================================================
// ERROR CREATION BENCHMARKS
// ============================================================================

fn bench_error_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("error_constructors");

    group.bench_function("supplied_code", |b| {
        b.iter(|| {
            black_box(XError::new(
                "no rows",
                Identity::Supplied(0x1f),
                "invalid userid",
            ))
        })
    });

    group.bench_function("generated_code", |b| {
        b.iter(|| black_box(XError::new("no rows", Identity::Generate, "invalid userid")))
    });

    group.bench_function("errorf_macro", |b| {
        let id = 42;
        b.iter(|| black_box(errorf!("no rows", 0x1f, "invalid userid {}", black_box(id))))
    });

    group.bench_function("xerror_macro", |b| {
        let id = 42;
        b.iter(|| black_box(xerror!("no rows", "invalid userid {}", black_box(id))))
    });

    group.bench_function("runtime_template", |b| {
        b.iter(|| {
            black_box(XError::with_template(
                "no rows",
                Identity::Supplied(1),
                black_box("user {} in region {}"),
                &[&42, &"eu-west"],
            ))
        })
    });

    group.finish();
}

fn bench_token_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("token_generation");

    let rng = ProcessRng::with_seed(7);
    group.bench_function("seeded_source", |b| b.iter(|| black_box(rng.next_token())));

    group.bench_function("process_source", |b| {
        b.iter(|| black_box(xerror::process_rng().next_token()))
    });

    group.finish();
}

// ============================================================================
// RENDERING BENCHMARKS
// ============================================================================

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");
    let err = XError::new("connection reset by peer", Identity::Supplied(0x2a), "upstream failed");

    group.bench_function("compact_hex", |b| {
        b.iter(|| black_box(err.render_compact_with(CodeRadix::Hex)))
    });
    group.bench_function("compact_decimal", |b| {
        b.iter(|| black_box(err.render_compact_with(CodeRadix::Decimal)))
    });
    group.bench_function("verbose", |b| b.iter(|| black_box(err.render_verbose())));
    group.bench_function("display", |b| b.iter(|| black_box(err.render())));

    group.finish();
}

fn bench_template_args(c: &mut Criterion) {
    let mut group = c.benchmark_group("template_args");

    for count in [0usize, 2, 8] {
        let args: Vec<String> = (0..count).map(|i| format!("arg{}", i)).collect();
        let tpl = "{} ".repeat(count);

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            let refs: Vec<&dyn std::fmt::Display> =
                args.iter().map(|a| a as &dyn std::fmt::Display).collect();
            b.iter(|| black_box(template::render(&tpl, &refs)))
        });
    }

    group.finish();
}

// ============================================================================
// LOGGING BENCHMARKS
// ============================================================================

fn bench_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("logging");
    let logger = RingBufferLogger::new(1000, 1024);
    let err = XError::new("disk quota exceeded", Identity::Supplied(4), "upload failed");

    group.bench_function("log_to_ring_buffer", |b| b.iter(|| err.log_to(black_box(&logger))));

    group.bench_function("internal_log_write_to", |b| {
        b.iter(|| {
            let mut buffer = String::new();
            let _ = err.internal_log().write_to(&mut buffer);
            black_box(buffer)
        })
    });

    group.bench_function("handle_http", |b| {
        b.iter(|| {
            let mut response = RecordedResponse::default();
            err.handle_http_with(&mut response, &logger);
            black_box(response)
        })
    });

    group.finish();
}

fn bench_log_truncation(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_truncation");

    for size in [100, 1024, 5000, 10000] {
        let err = XError::new("A".repeat(size), Identity::Supplied(1), "x");

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(err.internal_log().cause_text()))
        });
    }

    group.finish();
}

fn bench_ring_buffer_concurrent(c: &mut Criterion) {
    c.bench_function("ring_buffer_4_threads", |b| {
        let logger = RingBufferLogger::new(1000, 256);
        b.iter(|| {
            thread::scope(|s| {
                for t in 0..4u32 {
                    let logger = &logger;
                    s.spawn(move || {
                        for i in 0..25u32 {
                            XError::without_cause(Identity::Supplied(t * 100 + i), "x")
                                .log_to(logger);
                        }
                    });
                }
            });
        })
    });
}

criterion_group!(creation_benches, bench_error_creation, bench_token_generation);

criterion_group!(rendering_benches, bench_rendering, bench_template_args);

criterion_group!(
    logging_benches,
    bench_logging,
    bench_log_truncation,
    bench_ring_buffer_concurrent,
);

criterion_main!(creation_benches, rendering_benches, logging_benches);
