/**
 * Performance benchmarks for greedy-dither
 *
 * Run with:
 *   cargo bench
 *
 * View HTML reports in:
 *   target/criterion/report/index.html
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use greedy_dither::{
    dither, resize_lightness, DiffusionKernel, DitherConfig, DitherEngine, FilterType, FullScan,
    LightnessImage,
};

/// Diagonal gradient test image
fn gradient(size: usize) -> LightnessImage {
    LightnessImage::from_fn(size, size, |x, y| (x + y) as f64 / (2 * size - 2) as f64)
}

/// Benchmark dithering for different sizes
fn bench_dithering(c: &mut Criterion) {
    let mut group = c.benchmark_group("dithering");

    for size in [50, 100, 200].iter() {
        let input = gradient(*size);
        group.bench_with_input(BenchmarkId::new("queue", size), size, |b, _| {
            b.iter(|| black_box(dither(&input).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark lazy-invalidation queue vs full rescan
fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");
    group.sample_size(10);

    for size in [16, 32, 48].iter() {
        let input = gradient(*size);

        group.bench_with_input(BenchmarkId::new("queue", size), size, |b, _| {
            b.iter(|| {
                let engine = DitherEngine::new(&input, DitherConfig::default()).unwrap();
                black_box(engine.run().unwrap())
            })
        });

        group.bench_with_input(BenchmarkId::new("full_scan", size), size, |b, _| {
            b.iter(|| {
                let engine =
                    DitherEngine::with_selector(&input, DitherConfig::default(), FullScan::new())
                        .unwrap();
                black_box(engine.run().unwrap())
            })
        });
    }

    group.finish();
}

/// Benchmark kernel construction
fn bench_kernel(c: &mut Criterion) {
    c.bench_function("kernel_build", |b| b.iter(|| black_box(DiffusionKernel::new())));
}

/// Benchmark proportional resizing
fn bench_resize(c: &mut Criterion) {
    let input = gradient(400);
    c.bench_function("resize_400_to_100", |b| {
        b.iter(|| black_box(resize_lightness(&input, 100, FilterType::Triangle).unwrap()))
    });
}

criterion_group!(benches, bench_dithering, bench_selection, bench_kernel, bench_resize);
criterion_main!(benches);
