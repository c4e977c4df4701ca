use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, GrayImage, Luma};
use region_descriptors::{Contour, DescriptorStrategy, PipelineBuilder};

/// Scattered discs and boxes on a dark background
fn create_benchmark_image(size: u32) -> DynamicImage {
    let shapes: Vec<(i64, i64, i64)> = (0..12)
        .map(|i| {
            let cx = (37 + i * 83) % size as i64;
            let cy = (59 + i * 47) % size as i64;
            (cx, cy, 8 + (i % 5) * 6)
        })
        .collect();

    let img = GrayImage::from_fn(size, size, |x, y| {
        let (x, y) = (x as i64, y as i64);
        let inside = shapes.iter().enumerate().any(|(i, &(cx, cy, r))| {
            if i % 2 == 0 {
                (x - cx).pow(2) + (y - cy).pow(2) <= r * r
            } else {
                (x - cx).abs() <= r && (y - cy).abs() <= r
            }
        });
        if inside { Luma([230]) } else { Luma([20]) }
    });
    DynamicImage::ImageLuma8(img)
}

fn wobbly_contour(points: usize) -> Contour {
    let coords: Vec<(i32, i32)> = (0..points)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / points as f64;
            let r = 200.0 + 15.0 * (7.0 * t).sin();
            ((500.0 + r * t.cos()).round() as i32, (500.0 + r * t.sin()).round() as i32)
        })
        .collect();
    Contour::from_coords(&coords)
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategy_describe");
    let contour = wobbly_contour(1_000);

    for strategy in DescriptorStrategy::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(strategy), &contour, |b, contour| {
            b.iter(|| strategy.describe(black_box(contour)))
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for size in [256u32, 512] {
        let image = create_benchmark_image(size);
        let edge = PipelineBuilder::new().unbounded_size().build().unwrap();
        let otsu = PipelineBuilder::new().otsu().unbounded_size().build().unwrap();

        group.bench_with_input(BenchmarkId::new("edge", size), &image, |b, image| {
            b.iter(|| edge.describe(black_box(image)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("otsu", size), &image, |b, image| {
            b.iter(|| otsu.describe(black_box(image)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_strategies, bench_pipeline);
criterion_main!(benches);
