//! # Perception Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use image::{Rgb, RgbImage};
use nalgebra::Point2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rov_lib::{
    per::{PerMgr, PerParams},
    rover_state::RoverState,
};

fn perception_benchmark(c: &mut Criterion) {
    // ---- Build a synthetic frame ----

    // Bright ground with dark walls in the distance and a scattering of noise
    let mut rng = StdRng::seed_from_u64(0);
    let frame = RgbImage::from_fn(320, 160, |_, y| {
        let base: u8 = if y < 90 { 50 } else { 190 };
        let n: u8 = rng.gen_range(0..20);
        Rgb([base + n, base + n, base + n])
    });

    let per = PerMgr::new(PerParams::default()).unwrap();

    let mut rover = RoverState::default();
    rover.pos = Point2::new(100.0, 100.0);
    rover.yaw = 45.0;

    c.bench_function("PerMgr::step", |b| {
        b.iter(|| per.step(&frame, &mut rover).unwrap())
    });

    let no_blur_params = PerParams {
        blur_sigma: 0.0,
        ..PerParams::default()
    };
    let per_no_blur = PerMgr::new(no_blur_params).unwrap();

    c.bench_function("PerMgr::step::no_blur", |b| {
        b.iter(|| per_no_blur.step(&frame, &mut rover).unwrap())
    });
}

criterion_group!(benches, perception_benchmark);
criterion_main!(benches);
