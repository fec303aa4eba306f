//! Cycle benchmark — measure the per-tick pure computation.
//!
//! Benchmarks the sample→calibrate→decide pipeline for both axes without
//! the pacing sleep or any driver I/O, which is what has to fit inside the
//! cycle period with room to spare.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use roto_control::deadband::decide;
use roto_control::sampler::{Calibration, calibrate};

const AZIM_CAL: Calibration = Calibration {
    slope: 125,
    intercept: -210_000,
};

const ELEV_CAL: Calibration = Calibration {
    slope: 33,
    intercept: -10_000,
};

fn bench_tick_compute(c: &mut Criterion) {
    c.bench_function("tick_compute_both_axes", |b| {
        let mut raw = 0i32;
        b.iter(|| {
            raw = (raw + 1) & 0xFFF;

            let val_azim = calibrate(black_box(raw), AZIM_CAL);
            let drive_azim = decide(val_azim, black_box(122_000), 4_000);

            let val_elev = calibrate(black_box(raw), ELEV_CAL);
            let drive_elev = decide(val_elev, black_box(22_000), 4_000);

            black_box((drive_azim, drive_elev))
        })
    });
}

criterion_group!(benches, bench_tick_compute);
criterion_main!(benches);
