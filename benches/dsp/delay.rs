//! Benchmarks for the fractional delay line.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use flowgraph::dsp::delay::DelayLine;

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    let delay_times: &[f32] = &[
        480.0,    // 10ms at 48kHz
        4_800.0,  // 100ms at 48kHz
        47_999.5, // just under 1 second, fractional
    ];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for &delay_samples in delay_times {
            let mut line = DelayLine::with_capacity(48_000);
            let delay_ms = (delay_samples / 48.0) as u32;
            group.bench_with_input(BenchmarkId::new(format!("feedback_{delay_ms}ms"), size), &size, |b, _| {
                b.iter(|| {
                    let mut sum = 0.0f32;
                    for &x in &input {
                        let delayed = line.read(black_box(delay_samples));
                        line.write(x + delayed * 0.5);
                        sum += delayed;
                    }
                    sum
                })
            });
        }
    }

    group.finish();
}
