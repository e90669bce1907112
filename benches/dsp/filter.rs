//! Benchmarks for the biquad, including per-sample coefficient updates.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use flowgraph::dsp::filter::{Biquad, BiquadCoefficients, FilterType};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f32> = (0..size).map(|i| (i as f32 / size as f32) * 2.0 - 1.0).collect();

        for (name, filter_type) in [
            ("lowpass", FilterType::LowPass),
            ("highpass", FilterType::HighPass),
            ("bandpass", FilterType::BandPass),
            ("notch", FilterType::Notch),
        ] {
            let mut filter = Biquad::new(BiquadCoefficients::design(filter_type, 1_000.0, 2.0, SAMPLE_RATE));
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| input.iter().map(|&x| filter.process(black_box(x))).sum::<f32>())
            });
        }

        // A modulated cutoff redesigns the coefficients every sample
        let mut filter = Biquad::default();
        group.bench_with_input(BenchmarkId::new("swept_lowpass", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for (i, &x) in input.iter().enumerate() {
                    let cutoff = 800.0 + 400.0 * (i as f32 * 0.01).sin();
                    filter.set_coefficients(BiquadCoefficients::design(
                        FilterType::LowPass,
                        black_box(cutoff),
                        1.0,
                        SAMPLE_RATE,
                    ));
                    sum += filter.process(x);
                }
                sum
            })
        });
    }

    group.finish();
}
