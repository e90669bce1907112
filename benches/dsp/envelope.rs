//! Benchmarks for the ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use flowgraph::dsp::envelope::{Envelope, EnvelopeShape};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let slow = EnvelopeShape {
        attack: 0.1,
        ..EnvelopeShape::default()
    };
    let fast = EnvelopeShape {
        attack: 0.001,
        decay: 0.001,
        sustain: 0.7,
        release: 0.1,
    };

    for &size in BLOCK_SIZES {
        let mut env = Envelope::new();
        env.trigger();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| (0..size).map(|_| env.next_sample(black_box(&slow), SAMPLE_RATE)).sum::<f32>())
        });

        let mut env = Envelope::new();
        env.trigger();
        for _ in 0..200 {
            env.next_sample(&fast, SAMPLE_RATE);
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| (0..size).map(|_| env.next_sample(black_box(&fast), SAMPLE_RATE)).sum::<f32>())
        });

        let mut env = Envelope::new();
        env.trigger();
        for _ in 0..200 {
            env.next_sample(&fast, SAMPLE_RATE);
        }
        env.gate_off();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| (0..size).map(|_| env.next_sample(black_box(&fast), SAMPLE_RATE)).sum::<f32>())
        });
    }

    group.finish();
}
