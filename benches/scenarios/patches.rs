//! Steady-state rendering of demo-style patches.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use flowgraph::{Engine, EngineConfig, GraphPatch};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn warmed_up(patch: &GraphPatch) -> Engine {
    let mut engine = Engine::new(EngineConfig::with_sample_rate(SAMPLE_RATE));
    engine.apply_patch(patch);
    // Past the first triggers so resonators are ringing
    let mut scratch = vec![0.0f32; 2 * SAMPLE_RATE as usize / 2];
    engine.render_interleaved(&mut scratch);
    engine
}

pub fn bench_patches(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/patches");

    for (name, patch) in [("pluck", super::pluck()), ("bells", super::bells())] {
        for &size in BLOCK_SIZES {
            let mut engine = warmed_up(&patch);
            let mut left = vec![0.0f32; size];
            let mut right = vec![0.0f32; size];
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    engine.render(black_box(&mut left), black_box(&mut right));
                })
            });
        }
    }

    group.finish();
}
