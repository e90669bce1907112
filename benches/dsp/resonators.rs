//! Benchmarks for the physical-model node processors.

use std::{hint::black_box, sync::Arc};

use criterion::{BenchmarkId, Criterion};
use flowgraph::{
    graph::{
        granular::GranularTexture,
        modal::{Material, ModalResonator},
        string::PluckedString,
        NodeType, ParamId, Params, RenderCtx,
    },
    SampleBuffer,
};
use rand::{rngs::SmallRng, SeedableRng};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_resonators(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/resonators");
    let ctx = RenderCtx::new(SAMPLE_RATE);

    for &size in BLOCK_SIZES {
        let params = Params::defaults(NodeType::Karplus);
        let mut string = PluckedString::new(SAMPLE_RATE, SmallRng::seed_from_u64(1));
        string.trigger();
        group.bench_with_input(BenchmarkId::new("karplus", size), &size, |b, _| {
            b.iter(|| {
                (0..size)
                    .map(|_| string.next_sample(black_box(&params), 0.0, &ctx))
                    .sum::<f32>()
            })
        });

        // Eight modes, each a biquad
        let params = Params::defaults(NodeType::Modal);
        let mut modal = ModalResonator::new(Material::Glass, SAMPLE_RATE, SmallRng::seed_from_u64(2));
        modal.trigger();
        group.bench_with_input(BenchmarkId::new("modal_glass", size), &size, |b, _| {
            b.iter(|| (0..size).map(|_| modal.next_sample(black_box(&params), &ctx)).sum::<f32>())
        });

        // Dense cloud so the grain pool stays busy
        let mut params = Params::defaults(NodeType::Granular);
        params.set(ParamId::Density, 100.0);
        let tone: Vec<f32> = (0..SAMPLE_RATE as usize)
            .map(|n| (std::f32::consts::TAU * 220.0 * n as f32 / SAMPLE_RATE).sin())
            .collect();
        let mut grains = GranularTexture::new(SmallRng::seed_from_u64(3));
        grains.attach(Arc::new(SampleBuffer::new(tone, SAMPLE_RATE)));
        for _ in 0..SAMPLE_RATE as usize / 2 {
            grains.next_sample(&params, &ctx);
        }
        group.bench_with_input(BenchmarkId::new("granular", size), &size, |b, _| {
            b.iter(|| (0..size).map(|_| grains.next_sample(black_box(&params), &ctx)).sum::<f32>())
        });
    }

    group.finish();
}
