//! Cost of replacing a running graph.
//!
//! `prepare` is the control-thread side: building nodes and resolving the
//! topology. `swap` is what the audio thread pays to install an already
//! prepared graph and render one block.

use std::hint::black_box;

use criterion::Criterion;
use flowgraph::{channel, engine::prepare::GraphPreparer, EngineConfig};

use crate::SAMPLE_RATE;

pub fn bench_updates(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/updates");
    let config = EngineConfig::with_sample_rate(SAMPLE_RATE);
    let patch = super::bells();

    let mut preparer = GraphPreparer::new(&config);
    group.bench_function("prepare", |b| b.iter(|| preparer.prepare(black_box(&patch))));

    let (mut handle, mut engine) = channel(config);
    let mut left = [0.0f32; 128];
    let mut right = [0.0f32; 128];
    group.bench_function("swap", |b| {
        b.iter(|| {
            handle.update_graph(black_box(&patch)).ok();
            engine.render(&mut left, &mut right);
        })
    });

    group.finish();
}
