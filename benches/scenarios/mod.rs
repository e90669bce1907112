//! Whole-engine benchmarks.
//!
//! These render complete patches like the ones under `patches/` and measure
//! the cost of replacing a running graph.

mod patches;
mod updates;

pub use patches::bench_patches;
pub use updates::bench_updates;

use flowgraph::{GraphPatch, NodeType, ParamValue};

/// Euclidean rhythm plucking a string through a swept filter and an echo.
pub fn pluck() -> GraphPatch {
    GraphPatch::new()
        .node(
            "clock",
            NodeType::Euclidean,
            [("tempo", 240.0), ("steps", 8.0), ("pulses", 5.0)],
        )
        .node("string", NodeType::Karplus, [("frequency", 146.8), ("damping", 0.4)])
        .node("sweep", NodeType::Lfo, [("frequency", 0.3)])
        .node(
            "tone",
            NodeType::Filter,
            [("cutoff", ParamValue::from(1_800.0)), ("filterType", "lowpass".into())],
        )
        .node("echo", NodeType::Delay, [("time", 0.3), ("feedback", 0.45), ("mix", 0.35)])
        .node("out", NodeType::Output, Vec::<(&str, f32)>::new())
        .connect("clock", "string")
        .connect("string", "tone")
        .connect("tone", "echo")
        .connect("echo", "out")
        .modulate("sweep", "tone", "cutoff", 0.4, true)
}

/// A bank of struck resonators, two panned drones and a noise-driven panner.
pub fn bells() -> GraphPatch {
    let mut patch = GraphPatch::new()
        .node(
            "seq",
            NodeType::Sequencer,
            [
                ("pattern", ParamValue::from(vec![true, false, true, true, false, false, true, false])),
                ("tempo", ParamValue::from(240.0)),
            ],
        )
        .node("drift", NodeType::Noise, [("rate", 0.5), ("smoothness", 0.8)])
        .node("out", NodeType::Output, Vec::<(&str, f32)>::new());

    for (i, frequency) in [523.3f32, 659.3, 784.0, 1046.5].into_iter().enumerate() {
        let bell = format!("bell{i}");
        let pan = format!("pan{i}");
        patch = patch
            .node(
                bell.as_str(),
                NodeType::Modal,
                [("frequency", ParamValue::from(frequency)), ("material", "glass".into())],
            )
            .node(pan.as_str(), NodeType::Panner, Vec::<(&str, f32)>::new())
            .connect("seq", bell.as_str())
            .connect(bell.as_str(), pan.as_str())
            .connect(pan.as_str(), "out")
            .modulate("drift", pan.as_str(), "x", 0.5, true);
    }

    for (id, frequency) in [("drone_lo", 110.0f32), ("drone_hi", 165.0)] {
        patch = patch
            .node(id, NodeType::Oscillator, [("frequency", ParamValue::from(frequency)), ("waveform", "triangle".into())])
            .connect(id, "out");
    }
    patch
}
