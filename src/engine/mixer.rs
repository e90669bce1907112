//! Stereo output mixer.
//!
//! Every edge into a sink adds `output * MIX_GAIN` to the bus, spread with an
//! equal-power pan law. A node wired to two sinks is heard twice. Both
//! channels are hard-clipped after summation.

use crate::{
    dsp::pan::{equal_power, hard_clip},
    graph::Node,
};

/// Headroom per contributing edge.
pub const MIX_GAIN: f32 = 0.5;

#[inline]
pub fn mix(nodes: &[Node], sink_edges: &[usize]) -> (f32, f32) {
    let mut left = 0.0;
    let mut right = 0.0;
    for &source in sink_edges {
        let node = &nodes[source];
        let signal = node.output * MIX_GAIN;
        let (l, r) = equal_power(node.pan());
        left += signal * l;
        right += signal * r;
    }
    (hard_clip(left), hard_clip(right))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::graph::{NodeSettings, NodeState, NodeType, ParamId, Params};

    fn source(output: f32, pan: f32) -> Node {
        let mut params = Params::defaults(NodeType::Oscillator);
        params.set(ParamId::Pan, pan);
        let mut node = Node::new(
            Arc::from("src"),
            NodeType::Oscillator,
            NodeSettings::defaults(NodeType::Oscillator),
            params,
            NodeState::Unset,
        );
        node.output = output;
        node
    }

    #[test]
    fn centre_pan_splits_equally() {
        let nodes = [source(1.0, 0.0)];
        let (l, r) = mix(&nodes, &[0]);
        let expected = 0.5 * std::f32::consts::FRAC_1_SQRT_2;
        assert!((l - expected).abs() < 1e-6 && (r - expected).abs() < 1e-6, "got ({l}, {r})");
    }

    #[test]
    fn hard_left_is_silent_on_the_right() {
        let nodes = [source(1.0, -1.0)];
        let (l, r) = mix(&nodes, &[0]);
        assert!((l - 0.5).abs() < 1e-6);
        assert!(r.abs() < 1e-6);
    }

    #[test]
    fn sum_is_clipped() {
        let nodes = [source(1.0, -1.0), source(1.0, -1.0), source(1.0, -1.0)];
        let (l, _) = mix(&nodes, &[0, 1, 2, 0]);
        assert_eq!(l, 1.0);
    }

    #[test]
    fn no_sinks_is_silence() {
        let nodes = [source(1.0, 0.0)];
        assert_eq!(mix(&nodes, &[]), (0.0, 0.0));
    }
}
