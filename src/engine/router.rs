/* Modulation Router
=================

Runs once per sample, after the control generators and before any audio.

  effective = params                                  (every node)
  effective[p] += signal * amount * range.span(base)  (every route)
  effective[p] = clamp(effective[p])                  (every routed param)

  signal = bipolar ? mod_output : (mod_output + 1) / 2

Routes into the same parameter sum. There is no normalisation, so two
full-scale LFOs on one cutoff can push it twice as far as one; the clamp
keeps the result inside the parameter's valid range. The span is taken from
the base value, not from the running sum, so route order never matters.
*/

use crate::{dsp::lfo::bipolar_to_unipolar, engine::topology::Route, graph::Node};

/// Rebuild every node's effective parameters from its base parameters and
/// the current modulation outputs.
#[inline]
pub fn apply(nodes: &mut [Node], routes: &[Route]) {
    for node in nodes.iter_mut() {
        node.effective = node.params;
    }

    for route in routes {
        let Some(raw) = nodes[route.source].mod_output else {
            continue;
        };
        let signal = if route.bipolar {
            raw
        } else {
            bipolar_to_unipolar(raw)
        };
        let target = &mut nodes[route.target];
        let span = route.range.span(target.params.get(route.param));
        target.effective.add(route.param, signal * route.amount * span);
    }

    for route in routes {
        let target = &mut nodes[route.target];
        let node_type = target.node_type;
        target.effective.clamp(node_type, route.param);
    }
}
