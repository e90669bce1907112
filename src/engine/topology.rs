//! Resolved topology: signal edges, modulation routes and evaluation order,
//! expressed as indices into the node vector.
//!
//! Everything here is built on the control thread. The renderer only walks
//! the vectors.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    graph::{
        params::{lookup, ModRange},
        Node, NodeId, NodeType, ParamId, Role,
    },
    io::patch::{Connection, ModulationRoute},
};

/// A modulation route with its ids resolved and its range looked up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    pub source: usize,
    pub target: usize,
    pub param: ParamId,
    pub amount: f32,
    pub bipolar: bool,
    pub range: ModRange,
}

/// Node indices per evaluation phase, in patch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    pub gates: Vec<usize>,
    pub controls: Vec<usize>,
    pub sources: Vec<usize>,
    pub effects: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    /// Upstream node indices, per node.
    pub inputs: Vec<Vec<usize>>,
    /// Downstream node indices, per node. Used for gate fan-out.
    pub outputs: Vec<Vec<usize>>,
    /// Source node of every edge that ends in a sink.
    pub sink_edges: Vec<usize>,
    pub routes: Vec<Route>,
    pub schedule: Schedule,
}

impl Topology {
    /// Resolve wire edges against `nodes`. Edges that name a missing node and
    /// routes that name a parameter the target does not have are dropped.
    pub fn resolve(
        nodes: &[Node],
        index: &HashMap<NodeId, usize>,
        connections: &[Connection],
        modulations: &[ModulationRoute],
    ) -> Self {
        let count = nodes.len();
        let mut topology = Topology {
            inputs: vec![Vec::new(); count],
            outputs: vec![Vec::new(); count],
            ..Default::default()
        };

        for edge in connections {
            let (Some(&source), Some(&target)) = (
                index.get(edge.source_id.as_str()),
                index.get(edge.target_id.as_str()),
            ) else {
                debug!(source = %edge.source_id, target = %edge.target_id, "dangling connection skipped");
                continue;
            };
            topology.outputs[source].push(target);
            if nodes[target].node_type() == NodeType::Output {
                topology.sink_edges.push(source);
            } else {
                topology.inputs[target].push(source);
            }
        }

        for route in modulations {
            match resolve_route(nodes, index, route) {
                Some(resolved) => topology.routes.push(resolved),
                None => debug!(
                    source = %route.source_id,
                    target = %route.target_id,
                    param = %route.target_param,
                    "modulation route dropped"
                ),
            }
        }

        for i in 0..count {
            match topology.role_of(nodes, i) {
                Role::Gate => topology.schedule.gates.push(i),
                Role::Control => topology.schedule.controls.push(i),
                Role::Source => topology.schedule.sources.push(i),
                Role::Effect => topology.schedule.effects.push(i),
                Role::Sink | Role::External => {}
            }
        }

        topology
    }

    /// Effective role of node `i`. A plucked string fed by an audio-producing
    /// node becomes an effect so it runs after its exciter.
    fn role_of(&self, nodes: &[Node], i: usize) -> Role {
        let node_type = nodes[i].node_type();
        if node_type == NodeType::Karplus
            && self.inputs[i]
                .iter()
                .any(|&j| matches!(nodes[j].node_type().role(), Role::Source | Role::Effect))
        {
            return Role::Effect;
        }
        node_type.role()
    }
}

fn resolve_route(
    nodes: &[Node],
    index: &HashMap<NodeId, usize>,
    route: &ModulationRoute,
) -> Option<Route> {
    let source = *index.get(route.source_id.as_str())?;
    let target = *index.get(route.target_id.as_str())?;
    if !nodes[source].node_type().has_mod_output() {
        return None;
    }
    let param: ParamId = route.target_param.parse().ok()?;
    let spec = lookup(nodes[target].node_type(), param)?;
    Some(Route {
        source,
        target,
        param,
        amount: if route.amount.is_finite() {
            route.amount.clamp(-1.0, 1.0)
        } else {
            0.0
        },
        bipolar: route.bipolar,
        range: spec.mod_range,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::graph::{NodeSettings, NodeState, Params};

    fn graph(types: &[(&str, NodeType)]) -> (Vec<Node>, HashMap<NodeId, usize>) {
        let nodes: Vec<Node> = types
            .iter()
            .map(|&(id, t)| {
                let settings = NodeSettings::defaults(t);
                Node::new(Arc::from(id), t, settings, Params::defaults(t), NodeState::Unset)
            })
            .collect();
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        (nodes, index)
    }

    fn edge(source: &str, target: &str) -> Connection {
        Connection {
            source_id: source.into(),
            target_id: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    fn route(source: &str, target: &str, param: &str, amount: f32) -> ModulationRoute {
        ModulationRoute {
            source_id: source.into(),
            target_id: target.into(),
            target_param: param.into(),
            amount,
            bipolar: true,
        }
    }

    #[test]
    fn dangling_edges_are_skipped() {
        let (nodes, index) = graph(&[("osc", NodeType::Oscillator), ("out", NodeType::Output)]);
        let topology = Topology::resolve(
            &nodes,
            &index,
            &[edge("osc", "out"), edge("ghost", "out"), edge("osc", "nowhere")],
            &[],
        );
        assert_eq!(topology.sink_edges, vec![0]);
        assert_eq!(topology.outputs[0], vec![1]);
        assert!(topology.inputs[1].is_empty(), "sinks are read by the mixer, not as inputs");
    }

    #[test]
    fn routes_need_a_mod_source_and_a_real_param() {
        let (nodes, index) = graph(&[
            ("lfo", NodeType::Lfo),
            ("osc", NodeType::Oscillator),
            ("flt", NodeType::Filter),
        ]);
        let topology = Topology::resolve(
            &nodes,
            &index,
            &[],
            &[
                route("lfo", "flt", "cutoff", 3.0),
                route("lfo", "osc", "cutoff", 0.5),
                route("osc", "flt", "cutoff", 0.5),
                route("lfo", "flt", "wobble", 0.5),
                route("ghost", "flt", "cutoff", 0.5),
            ],
        );
        assert_eq!(topology.routes.len(), 1);
        let kept = topology.routes[0];
        assert_eq!((kept.source, kept.target, kept.param), (0, 2, ParamId::Cutoff));
        assert_eq!(kept.amount, 1.0, "amount is clamped to [-1, 1]");
        assert_eq!(kept.range, ModRange::Absolute(5_000.0));
    }

    #[test]
    fn plucked_string_with_audio_input_runs_as_effect() {
        let (nodes, index) = graph(&[
            ("clock", NodeType::Euclidean),
            ("pluck", NodeType::Karplus),
            ("osc", NodeType::Oscillator),
            ("string", NodeType::Karplus),
            ("env", NodeType::Envelope),
        ]);
        let topology = Topology::resolve(
            &nodes,
            &index,
            &[edge("clock", "pluck"), edge("osc", "string")],
            &[],
        );
        assert_eq!(topology.schedule.gates, vec![0]);
        assert_eq!(topology.schedule.controls, vec![4]);
        assert_eq!(topology.schedule.sources, vec![1, 2], "a gate input does not make an effect");
        assert_eq!(topology.schedule.effects, vec![3]);
    }
}
