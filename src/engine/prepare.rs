//! Control-side graph preparation.
//!
//! Turns a wire [`GraphPatch`] into a [`PreparedGraph`]: typed nodes, an id
//! index and a resolved [`Topology`]. Any allocation the renderer would need
//! to apply the patch happens here instead. Nodes expected to survive from
//! the running graph get a placeholder state that the renderer replaces with
//! the live one.

use std::collections::{hash_map::Entry, HashMap};
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    config::EngineConfig,
    dsp::euclid::StepPattern,
    engine::topology::Topology,
    error::Error,
    graph::{Node, NodeId, NodeSettings, NodeState, NodeType, ParamId, Params},
    io::patch::{GraphPatch, NodeDescription, ParamValue},
};

/// A graph ready to be swapped in by the renderer without allocating.
#[derive(Debug, Default)]
pub struct PreparedGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) index: HashMap<NodeId, usize>,
    pub(crate) topology: Topology,
}

impl PreparedGraph {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Id and type of every node, as the renderer will hold them once applied.
    pub fn node_types(&self) -> HashMap<NodeId, NodeType> {
        self.nodes
            .iter()
            .map(|node| (node.id.clone(), node.node_type))
            .collect()
    }
}

/// Converts patches for one renderer and remembers what it last sent.
#[derive(Debug)]
pub struct GraphPreparer {
    sample_rate: f32,
    seed: u64,
    spawned: u64,
    live: HashMap<NodeId, NodeType>,
}

impl GraphPreparer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            seed: config.seed,
            spawned: 0,
            live: HashMap::new(),
        }
    }

    pub fn prepare(&mut self, patch: &GraphPatch) -> PreparedGraph {
        let mut nodes = Vec::with_capacity(patch.nodes.len());
        let mut index = HashMap::with_capacity(patch.nodes.len());

        for desc in &patch.nodes {
            let id = self.intern(&desc.id);
            match index.entry(id.clone()) {
                Entry::Occupied(_) => {
                    warn!(id = %desc.id, "duplicate node id, keeping the first");
                    continue;
                }
                Entry::Vacant(slot) => {
                    slot.insert(nodes.len());
                }
            }
            nodes.push(self.build_node(id, desc));
        }

        let topology = Topology::resolve(&nodes, &index, &patch.connections, &patch.modulations);
        debug!(
            nodes = nodes.len(),
            connections = patch.connections.len(),
            routes = topology.routes.len(),
            dropped_routes = patch.modulations.len() - topology.routes.len(),
            "graph prepared"
        );

        PreparedGraph {
            nodes,
            index,
            topology,
        }
    }

    /// Record the node set the renderer holds after a graph was sent.
    pub fn commit(&mut self, live: HashMap<NodeId, NodeType>) {
        self.live = live;
    }

    /// The renderer was cleared.
    pub fn forget(&mut self) {
        self.live.clear();
    }

    /// Share the renderer's copy of an id when there is one.
    pub fn intern(&self, id: &str) -> NodeId {
        match self.live.get_key_value(id) {
            Some((shared, _)) => shared.clone(),
            None => Arc::from(id),
        }
    }

    fn build_node(&mut self, id: NodeId, desc: &NodeDescription) -> Node {
        let node_type = desc.node_type;
        let parsed = parse_params(desc);
        let state = if self.live.get(&id) == Some(&node_type) {
            NodeState::Unset
        } else {
            let seed = self.next_seed();
            NodeState::new(node_type, &parsed.settings, self.sample_rate, seed)
        };

        let mut node = Node::new(id, node_type, parsed.settings, parsed.params, state);
        node.muted = parsed.muted;
        node.pending.trigger = parsed.trigger;
        node.pending.gate_off = parsed.gate_off;
        node
    }

    fn next_seed(&mut self) -> u64 {
        self.spawned += 1;
        self.seed ^ self.spawned.wrapping_mul(0x9e37_79b9_7f4a_7c15)
    }
}

/// Typed view of one node's wire params.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedParams {
    pub settings: NodeSettings,
    pub params: Params,
    pub muted: bool,
    pub trigger: bool,
    pub gate_off: bool,
}

/// Split wire params into settings, clamped numeric params and flags.
/// Unknown keys and unparseable values are skipped.
pub fn parse_params(desc: &NodeDescription) -> ParsedParams {
    let node_type = desc.node_type;
    let mut parsed = ParsedParams {
        settings: NodeSettings::defaults(node_type),
        params: Params::defaults(node_type),
        muted: false,
        trigger: false,
        gate_off: false,
    };

    for (key, value) in &desc.params {
        match key.as_str() {
            "muted" => parsed.muted = value.as_bool().unwrap_or(false),
            "trigger" => parsed.trigger = value.as_bool().unwrap_or(false),
            "gateOff" => parsed.gate_off = value.as_bool().unwrap_or(false),
            _ if apply_setting(&mut parsed.settings, key, value, &desc.id) => {}
            _ => apply_number(&mut parsed.params, node_type, key, value, &desc.id),
        }
    }
    parsed
}

/// Returns true if `key` names a setting of this node's type.
fn apply_setting(settings: &mut NodeSettings, key: &str, value: &ParamValue, id: &str) -> bool {
    match (settings, key) {
        (NodeSettings::Oscillator { waveform }, "waveform") => set_parsed(waveform, value, id),
        (NodeSettings::Lfo { shape }, "waveform" | "shape") => set_parsed(shape, value, id),
        (NodeSettings::Modal { material }, "material") => set_parsed(material, value, id),
        (NodeSettings::Filter { mode }, "filterType" | "mode") => set_parsed(mode, value, id),
        (NodeSettings::Noise { unipolar }, "unipolar") => match value.as_bool() {
            Some(flag) => *unipolar = flag,
            None => warn!(id, "`unipolar` expects a bool"),
        },
        (NodeSettings::Sequencer { pattern }, "pattern") => match value {
            ParamValue::Pattern(steps) => *pattern = StepPattern::from_slice(steps),
            _ => warn!(id, "`pattern` expects a list of bools"),
        },
        (NodeSettings::Sample { sample_id }, "sampleId") => match value.as_str() {
            Some(name) => *sample_id = Arc::from(name),
            None => warn!(id, "`sampleId` expects a string"),
        },
        _ => return false,
    }
    true
}

fn set_parsed<T>(slot: &mut T, value: &ParamValue, id: &str)
where
    T: FromStr<Err = Error>,
{
    let Some(text) = value.as_str() else {
        warn!(id, ?value, "expected a string setting");
        return;
    };
    match text.parse() {
        Ok(parsed) => *slot = parsed,
        Err(err) => warn!(id, %err, "setting ignored"),
    }
}

fn apply_number(params: &mut Params, node_type: NodeType, key: &str, value: &ParamValue, id: &str) {
    let Ok(param) = key.parse::<ParamId>() else {
        debug!(id, key, "unknown parameter ignored");
        return;
    };
    let Some(number) = value.as_f32() else {
        warn!(id, key, ?value, "parameter expects a number");
        return;
    };
    if !params.set_clamped(node_type, param, number) {
        debug!(id, key, %node_type, "parameter does not apply to this node type");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dsp::{filter::FilterType, oscillator::Waveform},
        graph::modal::Material,
    };

    fn preparer() -> GraphPreparer {
        GraphPreparer::new(&EngineConfig::default())
    }

    #[test]
    fn wire_params_become_typed() {
        let patch = GraphPatch::new()
            .node(
                "osc",
                NodeType::Oscillator,
                [
                    ("frequency", ParamValue::from(50_000.0)),
                    ("waveform", "saw".into()),
                    ("muted", true.into()),
                    ("wobble", ParamValue::from(3.0)),
                ],
            )
            .node("flt", NodeType::Filter, [("filterType", "notch"), ("waveform", "square")])
            .node("bell", NodeType::Modal, [("material", ParamValue::from("glass")), ("trigger", true.into())]);
        let graph = preparer().prepare(&patch);

        let osc = &graph.nodes()[0];
        assert_eq!(osc.params().get(ParamId::Frequency), 20_000.0, "clamped on conversion");
        assert_eq!(osc.settings(), &NodeSettings::Oscillator { waveform: Waveform::Sawtooth });
        assert!(osc.is_muted());

        assert_eq!(graph.nodes()[1].settings(), &NodeSettings::Filter { mode: FilterType::Notch });
        assert_eq!(graph.nodes()[2].settings(), &NodeSettings::Modal { material: Material::Glass });
        assert!(graph.nodes()[2].pending.trigger);
    }

    #[test]
    fn bad_setting_keeps_default() {
        let desc = NodeDescription {
            id: "osc".into(),
            node_type: NodeType::Oscillator,
            params: [("waveform".to_owned(), ParamValue::from("kazoo"))].into_iter().collect(),
        };
        let parsed = parse_params(&desc);
        assert_eq!(parsed.settings, NodeSettings::defaults(NodeType::Oscillator));
    }

    #[test]
    fn known_nodes_are_marked_for_carry_over() {
        let mut preparer = preparer();
        let first = GraphPatch::new()
            .node("a", NodeType::Oscillator, [("frequency", 220.0)])
            .node("b", NodeType::Delay, [("time", 0.2)]);
        let graph = preparer.prepare(&first);
        assert!(graph.nodes().iter().all(|n| !matches!(n.state(), NodeState::Unset)));
        preparer.commit(graph.node_types());

        let second = GraphPatch::new()
            .node("a", NodeType::Oscillator, [("frequency", 330.0)])
            .node("b", NodeType::Filter, Vec::<(&str, f32)>::new());
        let graph = preparer.prepare(&second);
        assert!(matches!(graph.nodes()[0].state(), NodeState::Unset), "same id and type carries");
        assert!(matches!(graph.nodes()[1].state(), NodeState::Filter(_)), "type change rebuilds");
    }

    #[test]
    fn duplicate_ids_keep_the_first() {
        let patch = GraphPatch::new()
            .node("a", NodeType::Oscillator, [("frequency", 220.0)])
            .node("a", NodeType::Oscillator, [("frequency", 330.0)]);
        let graph = preparer().prepare(&patch);
        assert_eq!(graph.nodes().len(), 1);
        assert_eq!(graph.nodes()[0].params().get(ParamId::Frequency), 220.0);
    }
}
