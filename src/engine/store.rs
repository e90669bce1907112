//! Render-side node store and topology apply.

use std::{collections::HashMap, mem};

use crate::{
    engine::{prepare::PreparedGraph, topology::Topology},
    graph::{Node, NodeId, NodeState},
};

/// Live nodes, their id index and the topology that wires them.
#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    topology: Topology,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.index.get(id).map(|&i| &mut self.nodes[i])
    }

    /// Nodes for mutation alongside the topology that indexes them.
    pub(crate) fn split_mut(&mut self) -> (&mut [Node], &Topology) {
        (&mut self.nodes, &self.topology)
    }

    /// Swap `graph` in. A node whose id and type both match a live node takes
    /// over that node's state and last outputs; any other node keeps the state
    /// it was prepared with. On return `graph` holds the previous contents.
    ///
    /// Allocates only when a node marked for carry-over has no live
    /// counterpart, which means the control side lost track of the renderer.
    pub fn apply(&mut self, graph: &mut PreparedGraph, sample_rate: f32, seed: u64) {
        for node in graph.nodes.iter_mut() {
            let live = self
                .index
                .get(&node.id)
                .map(|&i| &mut self.nodes[i])
                .filter(|live| live.node_type == node.node_type);

            match live {
                Some(live) => {
                    mem::swap(&mut node.state, &mut live.state);
                    node.output = live.output;
                    node.mod_output = live.mod_output;
                    node.effective = live.effective;
                }
                None if matches!(node.state, NodeState::Unset) => {
                    node.state = NodeState::new(node.node_type, &node.settings, sample_rate, seed);
                }
                None => {}
            }
            node.state.configure(&node.settings);
        }

        mem::swap(&mut self.nodes, &mut graph.nodes);
        mem::swap(&mut self.index, &mut graph.index);
        mem::swap(&mut self.topology, &mut graph.topology);
    }

    /// Drop every node and edge. The previous contents are moved into `into`.
    pub fn clear(&mut self, into: &mut PreparedGraph) {
        mem::swap(&mut self.nodes, &mut into.nodes);
        mem::swap(&mut self.index, &mut into.index);
        mem::swap(&mut self.topology, &mut into.topology);
    }
}
