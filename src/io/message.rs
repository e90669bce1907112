//! Messages crossing the control/audio boundary.
//!
//! Three single-producer single-consumer rings connect the two threads:
//!
//! ```text
//! control ──ControlMessage──→ audio
//! control ←──Notification─── audio   (fire and forget)
//! control ←────Retired─────── audio   (things to drop off the audio thread)
//! ```

use std::sync::Arc;

use crate::{
    engine::prepare::PreparedGraph,
    graph::{NodeId, ParamId},
    io::sample::SampleBuffer,
};

pub enum ControlMessage {
    /// `UPDATE_GRAPH`: swap in a prepared graph, carrying state across.
    UpdateGraph(Box<PreparedGraph>),
    /// `UPDATE_MACROS`: replace the macro table.
    UpdateMacros(Vec<(NodeId, f32)>),
    /// `LOAD_SAMPLE_BUFFER`: attach audio to a granular node.
    LoadSampleBuffer {
        node_id: NodeId,
        buffer: Arc<SampleBuffer>,
    },
    /// Edit one base parameter without resending the graph.
    SetParam {
        node_id: NodeId,
        param: ParamId,
        value: f32,
    },
    /// Drop every node and edge.
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// `SAMPLE_TRIGGER`: a gate fired into a node played outside the engine.
    SampleTrigger { node_id: NodeId, sample_id: Arc<str> },
    /// `HEARTBEAT`: the renderer is alive. `timestamp` is audio time in seconds.
    Heartbeat { frame_count: u64, timestamp: f64 },
}

/// Allocations handed back to the control thread to be dropped there.
///
/// The payloads are never read; the value of this type is in its `Drop`.
#[allow(dead_code)]
pub enum Retired {
    /// The replaced graph, in the box its successor arrived in.
    Graph(Box<PreparedGraph>),
    Cleared(PreparedGraph),
    Macros(Vec<(NodeId, f32)>),
    SampleBuffer(Arc<SampleBuffer>),
    Id(NodeId),
}
