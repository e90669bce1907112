//! Control-thread handle for an engine running on the audio thread.

use std::sync::Arc;

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, info, warn};

use crate::{
    config::EngineConfig,
    engine::{prepare::GraphPreparer, Engine},
    error::{Error, Result},
    graph::{NodeId, ParamId},
    io::{
        message::{ControlMessage, Notification, Retired},
        patch::{GraphPatch, MacroValue},
        sample::SampleBuffer,
    },
};

/// Most items the renderer hands back for one control message
/// (`LOAD_SAMPLE_BUFFER`: the displaced buffer and the node id).
pub const RETIRED_PER_MESSAGE: usize = 2;

/// Create a connected control handle and engine. Move the engine into the
/// audio callback and keep the handle on the control thread.
///
/// The handle empties the retire queue before every send, so between two
/// collections the renderer can retire at most a full control queue plus the
/// one message pushed after the collection. The retire queue is sized for
/// that, so the renderer never has to drop a retired allocation itself.
pub fn channel(config: EngineConfig) -> (ControlHandle, Engine) {
    let control_capacity = config.control_capacity.max(1);
    let retire_capacity = config.retire_capacity.max((control_capacity + 1) * RETIRED_PER_MESSAGE);
    let (control_tx, control_rx) = RingBuffer::new(control_capacity);
    let (notify_tx, notify_rx) = RingBuffer::new(config.notification_capacity.max(1));
    let (retire_tx, retire_rx) = RingBuffer::new(retire_capacity);

    let handle = ControlHandle {
        preparer: GraphPreparer::new(&config),
        control_tx,
        notify_rx,
        retire_rx,
    };
    let engine = Engine::with_queues(config, control_rx, notify_tx, retire_tx);
    (handle, engine)
}

pub struct ControlHandle {
    preparer: GraphPreparer,
    control_tx: Producer<ControlMessage>,
    notify_rx: Consumer<Notification>,
    retire_rx: Consumer<Retired>,
}

impl ControlHandle {
    /// `UPDATE_GRAPH`. Preparation happens here; the renderer only swaps.
    pub fn update_graph(&mut self, patch: &GraphPatch) -> Result<()> {
        let graph = self.preparer.prepare(patch);
        let live = graph.node_types();
        self.send(ControlMessage::UpdateGraph(Box::new(graph)))?;
        self.preparer.commit(live);
        info!(
            nodes = patch.nodes.len(),
            connections = patch.connections.len(),
            modulations = patch.modulations.len(),
            "graph update sent"
        );
        Ok(())
    }

    /// `UPDATE_MACROS`. Replaces the whole macro table.
    pub fn update_macros(&mut self, macros: &[MacroValue]) -> Result<()> {
        let table = macros
            .iter()
            .map(|m| (NodeId::from(m.id.as_str()), m.value))
            .collect();
        self.send(ControlMessage::UpdateMacros(table))
    }

    /// `LOAD_SAMPLE_BUFFER`. Ignored by the renderer unless `node_id` is a
    /// granular node.
    pub fn load_sample_buffer(&mut self, node_id: &str, samples: Vec<f32>, sample_rate: f32) -> Result<()> {
        let buffer = Arc::new(SampleBuffer::new(samples, sample_rate));
        debug!(node_id, frames = buffer.len(), sample_rate, "sample buffer sent");
        let node_id = self.preparer.intern(node_id);
        self.send(ControlMessage::LoadSampleBuffer { node_id, buffer })
    }

    /// Edit one base parameter by its wire name.
    pub fn set_param(&mut self, node_id: &str, param: &str, value: f32) -> Result<()> {
        let param: ParamId = param.parse()?;
        let node_id = self.preparer.intern(node_id);
        self.send(ControlMessage::SetParam { node_id, param, value })
    }

    pub fn clear(&mut self) -> Result<()> {
        self.send(ControlMessage::Clear)?;
        self.preparer.forget();
        Ok(())
    }

    pub fn poll_notification(&mut self) -> Option<Notification> {
        self.notify_rx.pop().ok()
    }

    /// Everything the renderer has reported since the last call.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::iter::from_fn(|| self.notify_rx.pop().ok()).collect()
    }

    /// Drop whatever the renderer has handed back. Called on every send;
    /// call it directly when idle for long periods.
    pub fn collect_garbage(&mut self) -> usize {
        let mut dropped = 0;
        while let Ok(item) = self.retire_rx.pop() {
            drop(item);
            dropped += 1;
        }
        dropped
    }

    fn send(&mut self, message: ControlMessage) -> Result<()> {
        self.collect_garbage();
        match self.control_tx.push(message) {
            Ok(()) => Ok(()),
            Err(_) => {
                warn!("control queue full, message dropped");
                Err(Error::QueueFull { queue: "control" })
            }
        }
    }
}
