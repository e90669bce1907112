/* Render Engine
=============

Renders the node graph one sample at a time in a fixed phase order:

  1. gates      Euclidean and step sequencers; rising edges fan triggers out
                along outgoing connections, falling edges release envelopes
  2. controls   LFO, envelope and noise produce modulation outputs
  3. router     effective params = base params + modulation, clamped
  4. sources    oscillators, physics, modal, plucked strings, granular
  5. effects    filters, panners, delays and excited strings read the sum
                of their inputs
  6. mixer      every edge into a sink is panned into the stereo bus

Control generators read the effective params routed on the previous sample.
An effect that reads another effect later in the order sees its previous
sample. Cycles therefore need no special handling.

Messages from the control thread are drained at the start of each block,
so a graph update lands on a block boundary.
*/

pub mod channel;
pub mod health;
pub mod mixer;
pub mod prepare;
pub mod router;
pub mod store;
pub mod topology;

use std::sync::Arc;

use rtrb::{Consumer, Producer};
use tracing::info;

use crate::{
    config::EngineConfig,
    graph::{gate::GateEvent, Node, NodeId, NodeSettings, NodeState, NodeType, ParamId, RenderCtx},
    io::{
        message::{ControlMessage, Notification, Retired},
        patch::{GraphPatch, MacroValue},
        sample::SampleBuffer,
        AudioInput, AudioOutput,
    },
};

use self::{
    health::HealthReporter,
    prepare::{GraphPreparer, PreparedGraph},
    store::NodeStore,
};

pub use self::channel::{channel, ControlHandle};

pub struct Engine {
    store: NodeStore,
    ctx: RenderCtx,
    seed: u64,
    macros: Vec<(NodeId, f32)>,
    health: HealthReporter,
    preparer: GraphPreparer,
    control_rx: Option<Consumer<ControlMessage>>,
    notify_tx: Option<Producer<Notification>>,
    retire_tx: Option<Producer<Retired>>,
}

impl Engine {
    /// A standalone engine driven through its own methods. Use
    /// [`channel`] for one that is fed from another thread.
    pub fn new(config: EngineConfig) -> Self {
        info!(sample_rate = config.sample_rate, "engine created");
        Self {
            store: NodeStore::new(),
            ctx: RenderCtx::new(config.sample_rate),
            seed: config.seed,
            macros: Vec::new(),
            health: HealthReporter::new(config.heartbeat_frames(), config.sample_rate),
            preparer: GraphPreparer::new(&config),
            control_rx: None,
            notify_tx: None,
            retire_tx: None,
        }
    }

    pub(crate) fn with_queues(
        config: EngineConfig,
        control_rx: Consumer<ControlMessage>,
        notify_tx: Producer<Notification>,
        retire_tx: Producer<Retired>,
    ) -> Self {
        Self {
            control_rx: Some(control_rx),
            notify_tx: Some(notify_tx),
            retire_tx: Some(retire_tx),
            ..Self::new(config)
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.ctx.sample_rate
    }

    /// Frames rendered since construction.
    pub fn frame_count(&self) -> u64 {
        self.health.frame_count()
    }

    pub fn nodes(&self) -> &[Node] {
        self.store.nodes()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.store.get(id)
    }

    pub fn macro_value(&self, id: &str) -> Option<f32> {
        self.macros
            .iter()
            .find(|(name, _)| &**name == id)
            .map(|&(_, value)| value)
    }

    /// Prepare and apply a patch in place. Runs the preparation on the
    /// calling thread, so keep it off the audio callback.
    pub fn apply_patch(&mut self, patch: &GraphPatch) {
        let mut graph = self.preparer.prepare(patch);
        let live = graph.node_types();
        self.store.apply(&mut graph, self.ctx.sample_rate, self.seed);
        self.preparer.commit(live);
    }

    pub fn update_macros(&mut self, macros: &[MacroValue]) {
        self.macros = macros
            .iter()
            .map(|m| (NodeId::from(m.id.as_str()), m.value))
            .collect();
    }

    /// Attach a sample buffer to a granular node. Returns false if there is
    /// no granular node with that id.
    pub fn load_sample_buffer(&mut self, node_id: &str, buffer: Arc<SampleBuffer>) -> bool {
        match self.store.get_mut(node_id).map(|node| &mut node.state) {
            Some(NodeState::Granular(texture)) => {
                texture.attach(buffer);
                true
            }
            _ => false,
        }
    }

    /// Set one base parameter, clamped. Returns false if the node or the
    /// parameter does not exist.
    pub fn set_param(&mut self, node_id: &str, param: ParamId, value: f32) -> bool {
        match self.store.get_mut(node_id) {
            Some(node) => {
                let node_type = node.node_type;
                node.params.set_clamped(node_type, param, value)
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        let mut old = PreparedGraph::default();
        self.store.clear(&mut old);
        self.preparer.forget();
    }

    /// Render a planar host block. Input channels are ignored; a mono
    /// output gets the left channel.
    pub fn process_block(&mut self, _input: &AudioInput, output: &mut AudioOutput) {
        match output.buffers.as_mut_slice() {
            [] => {}
            [mono] => {
                self.drain_messages();
                for sample in mono.iter_mut() {
                    *sample = self.render_frame().0;
                }
            }
            [left, right, ..] => self.render(left, right),
        }
    }

    /// Render `min(left.len(), right.len())` stereo frames.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.drain_messages();
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.render_frame();
        }
    }

    /// Render interleaved stereo frames.
    pub fn render_interleaved(&mut self, out: &mut [f32]) {
        self.drain_messages();
        for frame in out.chunks_exact_mut(2) {
            let (l, r) = self.render_frame();
            frame[0] = l;
            frame[1] = r;
        }
    }

    fn drain_messages(&mut self) {
        let Some(mut rx) = self.control_rx.take() else {
            return;
        };
        while let Ok(message) = rx.pop() {
            self.handle(message);
        }
        self.control_rx = Some(rx);
    }

    fn handle(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::UpdateGraph(mut graph) => {
                self.store.apply(&mut graph, self.ctx.sample_rate, self.seed);
                self.retire(Retired::Graph(graph));
            }
            ControlMessage::UpdateMacros(mut macros) => {
                std::mem::swap(&mut self.macros, &mut macros);
                self.retire(Retired::Macros(macros));
            }
            ControlMessage::LoadSampleBuffer { node_id, buffer } => {
                let rejected = match self.store.get_mut(&node_id).map(|node| &mut node.state) {
                    Some(NodeState::Granular(texture)) => texture.attach(buffer),
                    _ => Some(buffer),
                };
                if let Some(old) = rejected {
                    self.retire(Retired::SampleBuffer(old));
                }
                self.retire(Retired::Id(node_id));
            }
            ControlMessage::SetParam { node_id, param, value } => {
                self.set_param(&node_id, param, value);
                self.retire(Retired::Id(node_id));
            }
            ControlMessage::Clear => {
                let mut old = PreparedGraph::default();
                self.store.clear(&mut old);
                self.retire(Retired::Cleared(old));
            }
        }
    }

    /// Hand an allocation back to the control thread. [`channel`] sizes the
    /// retire queue so this push cannot fail; a standalone engine has no
    /// queue and drops in place.
    fn retire(&mut self, item: Retired) {
        if let Some(tx) = self.retire_tx.as_mut() {
            let pushed = tx.push(item);
            debug_assert!(pushed.is_ok(), "retire queue overflowed");
        }
    }

    #[inline]
    fn render_frame(&mut self) -> (f32, f32) {
        let Engine {
            store,
            ctx,
            health,
            notify_tx,
            ..
        } = self;
        let (nodes, topology) = store.split_mut();

        for &i in &topology.schedule.gates {
            if let Some(event) = nodes[i].run_gate(ctx) {
                for &target in &topology.outputs[i] {
                    fan_out(&mut nodes[target], event, notify_tx);
                }
            }
        }

        for &i in &topology.schedule.controls {
            nodes[i].run_control(ctx);
        }

        router::apply(nodes, &topology.routes);

        for &i in &topology.schedule.sources {
            nodes[i].run_audio(0.0, ctx);
        }

        for &i in &topology.schedule.effects {
            let input: f32 = topology.inputs[i].iter().map(|&j| nodes[j].output).sum();
            nodes[i].run_audio(input, ctx);
        }

        let frame = mixer::mix(nodes, &topology.sink_edges);

        if let Some(beat) = health.tick() {
            notify(notify_tx, beat);
        }
        frame
    }
}

/// Deliver a gate edge to one downstream node.
fn fan_out(target: &mut Node, event: GateEvent, notify_tx: &mut Option<Producer<Notification>>) {
    match target.node_type {
        NodeType::Envelope => {
            target.pending.gate_off |= event.closes();
            target.pending.trigger |= event.opens();
        }
        NodeType::Karplus | NodeType::Modal | NodeType::Physics if event.opens() => target.pending.trigger = true,
        NodeType::Sample if event.opens() => {
            if let NodeSettings::Sample { sample_id } = &target.settings {
                notify(
                    notify_tx,
                    Notification::SampleTrigger {
                        node_id: target.id.clone(),
                        sample_id: sample_id.clone(),
                    },
                );
            }
        }
        _ => {}
    }
}

/// Fire and forget. A full queue drops the notification.
#[inline]
fn notify(notify_tx: &mut Option<Producer<Notification>>, notification: Notification) {
    if let Some(tx) = notify_tx.as_mut() {
        let _ = tx.push(notification);
    }
}
