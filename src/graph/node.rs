use std::sync::Arc;

use crate::graph::{
    gate::GateEvent,
    kind::{NodeSettings, NodeType},
    params::{ParamId, Params},
    state::NodeState,
};

/// Node identifier. Shared so notifications can carry it without allocating.
pub type NodeId = Arc<str>;

/// Context passed to node processors for every sample.
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
}

impl RenderCtx {
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }
}

/// One-shot events waiting to be delivered to a node's state on its next sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pending {
    pub trigger: bool,
    pub gate_off: bool,
}

/// A live node: authoritative params from the patch, effective params after
/// modulation, and the DSP state only the renderer touches.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) node_type: NodeType,
    pub(crate) settings: NodeSettings,
    pub(crate) params: Params,
    pub(crate) effective: Params,
    pub(crate) state: NodeState,
    pub(crate) muted: bool,
    pub(crate) pending: Pending,
    pub(crate) output: f32,
    pub(crate) mod_output: Option<f32>,
}

impl Node {
    pub fn new(id: NodeId, node_type: NodeType, settings: NodeSettings, params: Params, state: NodeState) -> Self {
        Self {
            id,
            node_type,
            settings,
            params,
            effective: params,
            state,
            muted: false,
            pending: Pending::default(),
            output: 0.0,
            mod_output: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn settings(&self) -> &NodeSettings {
        &self.settings
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn effective(&self) -> &Params {
        &self.effective
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Audio produced on the last rendered sample.
    pub fn output(&self) -> f32 {
        self.output
    }

    /// Modulation signal produced on the last rendered sample, if the type has one.
    pub fn mod_output(&self) -> Option<f32> {
        self.mod_output
    }

    /// Stereo position the mixer uses for this node.
    pub fn pan(&self) -> f32 {
        match &self.state {
            NodeState::Panner(panner) => panner.pan(),
            _ => self.effective.get(ParamId::Pan),
        }
    }

    /// Release first, so a release and a trigger landing together restart the note.
    fn deliver_pending(&mut self) {
        if self.pending.gate_off {
            self.state.gate_off();
        }
        if self.pending.trigger {
            self.state.trigger();
        }
        self.pending = Pending::default();
    }

    /// Run an LFO, envelope or noise node for one sample.
    #[inline]
    pub(crate) fn run_control(&mut self, ctx: &RenderCtx) {
        self.deliver_pending();
        self.mod_output = self.state.next_control(&self.effective, ctx);
    }

    /// Run a step gate for one sample and report its edge, if any.
    #[inline]
    pub(crate) fn run_gate(&mut self, ctx: &RenderCtx) -> Option<GateEvent> {
        self.deliver_pending();
        let (level, event) = self.state.next_gate(&self.effective, ctx);
        self.mod_output = Some(level);
        event
    }

    /// Run a source or effect for one sample. Muted nodes keep processing
    /// so phase and buffers stay continuous, but output silence.
    #[inline]
    pub(crate) fn run_audio(&mut self, input: f32, ctx: &RenderCtx) {
        self.deliver_pending();
        let out = self.state.next_audio(&self.effective, input, ctx);
        self.output = if self.muted { 0.0 } else { out };
        if let Some(position) = self.state.physics_position() {
            self.mod_output = Some(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(node_type: NodeType) -> Node {
        let settings = NodeSettings::defaults(node_type);
        let state = NodeState::new(node_type, &settings, 48_000.0, 0);
        Node::new(Arc::from("n"), node_type, settings, Params::defaults(node_type), state)
    }

    #[test]
    fn muted_oscillator_keeps_its_phase() {
        let ctx = RenderCtx::new(48_000.0);
        let mut muted = node(NodeType::Oscillator);
        let mut open = node(NodeType::Oscillator);
        muted.muted = true;
        for _ in 0..100 {
            muted.run_audio(0.0, &ctx);
            open.run_audio(0.0, &ctx);
            assert_eq!(muted.output(), 0.0);
        }
        muted.muted = false;
        muted.run_audio(0.0, &ctx);
        open.run_audio(0.0, &ctx);
        assert_eq!(muted.output(), open.output());
    }

    #[test]
    fn pending_trigger_starts_envelope() {
        let ctx = RenderCtx::new(48_000.0);
        let mut env = node(NodeType::Envelope);
        env.run_control(&ctx);
        assert_eq!(env.mod_output(), Some(0.0));
        env.pending.trigger = true;
        env.run_control(&ctx);
        assert!(env.mod_output().unwrap() > 0.0);
        assert_eq!(env.pending, Pending::default());
    }

    #[test]
    fn release_and_trigger_together_restart_the_attack() {
        let ctx = RenderCtx::new(48_000.0);
        let mut env = node(NodeType::Envelope);
        env.pending.trigger = true;
        for _ in 0..4_800 {
            env.run_control(&ctx);
        }

        env.pending = Pending {
            trigger: true,
            gate_off: true,
        };
        for _ in 0..100 {
            env.run_control(&ctx);
        }
        let level = env.mod_output().unwrap_or(0.0);
        assert!(level > 0.1 && level < 0.5, "attack restarted from zero, level {level}");
    }
}
