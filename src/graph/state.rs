//! Type-tagged per-node DSP state and its dispatch.

use rand::{rngs::SmallRng, SeedableRng};

use crate::graph::{
    delay::DelayNode,
    envelope::EnvelopeNode,
    filter::FilterNode,
    gate::{GateEvent, StepGate},
    granular::GranularTexture,
    kind::{NodeSettings, NodeType},
    lfo::Lfo,
    modal::ModalResonator,
    node::RenderCtx,
    noise::NoiseNode,
    oscillator::Oscillator,
    panner::SpatialPanner,
    params::{ParamId, Params},
    physics::BouncingBall,
    string::PluckedString,
};

/// Internal state of one node, owned by the renderer.
///
/// The variant always matches the node's [`NodeType`]. `Unset` only exists
/// between patch preparation and apply, for nodes whose state is expected to
/// carry over from the running graph.
#[derive(Debug, Clone)]
pub enum NodeState {
    Unset,
    Oscillator(Oscillator),
    Lfo(Lfo),
    Envelope(EnvelopeNode),
    Noise(NoiseNode),
    Euclidean(StepGate),
    Sequencer(StepGate),
    Physics(BouncingBall),
    Modal(ModalResonator),
    Karplus(PluckedString),
    Granular(GranularTexture),
    Filter(FilterNode),
    Panner(SpatialPanner),
    Delay(DelayNode),
    Sample,
    Output,
}

impl NodeState {
    /// Build zeroed state for `node_type`. May allocate (delay lines), so it
    /// runs on the control thread except for the rare carry-over miss.
    pub fn new(node_type: NodeType, settings: &NodeSettings, sample_rate: f32, seed: u64) -> Self {
        let rng = || SmallRng::seed_from_u64(seed);
        let mut state = match node_type {
            NodeType::Oscillator => NodeState::Oscillator(Oscillator::default()),
            NodeType::Lfo => NodeState::Lfo(Lfo::new(Default::default(), rng())),
            NodeType::Envelope => NodeState::Envelope(EnvelopeNode::new()),
            NodeType::Noise => NodeState::Noise(NoiseNode::new(false, rng())),
            NodeType::Euclidean => NodeState::Euclidean(StepGate::euclidean()),
            NodeType::Sequencer => NodeState::Sequencer(StepGate::sequencer(Default::default())),
            NodeType::Physics => NodeState::Physics(BouncingBall::new()),
            NodeType::Modal => {
                NodeState::Modal(ModalResonator::new(Default::default(), sample_rate, rng()))
            }
            NodeType::Karplus => NodeState::Karplus(PluckedString::new(sample_rate, rng())),
            NodeType::Granular => NodeState::Granular(GranularTexture::new(rng())),
            NodeType::Filter => NodeState::Filter(FilterNode::new(Default::default())),
            NodeType::Panner => NodeState::Panner(SpatialPanner::new()),
            NodeType::Delay => NodeState::Delay(DelayNode::new(sample_rate)),
            NodeType::Sample => NodeState::Sample,
            NodeType::Output => NodeState::Output,
        };
        state.configure(settings);
        state
    }

    pub fn node_type(&self) -> Option<NodeType> {
        Some(match self {
            NodeState::Unset => return None,
            NodeState::Oscillator(_) => NodeType::Oscillator,
            NodeState::Lfo(_) => NodeType::Lfo,
            NodeState::Envelope(_) => NodeType::Envelope,
            NodeState::Noise(_) => NodeType::Noise,
            NodeState::Euclidean(_) => NodeType::Euclidean,
            NodeState::Sequencer(_) => NodeType::Sequencer,
            NodeState::Physics(_) => NodeType::Physics,
            NodeState::Modal(_) => NodeType::Modal,
            NodeState::Karplus(_) => NodeType::Karplus,
            NodeState::Granular(_) => NodeType::Granular,
            NodeState::Filter(_) => NodeType::Filter,
            NodeState::Panner(_) => NodeType::Panner,
            NodeState::Delay(_) => NodeType::Delay,
            NodeState::Sample => NodeType::Sample,
            NodeState::Output => NodeType::Output,
        })
    }

    /// Push non-numeric settings into the processor. Settings for another
    /// type are ignored.
    pub fn configure(&mut self, settings: &NodeSettings) {
        match (self, settings) {
            (NodeState::Oscillator(osc), NodeSettings::Oscillator { waveform }) => {
                osc.set_waveform(*waveform)
            }
            (NodeState::Lfo(lfo), NodeSettings::Lfo { shape }) => lfo.set_shape(*shape),
            (NodeState::Noise(noise), NodeSettings::Noise { unipolar }) => {
                noise.set_unipolar(*unipolar)
            }
            (NodeState::Sequencer(gate), NodeSettings::Sequencer { pattern }) => {
                gate.set_pattern(*pattern)
            }
            (NodeState::Modal(modal), NodeSettings::Modal { material }) => {
                modal.set_material(*material)
            }
            (NodeState::Filter(filter), NodeSettings::Filter { mode }) => filter.set_mode(*mode),
            _ => {}
        }
    }

    /// Modulation output of a control generator, or `None` for other types.
    #[inline]
    pub fn next_control(&mut self, params: &Params, ctx: &RenderCtx) -> Option<f32> {
        match self {
            NodeState::Lfo(lfo) => Some(lfo.next_sample(params, ctx)),
            NodeState::Envelope(env) => Some(env.next_sample(params, ctx)),
            NodeState::Noise(noise) => Some(noise.next_sample(params, ctx)),
            _ => None,
        }
    }

    /// Advance a step gate. Returns `(gate level, event)`.
    #[inline]
    pub fn next_gate(&mut self, params: &Params, ctx: &RenderCtx) -> (f32, Option<GateEvent>) {
        match self {
            NodeState::Euclidean(gate) | NodeState::Sequencer(gate) => {
                let event = gate.next_sample(params, ctx);
                (gate.level(), event)
            }
            _ => (0.0, None),
        }
    }

    /// Audio output for sources and effects. `input` is the summed upstream
    /// signal and is ignored by pure sources.
    #[inline]
    pub fn next_audio(&mut self, params: &Params, input: f32, ctx: &RenderCtx) -> f32 {
        match self {
            NodeState::Oscillator(osc) => osc.next_sample(params, ctx),
            NodeState::Physics(ball) => ball.next_sample(params, ctx) * params.get(ParamId::Gain),
            NodeState::Modal(modal) => modal.next_sample(params, ctx),
            NodeState::Karplus(string) => string.next_sample(params, input, ctx),
            NodeState::Granular(texture) => texture.next_sample(params, ctx),
            NodeState::Filter(filter) => filter.next_sample(params, input, ctx),
            NodeState::Panner(panner) => panner.next_sample(params, input),
            NodeState::Delay(delay) => delay.next_sample(params, input, ctx),
            NodeState::Unset
            | NodeState::Lfo(_)
            | NodeState::Envelope(_)
            | NodeState::Noise(_)
            | NodeState::Euclidean(_)
            | NodeState::Sequencer(_)
            | NodeState::Sample
            | NodeState::Output => 0.0,
        }
    }

    /// Gate rising edge, or a `trigger` flag from a patch.
    pub fn trigger(&mut self) {
        match self {
            NodeState::Envelope(env) => env.trigger(),
            NodeState::Karplus(string) => string.trigger(),
            NodeState::Modal(modal) => modal.trigger(),
            NodeState::Physics(ball) => ball.trigger(),
            _ => {}
        }
    }

    /// Gate falling edge, or a `gateOff` flag from a patch.
    pub fn gate_off(&mut self) {
        if let NodeState::Envelope(env) = self {
            env.gate_off();
        }
    }

    /// Current modulation signal of a physics node: ball height.
    pub fn physics_position(&self) -> Option<f32> {
        match self {
            NodeState::Physics(ball) => Some(ball.position()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_matches_type() {
        for node_type in NodeType::ALL {
            let state = NodeState::new(node_type, &NodeSettings::defaults(node_type), 48_000.0, 1);
            assert_eq!(state.node_type(), Some(node_type));
        }
        assert_eq!(NodeState::Unset.node_type(), None);
    }
}
