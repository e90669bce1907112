use crate::{
    dsp::envelope::{Envelope, EnvelopeShape, EnvelopeStage},
    graph::{
        node::RenderCtx,
        params::{ParamId, Params},
    },
};

/// ADSR as a modulation source. Triggered by gate fan-out or by a patch's
/// `trigger` flag, released by gate close or `gateOff`.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeNode {
    env: Envelope,
}

impl EnvelopeNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&mut self) {
        self.env.trigger();
    }

    pub fn gate_off(&mut self) {
        self.env.gate_off();
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.env.stage()
    }

    #[inline]
    pub fn next_sample(&mut self, params: &Params, ctx: &RenderCtx) -> f32 {
        let shape = EnvelopeShape {
            attack: params.get(ParamId::AttackTime),
            decay: params.get(ParamId::DecayTime),
            sustain: params.get(ParamId::SustainLevel),
            release: params.get(ParamId::ReleaseTime),
        };
        self.env.next_sample(&shape, ctx.sample_rate)
    }
}
