use crate::{
    dsp::oscillator::{Phasor, Waveform},
    graph::{
        node::RenderCtx,
        params::{ParamId, Params},
    },
};

/*
Audio Oscillator
================

  Sine       fundamental only
  Sawtooth   every harmonic, falling as 1/n
  Square     odd harmonics, falling as 1/n
  Triangle   odd harmonics, falling as 1/n²

The phase keeps running while the node is muted. Unmuting therefore picks
the waveform up where it would have been, which keeps layered oscillators
phase-locked across mute toggles.
*/

#[derive(Debug, Clone, Default)]
pub struct Oscillator {
    phasor: Phasor,
    waveform: Waveform,
}

impl Oscillator {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            phasor: Phasor::new(),
            waveform,
        }
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn phase(&self) -> f32 {
        self.phasor.phase()
    }

    #[inline]
    pub fn next_sample(&mut self, params: &Params, ctx: &RenderCtx) -> f32 {
        let value = self.waveform.sample(self.phasor.phase());
        self.phasor
            .advance(params.get(ParamId::Frequency), ctx.sample_rate);
        value * params.get(ParamId::Gain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::kind::NodeType;

    #[test]
    fn sine_matches_closed_form() {
        let ctx = RenderCtx::new(48_000.0);
        let mut params = Params::defaults(NodeType::Oscillator);
        params.set(ParamId::Frequency, 1_000.0);
        let mut osc = Oscillator::new(Waveform::Sine);
        for n in 0..480 {
            let expected = (std::f32::consts::TAU * 1_000.0 * n as f32 / 48_000.0).sin();
            let got = osc.next_sample(&params, &ctx);
            assert!((got - expected).abs() < 1e-3, "sample {n}: {got} vs {expected}");
        }
    }

    #[test]
    fn gain_scales_output() {
        let ctx = RenderCtx::new(48_000.0);
        let mut params = Params::defaults(NodeType::Oscillator);
        params.set(ParamId::Gain, 0.25);
        let mut osc = Oscillator::new(Waveform::Square);
        assert_eq!(osc.next_sample(&params, &ctx), 0.25);
    }
}
