use crate::{
    dsp::filter::{Biquad, BiquadCoefficients, FilterType},
    graph::{
        node::RenderCtx,
        params::{ParamId, Params},
    },
};

/// Biquad effect. Coefficients are redesigned only when the effective
/// `(cutoff, resonance, gainDb, mode)` differs from the last design.
#[derive(Debug, Clone)]
pub struct FilterNode {
    biquad: Biquad,
    mode: FilterType,
    designed: Option<(f32, f32, f32, FilterType)>,
}

impl FilterNode {
    pub fn new(mode: FilterType) -> Self {
        Self {
            biquad: Biquad::default(),
            mode,
            designed: None,
        }
    }

    pub fn set_mode(&mut self, mode: FilterType) {
        self.mode = mode;
    }

    pub fn coefficients(&self) -> &BiquadCoefficients {
        self.biquad.coefficients()
    }

    #[inline]
    pub fn next_sample(&mut self, params: &Params, input: f32, ctx: &RenderCtx) -> f32 {
        let cutoff = params.get(ParamId::Cutoff);
        let q = params.get(ParamId::Resonance);
        let gain_db = params.get(ParamId::GainDb);
        let key = Some((cutoff, q, gain_db, self.mode));
        if self.designed != key {
            self.designed = key;
            self.biquad.set_coefficients(BiquadCoefficients::design_with_gain(
                self.mode,
                cutoff,
                q,
                gain_db,
                ctx.sample_rate,
            ));
        }
        self.biquad.process(input) * params.get(ParamId::Gain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::kind::NodeType;

    #[test]
    fn redesigns_only_on_change() {
        let ctx = RenderCtx::new(48_000.0);
        let mut params = Params::defaults(NodeType::Filter);
        let mut filter = FilterNode::new(FilterType::LowPass);
        filter.next_sample(&params, 0.0, &ctx);
        let first = *filter.coefficients();
        filter.next_sample(&params, 0.0, &ctx);
        assert_eq!(first, *filter.coefficients());

        params.set(ParamId::Cutoff, 4_000.0);
        filter.next_sample(&params, 0.0, &ctx);
        assert_ne!(first, *filter.coefficients());

        filter.set_mode(FilterType::HighPass);
        let lowpass = *filter.coefficients();
        filter.next_sample(&params, 0.0, &ctx);
        assert_ne!(lowpass, *filter.coefficients());
    }

    #[test]
    fn shelf_follows_gain_db() {
        let ctx = RenderCtx::new(48_000.0);
        let mut params = Params::defaults(NodeType::Filter);
        params.set(ParamId::Cutoff, 200.0);
        let mut filter = FilterNode::new(FilterType::LowShelf);

        // A flat shelf passes DC untouched
        let mut out = 0.0;
        for _ in 0..4_800 {
            out = filter.next_sample(&params, 1.0, &ctx);
        }
        assert!((out - 1.0).abs() < 1e-3, "0 dB shelf gave {out}");

        params.set(ParamId::GainDb, -12.0);
        for _ in 0..4_800 {
            out = filter.next_sample(&params, 1.0, &ctx);
        }
        let expected = 10f32.powf(-12.0 / 20.0);
        assert!((out - expected).abs() < 1e-2, "expected {expected}, got {out}");
    }
}
