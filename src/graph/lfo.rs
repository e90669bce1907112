use rand::rngs::SmallRng;

use crate::{
    dsp::{lfo::LfoShape, noise::white, oscillator::Phasor},
    graph::{
        node::RenderCtx,
        params::{ParamId, Params},
    },
};

/// Control-rate oscillator. Output is `shape(phase) · depth`, in `[-depth, depth]`.
///
/// See `dsp/lfo.rs` for the shapes and the sample-and-hold timing.
#[derive(Debug, Clone)]
pub struct Lfo {
    phasor: Phasor,
    shape: LfoShape,
    held: f32,
    rng: SmallRng,
}

impl Lfo {
    pub fn new(shape: LfoShape, mut rng: SmallRng) -> Self {
        let held = white(&mut rng);
        Self {
            phasor: Phasor::new(),
            shape,
            held,
            rng,
        }
    }

    pub fn set_shape(&mut self, shape: LfoShape) {
        self.shape = shape;
    }

    #[inline]
    pub fn next_sample(&mut self, params: &Params, ctx: &RenderCtx) -> f32 {
        let value = match self.shape.waveform() {
            Some(waveform) => waveform.sample(self.phasor.phase()),
            None => self.held,
        };
        let wrapped = self
            .phasor
            .advance(params.get(ParamId::Frequency), ctx.sample_rate);
        if wrapped && self.shape == LfoShape::SampleAndHold {
            self.held = white(&mut self.rng);
        }
        value * params.get(ParamId::Depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::kind::NodeType;
    use rand::SeedableRng;

    fn params(frequency: f32, depth: f32) -> Params {
        let mut params = Params::defaults(NodeType::Lfo);
        params.set(ParamId::Frequency, frequency);
        params.set(ParamId::Depth, depth);
        params
    }

    #[test]
    fn output_is_bounded_by_depth() {
        let ctx = RenderCtx::new(1_000.0);
        let p = params(3.0, 0.4);
        for shape in [LfoShape::Sine, LfoShape::Triangle, LfoShape::Square, LfoShape::Sawtooth] {
            let mut lfo = Lfo::new(shape, SmallRng::seed_from_u64(1));
            for _ in 0..2_000 {
                let v = lfo.next_sample(&p, &ctx);
                assert!(v.abs() <= 0.4 + 1e-6, "{shape:?} escaped depth: {v}");
            }
        }
    }

    #[test]
    fn sample_and_hold_changes_once_per_period() {
        let ctx = RenderCtx::new(1_000.0);
        let p = params(10.0, 1.0);
        let mut lfo = Lfo::new(LfoShape::SampleAndHold, SmallRng::seed_from_u64(9));
        let values: Vec<f32> = (0..1_000).map(|_| lfo.next_sample(&p, &ctx)).collect();
        let changes = values.windows(2).filter(|w| w[0] != w[1]).count();
        assert!(
            (9..=10).contains(&changes),
            "10 Hz S&H over one second should step ~10 times, got {changes}"
        );
        // Each held value lasts sample_rate / frequency = 100 samples.
        assert!(values[..99].iter().all(|&v| v == values[0]));
    }
}
