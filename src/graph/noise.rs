use rand::rngs::SmallRng;

use crate::{
    dsp::{lfo::bipolar_to_unipolar, noise::SummedSineNoise},
    graph::{
        node::RenderCtx,
        params::{ParamId, Params},
    },
};

#[derive(Debug, Clone)]
pub struct NoiseNode {
    noise: SummedSineNoise,
    unipolar: bool,
}

impl NoiseNode {
    pub fn new(unipolar: bool, mut rng: SmallRng) -> Self {
        Self {
            noise: SummedSineNoise::new(&mut rng),
            unipolar,
        }
    }

    pub fn set_unipolar(&mut self, unipolar: bool) {
        self.unipolar = unipolar;
    }

    #[inline]
    pub fn next_sample(&mut self, params: &Params, ctx: &RenderCtx) -> f32 {
        let raw = self.noise.next_sample(
            params.get(ParamId::Rate),
            params.get(ParamId::Smoothness),
            ctx.sample_rate,
        );
        let shaped = if self.unipolar {
            bipolar_to_unipolar(raw)
        } else {
            raw
        };
        shaped * params.get(ParamId::Depth)
    }
}
