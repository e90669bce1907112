use crate::{
    dsp::pan::distance_gain,
    graph::params::{ParamId, Params},
};

/// Places a mono signal in 3-D space around a listener at the origin.
///
/// Loudness follows the inverse-distance law from `dsp::pan`. Stereo
/// position is the x direction cosine, `x / max(distance, refDistance)`,
/// which the mixer turns into equal-power gains.
#[derive(Debug, Clone, Default)]
pub struct SpatialPanner {
    pan: f32,
    attenuation: f32,
}

impl SpatialPanner {
    pub fn new() -> Self {
        Self {
            pan: 0.0,
            attenuation: 1.0,
        }
    }

    pub fn pan(&self) -> f32 {
        self.pan
    }

    pub fn attenuation(&self) -> f32 {
        self.attenuation
    }

    #[inline]
    pub fn next_sample(&mut self, params: &Params, input: f32) -> f32 {
        let x = params.get(ParamId::X);
        let y = params.get(ParamId::Y);
        let z = params.get(ParamId::Z);
        let ref_distance = params.get(ParamId::RefDistance);
        let distance = (x * x + y * y + z * z).sqrt();

        self.attenuation = distance_gain(distance, ref_distance, params.get(ParamId::Rolloff));
        self.pan = (x / distance.max(ref_distance).max(f32::EPSILON)).clamp(-1.0, 1.0);
        input * self.attenuation * params.get(ParamId::Gain)
    }
}
