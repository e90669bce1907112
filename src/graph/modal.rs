use std::str::FromStr;

use rand::rngs::SmallRng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        filter::{Biquad, BiquadCoefficients, FilterType},
        noise::white,
    },
    error::Error,
    graph::{
        node::RenderCtx,
        params::{ParamId, Params},
    },
};

/*
Modal Resonator
===============

A struck object rings at a handful of resonant frequencies ("modes"), each
decaying on its own. We model each mode with a bandpass biquad and excite
the whole bank with a short burst of noise.

  ratio       Mode frequency relative to the fundamental. Strings and wood
              sit near integers; bars, glass and bells do not.

  Q           How narrow each resonance is, and therefore how long it rings.

  amplitude   Mode i is weighted 0.7^i, tilted further down toward the top
              modes as `brightness` falls.

| material | ratios                          | Q   |
| -------- | ------------------------------- | --- |
| wood     | near-integer 1, 2, 3, 4.02 ...  | 8   |
| glass    | spread 1, 2.32, 4.25, 6.63 ...  | 60  |
| metal    | clustered 1, 1.11, 1.37 ...     | 25  |

Coefficients are designed once per (material, frequency) and cached; the
per-sample path only runs the eight filters.
*/

pub const MODE_COUNT: usize = 8;

const EXCITATION_SECONDS: f32 = 0.005;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Material {
    #[default]
    Wood,
    Glass,
    Metal,
}

impl Material {
    pub fn ratios(self) -> [f32; MODE_COUNT] {
        match self {
            Material::Wood => [1.0, 2.0, 3.0, 4.02, 5.0, 6.01, 7.0, 8.02],
            Material::Glass => [1.0, 2.32, 4.25, 6.63, 9.38, 12.07, 15.12, 18.4],
            Material::Metal => [1.0, 1.11, 1.37, 1.58, 2.31, 2.47, 3.19, 3.42],
        }
    }

    pub fn q(self) -> f32 {
        match self {
            Material::Wood => 8.0,
            Material::Glass => 60.0,
            Material::Metal => 25.0,
        }
    }
}

impl FromStr for Material {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wood" => Ok(Material::Wood),
            "glass" => Ok(Material::Glass),
            "metal" => Ok(Material::Metal),
            other => Err(Error::InvalidValue {
                key: "material",
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModalResonator {
    material: Material,
    modes: [Biquad; MODE_COUNT],
    frequencies: [f32; MODE_COUNT],
    cache_key: Option<(Material, f32)>,
    excitation: f32,
    excitation_decay: f32,
    rng: SmallRng,
}

impl ModalResonator {
    pub fn new(material: Material, sample_rate: f32, rng: SmallRng) -> Self {
        Self {
            material,
            modes: [Biquad::default(); MODE_COUNT],
            frequencies: [0.0; MODE_COUNT],
            cache_key: None,
            excitation: 0.0,
            excitation_decay: (-1.0 / (EXCITATION_SECONDS * sample_rate)).exp(),
            rng,
        }
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    pub fn trigger(&mut self) {
        self.excitation = 1.0;
    }

    /// Centre frequencies of the current bank.
    pub fn mode_frequencies(&self) -> [f32; MODE_COUNT] {
        self.frequencies
    }

    fn retune(&mut self, frequency: f32, sample_rate: f32) {
        let key = Some((self.material, frequency));
        if self.cache_key == key {
            return;
        }
        self.cache_key = key;

        let q = self.material.q();
        for ((mode, centre), ratio) in self
            .modes
            .iter_mut()
            .zip(self.frequencies.iter_mut())
            .zip(self.material.ratios())
        {
            *centre = frequency * ratio;
            mode.set_coefficients(BiquadCoefficients::design(
                FilterType::BandPass,
                *centre,
                q,
                sample_rate,
            ));
        }
    }

    #[inline]
    pub fn next_sample(&mut self, params: &Params, ctx: &RenderCtx) -> f32 {
        self.retune(params.get(ParamId::Frequency), ctx.sample_rate);

        let input = if self.excitation > 1e-4 {
            let x = white(&mut self.rng) * self.excitation;
            self.excitation *= self.excitation_decay;
            x
        } else {
            0.0
        };

        let brightness = params.get(ParamId::Brightness).clamp(0.0, 1.0);
        let nyquist_guard = ctx.sample_rate * 0.45;
        let mut sum = 0.0;
        let mut weight = 1.0;
        for (i, (mode, &centre)) in self.modes.iter_mut().zip(&self.frequencies).enumerate() {
            let y = mode.process(input);
            if centre < nyquist_guard {
                let tilt = 1.0 - (1.0 - brightness) * i as f32 / (MODE_COUNT - 1) as f32;
                sum += y * weight * tilt;
            }
            weight *= 0.7;
        }

        sum * self.material.q().sqrt() * params.get(ParamId::Gain)
    }
}
