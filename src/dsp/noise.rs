use std::f32::consts::TAU;

use rand::{rngs::SmallRng, Rng};

/*
Summed-Sine Noise
=================

A smooth random-looking control signal built from a handful of sines whose
frequencies sit at slightly stretched octaves of a base rate. Because the
ratios are irrational-ish the sum takes a very long time to repeat.

  octaves     1 to 5. High smoothness keeps only the lowest octaves, low
              smoothness adds the faster ones on top.

  weight      Octave i contributes 0.5^i. The sum is divided by the total
              weight so the result stays in [-1, 1].

  smoothing   The raw sum is run through a one-pole lowpass whose cutoff is
              1 + 200·(1 - smoothness) Hz, so a smooth setting glides and a
              rough setting follows the sum closely.
*/

pub const MAX_OCTAVES: usize = 5;

const OCTAVE_RATIOS: [f32; MAX_OCTAVES] = [1.0, 2.137, 4.271, 8.513, 17.06];

#[derive(Debug, Clone)]
pub struct SummedSineNoise {
    phases: [f32; MAX_OCTAVES],
    smoothed: f32,
}

impl SummedSineNoise {
    pub fn new(rng: &mut SmallRng) -> Self {
        let mut phases = [0.0; MAX_OCTAVES];
        for phase in phases.iter_mut() {
            *phase = rng.gen_range(0.0..1.0);
        }
        Self {
            phases,
            smoothed: 0.0,
        }
    }

    pub fn octaves(smoothness: f32) -> usize {
        let octaves = (MAX_OCTAVES as f32 - smoothness.clamp(0.0, 1.0) * 4.0).round();
        (octaves as usize).clamp(1, MAX_OCTAVES)
    }

    /// Next bipolar sample in [-1, 1].
    pub fn next_sample(&mut self, rate: f32, smoothness: f32, sample_rate: f32) -> f32 {
        let octaves = Self::octaves(smoothness);
        let mut sum = 0.0;
        let mut total = 0.0;
        let mut weight = 1.0;

        for (phase, ratio) in self.phases.iter_mut().zip(OCTAVE_RATIOS).take(octaves) {
            sum += weight * (TAU * *phase).sin();
            total += weight;
            *phase = (*phase + rate * ratio / sample_rate).fract();
            weight *= 0.5;
        }

        let raw = sum / total;
        let cutoff = 1.0 + (1.0 - smoothness.clamp(0.0, 1.0)) * 200.0;
        let alpha = 1.0 - (-TAU * cutoff / sample_rate).exp();
        self.smoothed += alpha * (raw - self.smoothed);
        self.smoothed
    }
}

/// Uniform bipolar white noise sample.
#[inline]
pub fn white(rng: &mut SmallRng) -> f32 {
    rng.gen_range(-1.0..1.0)
}
