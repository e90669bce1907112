use std::{f32::consts::TAU, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/*
Phase Accumulation
==================

Every periodic generator in the graph (oscillators, LFOs, the step gates)
is driven by the same thing: a phase that walks from 0.0 to 1.0 and wraps.

  phase       Position inside one cycle, in [0, 1).

  increment   frequency / sample_rate. At 440 Hz and 48 kHz the phase moves
              0.009167 per sample, so one cycle takes ~109 samples.

  wrap        When phase passes 1.0 we subtract 1.0. The wrap is reported to
              the caller so sample-and-hold and step logic can react to it.

Waveforms are pure functions of phase:

    sine      sin(2π·phase)
    square    +1 for the first half of the cycle, -1 for the second
    sawtooth  2·phase - 1, a rising ramp
    triangle  starts at 0, peaks at +1 a quarter in, bottoms at -1 at 3/4

All of them start at (or pass through) a known value at phase 0, which makes
output deterministic for a freshly created node.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    #[cfg_attr(feature = "serde", serde(alias = "saw"))]
    Sawtooth,
    Triangle,
}

impl Waveform {
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => {
                let shifted = (phase + 0.25).fract();
                1.0 - 4.0 * (shifted - 0.5).abs()
            }
        }
    }
}

impl FromStr for Waveform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sine" => Ok(Waveform::Sine),
            "square" => Ok(Waveform::Square),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            "triangle" => Ok(Waveform::Triangle),
            other => Err(Error::InvalidValue {
                key: "waveform",
                value: other.to_owned(),
            }),
        }
    }
}

/// Phase accumulator in [0, 1).
#[derive(Debug, Clone, Copy, Default)]
pub struct Phasor {
    phase: f32,
}

impl Phasor {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Advance by one sample. Returns true when the cycle wrapped.
    #[inline]
    pub fn advance(&mut self, frequency: f32, sample_rate: f32) -> bool {
        self.phase += frequency / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
            true
        } else if self.phase < 0.0 {
            self.phase -= self.phase.floor();
            false
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waveforms_hit_known_points() {
        assert!(Waveform::Sine.sample(0.0).abs() < 1e-6);
        assert!((Waveform::Sine.sample(0.25) - 1.0).abs() < 1e-6);
        assert_eq!(Waveform::Square.sample(0.1), 1.0);
        assert_eq!(Waveform::Square.sample(0.6), -1.0);
        assert!((Waveform::Sawtooth.sample(0.0) + 1.0).abs() < 1e-6);
        assert!(Waveform::Triangle.sample(0.0).abs() < 1e-6);
        assert!((Waveform::Triangle.sample(0.25) - 1.0).abs() < 1e-6);
        assert!((Waveform::Triangle.sample(0.75) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn phasor_reports_wrap_once_per_cycle() {
        let mut phasor = Phasor::new();
        let wraps = (0..48_000).filter(|_| phasor.advance(10.0, 48_000.0)).count();
        assert!(
            (9..=10).contains(&wraps),
            "10 Hz for one second should wrap ~10 times, got {wraps}"
        );
        assert!(phasor.phase() >= 0.0 && phasor.phase() < 1.0);
    }

    #[test]
    fn waveform_parses_aliases() {
        assert_eq!("saw".parse::<Waveform>().unwrap(), Waveform::Sawtooth);
        assert!("wobble".parse::<Waveform>().is_err());
    }
}
