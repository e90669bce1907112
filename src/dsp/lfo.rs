//! Control-rate oscillator shapes and polarity helpers.

use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{dsp::oscillator::Waveform, error::Error};

/*
Low Frequency Oscillators
=========================

Same phase math as the audio oscillators, run at 0.01 to 50 Hz and read as a
control signal rather than listened to.

  bipolar         Swings -1..+1. Moves a parameter above and below its base.

  unipolar        Swings 0..1. Only ever pushes a parameter one way.
                  unipolar = (bipolar + 1) / 2

  sample & hold   A random value held for one full LFO period, i.e. for
                  sample_rate / frequency samples, then replaced when the
                  phase wraps.

    bipolar   unipolar
    -1.0      0.0
     0.0      0.5
    +1.0      1.0

A modulation route with `bipolar = false` runs its source through
`bipolar_to_unipolar` before scaling, so an LFO at rest (0.0) still pushes
the target half of its range.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoShape {
    #[default]
    Sine,
    Triangle,
    Square,
    Sawtooth,
    #[cfg_attr(feature = "serde", serde(rename = "random"))]
    SampleAndHold,
}

impl LfoShape {
    /// The periodic waveform behind this shape, `None` for sample-and-hold.
    pub fn waveform(self) -> Option<Waveform> {
        match self {
            LfoShape::Sine => Some(Waveform::Sine),
            LfoShape::Triangle => Some(Waveform::Triangle),
            LfoShape::Square => Some(Waveform::Square),
            LfoShape::Sawtooth => Some(Waveform::Sawtooth),
            LfoShape::SampleAndHold => None,
        }
    }
}

impl FromStr for LfoShape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" | "sampleandhold" | "s&h" | "sh" => Ok(LfoShape::SampleAndHold),
            other => other
                .parse::<Waveform>()
                .map(|waveform| match waveform {
                    Waveform::Sine => LfoShape::Sine,
                    Waveform::Triangle => LfoShape::Triangle,
                    Waveform::Square => LfoShape::Square,
                    Waveform::Sawtooth => LfoShape::Sawtooth,
                })
                .map_err(|_| Error::InvalidValue {
                    key: "waveform",
                    value: other.to_owned(),
                }),
        }
    }
}

/// -1..+1 to 0..1.
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}
