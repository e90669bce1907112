use std::{
    f32::consts::{FRAC_PI_2, TAU},
    str::FromStr,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/*
RBJ Biquad
==========

Second-order IIR section with coefficients from the Audio EQ Cookbook.

    y[n] = b0·x[n] + b1·x[n-1] + b2·x[n-2] - a1·y[n-1] - a2·y[n-2]

Computed in transposed direct form II, which needs two state words and
behaves well with coefficients that change while audio is running.

| type      | passes          | rejects         | b0         | b1          | b2         |
| --------- | --------------- | --------------- | ---------- | ----------- | ---------- |
| low-pass  | below cutoff    | above cutoff    | (1-cos)/2  | 1-cos       | (1-cos)/2  |
| high-pass | above cutoff    | below cutoff    | (1+cos)/2  | -(1+cos)    | (1+cos)/2  |
| band-pass | around cutoff   | both sides      | alpha      | 0           | -alpha     |
| notch     | both sides      | around cutoff   | 1          | -2cos       | 1          |

with w0 = 2π·f/sr, cos = cos(w0), alpha = sin(w0) / (2Q), and the shared
denominator a0 = 1+alpha, a1 = -2cos, a2 = 1-alpha. Everything is divided by
a0 once at design time.

The band-pass variant is the constant 0 dB peak gain form.

Three more types boost or cut by `gain_db` instead of removing anything.
With A = 10^(gain_db / 40):

  peak        Bell around the cutoff. b = (1+alpha·A, -2cos, 1-alpha·A),
              a = (1+alpha/A, -2cos, 1-alpha/A).

  low shelf   Everything below the cutoff moves by gain_db.

  high shelf  Everything above the cutoff moves by gain_db.

The shelves take Q as the cookbook's shelf Q, so 0.707 gives the usual
monotonic slope. At 0 dB all three collapse to a pass-through.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    LowPass,
    HighPass,
    BandPass,
    Notch,
    Peak,
    LowShelf,
    HighShelf,
}

impl FromStr for FilterType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lowpass" | "lp" => Ok(FilterType::LowPass),
            "highpass" | "hp" => Ok(FilterType::HighPass),
            "bandpass" | "bp" => Ok(FilterType::BandPass),
            "notch" => Ok(FilterType::Notch),
            "peak" | "peaking" | "bell" => Ok(FilterType::Peak),
            "lowshelf" => Ok(FilterType::LowShelf),
            "highshelf" => Ok(FilterType::HighShelf),
            other => Err(Error::InvalidValue {
                key: "filterType",
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Pass-through section.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    pub fn design(filter_type: FilterType, frequency: f32, q: f32, sample_rate: f32) -> Self {
        Self::design_with_gain(filter_type, frequency, q, 0.0, sample_rate)
    }

    /// As [`design`](Self::design), with the boost or cut used by the peak
    /// and shelf types. The other types ignore `gain_db`.
    pub fn design_with_gain(filter_type: FilterType, frequency: f32, q: f32, gain_db: f32, sample_rate: f32) -> Self {
        let frequency = frequency.clamp(1.0, (sample_rate * 0.49).max(1.0));
        let q = q.max(0.01);
        let w0 = TAU * frequency / sample_rate;
        let (sin, cos) = w0.sin_cos();
        let alpha = sin / (2.0 * q);
        let a = 10f32.powf(gain_db / 40.0);
        let shelf = 2.0 * a.sqrt() * alpha;

        let (b0, b1, b2, a0, a1, a2) = match filter_type {
            FilterType::LowPass => (
                (1.0 - cos) / 2.0,
                1.0 - cos,
                (1.0 - cos) / 2.0,
                1.0 + alpha,
                -2.0 * cos,
                1.0 - alpha,
            ),
            FilterType::HighPass => (
                (1.0 + cos) / 2.0,
                -(1.0 + cos),
                (1.0 + cos) / 2.0,
                1.0 + alpha,
                -2.0 * cos,
                1.0 - alpha,
            ),
            FilterType::BandPass => (alpha, 0.0, -alpha, 1.0 + alpha, -2.0 * cos, 1.0 - alpha),
            FilterType::Notch => (1.0, -2.0 * cos, 1.0, 1.0 + alpha, -2.0 * cos, 1.0 - alpha),
            FilterType::Peak => (
                1.0 + alpha * a,
                -2.0 * cos,
                1.0 - alpha * a,
                1.0 + alpha / a,
                -2.0 * cos,
                1.0 - alpha / a,
            ),
            FilterType::LowShelf => (
                a * ((a + 1.0) - (a - 1.0) * cos + shelf),
                2.0 * a * ((a - 1.0) - (a + 1.0) * cos),
                a * ((a + 1.0) - (a - 1.0) * cos - shelf),
                (a + 1.0) + (a - 1.0) * cos + shelf,
                -2.0 * ((a - 1.0) + (a + 1.0) * cos),
                (a + 1.0) + (a - 1.0) * cos - shelf,
            ),
            FilterType::HighShelf => (
                a * ((a + 1.0) + (a - 1.0) * cos + shelf),
                -2.0 * a * ((a - 1.0) + (a + 1.0) * cos),
                a * ((a + 1.0) + (a - 1.0) * cos - shelf),
                (a + 1.0) - (a - 1.0) * cos + shelf,
                2.0 * ((a - 1.0) - (a + 1.0) * cos),
                (a + 1.0) - (a - 1.0) * cos - shelf,
            ),
        };

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Biquad {
    coeffs: BiquadCoefficients,
    s1: f32,
    s2: f32,
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new(BiquadCoefficients::IDENTITY)
    }
}

impl Biquad {
    pub fn new(coeffs: BiquadCoefficients) -> Self {
        Self {
            coeffs,
            s1: 0.0,
            s2: 0.0,
        }
    }

    /// Swap coefficients without touching the state, so a sweep stays click free.
    pub fn set_coefficients(&mut self, coeffs: BiquadCoefficients) {
        self.coeffs = coeffs;
    }

    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coeffs
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let c = &self.coeffs;
        let y = c.b0 * x + self.s1;
        self.s1 = c.b1 * x - c.a1 * y + self.s2;
        self.s2 = c.b2 * x - c.a2 * y;
        y
    }

    pub fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }
}

/// One-pole lowpass: `y += (1 - b1)·(x - y)` with `b1 = exp(-2π·f/sr)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnePole {
    b1: f32,
    z1: f32,
}

impl OnePole {
    pub fn new(cutoff: f32, sample_rate: f32) -> Self {
        let mut pole = Self::default();
        pole.set_cutoff(cutoff, sample_rate);
        pole
    }

    pub fn set_cutoff(&mut self, cutoff: f32, sample_rate: f32) {
        self.b1 = (-TAU * cutoff / sample_rate).exp();
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        self.z1 = x * (1.0 - self.b1) + self.z1 * self.b1;
        self.z1
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
    }
}

/// Gain-normalised DC blocker. Never exceeds unity gain at any frequency,
/// which keeps it safe inside feedback loops.
#[derive(Debug, Clone, Copy)]
pub struct DcBlocker {
    r: f32,
    x1: f32,
    y1: f32,
}

impl DcBlocker {
    /// Pole at `exp(-2π·cutoff/sr)`: `cutoff` is roughly the -3 dB corner.
    pub fn with_cutoff(cutoff: f32, sample_rate: f32) -> Self {
        Self {
            r: (-TAU * cutoff / sample_rate).exp(),
            x1: 0.0,
            y1: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let y = 0.5 * (1.0 + self.r) * (x - self.x1) + self.r * self.y1;
        self.x1 = x;
        self.y1 = y;
        y
    }

    /// Phase delay in samples at `w` radians per sample. Always negative:
    /// the blocker leads everything it passes.
    pub fn phase_delay(&self, w: f32) -> f32 {
        let (sin, cos) = w.sin_cos();
        ((self.r * sin).atan2(1.0 - self.r * cos) - (FRAC_PI_2 - 0.5 * w)) / w
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48_000.0;

    fn steady_peak(filter: &mut Biquad, freq: f32) -> f32 {
        let mut peak = 0.0f32;
        for n in 0..(SR as usize / 2) {
            let x = (TAU * freq * n as f32 / SR).sin();
            let y = filter.process(x);
            if n > SR as usize / 4 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn lowpass_passes_low_and_cuts_high() {
        let coeffs = BiquadCoefficients::design(FilterType::LowPass, 1_000.0, 0.707, SR);
        let low = steady_peak(&mut Biquad::new(coeffs), 100.0);
        let high = steady_peak(&mut Biquad::new(coeffs), 10_000.0);
        assert!(low > 0.95, "100 Hz should pass, got {low}");
        assert!(high < 0.05, "10 kHz should be cut, got {high}");
    }

    #[test]
    fn highpass_passes_high_and_cuts_low() {
        let coeffs = BiquadCoefficients::design(FilterType::HighPass, 1_000.0, 0.707, SR);
        assert!(steady_peak(&mut Biquad::new(coeffs), 10_000.0) > 0.95);
        assert!(steady_peak(&mut Biquad::new(coeffs), 100.0) < 0.05);
    }

    #[test]
    fn bandpass_peaks_at_centre() {
        let coeffs = BiquadCoefficients::design(FilterType::BandPass, 1_000.0, 2.0, SR);
        let centre = steady_peak(&mut Biquad::new(coeffs), 1_000.0);
        let off = steady_peak(&mut Biquad::new(coeffs), 8_000.0);
        assert!((centre - 1.0).abs() < 0.05, "0 dB at centre, got {centre}");
        assert!(off < 0.3, "far off-centre should be attenuated, got {off}");
    }

    #[test]
    fn notch_removes_centre() {
        let coeffs = BiquadCoefficients::design(FilterType::Notch, 1_000.0, 2.0, SR);
        assert!(steady_peak(&mut Biquad::new(coeffs), 1_000.0) < 0.05);
        assert!(steady_peak(&mut Biquad::new(coeffs), 100.0) > 0.9);
    }

    #[test]
    fn dc_blocker_removes_offset() {
        let mut dc = DcBlocker::with_cutoff(5.0, SR);
        let mut last = 1.0;
        for _ in 0..48_000 {
            last = dc.process(1.0);
        }
        assert!(last.abs() < 1e-3, "DC should decay away, got {last}");
    }

    #[test]
    fn dc_blocker_lead_matches_a_measured_sine() {
        // Phase of a steady 50 Hz sine through the blocker, by correlation
        // against sin and cos of the input.
        let freq = 50.0;
        let w = TAU * freq / SR;
        let mut dc = DcBlocker::with_cutoff(20.0, SR);
        let (mut re, mut im) = (0.0f64, 0.0f64);
        for n in 0..SR as usize * 2 {
            let phase = w * n as f32;
            let y = dc.process(phase.sin());
            if n >= SR as usize {
                re += (y * phase.sin()) as f64;
                im += (y * phase.cos()) as f64;
            }
        }
        let measured = -(im.atan2(re) as f32) / w;
        let predicted = dc.phase_delay(w);
        assert!(predicted < 0.0);
        assert!((measured - predicted).abs() < 0.5, "measured {measured}, predicted {predicted}");
    }

    #[test]
    fn peak_and_shelves_move_their_band_by_gain() {
        let db = |peak: f32| 20.0 * peak.log10();
        let boost = |filter_type| Biquad::new(BiquadCoefficients::design_with_gain(filter_type, 1_000.0, 0.707, 6.0, SR));

        let centre = db(steady_peak(&mut boost(FilterType::Peak), 1_000.0));
        let far = db(steady_peak(&mut boost(FilterType::Peak), 100.0));
        assert!((centre - 6.0).abs() < 0.3, "peak centre {centre} dB");
        assert!(far.abs() < 0.5, "peak leaves 100 Hz alone, got {far} dB");

        let low = db(steady_peak(&mut boost(FilterType::LowShelf), 50.0));
        let high = db(steady_peak(&mut boost(FilterType::LowShelf), 10_000.0));
        assert!((low - 6.0).abs() < 0.3 && high.abs() < 0.3, "low shelf {low} / {high} dB");

        let low = db(steady_peak(&mut boost(FilterType::HighShelf), 50.0));
        let high = db(steady_peak(&mut boost(FilterType::HighShelf), 10_000.0));
        assert!(low.abs() < 0.3 && (high - 6.0).abs() < 0.3, "high shelf {low} / {high} dB");

        let flat = BiquadCoefficients::design_with_gain(FilterType::Peak, 1_000.0, 0.707, 0.0, SR);
        assert!((flat.b0 - 1.0).abs() < 1e-6 && (flat.b1 - flat.a1).abs() < 1e-6);
    }

    #[test]
    fn one_pole_converges_to_input() {
        let mut pole = OnePole::new(100.0, SR);
        let mut y = 0.0;
        for _ in 0..4_800 {
            y = pole.process(1.0);
        }
        assert!((y - 1.0).abs() < 1e-3);
    }
}
