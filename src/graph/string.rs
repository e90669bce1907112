use std::f32::consts::TAU;

use rand::rngs::SmallRng;

use crate::{
    dsp::{delay::DelayLine, filter::DcBlocker, noise::white},
    graph::{
        node::RenderCtx,
        params::{ParamId, Params},
    },
};

/*
Karplus-Strong Plucked String
=============================

A delay line one period long, fed back into itself through a lowpass. A
burst of noise goes in, the loop keeps re-filtering it, and what comes out
is a decaying pitched tone.

    excite ──→(+)──→ [ delay: sr/f ] ──┬──→ out
               ↑                        │
               └─ g ← dc ← ap ← lp ←────┘

  period      sr / frequency samples. The noise burst is round(period)
              samples long; the read tap is fractional and linearly
              interpolated so tuning is not quantised to whole samples.

  tap         period minus the phase delay of lp, ap and dc, each taken at
              the fundamental w = 2π·f/sr. The whole loop is then exactly
              one period long at f, whatever the damping and stiffness.
              Recomputed only when f, damping or stiffness change.

  lp          One-pole lowpass, coefficient c = 0.95 - 0.75·damping.
              Higher damping darkens the tone and shortens the upper
              partials. Phase delay atan2(a·sin w, 1 - a·cos w) / w with
              a = 1 - c.

  ap          First-order allpass (k + z⁻¹) / (1 + k·z⁻¹), k = -0.7·stiffness.
              Low partials see more delay than high ones, so after tuning
              the fundamental the upper partials land sharp like a stiff
              piano string. Bypassed at zero stiffness.

  dc          Gain-normalised DC blocker at 5 Hz so the loop cannot drift.
              It leads rather than delays, which lengthens the tap a little
              at the bottom of the range.

  g           Per-pass gain 10^(-3 / (frequency · decay)): the tone falls
              60 dB in `decay` seconds.

Every element in the loop has gain ≤ 1 and g < 1, so the loop can only
lose energy once the excitation stops.

Excitation comes from a triggered noise burst, or in effect mode from the
summed upstream signal scaled by `excitation`.
*/

pub const MIN_FREQUENCY: f32 = 20.0;
pub const MAX_FREQUENCY: f32 = 2_000.0;
const DC_CUTOFF: f32 = 5.0;

#[derive(Debug, Clone)]
pub struct PluckedString {
    line: DelayLine,
    lowpass: f32,
    ap_x1: f32,
    ap_y1: f32,
    dc: DcBlocker,
    /// (frequency, lowpass coefficient, allpass coefficient) the tap was computed for.
    tuned_for: Option<(f32, f32, f32)>,
    tap: f32,
    burst_pending: bool,
    burst_remaining: usize,
    rng: SmallRng,
}

impl PluckedString {
    /// Allocates a delay line long enough for the lowest note at
    /// `sample_rate`, plus the DC blocker's lead.
    pub fn new(sample_rate: f32, rng: SmallRng) -> Self {
        let capacity = (sample_rate / MIN_FREQUENCY * 1.25).ceil() as usize + 4;
        Self {
            line: DelayLine::with_capacity(capacity),
            lowpass: 0.0,
            ap_x1: 0.0,
            ap_y1: 0.0,
            dc: DcBlocker::with_cutoff(DC_CUTOFF, sample_rate),
            tuned_for: None,
            tap: 1.0,
            burst_pending: false,
            burst_remaining: 0,
            rng,
        }
    }

    /// Schedule a one-period noise burst.
    pub fn trigger(&mut self) {
        self.burst_pending = true;
    }

    pub fn reset(&mut self) {
        self.line.clear();
        self.lowpass = 0.0;
        self.ap_x1 = 0.0;
        self.ap_y1 = 0.0;
        self.dc.reset();
        self.burst_remaining = 0;
    }

    /// Read position that makes the whole loop one period long at `frequency`.
    fn retune(&mut self, frequency: f32, lowpass: f32, allpass: f32, sample_rate: f32) -> f32 {
        let key = Some((frequency, lowpass, allpass));
        if self.tuned_for != key {
            self.tuned_for = key;
            let w = TAU * frequency / sample_rate;
            let mut loop_delay = lowpass_phase_delay(lowpass, w) + self.dc.phase_delay(w);
            if allpass != 0.0 {
                loop_delay += allpass_phase_delay(allpass, w);
            }
            self.tap = (sample_rate / frequency - loop_delay).clamp(1.0, self.line.max_delay());
        }
        self.tap
    }

    #[inline]
    pub fn next_sample(&mut self, params: &Params, input: f32, ctx: &RenderCtx) -> f32 {
        let sr = ctx.sample_rate;
        let top = MAX_FREQUENCY.min(sr * 0.25).max(MIN_FREQUENCY);
        let frequency = params.get(ParamId::Frequency).clamp(MIN_FREQUENCY, top);
        let coeff = 0.95 - 0.75 * params.get(ParamId::Damping).clamp(0.0, 1.0);
        let allpass = -0.7 * params.get(ParamId::Stiffness).clamp(0.0, 1.0);
        let tap = self.retune(frequency, coeff, allpass, sr);

        if self.burst_pending {
            self.burst_pending = false;
            self.burst_remaining = (sr / frequency).round() as usize;
        }

        let mut excite = input * params.get(ParamId::Excitation);
        if self.burst_remaining > 0 {
            self.burst_remaining -= 1;
            excite += white(&mut self.rng);
        }

        let out = self.line.read(tap);

        self.lowpass += coeff * (out - self.lowpass);
        let mut looped = self.lowpass;

        if allpass != 0.0 {
            let y = allpass * looped + self.ap_x1 - allpass * self.ap_y1;
            self.ap_x1 = looped;
            self.ap_y1 = y;
            looped = y;
        }

        let decay = params.get(ParamId::Decay).max(0.01);
        let g = 10f32.powf(-3.0 / (frequency * decay)).min(0.9999);
        let looped = self.dc.process(looped) * g;

        self.line.write(looped + excite);

        if !out.is_finite() {
            self.reset();
            return 0.0;
        }
        out * params.get(ParamId::Gain)
    }
}

/// Phase delay in samples of `y += c·(x - y)` at `w` radians per sample.
fn lowpass_phase_delay(c: f32, w: f32) -> f32 {
    let a = 1.0 - c;
    (a * w.sin()).atan2(1.0 - a * w.cos()) / w
}

/// Phase delay in samples of `(k + z⁻¹) / (1 + k·z⁻¹)` at `w` radians per sample.
fn allpass_phase_delay(k: f32, w: f32) -> f32 {
    let (sin, cos) = w.sin_cos();
    (sin.atan2(k + cos) - (k * sin).atan2(1.0 + k * cos)) / w
}
