//! Fixed-size step patterns and the Euclidean bucket generator.

/*
Euclidean Rhythms (bucket form)
===============================

Spread `pulses` onsets as evenly as possible over `steps` slots.

    bucket = 0
    for each step:
        bucket += pulses
        if bucket >= steps:
            bucket -= steps
            emit pulse
        else:
            emit rest

Over a full cycle `pulses · steps` is poured in and `steps` is removed once
per pulse, so exactly `pulses` onsets come out. This is the Bresenham line
walk and produces the same necklaces as Bjorklund's recursive grouping, up
to a cyclic rotation.

    E(3, 8)   . . x . . x . x
    E(5, 8)   . x . x x . x x

Rotation shifts the pattern left by `rotation` steps after generation.
*/

pub const MAX_STEPS: usize = 64;

/// Boolean step pattern stored inline, so copying it never allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPattern {
    steps: [bool; MAX_STEPS],
    len: usize,
}

impl Default for StepPattern {
    fn default() -> Self {
        Self {
            steps: [false; MAX_STEPS],
            len: 1,
        }
    }
}

impl StepPattern {
    /// Build from a slice, truncated to [`MAX_STEPS`]. An empty slice gives one rest.
    pub fn from_slice(values: &[bool]) -> Self {
        let mut pattern = Self::default();
        let len = values.len().min(MAX_STEPS);
        pattern.steps[..len].copy_from_slice(&values[..len]);
        pattern.len = len.max(1);
        pattern
    }

    pub fn euclidean(steps: usize, pulses: usize, rotation: usize) -> Self {
        let steps = steps.clamp(1, MAX_STEPS);
        let pulses = pulses.min(steps);

        let mut raw = [false; MAX_STEPS];
        let mut bucket = 0;
        for slot in raw.iter_mut().take(steps) {
            bucket += pulses;
            if bucket >= steps {
                bucket -= steps;
                *slot = true;
            }
        }

        let mut pattern = Self {
            steps: [false; MAX_STEPS],
            len: steps,
        };
        for i in 0..steps {
            pattern.steps[i] = raw[(i + rotation) % steps];
        }
        pattern
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.pulse_count() == 0
    }

    #[inline]
    pub fn is_pulse(&self, step: usize) -> bool {
        step < self.len && self.steps[step]
    }

    pub fn pulse_count(&self) -> usize {
        self.as_slice().iter().filter(|&&on| on).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.steps[..self.len]
    }
}
