use crate::MIN_TIME;

/*
Linear ADSR
===========

  level       Current output, 0.0 to 1.0.

  stage       Idle, Attack, Decay, Sustain or Release.

  trigger     Restarts the envelope from zero in Attack, from any stage.

  gate off    Moves Attack, Decay or Sustain into Release. The current level
              is captured as the release start, so releasing half-way up an
              attack ramps down from there instead of jumping.

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
          A    D      S        R

Each stage counts elapsed samples and interpolates linearly between its start
and end level. Stage durations are read every sample, so a modulated attack
or decay time bends the current ramp rather than waiting for the next note.

    Idle ──trigger──→ Attack ──elapsed ≥ A──→ Decay ──elapsed ≥ D──→ Sustain
                        │                       │                      │
                        └──────────gate off─────┴──────────────────────┘
                                                │
                                                ↓
    Idle ←──────────────elapsed ≥ R──────── Release
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeShape {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for EnvelopeShape {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Envelope {
    stage: EnvelopeStage,
    level: f32,
    elapsed: u32, // samples spent in the current stage
    release_start: f32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            stage: EnvelopeStage::Idle,
            level: 0.0,
            elapsed: 0,
            release_start: 0.0,
        }
    }

    pub fn trigger(&mut self) {
        self.level = 0.0;
        self.elapsed = 0;
        self.stage = EnvelopeStage::Attack;
    }

    pub fn gate_off(&mut self) {
        if matches!(self.stage, EnvelopeStage::Idle | EnvelopeStage::Release) {
            return;
        }
        self.release_start = self.level;
        self.elapsed = 0;
        self.stage = EnvelopeStage::Release;
    }

    /// Advance one sample and return the new level.
    pub fn next_sample(&mut self, shape: &EnvelopeShape, sample_rate: f32) -> f32 {
        let samples = |seconds: f32| (seconds.max(MIN_TIME) * sample_rate).max(1.0);
        let sustain = shape.sustain.clamp(0.0, 1.0);

        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }
            EnvelopeStage::Attack => {
                self.elapsed += 1;
                let total = samples(shape.attack);
                self.level = (self.elapsed as f32 / total).min(1.0);
                if self.elapsed as f32 >= total {
                    self.enter(EnvelopeStage::Decay);
                }
            }
            EnvelopeStage::Decay => {
                self.elapsed += 1;
                let total = samples(shape.decay);
                let t = (self.elapsed as f32 / total).min(1.0);
                self.level = 1.0 + (sustain - 1.0) * t;
                if t >= 1.0 {
                    self.enter(EnvelopeStage::Sustain);
                }
            }
            EnvelopeStage::Sustain => {
                self.level = sustain;
            }
            EnvelopeStage::Release => {
                self.elapsed += 1;
                let total = samples(shape.release);
                let t = (self.elapsed as f32 / total).min(1.0);
                self.level = self.release_start * (1.0 - t);
                if t >= 1.0 {
                    self.level = 0.0;
                    self.enter(EnvelopeStage::Idle);
                }
            }
        }
        self.level
    }

    fn enter(&mut self, stage: EnvelopeStage) {
        self.stage = stage;
        self.elapsed = 0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }
}
