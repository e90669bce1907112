use crate::{
    dsp::euclid::StepPattern,
    graph::{
        node::RenderCtx,
        params::{ParamId, Params},
    },
};

/*
Step Gates
==========

Euclidean gates and step sequencers share one clock:

  phase       Cyclic position through the whole pattern, in [0, 1).
              Advances by (tempo / 60 / sample_rate) / steps per sample,
              so every step lasts one beat.

  step        floor(phase · steps).

  gate        Opens for GATE_SECONDS whenever the clock enters a step that
              holds a pulse. The open gate reads 1.0 as a modulation signal,
              0.0 otherwise.

Entering a pulse step reports `GateEvent::Opened`; the engine fans that out
as a trigger along the node's outgoing edges. When the gate timer runs out
it reports `GateEvent::Closed`, which releases downstream envelopes. If the
timer runs out on the very sample a new pulse step begins, the edge is
`GateEvent::Retriggered`: a release followed by a trigger.

The Euclidean variant keeps its pattern cached and only regenerates when
the rounded (steps, pulses, rotation) triple changes. The sequencer plays a
pattern supplied by the patch.
*/

pub const GATE_SECONDS: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    Opened,
    Closed,
    Retriggered,
}

impl GateEvent {
    pub fn opens(self) -> bool {
        matches!(self, GateEvent::Opened | GateEvent::Retriggered)
    }

    pub fn closes(self) -> bool {
        matches!(self, GateEvent::Closed | GateEvent::Retriggered)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternSource {
    Euclidean { key: Option<(usize, usize, usize)> },
    Fixed,
}

#[derive(Debug, Clone)]
pub struct StepGate {
    source: PatternSource,
    pattern: StepPattern,
    phase: f64,
    current_step: Option<usize>,
    gate_remaining: u32,
}

impl StepGate {
    pub fn euclidean() -> Self {
        Self {
            source: PatternSource::Euclidean { key: None },
            pattern: StepPattern::default(),
            phase: 0.0,
            current_step: None,
            gate_remaining: 0,
        }
    }

    pub fn sequencer(pattern: StepPattern) -> Self {
        Self {
            source: PatternSource::Fixed,
            pattern,
            ..Self::euclidean()
        }
    }

    pub fn set_pattern(&mut self, pattern: StepPattern) {
        self.pattern = pattern;
    }

    pub fn pattern(&self) -> &StepPattern {
        &self.pattern
    }

    pub fn is_open(&self) -> bool {
        self.gate_remaining > 0
    }

    pub fn level(&self) -> f32 {
        if self.is_open() {
            1.0
        } else {
            0.0
        }
    }

    fn refresh_pattern(&mut self, params: &Params) {
        let PatternSource::Euclidean { key } = &mut self.source else {
            return;
        };
        let steps = params.get(ParamId::Steps).round().max(1.0) as usize;
        let pulses = params.get(ParamId::Pulses).round().max(0.0) as usize;
        let rotation = params.get(ParamId::Rotation).round().max(0.0) as usize;
        let next = Some((steps, pulses, rotation));
        if *key != next {
            *key = next;
            self.pattern = StepPattern::euclidean(steps, pulses, rotation);
        }
    }

    /// Advance one sample.
    pub fn next_sample(&mut self, params: &Params, ctx: &RenderCtx) -> Option<GateEvent> {
        self.refresh_pattern(params);
        let steps = self.pattern.len().max(1);
        let step = ((self.phase * steps as f64) as usize).min(steps - 1);

        let mut event = None;
        if self.gate_remaining > 0 {
            self.gate_remaining -= 1;
            if self.gate_remaining == 0 {
                event = Some(GateEvent::Closed);
            }
        }

        if self.current_step != Some(step) {
            self.current_step = Some(step);
            if self.pattern.is_pulse(step) {
                self.gate_remaining = (GATE_SECONDS * ctx.sample_rate).round().max(1.0) as u32;
                event = match event {
                    Some(GateEvent::Closed) => Some(GateEvent::Retriggered),
                    _ => Some(GateEvent::Opened),
                };
            }
        }

        let beats_per_sample = params.get(ParamId::Tempo) as f64 / 60.0 / ctx.sample_rate as f64;
        self.phase = (self.phase + beats_per_sample / steps as f64).fract();
        event
    }
}
