use crate::{
    dsp::{delay::DelayLine, filter::OnePole},
    graph::{
        node::RenderCtx,
        params::{ParamId, Params},
    },
};

pub const MAX_DELAY_SECONDS: f32 = 2.0;

/// Feedback delay with a damped repeat path.
///
/// ```text
/// in ──┬────────────────────────── (1-mix) ──→(+)──→ out
///      └─→(+)─→ [ delay ] ──┬──── mix ──────────↑
///          ↑                │
///          └─ feedback ← lp ┘
/// ```
#[derive(Debug, Clone)]
pub struct DelayNode {
    line: DelayLine,
    damping: OnePole,
    damping_cutoff: f32,
}

impl DelayNode {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            line: DelayLine::with_capacity((MAX_DELAY_SECONDS * sample_rate).ceil() as usize + 4),
            damping: OnePole::default(),
            damping_cutoff: f32::NAN,
        }
    }

    #[inline]
    pub fn next_sample(&mut self, params: &Params, input: f32, ctx: &RenderCtx) -> f32 {
        let cutoff = params.get(ParamId::Cutoff);
        if cutoff != self.damping_cutoff {
            self.damping_cutoff = cutoff;
            self.damping.set_cutoff(cutoff, ctx.sample_rate);
        }

        let delay = params.get(ParamId::Time) * ctx.sample_rate;
        let wet = self.line.read(delay);
        let repeat = self.damping.process(wet) * params.get(ParamId::Feedback);
        self.line.write(input + repeat);

        let mix = params.get(ParamId::Mix);
        (input * (1.0 - mix) + wet * mix) * params.get(ParamId::Gain)
    }
}
