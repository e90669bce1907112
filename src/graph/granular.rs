use std::{f32::consts::TAU, sync::Arc};

use rand::{rngs::SmallRng, Rng};

use crate::{
    graph::{
        node::RenderCtx,
        params::{ParamId, Params},
    },
    io::sample::SampleBuffer,
};

/*
Granular Texture
================

Short windowed snippets ("grains") are read out of a sample buffer and
layered into a cloud.

  density     Grains started per second. A new grain starts every
              sample_rate / density samples.

  position    Where in the buffer grains start, 0..1 of its length.

  spray       Random start offset, uniform in ±spray/2 around `position`,
              clamped back into the buffer.

  grainSize   Grain length in seconds, shortened at spawn if the grain
              would otherwise run off the end of the buffer. A grain
              with less than two frames of room is not started.

  pitch       Playback rate. Each grain also gets a random factor of
              2^(u·pitchJitter) with u uniform in [-1, 1].

  window      Hann: 0.5 - 0.5·cos(2π·t), t = age / length. Grains fade in
              and out so overlapping them never clicks.

Each grain also draws an amplitude in [0.8, 1.0]. The sum of active grains
is divided by sqrt(active) so a dense cloud is not much louder than a
sparse one.

Grains live in a fixed pool of MAX_GRAINS slots. When every slot is busy
new grains are skipped rather than allocated.
*/

pub const MAX_GRAINS: usize = 100;

#[derive(Debug, Clone, Copy, Default)]
struct Grain {
    active: bool,
    position: f64,
    rate: f64,
    amplitude: f32,
    length: f32,
    age: f32,
}

#[derive(Debug, Clone)]
pub struct GranularTexture {
    grains: [Grain; MAX_GRAINS],
    buffer: Option<Arc<SampleBuffer>>,
    until_spawn: f32,
    rng: SmallRng,
}

impl GranularTexture {
    pub fn new(rng: SmallRng) -> Self {
        Self {
            grains: [Grain::default(); MAX_GRAINS],
            buffer: None,
            until_spawn: 0.0,
            rng,
        }
    }

    /// Attach a buffer, returning the previous one so the caller can retire it.
    /// Any grains still playing from the old buffer are cut.
    pub fn attach(&mut self, buffer: Arc<SampleBuffer>) -> Option<Arc<SampleBuffer>> {
        for grain in self.grains.iter_mut() {
            grain.active = false;
        }
        self.until_spawn = 0.0;
        self.buffer.replace(buffer)
    }

    pub fn active_grains(&self) -> usize {
        self.grains.iter().filter(|g| g.active).count()
    }

    #[inline]
    pub fn next_sample(&mut self, params: &Params, ctx: &RenderCtx) -> f32 {
        let Self {
            grains,
            buffer,
            until_spawn,
            rng,
        } = self;
        let Some(buffer) = buffer.as_deref() else {
            return 0.0;
        };
        if buffer.is_empty() {
            return 0.0;
        }

        if *until_spawn <= 0.0 {
            *until_spawn += ctx.sample_rate / params.get(ParamId::Density).max(0.001);
            if let Some(slot) = grains.iter_mut().find(|g| !g.active) {
                if let Some(grain) = spawn(params, buffer, ctx, rng) {
                    *slot = grain;
                }
            }
        }
        *until_spawn -= 1.0;

        let last = (buffer.len() - 1) as f64;
        let mut sum = 0.0;
        let mut active = 0usize;
        for grain in grains.iter_mut().filter(|g| g.active) {
            let t = grain.age / grain.length;
            let window = 0.5 - 0.5 * (TAU * t).cos();
            sum += buffer.read(grain.position) * window * grain.amplitude;
            active += 1;

            grain.position += grain.rate;
            grain.age += 1.0;
            if grain.age >= grain.length || grain.position >= last || grain.position < 0.0 {
                grain.active = false;
            }
        }

        if active == 0 {
            return 0.0;
        }
        sum / (active as f32).sqrt() * params.get(ParamId::Gain)
    }
}

fn spawn(params: &Params, buffer: &SampleBuffer, ctx: &RenderCtx, rng: &mut SmallRng) -> Option<Grain> {
    let spray = params.get(ParamId::Spray);
    let offset = if spray > 0.0 {
        rng.gen_range(-spray / 2.0..=spray / 2.0)
    } else {
        0.0
    };
    let start = (params.get(ParamId::Position) + offset).clamp(0.0, 1.0);

    let jitter = params.get(ParamId::PitchJitter);
    let detune = if jitter > 0.0 {
        2f32.powf(rng.gen_range(-1.0..=1.0) * jitter)
    } else {
        1.0
    };
    let native = buffer.sample_rate() / ctx.sample_rate;

    let last = (buffer.len() - 1) as f64;
    let position = start as f64 * last;
    let rate = (params.get(ParamId::Pitch) * detune * native) as f64;
    // Whole window must fit before the read reaches the last frame
    let room = ((last - position) / rate) as f32;
    let length = (params.get(ParamId::GrainSize) * ctx.sample_rate).min(room);
    if length < 2.0 {
        return None;
    }

    Some(Grain {
        active: true,
        position,
        rate,
        amplitude: rng.gen_range(0.8..=1.0),
        length,
        age: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::kind::NodeType;
    use rand::SeedableRng;

    const SR: f32 = 48_000.0;

    fn tone(seconds: f32) -> Arc<SampleBuffer> {
        let samples = (0..(seconds * SR) as usize)
            .map(|n| (TAU * 220.0 * n as f32 / SR).sin())
            .collect();
        Arc::new(SampleBuffer::new(samples, SR))
    }

    #[test]
    fn silent_without_buffer() {
        let ctx = RenderCtx::new(SR);
        let params = Params::defaults(NodeType::Granular);
        let mut texture = GranularTexture::new(SmallRng::seed_from_u64(1));
        assert!((0..1_000).all(|_| texture.next_sample(&params, &ctx) == 0.0));
    }

    #[test]
    fn spawns_at_density_and_stays_bounded() {
        let ctx = RenderCtx::new(SR);
        let mut params = Params::defaults(NodeType::Granular);
        params.set(ParamId::Density, 100.0);
        params.set(ParamId::GrainSize, 0.05);
        let mut texture = GranularTexture::new(SmallRng::seed_from_u64(3));
        assert!(texture.attach(tone(2.0)).is_none());

        let mut peak = 0.0f32;
        for _ in 0..SR as usize {
            peak = peak.max(texture.next_sample(&params, &ctx).abs());
        }
        // 100 grains/s × 50 ms = ~5 overlapping grains.
        let active = texture.active_grains();
        assert!((4..=6).contains(&active), "active grains {active}");
        assert!(peak > 0.1 && peak <= 3.0, "peak {peak}");
    }

    #[test]
    fn pool_never_exceeds_max_grains() {
        let ctx = RenderCtx::new(SR);
        let mut params = Params::defaults(NodeType::Granular);
        params.set(ParamId::Density, 200.0);
        params.set(ParamId::GrainSize, 1.0);
        params.set(ParamId::Pitch, 0.25);
        let mut texture = GranularTexture::new(SmallRng::seed_from_u64(3));
        texture.attach(tone(8.0));
        // 200 grains/s fills the pool after half a second; none expire before 1 s.
        for _ in 0..(SR * 0.9) as usize {
            texture.next_sample(&params, &ctx);
        }
        assert_eq!(texture.active_grains(), MAX_GRAINS);
    }

    #[test]
    fn grain_near_buffer_end_fades_out_fully() {
        let ctx = RenderCtx::new(SR);
        let mut params = Params::defaults(NodeType::Granular);
        params.set(ParamId::Position, 0.99);
        params.set(ParamId::Spray, 0.0);
        params.set(ParamId::PitchJitter, 0.0);
        params.set(ParamId::GrainSize, 0.1);
        params.set(ParamId::Density, 1.0);

        // Constant buffer: any cut shows up as a step.
        let mut texture = GranularTexture::new(SmallRng::seed_from_u64(9));
        texture.attach(Arc::new(SampleBuffer::new(vec![1.0; SR as usize], SR)));
        let out: Vec<f32> = (0..6_000).map(|_| texture.next_sample(&params, &ctx)).collect();

        assert!(out.iter().any(|&s| s > 0.5), "the grain should sound");
        let jump = out.windows(2).map(|w| (w[1] - w[0]).abs()).fold(0.0, f32::max);
        assert!(jump < 0.02, "step of {jump} between samples");
        assert_eq!(*out.last().unwrap_or(&1.0), 0.0);
    }

    #[test]
    fn grain_at_the_very_end_is_not_started() {
        let ctx = RenderCtx::new(SR);
        let mut params = Params::defaults(NodeType::Granular);
        params.set(ParamId::Position, 1.0);
        params.set(ParamId::Spray, 0.0);
        let mut texture = GranularTexture::new(SmallRng::seed_from_u64(9));
        texture.attach(tone(0.5));
        texture.next_sample(&params, &ctx);
        assert_eq!(texture.active_grains(), 0);
    }

    #[test]
    fn attaching_returns_previous_buffer() {
        let mut texture = GranularTexture::new(SmallRng::seed_from_u64(3));
        let first = tone(0.1);
        texture.attach(first.clone());
        let previous = texture.attach(tone(0.1)).unwrap();
        assert!(Arc::ptr_eq(&first, &previous));
    }
}
