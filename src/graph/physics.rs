use crate::graph::{
    node::RenderCtx,
    params::{ParamId, Params},
};

/// A point mass dropped from `height` onto a floor at y = 0.
///
/// Semi-implicit Euler: velocity is updated from gravity first, then
/// position from the new velocity. On contact the velocity flips and loses
/// energy to `restitution`. Output is the height of the ball.
#[derive(Debug, Clone, Default)]
pub struct BouncingBall {
    y: f32,
    velocity: f32,
    dropped: bool,
}

impl BouncingBall {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the ball up and drop it again on the next sample.
    pub fn trigger(&mut self) {
        self.dropped = false;
    }

    pub fn position(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn next_sample(&mut self, params: &Params, ctx: &RenderCtx) -> f32 {
        if !self.dropped {
            self.y = params.get(ParamId::Height);
            self.velocity = 0.0;
            self.dropped = true;
        }

        let dt = 1.0 / ctx.sample_rate;
        let gravity = params.get(ParamId::Gravity);
        self.velocity -= gravity * dt;
        self.y += self.velocity * dt;

        if self.y <= 0.0 {
            self.y = 0.0;
            self.velocity = -self.velocity * params.get(ParamId::Restitution);
            // Too slow to leave the floor again within one step: come to rest.
            if self.velocity < gravity * dt {
                self.velocity = 0.0;
            }
        }
        self.y
    }
}
