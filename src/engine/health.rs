//! Audio-time heartbeat.

use crate::io::message::Notification;

/// Counts rendered frames and produces a heartbeat every `interval` frames.
#[derive(Debug, Clone)]
pub struct HealthReporter {
    interval: u64,
    frames: u64,
    until_beat: u64,
    sample_rate: f64,
}

impl HealthReporter {
    pub fn new(interval: u64, sample_rate: f32) -> Self {
        let interval = interval.max(1);
        Self {
            interval,
            frames: 0,
            until_beat: interval,
            sample_rate: sample_rate as f64,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Account for one rendered frame.
    #[inline]
    pub fn tick(&mut self) -> Option<Notification> {
        self.frames += 1;
        self.until_beat -= 1;
        if self.until_beat > 0 {
            return None;
        }
        self.until_beat = self.interval;
        Some(Notification::Heartbeat {
            frame_count: self.frames,
            timestamp: self.frames as f64 / self.sample_rate,
        })
    }
}
