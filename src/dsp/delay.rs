/// Circular delay line with a fixed capacity and fractional reads.
///
/// Capacity is chosen at construction and never changes, so the buffer is
/// allocated exactly once, off the audio thread.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(4)],
            write_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Largest delay that [`read`](Self::read) can honour.
    pub fn max_delay(&self) -> f32 {
        (self.buffer.len() - 2) as f32
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos += 1;
        if self.write_pos == self.buffer.len() {
            self.write_pos = 0;
        }
    }

    /// Read `delay` samples behind the most recent write, linearly interpolated.
    /// A delay of 1.0 returns the last written sample.
    #[inline]
    pub fn read(&self, delay: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay.clamp(1.0, self.max_delay());
        let whole = delay.floor();
        let frac = delay - whole;

        let newer = (self.write_pos + len - whole as usize) % len;
        let older = (newer + len - 1) % len;
        let a = self.buffer[newer];
        let b = self.buffer[older];
        a + (b - a) * frac
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
