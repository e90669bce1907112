// Purpose - external interfaces: audio buffers, wire formats, thread messages

pub mod message;
pub mod patch;
pub mod sample;

/// Host input channels. The engine does not read them.
#[derive(Debug, Default)]
pub struct AudioInput {
    pub buffers: Vec<Vec<f32>>,
}

/// Planar output channels, left then right.
#[derive(Debug, Default)]
pub struct AudioOutput {
    pub buffers: Vec<Vec<f32>>,
}

impl AudioOutput {
    pub fn stereo(frames: usize) -> Self {
        Self {
            buffers: vec![vec![0.0; frames]; 2],
        }
    }

    pub fn frames(&self) -> usize {
        self.buffers.first().map_or(0, Vec::len)
    }
}
