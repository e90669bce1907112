//! Offline rendering to WAV

use std::path::PathBuf;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use flowgraph::{channel, EngineConfig, GraphPatch, Notification};
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, info};

use crate::samples::{load_wav, SampleBinding};

pub struct RenderSettings {
    pub output: PathBuf,
    pub duration: f32,
    pub block_size: usize,
}

/// Drive the engine through the same channel a live stream uses, one block
/// at a time, and write 16-bit stereo.
pub fn render(
    config: EngineConfig,
    patch: &GraphPatch,
    samples: &[SampleBinding],
    settings: &RenderSettings,
) -> EyreResult<()> {
    let sample_rate = config.sample_rate;
    let (mut handle, mut engine) = channel(config);

    handle.update_graph(patch)?;
    for binding in samples {
        let (data, rate) = load_wav(&binding.path)?;
        handle.load_sample_buffer(&binding.node, data, rate)?;
    }

    let spec = WavSpec {
        channels: 2,
        sample_rate: sample_rate as u32,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&settings.output, spec)
        .wrap_err_with(|| format!("creating {}", settings.output.display()))?;

    let total_frames = (settings.duration.max(0.0) * sample_rate) as usize;
    let mut left = vec![0.0f32; settings.block_size];
    let mut right = vec![0.0f32; settings.block_size];
    let mut frames_written = 0;
    let mut peak = 0.0f32;
    let mut triggers = 0usize;

    while frames_written < total_frames {
        let frames = (total_frames - frames_written).min(settings.block_size);
        engine.render(&mut left[..frames], &mut right[..frames]);

        for (&l, &r) in left[..frames].iter().zip(&right[..frames]) {
            peak = peak.max(l.abs()).max(r.abs());
            writer.write_sample((l * i16::MAX as f32) as i16)?;
            writer.write_sample((r * i16::MAX as f32) as i16)?;
        }
        frames_written += frames;

        for notification in handle.drain_notifications() {
            match notification {
                Notification::SampleTrigger { node_id, sample_id } => {
                    triggers += 1;
                    debug!(%node_id, %sample_id, "sample trigger");
                }
                Notification::Heartbeat { timestamp, .. } => {
                    debug!(seconds = timestamp, "rendering");
                }
            }
        }
        handle.collect_garbage();
    }

    writer.finalize()?;
    info!(
        path = %settings.output.display(),
        frames = frames_written,
        peak,
        sample_triggers = triggers,
        "render complete"
    );
    Ok(())
}
