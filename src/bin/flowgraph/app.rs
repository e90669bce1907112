//! Live playback: engine on the cpal callback, monitor on the main thread

use std::path::PathBuf;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use flowgraph::{channel, EngineConfig, GraphPatch};
use rtrb::RingBuffer;
use tracing::{error, info};

use crate::{
    samples::{load_wav, SampleBinding},
    ui::Monitor,
};

/// Largest block rendered in one engine call; longer host buffers are split.
const MAX_BLOCK_SIZE: usize = 2048;

/// Samples buffered for the oscilloscope between UI frames.
const SCOPE_CAPACITY: usize = 16_384;

pub struct PlaySettings {
    pub patch: GraphPatch,
    pub patch_path: PathBuf,
    pub config: EngineConfig,
    /// Take the sample rate from the output device instead of the config.
    pub device_rate: bool,
    pub samples: Vec<SampleBinding>,
}

pub fn play(settings: PlaySettings) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let stream_config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let mut config = settings.config;
    if settings.device_rate {
        config.sample_rate = stream_config.sample_rate().0 as f32;
    }
    let sample_rate = config.sample_rate;
    let channels = stream_config.channels() as usize;
    info!(sample_rate, channels, "output device ready");

    let (mut handle, mut engine) = channel(config);
    handle.update_graph(&settings.patch)?;
    for binding in &settings.samples {
        let (data, rate) = load_wav(&binding.path)?;
        handle.load_sample_buffer(&binding.node, data, rate)?;
    }

    let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_CAPACITY);
    let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut right = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &stream_config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                engine.render(&mut left[..frames], &mut right[..frames]);

                let out = &mut data[frames_written * channels..(frames_written + frames) * channels];
                for (i, frame) in out.chunks_exact_mut(channels).enumerate() {
                    match frame {
                        [mono] => *mono = 0.5 * (left[i] + right[i]),
                        [l, r, rest @ ..] => {
                            *l = left[i];
                            *r = right[i];
                            rest.fill(0.0);
                        }
                        [] => {}
                    }
                    // Scope drops samples when the UI falls behind
                    let _ = scope_tx.push(left[i]);
                }

                frames_written += frames;
            }
        },
        |err| error!(%err, "audio stream error"),
        None,
    )?;

    stream.play()?;

    let mut terminal = ratatui::init();
    let result = Monitor::new(handle, scope_rx, settings.patch_path, sample_rate).run(&mut terminal);
    ratatui::restore();
    result
}
