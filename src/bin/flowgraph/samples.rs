//! WAV loading for granular nodes

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use hound::{SampleFormat, WavReader};

/// `--sample node=path.wav`
#[derive(Debug, Clone)]
pub struct SampleBinding {
    pub node: String,
    pub path: PathBuf,
}

pub fn parse_binding(arg: &str) -> Result<SampleBinding, String> {
    match arg.split_once('=') {
        Some((node, path)) if !node.is_empty() && !path.is_empty() => Ok(SampleBinding {
            node: node.to_owned(),
            path: PathBuf::from(path),
        }),
        _ => Err(format!("expected NODE=PATH, got `{arg}`")),
    }
}

/// Decode a WAV file to mono f32 samples. Returns the samples and their rate.
pub fn load_wav(path: &Path) -> EyreResult<(Vec<f32>, f32)> {
    let mut reader = WavReader::open(path).wrap_err_with(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    // Mix down to mono
    let mono = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok((mono, spec.sample_rate as f32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_needs_both_halves() {
        let binding = parse_binding("grains=loops/rain.wav").unwrap();
        assert_eq!(binding.node, "grains");
        assert_eq!(binding.path, PathBuf::from("loops/rain.wav"));
        assert!(parse_binding("grains").is_err());
        assert!(parse_binding("=rain.wav").is_err());
    }
}
