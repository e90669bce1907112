//! Spectrum of the output, on a log-frequency axis with peak hold

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

const BANDS: usize = 64;
const FLOOR_DB: f64 = -100.0;
/// dB the held peak falls per update.
const FALL_DB: f64 = 1.5;

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    /// FFT bin per band, log spaced from 20 Hz to Nyquist.
    band_bins: Vec<usize>,
    /// (log10 Hz, dB) per band.
    bands: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(size: usize, sample_rate: f32) -> Self {
        let size = size.max(2);
        let fft = FftPlanner::new().plan_fft_forward(size);
        let window = (0..size)
            .map(|i| {
                let phase = i as f32 / (size - 1) as f32;
                0.5 - 0.5 * (std::f32::consts::TAU * phase).cos()
            })
            .collect();

        let nyquist = (sample_rate as f64 / 2.0).clamp(40.0, 20_000.0);
        let (lo, hi) = (20.0f64.log10(), nyquist.log10());
        let last_bin = size / 2 - 1;
        let mut band_bins = Vec::with_capacity(BANDS);
        let mut bands = Vec::with_capacity(BANDS);
        for band in 0..BANDS {
            let log_hz = lo + (hi - lo) * band as f64 / (BANDS - 1) as f64;
            let bin = (10f64.powf(log_hz) * size as f64 / sample_rate as f64).round() as usize;
            band_bins.push(bin.clamp(1, last_bin.max(1)));
            bands.push((log_hz, FLOOR_DB));
        }

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); size],
            band_bins,
            bands,
        }
    }

    pub fn update(&mut self, samples: &[f32]) {
        if samples.len() != self.window.len() {
            return;
        }
        for ((slot, &s), &w) in self.scratch.iter_mut().zip(samples).zip(&self.window) {
            *slot = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let norm = 2.0 / self.window.len() as f32;
        for (band, &bin) in self.bands.iter_mut().zip(&self.band_bins) {
            let magnitude = (self.scratch[bin].norm() * norm).max(1e-9);
            let db = (20.0 * magnitude.log10()) as f64;
            band.1 = db.max(band.1 - FALL_DB).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.bands
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, bands: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);
    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(bands);

    let x_max = bands.last().map_or(4.3, |&(x, _)| x);
    let axis_style = Style::default().fg(Color::DarkGray);
    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([20.0f64.log10(), x_max])
                .labels(["20", "200", "2k", "20k"])
                .style(axis_style),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(["-100", "-50", "0"])
                .style(axis_style),
        );

    frame.render_widget(chart, area);
}
