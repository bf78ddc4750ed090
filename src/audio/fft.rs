//! FFT spectrum analysis producing a byte spectrum per frame.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::{AnalysisSource, Playhead, Track};
use crate::error::Result;
use crate::params::AnalyserConfig;

/// Windowed FFT with temporal smoothing and decibel-to-byte mapping
pub struct SpectrumAnalyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    /// Smoothed linear magnitudes, one per bin
    smoothed: Vec<f32>,
}

impl SpectrumAnalyser {
    pub fn new(config: AnalyserConfig) -> Result<Self> {
        config.validate()?;

        let size = config.fft_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);

        Ok(Self {
            window: (0..size).map(|i| blackman_window(i, size)).collect(),
            buffer: vec![Complex::new(0.0, 0.0); size],
            smoothed: vec![0.0; config.frequency_bin_count()],
            fft,
            config,
        })
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    pub fn frequency_bin_count(&self) -> usize {
        self.smoothed.len()
    }

    /// Analyse the most recent `fft_size` samples of `samples`
    ///
    /// Shorter input is zero-padded at the front.
    pub fn process(&mut self, samples: &[f32]) {
        let size = self.config.fft_size;
        let recent = &samples[samples.len().saturating_sub(size)..];
        let pad = size - recent.len();

        // Apply Blackman window
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let scale = 1.0 / size as f32;
        let k = self.config.smoothing;
        for (value, bin) in self.smoothed.iter_mut().zip(&self.buffer) {
            let magnitude = bin.norm() * scale;
            let next = k * *value + (1.0 - k) * magnitude;
            *value = if next.is_finite() { next } else { 0.0 };
        }
    }

    /// Write the smoothed spectrum as bytes; bins past the analyser's range read 0
    pub fn byte_frequency_data(&self, bins: &mut [u8]) {
        let (min_db, max_db) = (self.config.min_decibels, self.config.max_decibels);
        for (i, dst) in bins.iter_mut().enumerate() {
            *dst = self
                .smoothed
                .get(i)
                .map_or(0, |&magnitude| magnitude_to_byte(magnitude, min_db, max_db));
        }
    }
}

/// Map a linear magnitude onto 0-255 across the `[min_db, max_db]` range
pub fn magnitude_to_byte(magnitude: f32, min_db: f32, max_db: f32) -> u8 {
    if magnitude.is_nan() || magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = 255.0 / (max_db - min_db) * (db - min_db);
    scaled.floor().clamp(0.0, 255.0) as u8
}

/// Blackman window function for FFT analysis
pub fn blackman_window(index: usize, size: usize) -> f32 {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;
    let phase = 2.0 * PI * index as f32 / size as f32;
    A0 - A1 * phase.cos() + A2 * (2.0 * phase).cos()
}

/// Analysis source reading the window of a track that ends at the playhead
pub struct TrackAnalyser {
    analyser: SpectrumAnalyser,
    track: Arc<Track>,
    playhead: Playhead,
    window: Vec<f32>,
}

impl TrackAnalyser {
    pub fn new(analyser: SpectrumAnalyser, track: Arc<Track>, playhead: Playhead) -> Self {
        let config = analyser.config();
        log::info!(
            "Analyser: {}-point FFT, {} bins of {:.1} Hz at {}Hz",
            config.fft_size,
            config.frequency_bin_count(),
            config.bin_resolution_hz(track.sample_rate()),
            track.sample_rate()
        );

        Self {
            analyser,
            track,
            playhead,
            window: Vec::new(),
        }
    }

    pub fn playhead(&self) -> &Playhead {
        &self.playhead
    }
}

impl AnalysisSource for TrackAnalyser {
    fn frequency_bin_count(&self) -> usize {
        self.analyser.frequency_bin_count()
    }

    fn byte_frequency_data(&mut self, bins: &mut [u8]) {
        self.track.mono_window(
            self.playhead.frame(),
            self.analyser.config().fft_size,
            &mut self.window,
        );
        self.analyser.process(&self.window);
        self.analyser.byte_frequency_data(bins);
    }
}
