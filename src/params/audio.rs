//! Audio analysis configuration, band layout and playback defaults.

use std::ops::Range;

use serde::Deserialize;

use crate::error::{OrbError, Result};

/// Spectrum analyser configuration (byte spectrum of a Web-Audio style analyser)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyserConfig {
    /// FFT window size in samples (power of 2, 32..=32768)
    /// Frequency bin count is half of this.
    pub fft_size: usize,

    /// Temporal smoothing between analyser frames (0 = none, 1 = frozen)
    pub smoothing: f32,

    /// Magnitude (dB) mapped to byte 0
    pub min_decibels: f32,

    /// Magnitude (dB) mapped to byte 255
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: audio_constants::REFERENCE_FFT_SIZE,
            smoothing: 0.85,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyserConfig {
    /// Number of frequency bins produced per analysis
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Width of one frequency bin (Hz) at the given sample rate
    pub fn bin_resolution_hz(&self, sample_rate_hz: u32) -> f32 {
        sample_rate_hz as f32 / self.fft_size as f32
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(OrbError::InvalidConfig(format!(
                "FFT size must be a power of 2 in 32..=32768, got {}",
                self.fft_size
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(OrbError::InvalidConfig(format!(
                "smoothing must be in [0, 1], got {}",
                self.smoothing
            )));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(OrbError::InvalidConfig(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            )));
        }
        Ok(())
    }
}

/// Bin index ranges for the three perceptual bands
///
/// The calibrated ranges are tuned by ear for a 2048-point transform; they
/// are calibration constants, not derived from the sample rate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BandLayout {
    /// Bass bins, ≈ 0-430 Hz at 44.1 kHz
    pub bass: Range<usize>,

    /// Mid bins, ≈ 430-3200 Hz at 44.1 kHz
    pub mid: Range<usize>,

    /// Treble bins, ≈ 3.2-10.8 kHz at 44.1 kHz
    pub treble: Range<usize>,
}

impl Default for BandLayout {
    fn default() -> Self {
        Self::CALIBRATED
    }
}

impl BandLayout {
    pub const CALIBRATED: BandLayout = BandLayout {
        bass: 0..20,
        mid: 20..150,
        treble: 150..500,
    };

    /// Rescale the layout for an analyser whose FFT size differs from the
    /// reference size, keeping each band at the same fraction of the spectrum.
    ///
    /// Returns the layout unchanged at the reference size.
    pub fn fit_to(&self, config: &AnalyserConfig) -> BandLayout {
        let reference = audio_constants::REFERENCE_FFT_SIZE;
        if config.fft_size == reference {
            return self.clone();
        }

        let scale = |bin: usize| (bin * config.fft_size + reference / 2) / reference;

        let bass_start = scale(self.bass.start);
        let bass_end = scale(self.bass.end).max(bass_start + 1);
        let mid_start = scale(self.mid.start).max(bass_end);
        let mid_end = scale(self.mid.end).max(mid_start + 1);
        let treble_start = scale(self.treble.start).max(mid_end);
        let treble_end = scale(self.treble.end).max(treble_start + 1);

        BandLayout {
            bass: bass_start..bass_end,
            mid: mid_start..mid_end,
            treble: treble_start..treble_end,
        }
    }

    /// Check that bands are non-empty, ordered, non-overlapping and in bounds
    pub fn validate(&self, bin_count: usize) -> Result<()> {
        for (name, range) in [
            ("bass", &self.bass),
            ("mid", &self.mid),
            ("treble", &self.treble),
        ] {
            if range.is_empty() {
                return Err(OrbError::InvalidConfig(format!(
                    "{} band {:?} is empty",
                    name, range
                )));
            }
        }
        if self.bass.end > self.mid.start || self.mid.end > self.treble.start {
            return Err(OrbError::InvalidConfig(format!(
                "bands must be ordered and non-overlapping: bass {:?}, mid {:?}, treble {:?}",
                self.bass, self.mid, self.treble
            )));
        }
        if self.treble.end > bin_count {
            return Err(OrbError::InvalidConfig(format!(
                "treble band ends at bin {} but the analyser only has {} bins",
                self.treble.end, bin_count
            )));
        }
        Ok(())
    }
}

/// Playback transport defaults
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Where playback starts in the track (seconds, wrapped to track length)
    pub start_offset_s: f32,

    /// Initial output volume (0.0 - 1.0)
    pub volume: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            start_offset_s: 100.0,
            volume: audio_constants::DEFAULT_VOLUME,
        }
    }
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.start_offset_s.is_finite() || self.start_offset_s < 0.0 {
            return Err(OrbError::InvalidConfig(format!(
                "start offset must be a non-negative number of seconds, got {}",
                self.start_offset_s
            )));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(OrbError::InvalidConfig(format!(
                "volume must be in [0, 1], got {}",
                self.volume
            )));
        }
        Ok(())
    }
}

/// Audio constants
pub mod audio_constants {
    /// FFT size the calibrated band layout was tuned for
    pub const REFERENCE_FFT_SIZE: usize = 2048;

    /// Number of bass values kept for trend derivation
    pub const BASS_HISTORY_LEN: usize = 30;

    /// Volume restored by unmute when no louder volume was ever set
    pub const DEFAULT_VOLUME: f32 = 0.7;
}
