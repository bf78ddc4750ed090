//! Band extraction: byte spectrum -> bass / mid / treble levels.

use std::collections::VecDeque;
use std::ops::Range;

use super::AnalysisSource;
use crate::params::{audio_constants::BASS_HISTORY_LEN, BandLayout};

/// Band levels of one analysis tick, each in [0, 1]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpectralFrame {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    /// Frame-clock time the levels were measured at (seconds)
    pub timestamp_s: f32,
}

/// Rolling window of the most recent bass levels, oldest first
#[derive(Clone, Debug)]
pub struct BassHistory {
    values: VecDeque<f32>,
}

impl Default for BassHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl BassHistory {
    pub const CAPACITY: usize = BASS_HISTORY_LEN;

    pub fn new() -> Self {
        Self {
            values: VecDeque::with_capacity(Self::CAPACITY),
        }
    }

    /// Append a value, evicting the oldest once full
    pub fn push(&mut self, bass: f32) {
        if self.values.len() == Self::CAPACITY {
            self.values.pop_front();
        }
        self.values.push_back(bass);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().copied()
    }

    pub fn latest(&self) -> Option<f32> {
        self.values.back().copied()
    }

    /// Mean of the window (0.0 when empty)
    pub fn average(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f32>() / self.values.len() as f32
    }

    /// Largest value in the window (0.0 when empty)
    pub fn peak(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }
}

/// Mean magnitude of `range` normalised to [0, 1]
///
/// The range is clipped to the bins actually present; a band with no bins
/// left reads 0.0.
pub fn band_level(bins: &[u8], range: &Range<usize>) -> f32 {
    let end = range.end.min(bins.len());
    let start = range.start.min(end);
    let band = &bins[start..end];
    if band.is_empty() {
        return 0.0;
    }

    let sum: u32 = band.iter().map(|&b| b as u32).sum();
    sum as f32 / band.len() as f32 / 255.0
}

/// Reduces analyser bins to band levels and keeps the bass history
///
/// When no source is attached or playback is paused the previous levels
/// are held, so the orb freezes instead of collapsing to neutral.
pub struct SpectralExtractor {
    layout: BandLayout,
    bins: Vec<u8>,
    current: SpectralFrame,
    history: BassHistory,
}

impl SpectralExtractor {
    pub fn new(layout: BandLayout) -> Self {
        Self {
            layout,
            bins: Vec::new(),
            current: SpectralFrame::default(),
            history: BassHistory::new(),
        }
    }

    /// Levels from the last successful extraction
    pub fn current(&self) -> SpectralFrame {
        self.current
    }

    pub fn history(&self) -> &BassHistory {
        &self.history
    }

    pub fn layout(&self) -> &BandLayout {
        &self.layout
    }

    /// Pull one spectrum from `source` and update the band levels
    ///
    /// Returns the held frame untouched when `source` is `None` or
    /// `is_playing` is false.
    pub fn extract(
        &mut self,
        source: Option<&mut dyn AnalysisSource>,
        is_playing: bool,
        timestamp_s: f32,
    ) -> SpectralFrame {
        let Some(source) = source else {
            return self.current;
        };
        if !is_playing {
            return self.current;
        }

        self.bins.resize(source.frequency_bin_count(), 0);
        source.byte_frequency_data(&mut self.bins);

        self.current = SpectralFrame {
            bass: band_level(&self.bins, &self.layout.bass),
            mid: band_level(&self.bins, &self.layout.mid),
            treble: band_level(&self.bins, &self.layout.treble),
            timestamp_s,
        };
        self.history.push(self.current.bass);

        log::trace!(
            "bands bass={:.3} mid={:.3} treble={:.3}",
            self.current.bass,
            self.current.mid,
            self.current.treble
        );

        self.current
    }
}
