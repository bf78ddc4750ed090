//! Audio decoding, playback and spectral analysis.
//!
//! Decodes one track, plays it through the default output device and
//! reduces its spectrum to the three band levels that drive the orb.

mod bands;
mod decode;
mod fft;
mod transport;

// Re-export public types
pub use bands::{band_level, BassHistory, SpectralExtractor, SpectralFrame};
pub use decode::{decode_track, Track};
pub use fft::{blackman_window, magnitude_to_byte, SpectrumAnalyser, TrackAnalyser};
pub use transport::{
    AudioOutput, PlaybackEvent, PlaybackState, PlaybackStatus, Playhead, TransportCommand,
};

/// Anything that can hand out a byte spectrum on demand
///
/// Implementations fill `bins` with magnitudes 0-255, one per frequency bin,
/// refreshed at most once per call.
pub trait AnalysisSource {
    /// Number of frequency bins (FFT size / 2)
    fn frequency_bin_count(&self) -> usize;

    /// Write the current byte spectrum into `bins`
    fn byte_frequency_data(&mut self, bins: &mut [u8]);
}
