//! Audio asset decoding into an in-memory track.

use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{OrbError, Result};

/// Fully decoded audio track
#[derive(Debug, Clone)]
pub struct Track {
    /// Interleaved samples, `channels` per frame
    samples: Vec<f32>,
    /// Per-frame channel average, used for analysis
    mono: Vec<f32>,
    channels: usize,
    sample_rate: u32,
}

impl Track {
    /// Build a track from interleaved samples
    pub fn from_interleaved(samples: Vec<f32>, channels: usize, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(OrbError::InvalidConfig(
                "track must have at least one channel".to_string(),
            ));
        }
        if sample_rate == 0 {
            return Err(OrbError::UnknownSampleRate);
        }
        if samples.len() < channels {
            return Err(OrbError::EmptyTrack);
        }

        let mono = samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        Ok(Self {
            samples,
            mono,
            channels,
            sample_rate,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of whole frames
    pub fn frames(&self) -> usize {
        self.mono.len()
    }

    pub fn duration_s(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }

    pub fn mono(&self) -> &[f32] {
        &self.mono
    }

    /// One sample of `frame` (wrapped to the track) on `channel`
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        let frame = frame % self.frames();
        self.samples[frame * self.channels + channel % self.channels]
    }

    /// Frame index of a time offset, wrapped to the track length
    pub fn frame_at(&self, seconds: f32) -> u64 {
        let frame = (seconds.max(0.0) as f64 * self.sample_rate as f64) as u64;
        frame % self.frames() as u64
    }

    /// Fill `out` with the `len` mono samples that end just before `end_frame`
    ///
    /// The track loops, so the window wraps around its end.
    pub fn mono_window(&self, end_frame: u64, len: usize, out: &mut Vec<f32>) {
        let frames = self.frames() as i64;
        let start = (end_frame as i64 - len as i64).rem_euclid(frames) as usize;

        out.clear();
        out.extend((0..len).map(|i| self.mono[(start + i) % self.mono.len()]));
    }
}

/// Decode an audio file (WAV, MP3, FLAC, OGG) into memory
///
/// Any failure here is terminal for the visualization: it never reaches
/// steady state without a track.
pub fn decode_track(path: &Path) -> Result<Track> {
    let file = std::fs::File::open(path).map_err(|source| OrbError::OpenTrack {
        path: path.to_path_buf(),
        source,
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| OrbError::NoTrack(path.to_path_buf()))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(OrbError::UnknownSampleRate)?;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<f32> = Vec::new();
    let mut channels = track.codec_params.channels.map_or(0, |c| c.count());
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(_)) => {
                skipped_packets += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        if channels == 0 {
            channels = spec.channels.count();
        }

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sample_buf.samples());
    }

    if skipped_packets > 0 {
        log::warn!("Skipped {} undecodable packets", skipped_packets);
    }

    let track = Track::from_interleaved(samples, channels.max(1), sample_rate)?;

    log::info!(
        "Decoded {}: {} frames, {} ch, {}Hz, {:.1}s",
        path.display(),
        track.frames(),
        track.channels(),
        track.sample_rate(),
        track.duration_s()
    );

    Ok(track)
}
