//! Offline recording: numbered PNG frames plus the matching audio segment.

use std::path::Path;
use std::sync::Arc;

use crate::audio::{PlaybackEvent, Playhead, SpectrumAnalyser, Track, TrackAnalyser};
use crate::config::Config;
use crate::error::Result;
use crate::params::RecordingConfig;
use crate::preview::PreviewRenderer;
use crate::visualizer::Visualizer;

/// Render `recording.duration_secs` of `track` starting at the configured offset
///
/// The playhead is driven by the frame clock rather than an output device,
/// so the result is identical on every run.
pub fn record(config: &Config, track: Arc<Track>, recording: &RecordingConfig) -> Result<()> {
    recording.validate()?;
    std::fs::create_dir_all(recording.frames_dir())?;

    let mut visualizer = Visualizer::new(config)?;
    visualizer.handle_event(PlaybackEvent::Start);
    visualizer.handle_event(PlaybackEvent::Loaded);

    let start_frame = track.frame_at(config.playback.start_offset_s);
    let playhead = Playhead::new(start_frame);
    let analyser = SpectrumAnalyser::new(config.audio.clone())?;
    let mut source = TrackAnalyser::new(analyser, Arc::clone(&track), playhead.clone());
    let mut renderer = PreviewRenderer::new(&config.render)?;

    let total_frames = recording.total_frames();
    let interval_s = recording.frame_interval_s();
    let samples_per_frame = track.sample_rate() as f64 / recording.fps as f64;

    log::info!(
        "Recording {} frames at {} fps ({}x{}) to {}",
        total_frames,
        recording.fps,
        config.render.width,
        config.render.height,
        recording.output_dir
    );

    for index in 0..total_frames {
        let offset = (index as f64 * samples_per_frame).round() as u64;
        playhead.set((start_frame + offset) % track.frames() as u64);

        let state = visualizer.advance(interval_s, Some(&mut source));
        visualizer.render(&mut renderer);
        renderer.save(recording.frame_path(index))?;

        if (index + 1) % recording.fps as usize == 0 {
            log::info!(
                "Frame {}/{} (bass {:.2}, mid {:.2}, treble {:.2})",
                index + 1,
                total_frames,
                state.spectral.bass,
                state.spectral.mid,
                state.spectral.treble
            );
        }
    }

    let audio_frames = (total_frames as f64 * samples_per_frame).round() as usize;
    write_audio_segment(&track, start_frame, audio_frames, recording.audio_path())?;

    log::info!("Recording complete: {}", recording.output_dir);
    Ok(())
}

/// Write `frames` frames of `track` from `start_frame` (looping) as 32-bit float WAV
pub fn write_audio_segment(
    track: &Track,
    start_frame: u64,
    frames: usize,
    path: impl AsRef<Path>,
) -> Result<()> {
    let spec = hound::WavSpec {
        channels: track.channels() as u16,
        sample_rate: track.sample_rate(),
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;

    let start = start_frame as usize;
    for frame in start..start + frames {
        for channel in 0..track.channels() {
            writer.write_sample(track.sample(frame, channel))?;
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{OrbGeometry, RenderConfig};

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("plasmaorb-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn stereo_ramp(frames: usize) -> Track {
        let samples = (0..frames)
            .flat_map(|i| {
                let v = i as f32 / frames as f32;
                [v, -v]
            })
            .collect();
        Track::from_interleaved(samples, 2, 8000).unwrap()
    }

    #[test]
    fn test_audio_segment_wraps_and_keeps_channels() {
        let dir = scratch_dir("segment");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("audio.wav");
        let track = stereo_ramp(100);

        write_audio_segment(&track, 90, 20, &path).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 8000);
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 40);
        assert_eq!(samples[0], track.sample(90, 0));
        // Frame 100 wraps to frame 0
        assert_eq!(samples[20], 0.0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_record_writes_frames_and_audio() {
        let dir = scratch_dir("record");
        let config = Config {
            geometry: OrbGeometry {
                subdivisions: 1,
                halo_subdivisions: 0,
                ..Default::default()
            },
            render: RenderConfig {
                width: 48,
                height: 32,
                ..Default::default()
            },
            ..Default::default()
        };
        let track = Arc::new(stereo_ramp(16000));
        let recording = RecordingConfig::new(0.5, dir.to_string_lossy(), 4);

        record(&config, track, &recording).unwrap();

        for index in 0..2 {
            let frame = image::open(recording.frame_path(index)).unwrap();
            assert_eq!((frame.width(), frame.height()), (48, 32));
        }
        let reader = hound::WavReader::open(recording.audio_path()).unwrap();
        // 2 frames at 4 fps = 0.5 s of 8 kHz audio
        assert_eq!(reader.duration(), 4000);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
