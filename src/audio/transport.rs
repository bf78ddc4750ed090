//! Playback state machine and the cpal output stream that realises it.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::Track;
use crate::error::{OrbError, Result};
use crate::params::audio_constants::DEFAULT_VOLUME;

/// Where the transport is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Nothing loaded yet
    Idle,
    /// Asset is being decoded
    Loading,
    Playing,
    Paused,
    /// Asset failed to load; a new `Start` may retry
    Failed,
}

/// Input events the host dispatcher forwards to the playback state
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlaybackEvent {
    Start,
    Loaded,
    LoadFailed,
    TogglePlay,
    SetVolume(f32),
    ToggleMute,
}

/// Side effect a state transition asks of the audio output
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransportCommand {
    /// Begin playback at the given gain
    Begin { gain: f32 },
    Suspend,
    Resume,
    SetGain(f32),
}

/// Explicit playback state, mutated only through [`PlaybackState::handle`]
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackState {
    status: PlaybackStatus,
    volume: f32,
    /// Volume restored by unmute
    last_volume: f32,
}

impl PlaybackState {
    pub fn new(volume: f32) -> Self {
        let volume = volume.clamp(0.0, 1.0);
        Self {
            status: PlaybackStatus::Idle,
            volume,
            last_volume: if volume > 0.0 { volume } else { DEFAULT_VOLUME },
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// The only flag the visual core reads
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Apply one event, returning the command the output should carry out
    pub fn handle(&mut self, event: PlaybackEvent) -> Option<TransportCommand> {
        use PlaybackStatus::*;

        match (event, self.status) {
            (PlaybackEvent::Start, Idle | Failed) => {
                self.status = Loading;
                None
            }
            (PlaybackEvent::Loaded, Loading) => {
                self.status = Playing;
                Some(TransportCommand::Begin { gain: self.volume })
            }
            (PlaybackEvent::LoadFailed, Loading) => {
                self.status = Failed;
                None
            }
            (PlaybackEvent::TogglePlay, Playing) => {
                self.status = Paused;
                Some(TransportCommand::Suspend)
            }
            (PlaybackEvent::TogglePlay, Paused) => {
                self.status = Playing;
                Some(TransportCommand::Resume)
            }
            (PlaybackEvent::SetVolume(volume), _) => {
                if !volume.is_finite() {
                    return None;
                }
                self.volume = volume.clamp(0.0, 1.0);
                if self.volume > 0.0 {
                    self.last_volume = self.volume;
                }
                Some(TransportCommand::SetGain(self.volume))
            }
            (PlaybackEvent::ToggleMute, _) => {
                if self.volume > 0.0 {
                    self.last_volume = self.volume;
                    self.volume = 0.0;
                } else {
                    self.volume = self.last_volume;
                }
                Some(TransportCommand::SetGain(self.volume))
            }
            (event, status) => {
                log::debug!("Ignoring {:?} while {:?}", event, status);
                None
            }
        }
    }
}

/// Shared frame position of the playing track
#[derive(Clone, Debug, Default)]
pub struct Playhead(Arc<AtomicU64>);

impl Playhead {
    pub fn new(frame: u64) -> Self {
        Self(Arc::new(AtomicU64::new(frame)))
    }

    pub fn frame(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, frame: u64) {
        self.0.store(frame, Ordering::Relaxed);
    }
}

/// State shared with the audio callback
struct OutputControl {
    paused: AtomicBool,
    gain_bits: AtomicU32,
}

impl OutputControl {
    fn gain(&self) -> f32 {
        f32::from_bits(self.gain_bits.load(Ordering::Relaxed))
    }

    fn set_gain(&self, gain: f32) {
        self.gain_bits.store(gain.to_bits(), Ordering::Relaxed);
    }
}

/// Looping track playback on the default output device
pub struct AudioOutput {
    control: Arc<OutputControl>,
    playhead: Playhead,

    /// Audio output stream (kept alive)
    _stream: cpal::Stream,
}

impl AudioOutput {
    /// Open the default output device and start playing `track` from `start_frame`
    ///
    /// The stream starts suspended; a [`TransportCommand::Begin`] starts it.
    pub fn open(track: Arc<Track>, start_frame: u64) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(OrbError::NoOutputDevice)?;

        let config: cpal::StreamConfig = device.default_output_config()?.into();

        log::info!(
            "Audio: {} @ {}Hz, {} channels",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            config.sample_rate.0,
            config.channels
        );

        let control = Arc::new(OutputControl {
            paused: AtomicBool::new(true),
            gain_bits: AtomicU32::new(0f32.to_bits()),
        });
        let playhead = Playhead::new(start_frame);

        let control_cb = Arc::clone(&control);
        let playhead_cb = playhead.clone();
        let out_channels = config.channels.max(1) as usize;
        let frames = track.frames() as f64;
        // Nearest-sample resampling when device and track rates differ
        let step = track.sample_rate() as f64 / config.sample_rate.0 as f64;
        let mut cursor = start_frame as f64 % frames;

        if step != 1.0 {
            log::warn!(
                "Track is {}Hz, device is {}Hz; resampling by sample stepping",
                track.sample_rate(),
                config.sample_rate.0
            );
        }

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                if control_cb.paused.load(Ordering::Relaxed) {
                    data.fill(0.0);
                    return;
                }

                let gain = control_cb.gain();
                for frame in data.chunks_mut(out_channels) {
                    let index = cursor as usize;
                    for (channel, sample) in frame.iter_mut().enumerate() {
                        *sample = track.sample(index, channel) * gain;
                    }

                    cursor += step;
                    while cursor >= frames {
                        cursor -= frames;
                    }
                }
                playhead_cb.set(cursor as u64);
            },
            |err| log::error!("Audio stream error: {}", err),
            None,
        )?;

        stream.play()?;

        Ok(Self {
            control,
            playhead,
            _stream: stream,
        })
    }

    /// Carry out a command produced by [`PlaybackState::handle`]
    pub fn apply(&self, command: TransportCommand) {
        match command {
            TransportCommand::Begin { gain } => {
                self.control.set_gain(gain);
                self.control.paused.store(false, Ordering::Relaxed);
            }
            TransportCommand::Suspend => self.control.paused.store(true, Ordering::Relaxed),
            TransportCommand::Resume => self.control.paused.store(false, Ordering::Relaxed),
            TransportCommand::SetGain(gain) => self.control.set_gain(gain),
        }
    }

    pub fn playhead(&self) -> Playhead {
        self.playhead.clone()
    }
}
