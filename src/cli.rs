//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::params::RecordingConfig;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "plasmaorb")]
#[command(about = "Audio-reactive plasma orb visualizer", long_about = None)]
pub struct Args {
    /// Audio file to play and visualize (WAV, MP3, FLAC, OGG)
    pub track: PathBuf,

    /// Config file (defaults to ./plasmaorb.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Render offline to PNG frames plus audio.wav (duration in seconds)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,

    /// Frame rate for the live loop and for recording
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Output directory for recordings and snapshots
    #[arg(long, value_name = "DIR", default_value = "recording")]
    pub output: String,

    /// Playback start position (seconds, wrapped to the track length)
    #[arg(long, value_name = "SECONDS")]
    pub start_offset: Option<f32>,

    /// Initial volume (0.0 - 1.0)
    #[arg(long)]
    pub volume: Option<f32>,

    /// Output width (pixels)
    #[arg(long)]
    pub width: Option<u32>,

    /// Output height (pixels)
    #[arg(long)]
    pub height: Option<u32>,
}

impl Args {
    /// Apply values given on the command line over the file configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(offset) = self.start_offset {
            config.playback.start_offset_s = offset;
        }
        if let Some(volume) = self.volume {
            config.playback.volume = volume;
        }
        if let Some(width) = self.width {
            config.render.width = width;
        }
        if let Some(height) = self.height {
            config.render.height = height;
        }
    }

    /// Create recording configuration if recording mode is enabled
    pub fn create_recording_config(&self) -> Option<RecordingConfig> {
        self.record
            .map(|duration| RecordingConfig::new(duration, self.output.clone(), self.fps))
    }
}
