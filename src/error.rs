//! Error type shared by setup, configuration and output paths.
//!
//! The per-frame core (extraction, deformation, shading) never fails; every
//! variant here belongs to loading, configuring or writing something.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrbError {
    #[error("failed to open audio file {path}: {source}")]
    OpenTrack {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode audio: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("no playable audio track in {0}")]
    NoTrack(PathBuf),

    #[error("audio track has an unknown sample rate")]
    UnknownSampleRate,

    #[error("audio track contains no samples")]
    EmptyTrack,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid color {0:?} (expected #rrggbb)")]
    InvalidColor(String),

    #[error("failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ParseConfig(#[from] toml::de::Error),

    #[error("no audio output device found")]
    NoOutputDevice,

    #[error("failed to query audio output config: {0}")]
    StreamConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("failed to write audio: {0}")]
    Wav(#[from] hound::Error),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OrbError>;
