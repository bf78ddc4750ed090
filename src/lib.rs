//! Plasmaorb library - audio-reactive plasma orb

pub mod audio;
pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod noise;
pub mod orb;
pub mod params;
pub mod preview;
pub mod recording;
pub mod visualizer;

pub use error::{OrbError, Result};
