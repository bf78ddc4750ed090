//! Parameter definitions with physical units and documented semantics.
//!
//! All tuning constants of the orb live here with:
//! - Units (seconds, Hz, bins, world units, radians per frame)
//! - Documented ranges and meanings
//! - Defaults equal to the calibrated look
//!
//! Every struct deserializes with `#[serde(default)]`, so a config file only
//! needs to name the fields it changes.

mod audio;
mod camera;
mod orb;
mod render;

// Re-export all types
pub use audio::{audio_constants, AnalyserConfig, BandLayout, PlaybackConfig};
pub use camera::{CameraPreset, DriftCamera, FixedCamera};
pub use orb::{parse_hex_color, OrbGeometry, OrbMotion, PaletteConfig};
pub use render::{RecordingConfig, RenderConfig};
