//! TOML configuration file: every section and field optional.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{OrbError, Result};
use crate::params::{
    AnalyserConfig, BandLayout, CameraPreset, OrbGeometry, OrbMotion, PaletteConfig,
    PlaybackConfig, RenderConfig,
};

/// File name looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "plasmaorb.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub audio: AnalyserConfig,
    /// Band bin ranges, expressed for a 2048-point analyser
    pub bands: BandLayout,
    pub playback: PlaybackConfig,
    pub motion: OrbMotion,
    pub geometry: OrbGeometry,
    pub palette: PaletteConfig,
    pub render: RenderConfig,
    pub camera: CameraPreset,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| OrbError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Band layout matched to the configured analyser size
    pub fn band_layout(&self) -> BandLayout {
        self.bands.fit_to(&self.audio)
    }

    pub fn validate(&self) -> Result<()> {
        self.audio.validate()?;
        self.band_layout()
            .validate(self.audio.frequency_bin_count())?;
        self.playback.validate()?;
        self.motion.validate()?;
        self.geometry.validate()?;
        self.render.validate()?;
        self.camera.validate()?;
        crate::orb::Palette::from_config(&self.palette)?;
        Ok(())
    }
}

/// Explicit path if given, else `plasmaorb.toml` when it exists
pub fn find_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    local.exists().then_some(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DriftCamera;

    #[test]
    fn test_empty_file_is_all_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections_override_fields() {
        let config = Config::from_toml_str(
            r##"
            [audio]
            smoothing = 0.6

            [motion]
            scale_response = 0.2

            [palette]
            cyan = "#00ffcc"

            [render]
            width = 640
            height = 360

            [camera.drift]
            distance = 10.0
            "##,
        )
        .unwrap();

        assert_eq!(config.audio.smoothing, 0.6);
        assert_eq!(config.audio.fft_size, 2048);
        assert_eq!(config.motion.scale_response, 0.2);
        assert_eq!(config.motion.scale_smoothing, 0.08);
        assert_eq!(config.palette.cyan, "#00ffcc");
        assert_eq!(config.palette.deep, "#1a0066");
        assert_eq!(config.render.width, 640);
        assert_eq!(
            config.camera,
            CameraPreset::Drift(DriftCamera {
                distance: 10.0,
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_fixed_camera_section() {
        let config = Config::from_toml_str(
            r#"
            [camera.fixed]
            position = [0.0, 2.0, 6.0]
            "#,
        )
        .unwrap();

        match config.camera {
            CameraPreset::Fixed(fixed) => {
                assert_eq!(fixed.position, [0.0, 2.0, 6.0]);
                assert_eq!(fixed.target, [0.0, 0.0, 0.0]);
            }
            other => panic!("expected fixed camera, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_bands() {
        let config = Config::from_toml_str(
            r#"
            [bands]
            bass = { start = 0, end = 10 }
            "#,
        )
        .unwrap();
        assert_eq!(config.bands.bass, 0..10);
        assert_eq!(config.bands.mid, 20..150);
    }

    #[test]
    fn test_smaller_fft_rescales_bands() {
        let config = Config::from_toml_str("[audio]\nfft_size = 1024\n").unwrap();
        let layout = config.band_layout();
        assert_eq!(layout.bass, 0..10);
        assert!(layout.treble.end <= 512);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::from_toml_str("[audio]\nfft_size = 1000\n").is_err());
        assert!(Config::from_toml_str("[playback]\nvolume = 2.0\n").is_err());
        assert!(Config::from_toml_str("[palette]\ndeep = \"blue\"\n").is_err());
        assert!(Config::from_toml_str("[unknown]\nkey = 1\n").is_err());
        assert!(matches!(
            Config::from_toml_str("[render\n"),
            Err(OrbError::ParseConfig(_))
        ));
    }

    #[test]
    fn test_degenerate_cameras_are_rejected() {
        let overhead = "[camera.fixed]\nposition = [0.0, 8.0, 0.0]\n";
        assert!(Config::from_toml_str(overhead).is_err());

        let on_target = "[camera.fixed]\nposition = [0.0, 0.0, 0.0]\n";
        assert!(Config::from_toml_str(on_target).is_err());

        let collapsed = "[camera.drift]\ndistance = 0.0\nsway = 0.0\n";
        assert!(matches!(
            Config::from_toml_str(collapsed),
            Err(OrbError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_accepted_cameras_give_finite_view() {
        let tilted =
            Config::from_toml_str("[camera.fixed]\nposition = [0.0, 8.0, 2.0]\n").unwrap();
        let camera = crate::camera::CameraSystem::new(tilted.camera);
        let (view_proj, _) = camera.create_view_proj_matrix(0.0, &tilted.render);
        assert!(view_proj.is_finite());
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = Config::load(Path::new("no/such/plasmaorb.toml")).unwrap_err();
        assert!(matches!(err, OrbError::ReadConfig { .. }));
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = Path::new("custom.toml");
        assert_eq!(find_config_path(Some(path)), Some(path.to_path_buf()));
    }
}
