//! Frame loop wiring: driver -> orb system -> renderer buffers.

use glam::{Mat4, Vec3};

use crate::audio::{AnalysisSource, PlaybackEvent, PlaybackState, TransportCommand};
use crate::camera::CameraSystem;
use crate::config::Config;
use crate::error::Result;
use crate::frame::{FrameDriver, FrameState};
use crate::orb::{OrbSystem, OrbUniforms, Palette, ShadedVertex};
use crate::params::RenderConfig;
use crate::preview::PreviewRenderer;

/// The whole visual side of the app for one track
pub struct Visualizer {
    driver: FrameDriver,
    orb: OrbSystem,
    camera: CameraSystem,
    render_config: RenderConfig,

    state: Option<FrameState>,
    view_proj: Mat4,
    eye: Vec3,
    vertices: Vec<ShadedVertex>,
    halo_vertices: Vec<ShadedVertex>,
}

impl Visualizer {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let driver = FrameDriver::new(
            config.band_layout(),
            config.motion.clone(),
            Palette::from_config(&config.palette)?,
            PlaybackState::new(config.playback.volume),
        );

        let mut visualizer = Self {
            driver,
            orb: OrbSystem::new(&config.geometry),
            camera: CameraSystem::new(config.camera.clone()),
            render_config: config.render.clone(),
            state: None,
            view_proj: Mat4::IDENTITY,
            eye: Vec3::ZERO,
            vertices: Vec::new(),
            halo_vertices: Vec::new(),
        };
        log::info!("Camera: {:?}", visualizer.camera.preset());
        visualizer.advance(0.0, None);
        Ok(visualizer)
    }

    /// Forward a transport event to the playback state
    pub fn handle_event(&mut self, event: PlaybackEvent) -> Option<TransportCommand> {
        self.driver.handle_event(event)
    }

    pub fn driver(&self) -> &FrameDriver {
        &self.driver
    }

    /// Tick the driver, then re-evaluate the orb for the new frame
    pub fn advance(
        &mut self,
        delta_s: f32,
        source: Option<&mut dyn AnalysisSource>,
    ) -> FrameState {
        let state = self.driver.tick(delta_s, source);

        let (view_proj, eye) = self
            .camera
            .create_view_proj_matrix(state.params.time(), &self.render_config);
        self.view_proj = view_proj;
        self.eye = eye;

        self.orb
            .evaluate(&state.params, &state.transform, eye, &mut self.vertices);
        self.orb
            .evaluate_halo(&state.params, &state.transform, eye, &mut self.halo_vertices);

        self.state = Some(state);
        state
    }

    /// Last state produced by [`Visualizer::advance`]
    pub fn state(&self) -> Option<&FrameState> {
        self.state.as_ref()
    }

    pub fn vertices(&self) -> &[ShadedVertex] {
        &self.vertices
    }

    pub fn halo_vertices(&self) -> &[ShadedVertex] {
        &self.halo_vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.orb.orb_mesh().indices
    }

    pub fn halo_indices(&self) -> &[u32] {
        &self.orb.halo_mesh().indices
    }

    pub fn uniforms(&self) -> Option<OrbUniforms> {
        self.state.map(|s| s.params.uniforms())
    }

    pub fn view_proj(&self) -> Mat4 {
        self.view_proj
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// Draw the current buffers: halo first, then the orb over it
    pub fn render(&self, renderer: &mut PreviewRenderer) {
        renderer.clear();
        renderer.draw_halo(&self.halo_vertices, self.halo_indices(), self.view_proj);
        renderer.draw_orb(&self.vertices, self.indices(), self.view_proj);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{CameraPreset, FixedCamera, OrbGeometry};

    fn small_config() -> Config {
        Config {
            geometry: OrbGeometry {
                subdivisions: 2,
                halo_subdivisions: 1,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_buffers_ready_after_construction() {
        let visualizer = Visualizer::new(&small_config()).unwrap();

        assert_eq!(visualizer.vertices().len(), 162);
        assert_eq!(visualizer.halo_vertices().len(), 42);
        assert_eq!(visualizer.indices().len(), 320 * 3);
        assert!(visualizer.uniforms().is_some());
        assert_eq!(visualizer.eye().z, 8.0);
    }

    #[test]
    fn test_advance_is_frozen_until_loaded() {
        let mut visualizer = Visualizer::new(&small_config()).unwrap();
        let before = visualizer.vertices().to_vec();

        visualizer.advance(1.0, None);
        assert_eq!(visualizer.vertices(), before.as_slice());

        visualizer.handle_event(PlaybackEvent::Start);
        visualizer.handle_event(PlaybackEvent::Loaded);
        visualizer.advance(1.0, None);
        assert_ne!(visualizer.vertices(), before.as_slice());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = small_config();
        config.render.width = 0;
        assert!(Visualizer::new(&config).is_err());
    }

    #[test]
    fn test_overhead_fixed_camera_is_rejected() {
        let mut config = small_config();
        config.camera = CameraPreset::Fixed(FixedCamera {
            position: [0.0, 8.0, 0.0],
            ..Default::default()
        });
        assert!(Visualizer::new(&config).is_err());
    }

    #[test]
    fn test_camera_uses_configured_preset() {
        let mut config = small_config();
        let fixed = CameraPreset::Fixed(FixedCamera::default());
        config.camera = fixed.clone();

        let visualizer = Visualizer::new(&config).unwrap();
        assert_eq!(visualizer.camera.preset(), &fixed);
        assert!(visualizer.view_proj().is_finite());
    }
}
