//! End-to-end checks: analysis source -> frame driver -> orb -> preview.

use std::f32::consts::PI;
use std::sync::Arc;

use glam::Vec3;

use plasmaorb::audio::{
    AnalysisSource, PlaybackEvent, PlaybackState, Playhead, SpectrumAnalyser, Track,
    TrackAnalyser,
};
use plasmaorb::config::Config;
use plasmaorb::frame::FrameDriver;
use plasmaorb::orb::{
    blend_palette, brightness, deform, displacement_intensity, flow_scalars, fresnel, mix, pulse,
    shade, white_mix, OrbMesh, OrbSystem, Palette,
};
use plasmaorb::params::{AnalyserConfig, BandLayout, OrbGeometry, OrbMotion, RenderConfig};
use plasmaorb::preview::PreviewRenderer;
use plasmaorb::visualizer::Visualizer;

struct Silence;

impl AnalysisSource for Silence {
    fn frequency_bin_count(&self) -> usize {
        1024
    }

    fn byte_frequency_data(&mut self, bins: &mut [u8]) {
        bins.fill(0);
    }
}

fn small_config() -> Config {
    Config {
        geometry: OrbGeometry {
            subdivisions: 3,
            halo_subdivisions: 2,
            ..Default::default()
        },
        render: RenderConfig {
            width: 160,
            height: 90,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn bass_tone_track() -> Arc<Track> {
    let samples = (0..44100 * 3)
        .map(|i| 0.5 * (2.0 * PI * 100.0 * i as f32 / 44100.0).sin())
        .collect();
    Arc::new(Track::from_interleaved(samples, 1, 44100).unwrap())
}

#[test]
fn silent_frame_uses_base_intensity_and_brightness() {
    let mut driver = FrameDriver::new(
        BandLayout::CALIBRATED,
        OrbMotion::default(),
        Palette::default(),
        PlaybackState::new(0.7),
    );
    driver.handle_event(PlaybackEvent::Start);
    driver.handle_event(PlaybackEvent::Loaded);

    let state = driver.tick(2.0, Some(&mut Silence));
    let params = state.params;
    assert_eq!(displacement_intensity(params.bass(), params.mid()), 0.12);

    let mesh = OrbMesh::icosphere(2.8, 2);
    let camera = Vec3::new(0.0, 0.0, 8.0);

    for point in mesh.points.iter().step_by(7) {
        let deformed = deform(point, &params);
        assert!((deformed.displacement - deformed.elevation * 0.12).abs() < 1e-6);

        let f = fresnel(camera - point.position, point.normal);
        let expected = 0.6 + deformed.elevation * 0.3 + f * 0.4;
        assert!((brightness(deformed.elevation, f, 0.0, 0.0) - expected).abs() < 1e-6);

        let shaded = shade(
            point.position,
            point.normal,
            camera - point.position,
            deformed.elevation,
            &params,
        );
        let base = blend_palette(params.palette(), flow_scalars(point.position, params.time()));
        let color = mix(base, Vec3::ONE, white_mix(deformed.elevation, f, 0.0));
        let want = color * expected * pulse(params.time());
        assert!((shaded.color - want).abs().max_element() < 1e-5);
    }
}

#[test]
fn bass_tone_drives_bass_band_and_scale() {
    let track = bass_tone_track();
    let playhead = Playhead::new(track.frame_at(1.0));
    let analyser = SpectrumAnalyser::new(AnalyserConfig::default()).unwrap();
    let mut source = TrackAnalyser::new(analyser, Arc::clone(&track), playhead.clone());

    let mut visualizer = Visualizer::new(&small_config()).unwrap();
    visualizer.handle_event(PlaybackEvent::Start);
    visualizer.handle_event(PlaybackEvent::Loaded);

    let mut last = None;
    for i in 0..30u64 {
        playhead.set(44100 + i * 735);
        last = Some(visualizer.advance(1.0 / 60.0, Some(&mut source)));
    }
    let state = last.unwrap();

    assert!(state.spectral.bass > 0.1, "bass {}", state.spectral.bass);
    assert!(state.spectral.bass > state.spectral.treble);
    assert!(state.transform.scale > 1.0);
    assert!(state.transform.scale < 1.1);
    assert_eq!(visualizer.driver().extractor().history().len(), 30);
}

#[test]
fn preview_shows_orb_over_background() {
    let config = small_config();
    let mut visualizer = Visualizer::new(&config).unwrap();
    visualizer.handle_event(PlaybackEvent::Start);
    visualizer.handle_event(PlaybackEvent::Loaded);
    visualizer.advance(0.5, Some(&mut Silence));

    let mut renderer = PreviewRenderer::new(&config.render).unwrap();
    visualizer.render(&mut renderer);
    let image = renderer.to_image();

    let background = image.get_pixel(0, 0).0;
    assert_eq!(background, [0x05, 0x00, 0x08, 255]);
    assert_ne!(image.get_pixel(80, 45).0, background);

    // Orb radius 2.8 at distance 8 covers a good part of the frame
    let lit = image.pixels().filter(|p| p.0 != background).count();
    assert!(lit > (160 * 90) / 10, "only {} pixels lit", lit);
}

#[test]
fn orb_system_matches_standalone_deformation() {
    let geometry = OrbGeometry {
        subdivisions: 1,
        ..Default::default()
    };
    let system = OrbSystem::new(&geometry);
    let mut visualizer_config = small_config();
    visualizer_config.geometry = geometry;
    let mut visualizer = Visualizer::new(&visualizer_config).unwrap();
    visualizer.handle_event(PlaybackEvent::Start);
    visualizer.handle_event(PlaybackEvent::Loaded);
    let state = visualizer.advance(1.0, Some(&mut Silence));

    // Vertices come out in world space
    let model = state.transform.model_matrix();
    for (point, vertex) in system.orb_mesh().points.iter().zip(visualizer.vertices()) {
        let local = deform(point, &state.params).position;
        let world = model.transform_point3(local);
        assert!((world - Vec3::from_array(vertex.position)).abs().max_element() < 1e-5);
    }
}
