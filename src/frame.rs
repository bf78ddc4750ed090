//! Per-frame driver: clock, band extraction and orb motion.

use crate::audio::{
    AnalysisSource, PlaybackEvent, PlaybackState, SpectralExtractor, SpectralFrame,
    TransportCommand,
};
use crate::orb::{OrbTransform, Palette, ShadingParameters};
use crate::params::{BandLayout, OrbMotion};

/// Everything one tick produces for the orb system and renderer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameState {
    pub spectral: SpectralFrame,
    pub params: ShadingParameters,
    pub transform: OrbTransform,
}

/// Exponential approach of `current` toward `target`
pub fn smooth_toward(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// Owns all mutable per-frame state; the only thing the frame loop talks to
pub struct FrameDriver {
    extractor: SpectralExtractor,
    playback: PlaybackState,
    motion: OrbMotion,
    palette: Palette,
    transform: OrbTransform,
    /// Shading clock (seconds), advanced only while playing
    elapsed_s: f32,
}

impl FrameDriver {
    pub fn new(
        layout: BandLayout,
        motion: OrbMotion,
        palette: Palette,
        playback: PlaybackState,
    ) -> Self {
        Self {
            extractor: SpectralExtractor::new(layout),
            playback,
            motion,
            palette,
            transform: OrbTransform::default(),
            elapsed_s: 0.0,
        }
    }

    /// Forward a transport event, returning what the audio output must do
    pub fn handle_event(&mut self, event: PlaybackEvent) -> Option<TransportCommand> {
        let command = self.playback.handle(event);
        log::debug!(
            "{:?} -> {:?} (command {:?})",
            event,
            self.playback.status(),
            command
        );
        command
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn elapsed_s(&self) -> f32 {
        self.elapsed_s
    }

    pub fn transform(&self) -> &OrbTransform {
        &self.transform
    }

    pub fn extractor(&self) -> &SpectralExtractor {
        &self.extractor
    }

    /// Advance one frame
    ///
    /// While paused the clock, rotation and scale are frozen and the band
    /// levels are held, so the orb stands still and resumes without a jump.
    pub fn tick(
        &mut self,
        delta_s: f32,
        source: Option<&mut dyn AnalysisSource>,
    ) -> FrameState {
        let playing = self.playback.is_playing();

        if playing && delta_s.is_finite() && delta_s > 0.0 {
            self.elapsed_s += delta_s;
        }

        let spectral = self.extractor.extract(source, playing, self.elapsed_s);

        if playing {
            self.transform.rotation_y += self.motion.rotation_rate_y;
            self.transform.rotation_x += self.motion.rotation_rate_x;

            let target = 1.0 + spectral.bass * self.motion.scale_response;
            self.transform.scale =
                smooth_toward(self.transform.scale, target, self.motion.scale_smoothing);
        }

        FrameState {
            spectral,
            params: ShadingParameters::from_spectral(self.elapsed_s, &spectral, self.palette),
            transform: self.transform,
        }
    }
}
