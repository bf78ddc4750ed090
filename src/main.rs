//! Plasmaorb - an audio-reactive plasma orb
//!
//! A glowing sphere that breathes with the bass, ripples with the mids and
//! sparkles with the treble of whatever track it is fed.

use std::io::BufRead;
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use plasmaorb::audio::{
    decode_track, AudioOutput, PlaybackEvent, SpectrumAnalyser, Track, TrackAnalyser,
};
use plasmaorb::cli::Args;
use plasmaorb::config::{find_config_path, Config};
use plasmaorb::preview::PreviewRenderer;
use plasmaorb::recording::record;
use plasmaorb::visualizer::Visualizer;

/// Volume change per `+` / `-` command
const VOLUME_STEP: f32 = 0.1;

/// Commands typed on stdin, forwarded to the frame loop
#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    TogglePlay,
    ToggleMute,
    Volume(f32),
    Snapshot,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "p" | "space" => Some(Command::TogglePlay),
        "m" => Some(Command::ToggleMute),
        "+" => Some(Command::Volume(VOLUME_STEP)),
        "-" => Some(Command::Volume(-VOLUME_STEP)),
        "s" => Some(Command::Snapshot),
        "q" | "quit" => Some(Command::Quit),
        _ => None,
    }
}

fn spawn_command_thread() -> mpsc::Receiver<Command> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Some(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                None => log::warn!("Unknown command {:?} (p, m, +, -, s, q)", line.trim()),
            }
        }
    });
    rx
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match find_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    args.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn load_track(path: &Path) -> Result<Arc<Track>> {
    let track = decode_track(path).with_context(|| format!("failed to load {}", path.display()))?;
    Ok(Arc::new(track))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    if let Some(recording) = args.create_recording_config() {
        let track = load_track(&args.track)?;
        return record(&config, track, &recording).context("recording failed");
    }

    run_live(&args, &config)
}

/// Play the track on the default output and drive the orb at `args.fps`
fn run_live(args: &Args, config: &Config) -> Result<()> {
    let mut visualizer = Visualizer::new(config)?;

    visualizer.handle_event(PlaybackEvent::Start);
    let loaded = load_track(&args.track).and_then(|track| {
        let start = track.frame_at(config.playback.start_offset_s);
        let output = AudioOutput::open(Arc::clone(&track), start)
            .context("failed to open audio output")?;
        Ok((track, output))
    });
    let (track, output) = match loaded {
        Ok(loaded) => loaded,
        Err(err) => {
            visualizer.handle_event(PlaybackEvent::LoadFailed);
            return Err(err);
        }
    };
    if let Some(command) = visualizer.handle_event(PlaybackEvent::Loaded) {
        output.apply(command);
    }

    let analyser = SpectrumAnalyser::new(config.audio.clone())?;
    let mut source = TrackAnalyser::new(analyser, track, output.playhead());

    log::info!("Plasmaorb is running ({} fps)", args.fps);
    log::info!("Commands: p = play/pause, m = mute, +/- = volume, s = snapshot, q = quit");

    let commands = spawn_command_thread();
    let frame_interval = Duration::from_secs_f64(1.0 / args.fps.max(1) as f64);
    let mut renderer: Option<PreviewRenderer> = None;
    let mut snapshots = 0usize;

    let mut last_frame = Instant::now();
    let mut fps_window = Instant::now();
    let mut frames_in_window = 0u32;

    loop {
        for command in commands.try_iter() {
            let event = match command {
                Command::TogglePlay => PlaybackEvent::TogglePlay,
                Command::ToggleMute => PlaybackEvent::ToggleMute,
                Command::Volume(step) => {
                    PlaybackEvent::SetVolume(visualizer.driver().playback().volume() + step)
                }
                Command::Snapshot => {
                    if renderer.is_none() {
                        renderer = Some(PreviewRenderer::new(&config.render)?);
                    }
                    let Some(renderer) = renderer.as_mut() else {
                        continue;
                    };
                    std::fs::create_dir_all(&args.output)?;
                    let path = format!("{}/snapshot_{:05}.png", args.output, snapshots);
                    visualizer.render(renderer);
                    renderer.save(&path)?;
                    snapshots += 1;
                    log::info!("Saved {}", path);
                    continue;
                }
                Command::Quit => {
                    log::info!("Quit requested");
                    return Ok(());
                }
            };
            if let Some(command) = visualizer.handle_event(event) {
                output.apply(command);
            }
            log::info!(
                "Playback {:?}, volume {:.1}",
                visualizer.driver().playback().status(),
                visualizer.driver().playback().volume()
            );
        }

        let now = Instant::now();
        let delta_s = (now - last_frame).as_secs_f32();
        last_frame = now;

        let state = visualizer.advance(delta_s, Some(&mut source));

        frames_in_window += 1;
        if fps_window.elapsed() >= Duration::from_secs(1) {
            log::info!(
                "{} fps | bass {:.2} mid {:.2} treble {:.2} | scale {:.3} | t {:.1}s",
                frames_in_window,
                state.spectral.bass,
                state.spectral.mid,
                state.spectral.treble,
                state.transform.scale,
                state.params.time()
            );
            log::debug!(
                "bass history: avg {:.2}, peak {:.2}",
                visualizer.driver().extractor().history().average(),
                visualizer.driver().extractor().history().peak()
            );
            frames_in_window = 0;
            fps_window = Instant::now();
        }

        if let Some(remaining) = frame_interval.checked_sub(now.elapsed()) {
            thread::sleep(remaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(" p \n"), Some(Command::TogglePlay));
        assert_eq!(parse_command("m"), Some(Command::ToggleMute));
        assert_eq!(parse_command("-"), Some(Command::Volume(-VOLUME_STEP)));
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command("x"), None);
    }
}
