//! blipbox CLI: real-time demo and offline WAV rendering.
//!
//! Usage:
//!   blipbox play --seconds 10
//!   blipbox render out.wav --seconds 8
//!   blipbox --config blipbox.toml play

use anyhow::{bail, Context, Result};
use bb_master::{CpalOutput, EngineConfig, EngineState, OfflineOutput, Sfx, SoundEngine, WakeupMode};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "blipbox", about = "Procedural game audio engine")]
struct Cli {
    /// Engine configuration (TOML). Defaults apply when missing.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play the music loop on the default device, firing effects as it goes.
    Play {
        #[arg(long, default_value_t = 10.0)]
        seconds: f64,
        /// Music volume; the configured default when unset.
        #[arg(long)]
        volume: Option<f32>,
        /// Interval between effects; 0 disables them.
        #[arg(long, default_value_t = 750)]
        sfx_interval_ms: u64,
    },
    /// Render a session offline to a 16-bit stereo WAV file.
    Render {
        output: PathBuf,
        #[arg(long, default_value_t = 8.0)]
        seconds: f64,
        #[arg(long)]
        volume: Option<f32>,
        #[arg(long, default_value_t = 750)]
        sfx_interval_ms: u64,
        #[arg(long)]
        sample_rate: Option<u32>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load_or_default(path),
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Play { seconds, volume, sfx_interval_ms } => play(config, seconds, volume, sfx_interval_ms),
        Command::Render { output, seconds, volume, sfx_interval_ms, sample_rate } => {
            render(config, &output, seconds, volume, sfx_interval_ms, sample_rate)
        }
    }
}

/// Effect fired on the `n`th interval.
fn sfx_for(n: usize) -> Sfx {
    Sfx::ALL[n % Sfx::ALL.len()]
}

fn play(config: EngineConfig, seconds: f64, volume: Option<f32>, sfx_interval_ms: u64) -> Result<()> {
    let manual = config.wakeup == WakeupMode::Manual;
    let lookahead = config.sequencer.lookahead();
    let teardown = Duration::from_secs_f64(config.mix.teardown_delay_s);
    let volume = volume.unwrap_or(config.mix.bgm_volume);

    let mut engine = SoundEngine::<CpalOutput>::new(config);
    engine.init();
    if engine.state() == EngineState::Uninitialized {
        bail!("no usable audio output device");
    }
    engine.play_bgm(volume);
    let device = engine.output().and_then(|o| o.device_name()).unwrap_or_else(|| "default device".into());
    println!("Playing on {} for {:.1}s...", device, seconds);

    let started = Instant::now();
    let run_for = Duration::from_secs_f64(seconds.max(0.0));
    let sfx_interval = Duration::from_millis(sfx_interval_ms);
    let mut fired = 0usize;
    while started.elapsed() < run_for {
        thread::sleep(lookahead);
        if manual {
            engine.tick();
        }
        if sfx_interval_ms > 0 && started.elapsed() >= sfx_interval * (fired as u32 + 1) {
            engine.play_sfx(sfx_for(fired), 1.0);
            fired += 1;
        }
    }

    engine.stop_bgm();
    thread::sleep(teardown);
    engine.shutdown();
    println!("Done. {} effects fired.", fired);
    Ok(())
}

fn render(
    mut config: EngineConfig,
    path: &Path,
    seconds: f64,
    volume: Option<f32>,
    sfx_interval_ms: u64,
    sample_rate: Option<u32>,
) -> Result<()> {
    config.wakeup = WakeupMode::Manual;
    if sample_rate.is_some() {
        config.output.sample_rate = sample_rate;
    }
    let tail = config.mix.teardown_delay_s + 0.3;
    let volume = volume.unwrap_or(config.mix.bgm_volume);

    let mut engine = SoundEngine::<OfflineOutput>::new(config);
    engine.play_bgm(volume);
    if engine.state() != EngineState::Playing {
        bail!("offline output failed to open");
    }

    let mut frames = Vec::new();
    if sfx_interval_ms == 0 {
        frames.extend(engine.render_seconds(seconds));
    } else {
        let step = sfx_interval_ms as f64 / 1000.0;
        let mut elapsed = 0.0;
        let mut fired = 0usize;
        while elapsed < seconds {
            let span = step.min(seconds - elapsed);
            frames.extend(engine.render_seconds(span));
            elapsed += span;
            if elapsed < seconds {
                engine.play_sfx(sfx_for(fired), 1.0);
                fired += 1;
            }
        }
    }
    engine.stop_bgm();
    frames.extend(engine.render_seconds(tail));

    let rate = engine.sample_rate().unwrap_or_default();
    bb_master::write_wav(path, &frames, rate).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {} frames ({:.2}s) to {}", frames.len(), frames.len() as f64 / rate.max(1) as f64, path.display());
    Ok(())
}
