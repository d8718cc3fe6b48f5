/// Cadence - Interactive command-line music player
use anyhow::Context;
use cadence_audio_desktop::CpalEngine;
use cadence_cli::{input, CliConfig, Overrides, Runtime};
use cadence_playback::{Interpreter, Player};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence", version)]
#[command(about = "Interactive command-line music player", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./cadence.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory scanned for music files
    #[arg(long, value_name = "DIR")]
    music_dir: Option<PathBuf>,

    /// Initial linear volume
    #[arg(long)]
    volume: Option<f32>,

    /// Main loop ticks per second
    #[arg(long)]
    tick_rate: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the console
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    config.apply(&Overrides {
        music_dir: cli.music_dir,
        volume: cli.volume,
        tick_rate: cli.tick_rate,
    });
    config.validate()?;

    tracing::info!("Starting Cadence");
    tracing::info!("Music directory: {}", config.playback.music_root.display());
    tracing::info!("Tick rate: {} Hz", config.runtime.tick_rate);

    let engine = CpalEngine::new().context("Failed to initialize the audio device")?;
    let player = Player::new(Box::new(engine), &config.playback);
    let interpreter = Interpreter::new(config.playback.history_size);

    let lines = input::spawn_stdin_reader();
    let mut runtime = Runtime::new(
        player,
        interpreter,
        std::io::stdout().lock(),
        config.runtime.tick_rate,
    );
    runtime.run(&lines)?;

    tracing::info!("Cadence stopped");
    Ok(())
}
