//! orchestrion - play a score from the computer keyboard
//!
//! Run with: cargo run -- demos/minuet.json

mod app;
mod board;
mod ui;

use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};

use app::Player;
use orchestrion::orchestrion::{DeliveryConfig, LoopSettings};

#[derive(Debug, Parser)]
#[command(version, about = "Play a fixed score one gesture at a time")]
struct Args {
    /// Score file (JSON)
    score: PathBuf,

    /// Seed for timing and velocity humanization
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Loop start, in notated ticks
    #[arg(long)]
    loop_left: Option<u32>,

    /// Loop end, in notated ticks; enables looping
    #[arg(long)]
    loop_right: Option<u32>,

    /// Write logs here (filtered by RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Run without opening an audio device
    #[arg(long)]
    no_audio: bool,

    /// Simultaneous synth voices
    #[arg(long, default_value_t = 32)]
    polyphony: usize,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    // The terminal belongs to the UI, so logs only go to a file
    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    }

    let looping = LoopSettings {
        enabled: args.loop_right.is_some(),
        left: args.loop_left.unwrap_or(0),
        right: args.loop_right,
    };

    Player::new(&args.score)
        .config(DeliveryConfig {
            seed: args.seed,
            ..DeliveryConfig::default()
        })
        .looping(looping)
        .audio(!args.no_audio)
        .polyphony(args.polyphony)
        .run()
}
