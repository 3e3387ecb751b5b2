#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for Pipeflow: play levels in the terminal, generate
//! boards and check level files.

mod board;
mod input;

use std::{
    fs,
    io::{self, BufRead},
    path::{Path, PathBuf},
    sync::{mpsc, PoisonError},
    thread,
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use pipeflow_core::{Command, Event, Level};
use pipeflow_session::{apply, drive, share, GameSettings, Session, SharedSession};
use pipeflow_system_generation::generate;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::input::{PlayerInput, HELP};

/// Seed used when `check` builds a throwaway session.
const CHECK_SEED: u64 = 0;

#[derive(Debug, Parser)]
#[command(name = "pipeflow", about = "Connect the source to the sink before the water spills")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Play a level file or a freshly generated board.
    Play(PlayArgs),
    /// Print a generated level in the level file format.
    Generate {
        /// Interior rows.
        #[arg(long, default_value_t = 8)]
        rows: u32,
        /// Interior columns.
        #[arg(long, default_value_t = 8)]
        cols: u32,
        /// Ticks before the first flow.
        #[arg(long, default_value_t = 10)]
        delay: u32,
        /// Seed for reproducible boards.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Parse and validate a level file.
    Check {
        /// Level file to check.
        path: PathBuf,
    },
}

#[derive(Debug, Args)]
struct PlayArgs {
    /// Level file to play. A board is generated when omitted.
    #[arg(long)]
    level: Option<PathBuf>,
    /// TOML settings file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed overriding the one in the settings.
    #[arg(long)]
    seed: Option<u64>,
}

/// Messages funnelled into the play loop.
enum Message {
    Line(String),
    InputClosed,
    Event(Event),
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => cmd_play(&args),
        Commands::Generate {
            rows,
            cols,
            delay,
            seed,
        } => cmd_generate(rows, cols, delay, seed),
        Commands::Check { path } => cmd_check(&path),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn cmd_play(args: &PlayArgs) -> Result<()> {
    let mut settings = match &args.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings {}", path.display()))?;
            GameSettings::from_toml_str(&contents)
                .with_context(|| format!("invalid settings in {}", path.display()))?
        }
        None => GameSettings::default(),
    };
    if args.seed.is_some() {
        settings.seed = args.seed;
    }

    let mut session = match &args.level {
        Some(path) => {
            let level = read_level(path)?;
            let rng = match settings.seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            Session::from_level(level_name(path), &level, &settings, rng)
                .with_context(|| format!("cannot play {}", path.display()))?
        }
        None => Session::generated(&settings).context("failed to generate a board")?,
    };

    let (sender, receiver) = mpsc::channel();
    let events = sender.clone();
    session.subscribe(move |event| {
        let _ = events.send(Message::Event(event.clone()));
    });
    let _ = session.start_countdown();

    println!("{}\n\n{}\n{HELP}\n", session.level_name(), board::render(&session));

    let shared = share(session);
    let clock = drive(&shared, settings.tick_interval()).context("failed to start the clock")?;
    let _ = thread::Builder::new()
        .name("pipeflow-stdin".to_owned())
        .spawn(move || read_lines(&sender))
        .context("failed to start the input reader")?;

    play_loop(&shared, &receiver);

    clock.stop();
    let session = shared.lock().unwrap_or_else(PoisonError::into_inner);
    println!("{}", board::outcome_line(&session));
    Ok(())
}

fn play_loop(shared: &SharedSession, receiver: &mpsc::Receiver<Message>) {
    for message in receiver {
        match message {
            Message::Event(event) => {
                if let Some(text) = board::describe(&event) {
                    println!("{text}");
                }
                if board::redraws(&event) || board::is_final(&event) {
                    let session = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    println!("{}", board::render(&session));
                }
                if board::is_final(&event) {
                    return;
                }
            }
            Message::Line(line) => match input::parse(&line) {
                Ok(PlayerInput::Command(command)) => {
                    let mut session = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    if let Command::PlacePipe { coord, .. } = command {
                        if !session.grid().contains(coord) {
                            println!("{coord} is outside the board");
                            continue;
                        }
                    }
                    debug!(?command, "applying player command");
                    let mut out_events = Vec::new();
                    apply(&mut session, command, &mut out_events);
                }
                Ok(PlayerInput::Board) => {
                    let session = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    println!("{}", board::render(&session));
                }
                Ok(PlayerInput::Help) => println!("{HELP}"),
                Ok(PlayerInput::Quit) => return,
                Err(error) => println!("{error:#}"),
            },
            Message::InputClosed => return,
        }
    }
}

fn read_lines(sender: &mpsc::Sender<Message>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        match line {
            Ok(line) => {
                if sender.send(Message::Line(line)).is_err() {
                    return;
                }
            }
            Err(error) => {
                warn!(%error, "failed to read input");
                break;
            }
        }
    }
    let _ = sender.send(Message::InputClosed);
}

fn cmd_generate(rows: u32, cols: u32, delay: u32, seed: Option<u64>) -> Result<()> {
    if delay == 0 {
        bail!("delay must be at least 1 tick");
    }
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let level = generate(rows, cols, delay, &mut rng).context("failed to generate a board")?;
    print!("{}", pipeflow_level_format::write(&level));
    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let level = read_level(path)?;
    let session = Session::from_level(
        level_name(path),
        &level,
        &GameSettings::default(),
        ChaCha8Rng::seed_from_u64(CHECK_SEED),
    )
    .with_context(|| format!("{} is not playable", path.display()))?;

    let queued = level.pipes.as_ref().map_or(0, Vec::len);
    println!(
        "OK: {} is {}x{}, delay {}, {} queued pipes",
        session.level_name(),
        level.rows,
        level.cols,
        level.delay,
        queued
    );
    Ok(())
}

fn read_level(path: &Path) -> Result<Level> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level {}", path.display()))?;
    pipeflow_level_format::parse(&contents)
        .with_context(|| format!("failed to parse level {}", path.display()))
}

fn level_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "level".to_owned(), |stem| stem.to_string_lossy().into_owned())
}
