//! Command-line interface.

use crate::config::{AppConfig, parse_background};
use crate::error::AppResult;
use crate::headless::{
    ReplayOptions, draw_session, format_history, load_session, render_png, replay_session,
    undo_steps,
};
use clap::{Parser, Subcommand};
use inkreel_core::ReplayConfig;
use inkreel_core::replay::{DEFAULT_SEGMENT_DELAY_MS, DEFAULT_STROKE_DELAY_MS};
use std::fs;
use std::path::PathBuf;

/// Command-line arguments for inkreel.
#[derive(Debug, Clone, Parser)]
#[command(name = "inkreel")]
#[command(about = "Render, replay and inspect recorded drawing sessions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Draw a session and write the resulting canvas as PNG
    Render {
        /// Session JSON file
        session: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Background colour (any CSS colour, or `none`)
        #[arg(long, default_value = "#ffffff")]
        background: String,

        /// Undo this many strokes before exporting
        #[arg(long, default_value_t = 0)]
        undo: usize,
    },

    /// Replay a session stroke by stroke
    Replay {
        /// Session JSON file
        session: PathBuf,

        /// Write the final canvas to this PNG
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write one PNG per completed stroke into this directory
        #[arg(long)]
        frames: Option<PathBuf>,

        /// Pause between segments of a freehand stroke
        #[arg(long, default_value_t = DEFAULT_SEGMENT_DELAY_MS)]
        segment_delay_ms: u64,

        /// Pause after each stroke
        #[arg(long, default_value_t = DEFAULT_STROKE_DELAY_MS)]
        stroke_delay_ms: u64,

        /// Skip all pauses
        #[arg(long)]
        instant: bool,

        /// Background colour for written images
        #[arg(long, default_value = "#ffffff")]
        background: String,
    },

    /// Print the history list after drawing a session
    History {
        /// Session JSON file
        session: PathBuf,

        /// Undo this many strokes before printing
        #[arg(long, default_value_t = 0)]
        undo: usize,

        /// Keep at most this many states
        #[arg(long)]
        history_limit: Option<usize>,
    },
}

/// Execute a parsed command.
pub fn run(cli: Cli) -> AppResult<()> {
    let mut config = AppConfig::default();

    match cli.command {
        Command::Render {
            session,
            output,
            background,
            undo,
        } => {
            config.background = parse_background(&background)?;
            let session = load_session(&session)?;
            let png_data = render_png(&session, &config, undo)?;
            fs::write(&output, png_data)?;
            log::info!("Exported PNG to: {:?}", output);
        }

        Command::Replay {
            session,
            output,
            frames,
            segment_delay_ms,
            stroke_delay_ms,
            instant,
            background,
        } => {
            config.background = parse_background(&background)?;
            config.replay = if instant {
                ReplayConfig::instant()
            } else {
                ReplayConfig {
                    segment_delay_ms,
                    stroke_delay_ms,
                }
            };
            let options = ReplayOptions {
                realtime: !instant,
                frames_dir: frames,
            };

            let session = load_session(&session)?;
            let (state, summary) = replay_session(&session, &config, &options)?;
            log::info!(
                "Replayed {} stroke(s), wrote {} frame(s)",
                summary.strokes,
                summary.frames.len()
            );
            if let Some(output) = output {
                fs::write(&output, state.surface().to_png(config.background)?)?;
                log::info!("Exported PNG to: {:?}", output);
            }
        }

        Command::History {
            session,
            undo,
            history_limit,
        } => {
            config.history_limit = history_limit;
            let session = load_session(&session)?;
            let mut state = draw_session(&session, &config)?;
            undo_steps(&mut state, undo);
            print!("{}", format_history(&state.history()));
        }
    }

    Ok(())
}
