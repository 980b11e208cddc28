//! Retime CLI: command-line interface for time-remap documents.
//!
//! Usage:
//!   retime init <PATH>         Create a sample remap document
//!   retime validate <PATH>     Check a document and dry-run the engine
//!   retime compute <PATH>      Print or export the remapped frame list
//!   retime preview <PATH>      Replay navigation steps over a result
//!   retime play <PATH>         Loop the result at a fixed frame rate

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "retime",
    about = "Time remapping with motion-blur stretching for frame sequences",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a sample remap document
    Init {
        /// Document path
        path: PathBuf,

        /// Remap mode: speed|frames (defaults to the configured mode)
        #[arg(long)]
        mode: Option<String>,

        /// First frame of the range
        #[arg(long, default_value = "1")]
        start: i64,

        /// Last frame of the range
        #[arg(long, default_value = "100")]
        end: i64,
    },

    /// Validate a remap document
    Validate {
        /// Path to the document
        path: PathBuf,
    },

    /// Compute the remapped frame list
    Compute {
        /// Path to the document
        path: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Write the JSON result to a file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output path prefix for frame names (defaults to the configured prefix)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Replay preview navigation over a computed result
    Preview {
        /// Path to the document
        path: PathBuf,

        /// Comma-separated signed steps, e.g. "+1,-10,+50"
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        steps: String,

        /// Where the cursor goes afterwards: back|from|stay
        #[arg(long, default_value = "back")]
        exit: String,
    },

    /// Loop playback of a computed result
    Play {
        /// Path to the document
        path: PathBuf,

        /// Number of passes over the result
        #[arg(long, default_value = "1")]
        loops: usize,

        /// Playback rate in frames per second
        #[arg(long, default_value = "24")]
        fps: u32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = retime_common::AppConfig::load();

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    retime_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Init {
            path,
            mode,
            start,
            end,
        } => commands::init::run(&config, path, mode, start, end),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Compute {
            path,
            json,
            output,
            prefix,
        } => commands::compute::run(&config, path, json, output, prefix),
        Commands::Preview { path, steps, exit } => {
            commands::preview::run(&config, path, steps, exit)
        }
        Commands::Play { path, loops, fps } => commands::play::run(&config, path, loops, fps),
    }
}
