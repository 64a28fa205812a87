use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

mod commands;
mod input;
mod logging;

use commands::{run_rank, run_replay, RankArgs, ReplayArgs};

#[derive(Parser)]
#[command(
    name = "autofix-dispatch",
    about = "Rank nearby mechanics and replay a dispatch",
    long_about = "Ranks approved garages around a requester by great-circle distance,\n\
                  quotes call-out price and ETA, and replays live position traces\n\
                  for a dispatched garage."
)]
struct Cli {
    /// Emit logs as JSON (filter with RUST_LOG)
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the nearest garages with price and ETA
    Rank {
        /// Requester latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Requester longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// JSON array of garage records
        #[arg(long, env = "AUTOFIX_GARAGES")]
        garages: PathBuf,
        /// Shortlist size (overrides the config)
        #[arg(long)]
        limit: Option<usize>,
        /// Dispatch config JSON
        #[arg(long, env = "AUTOFIX_CONFIG")]
        config: Option<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rank, dispatch one garage and replay its recorded positions
    Replay {
        /// Replay scenario JSON
        #[arg(long)]
        scenario: PathBuf,
        /// Dispatch config JSON
        #[arg(long, env = "AUTOFIX_CONFIG")]
        config: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.log_json);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = match cli.command {
        Commands::Rank {
            lat,
            lng,
            garages,
            limit,
            config,
            json,
        } => run_rank(
            &RankArgs {
                latitude: lat,
                longitude: lng,
                garages,
                limit,
                config,
                json,
            },
            &mut out,
        ),
        Commands::Replay {
            scenario,
            config,
            json,
        } => run_replay(
            &ReplayArgs {
                scenario,
                config,
                json,
            },
            &mut out,
        ),
    };

    match result.and_then(|()| out.flush().map_err(Into::into)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
