//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod pack;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// satlas - pack game sprites into dynamic atlas pages
#[derive(Parser)]
#[command(name = "satlas")]
#[command(about = "Pack the sprites of a scene into atlas pages")]
#[command(version)]
pub struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one refresh over a scene and write the pages and frames.json
    Pack {
        /// Scene file (JSON)
        scene: PathBuf,

        /// Config file (default: atlas.toml found by walking up from the
        /// current directory)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory holding gfx/
        #[arg(long)]
        gfx: Option<PathBuf>,

        /// Read packed sheets with JSON sidecars instead of loose files
        #[arg(long)]
        packed: bool,

        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Page side length in pixels
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Print the bitmaps a refresh of the scene would request
    Plan {
        /// Scene file (JSON)
        scene: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    // A second init (tests driving run_with twice) is harmless
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .target(env_logger::Target::Stderr)
        .try_init();
}

/// Parse arguments from the process and run.
pub fn run() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_INVALID_ARGS } else { EXIT_SUCCESS };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };
    run_with(cli)
}

/// Run an already parsed command line.
pub fn run_with(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);

    match cli.command {
        Commands::Pack { scene, config, gfx, packed, out, page_size } => {
            pack::run_pack(&scene, config.as_deref(), gfx, packed, out, page_size)
        }
        Commands::Plan { scene, json } => pack::run_plan(&scene, json),
    }
}
