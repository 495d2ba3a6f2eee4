//! satlas - pack the sprites of a scene into atlas pages

use std::process::ExitCode;

use sprite_atlas::cli;

fn main() -> ExitCode {
    cli::run()
}
