// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, parse arguments, hand off to `ui`.
// - Returns `anyhow::Result` so errors print with their context chain.

use clap::Parser;
use gistyc::{cli::Cli, ui};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; -v only raises the default.
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    ui::run(cli)
}
