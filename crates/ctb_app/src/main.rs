mod app;
mod cli;
mod config;
mod effects;
mod input;
mod render;

use std::path::Path;

use clap::Parser;
use log::LevelFilter;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    ctb_logging::initialize(
        cli.log.into(),
        level,
        Path::new(ctb_logging::DEFAULT_LOG_FILE),
    );

    let settings = config::apply_overrides(config::load_settings(&cli.config), &cli);
    app::run(settings, cli.file)
}
