//! Cutline CLI
//!
//! Command-line front end for inspecting, rendering and editing projects.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, info};

use cutline::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let config = commands::load_config(cli.config.as_deref()).context("failed to load config")?;
    debug!("Engine config: {:?}", config);

    match cli.command {
        Some(cmd) => handle_command(cmd, config),
        None => {
            println!("Cutline v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands, config: cutline::EngineConfig) -> anyhow::Result<()> {
    info!("Cutline v{}", env!("CARGO_PKG_VERSION"));
    match cmd {
        Commands::Inspect { project } => commands::inspect(&project, config)
            .with_context(|| format!("inspect failed for {}", project.display())),
        Commands::Resolve { project, time } => commands::resolve(&project, time, config)
            .with_context(|| format!("resolve failed for {}", project.display())),
        Commands::Render { project, time, out } => commands::render(&project, time, &out, config)
            .with_context(|| format!("render failed for {}", project.display())),
        Commands::Split {
            project,
            clip,
            time,
            out,
        } => commands::split(&project, &clip, time, out.as_deref(), config)
            .with_context(|| format!("split failed for {}", project.display())),
        Commands::Mixdown {
            project,
            out,
            seconds,
        } => commands::mixdown(&project, &out, seconds, config)
            .with_context(|| format!("mixdown failed for {}", project.display())),
    }
}
