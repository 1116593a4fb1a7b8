//! pkgraph CLI - inspect package descriptor graphs

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pkgraph::util::diagnostic::emit;
use pkgraph::{ConfigError, GlobalContext};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("pkgraph=debug")
    } else {
        EnvFilter::new("pkgraph=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let ctx = match GlobalContext::new() {
        Ok(ctx) => ctx.with_manifest(cli.manifest),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    };

    let color = !cli.no_color
        && ctx
            .config()
            .output
            .color
            .unwrap_or_else(|| std::io::stderr().is_terminal());

    if let Err(e) = run(cli.command, &ctx) {
        match e.downcast_ref::<ConfigError>() {
            Some(config_err) => emit(&config_err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(command: Commands, ctx: &GlobalContext) -> Result<()> {
    match command {
        Commands::List => commands::list::execute(ctx),
        Commands::Tree(args) => commands::tree::execute(args, ctx),
        Commands::Targets(args) => commands::targets::execute(args, ctx),
        Commands::Emit(args) => commands::emit::execute(args, ctx),
    }
}
