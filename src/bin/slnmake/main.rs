//! slnmake CLI - converts a solution description into makefiles

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("slnmake=debug")
    } else {
        EnvFilter::new("slnmake=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Convert(args) => commands::convert::execute(args),
        Commands::Linkplan(args) => commands::linkplan::execute(args),
        Commands::Tree(args) => commands::tree::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
