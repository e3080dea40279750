//! sdkgraph CLI - project graph discovery for SDK-style C# projects

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use sdkgraph::core::GraphError;
use sdkgraph::util::diagnostic;
use sdkgraph::ResolveError;

fn main() {
    let cli = Cli::parse();
    let color = !cli.global.no_color;

    if let Err(e) = run(cli) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.global.verbose {
        EnvFilter::new("sdkgraph=debug")
    } else {
        EnvFilter::new("sdkgraph=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.global.no_color)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(&cli.global, args),
        Commands::Tree(args) => commands::tree::execute(&cli.global, args),
        Commands::Packages(args) => commands::packages::execute(&cli.global, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

fn report(e: &anyhow::Error, color: bool) {
    if let Some(err) = e.downcast_ref::<GraphError>() {
        diagnostic::emit(&err.to_diagnostic(), color);
    } else if let Some(err) = e.downcast_ref::<ResolveError>() {
        diagnostic::emit(&err.to_diagnostic(), color);
    } else {
        eprintln!("error: {:#}", e);
    }
}
