//! Gantry - JRuby application provisioner
//!
//! CLI entry point: one build per invocation.

use clap::Parser;
use console::style;
use gantry::build::Builder;
use gantry::cli::Cli;
use gantry::error::GantryResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> GantryResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn (build log only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("gantry=warn"),
        1 => EnvFilter::new("gantry=info"),
        _ => EnvFilter::new("gantry=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    Builder::new()
        .jdk_url(cli.jdk_url)
        .jruby_url(cli.jruby_url)
        .run(cli.build_dir, cli.cache_dir)
        .await
}
