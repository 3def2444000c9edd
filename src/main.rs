use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{maps, run, stats};

/// Log to stderr; `-v` raises the default level, `RUST_LOG` overrides it.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let stderr_layer = fmt::layer()
        .with_target(verbose > 1)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Stats(args) => stats::run(&cli, args),
        Commands::Maps(args) => maps::run(&cli, args),
        Commands::Run(args) => run::run(&cli, args),
    }
}
