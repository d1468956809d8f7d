//! CLI entrypoint for `prettyconf`.

use clap::Parser;
use prettyconf_cli::cli::Args;
use prettyconf_cli::error::CliError;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), CliError> {
    let args = Args::parse();
    init_tracing(args.verbose);
    prettyconf_cli::run(&args)
}

/// Logs to stderr; `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
