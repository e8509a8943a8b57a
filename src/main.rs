use std::env;
use std::process;

use clap::Parser;
use jobspec_tools::Cli;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG takes over when set; otherwise the -v/--log-level flags drive
    // the jobspec_tools channel. Logs go to stderr so stdout stays parseable.
    if env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    } else if let Err(e) = cli.log_channel().init() {
        eprintln!("Warning: {e}");
    }

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e}");

        // Print the full error chain if available
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("  Caused by: {err}");
            source = err.source();
        }

        process::exit(1);
    }
}
