mod cli;

use std::{io, process};

use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so stdout stays clean JSON.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    if let Err(e) = cli::run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
