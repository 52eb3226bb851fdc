//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use sleigh_cli::{CliError, run};
use tracing_subscriber::EnvFilter;

#[expect(clippy::print_stderr, reason = "report fatal errors to the user")]
fn main() {
    init_logging();
    match run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("sleigh: {err}");
            std::process::exit(1);
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` and defaulting to `info`.
///
/// `init` also bridges records emitted through the `log` facade.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
