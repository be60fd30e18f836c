//! jobsh CLI entry point.
//!
//! Usage:
//!   jobsh          # Interactive prompt
//!   jobsh -v       # Additional diagnostics
//!   jobsh -p       # No prompt (for driving over a pipe)

use std::env;
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::process::ExitCode;

use anyhow::Result;
use nix::unistd;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let opts = match jobsh_repl::parse_flags(&args) {
        Ok(opts) => opts,
        Err(jobsh_repl::UsageRequested) => {
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    // Initialize tracing (respects RUST_LOG; -v defaults it to debug)
    let filter = if opts.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Driver convention inherited from the original shell: everything,
    // diagnostics included, arrives on the pipe connected to stdout.
    if let Err(e) = unistd::dup2(io::stdout().as_raw_fd(), io::stderr().as_raw_fd()) {
        eprintln!("dup2 error: {e}");
        return ExitCode::FAILURE;
    }

    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(opts: &jobsh_repl::Options) -> Result<()> {
    jobsh_repl::run(opts)
}

fn print_usage() {
    let mut out = io::stdout();
    let _ = writeln!(out, "Usage: jobsh [-hvp]");
    let _ = writeln!(out, "   -h   print this message");
    let _ = writeln!(out, "   -v   print additional diagnostic information");
    let _ = writeln!(out, "   -p   do not emit a command prompt");
}
