//! jobsh REPL — the read-eval loop around the job-control kernel.
//!
//! The loop itself is plain sequential I/O: read a line, run builtins or
//! launch a job, print any recoverable error, repeat. All the concurrency
//! lives in `jobsh-kernel`; the REPL just hosts the tokio runtime the
//! signal dispatcher task runs on.

use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::runtime::Runtime;

use jobsh_kernel::job::JobRegistry;
use jobsh_kernel::{builtins, launch, parse, signals};

const PROMPT: &str = "jobsh> ";

/// Command-line options for the shell binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Print the prompt before each read. Disabled by `-p` for test
    /// drivers feeding the shell over a pipe.
    pub emit_prompt: bool,
    /// Emit additional diagnostics (`-v`): raises the default log filter.
    pub verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            emit_prompt: true,
            verbose: false,
        }
    }
}

/// The caller should print usage and exit with status 1.
#[derive(Debug, PartialEq, Eq)]
pub struct UsageRequested;

/// Parse `-hvp`-style flags, combined forms included (`-vp`).
///
/// `-h` and unknown flags both request the usage message. Parsing stops
/// at the first non-flag argument, getopt style.
pub fn parse_flags(args: &[String]) -> Result<Options, UsageRequested> {
    let mut opts = Options::default();

    for arg in args.iter().skip(1) {
        let Some(flags) = arg.strip_prefix('-') else {
            break;
        };
        for c in flags.chars() {
            match c {
                'v' => opts.verbose = true,
                'p' => opts.emit_prompt = false,
                _ => return Err(UsageRequested),
            }
        }
    }

    Ok(opts)
}

/// REPL state: the shared job registry and the runtime hosting the
/// signal dispatcher.
pub struct Repl {
    jobs: Arc<JobRegistry>,
    runtime: Runtime,
}

impl Repl {
    /// Create the runtime, the registry, and the signal dispatcher task.
    ///
    /// Failure here is fatal for the shell.
    pub fn new() -> Result<Self> {
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;
        let jobs = Arc::new(JobRegistry::new());

        {
            let _guard = runtime.enter();
            signals::spawn_dispatcher(jobs.clone())
                .context("Failed to install signal handlers")?;
        }

        Ok(Self { jobs, runtime })
    }

    /// Evaluate one command line.
    ///
    /// Recoverable errors (unknown command, bad builtin target, full job
    /// table) are printed and the loop continues.
    pub fn eval(&mut self, line: &str) {
        let (argv, background) = parse::tokenize(line);
        if argv.is_empty() {
            return;
        }

        let jobs = &self.jobs;
        let cmdline = line.trim();
        let result = self.runtime.block_on(async {
            if builtins::dispatch(&argv, jobs).await? {
                return Ok(());
            }
            launch::launch(jobs, &argv, background, cmdline).await
        });

        if let Err(e) = result {
            println!("{e}");
        }
    }

    /// Interactive loop with line editing. Ctrl-D exits; Ctrl-C at the
    /// prompt just redraws it (there is no foreground job to interrupt).
    fn run_interactive(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new().context("Failed to initialize line editor")?;

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    // Session-only history; nothing is persisted.
                    let _ = rl.add_history_entry(line.as_str());
                    self.eval(&line);
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(()),
                Err(e) => return Err(e).context("read error"),
            }
        }
    }

    /// Prompt-less loop reading plain lines from stdin (`-p` mode).
    fn run_plain(&mut self) -> Result<()> {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = line.context("read error")?;
            self.eval(&line);
        }
        Ok(())
    }
}

/// Run the shell until EOF or `quit`.
pub fn run(opts: &Options) -> Result<()> {
    let mut repl = Repl::new()?;
    if opts.emit_prompt {
        repl.run_interactive()
    } else {
        repl.run_plain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(args: &[&str]) -> Result<Options, UsageRequested> {
        let mut full = vec!["jobsh".to_string()];
        full.extend(args.iter().map(|s| s.to_string()));
        parse_flags(&full)
    }

    #[test]
    fn defaults_without_flags() {
        let opts = flags(&[]).unwrap();
        assert!(opts.emit_prompt);
        assert!(!opts.verbose);
    }

    #[test]
    fn separate_and_combined_flags() {
        let opts = flags(&["-v", "-p"]).unwrap();
        assert!(!opts.emit_prompt);
        assert!(opts.verbose);

        let opts = flags(&["-vp"]).unwrap();
        assert!(!opts.emit_prompt);
        assert!(opts.verbose);
    }

    #[test]
    fn help_and_unknown_flags_request_usage() {
        assert_eq!(flags(&["-h"]), Err(UsageRequested));
        assert_eq!(flags(&["-x"]), Err(UsageRequested));
        assert_eq!(flags(&["-ph"]), Err(UsageRequested));
    }

    #[test]
    fn parsing_stops_at_first_non_flag() {
        let opts = flags(&["script.txt", "-x"]).unwrap();
        assert!(opts.emit_prompt);
    }
}
