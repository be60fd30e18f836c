//! Error types for the jobsh kernel.

use thiserror::Error;

/// Errors surfaced by job control and the builtins.
///
/// Everything here is recoverable: the REPL prints the `Display` form and
/// returns to the prompt. Fatal startup conditions (signal installation,
/// runtime creation) are reported through `anyhow` at the binary edge
/// instead.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The target program could not be resolved or executed.
    #[error("{0}: Command not found")]
    CommandNotFound(String),

    /// A bare-pid target that matches no tracked job.
    #[error("({0}): No such process")]
    NoSuchProcess(i32),

    /// A %jid target that matches no tracked job.
    #[error("%{0}: No such job")]
    NoSuchJob(u32),

    /// `bg`/`fg` invoked without a target argument.
    #[error("{0} command requires PID or %jobid argument")]
    MissingTarget(&'static str),

    /// `bg`/`fg` target that is neither a pid nor a %jid.
    #[error("{0}: argument must be a PID or %jobid")]
    InvalidTarget(&'static str),

    /// No free slot in the job table. Checked before the child is spawned,
    /// so a rejected launch leaves no untracked process behind.
    #[error("too many jobs")]
    TableFull,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sys(#[from] nix::errno::Errno),
}
