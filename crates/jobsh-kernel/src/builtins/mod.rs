//! Builtin commands: `quit`, `jobs`, `bg`, `fg`.
//!
//! Builtins run inside the shell process and read or mutate the job
//! table directly. Everything else is launched as an external job.

mod bgfg;
mod jobs;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ShellError;
use crate::job::{JobRegistry, Jid};

pub use bgfg::{Bg, Fg};
pub use jobs::Jobs;

/// A command implemented by the shell itself.
#[async_trait]
pub trait Builtin: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, argv: &[String], jobs: &Arc<JobRegistry>) -> Result<(), ShellError>;
}

/// Look up a builtin by name.
pub fn find(name: &str) -> Option<&'static dyn Builtin> {
    match name {
        "quit" => Some(&Quit),
        "jobs" => Some(&Jobs),
        "bg" => Some(&Bg),
        "fg" => Some(&Fg),
        _ => None,
    }
}

/// Run `argv` as a builtin if its name matches one.
///
/// Returns `Ok(false)` when the command is not a builtin and should be
/// launched as an external job.
pub async fn dispatch(argv: &[String], jobs: &Arc<JobRegistry>) -> Result<bool, ShellError> {
    let Some(name) = argv.first() else {
        return Ok(true);
    };
    match find(name) {
        Some(builtin) => {
            builtin.run(argv, jobs).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// quit — terminate the shell immediately.
///
/// Children are deliberately not cleaned up; background jobs keep running
/// in their own process groups.
pub struct Quit;

#[async_trait]
impl Builtin for Quit {
    fn name(&self) -> &'static str {
        "quit"
    }

    async fn run(&self, _argv: &[String], _jobs: &Arc<JobRegistry>) -> Result<(), ShellError> {
        std::process::exit(0);
    }
}

/// A `bg`/`fg` target: a bare decimal pid or a `%`-prefixed jid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobRef {
    Pid(i32),
    Jid(Jid),
}

/// Parse a builtin target argument. `cmd` names the builtin for the
/// diagnostic.
pub fn parse_target(cmd: &'static str, arg: Option<&str>) -> Result<JobRef, ShellError> {
    let arg = arg.ok_or(ShellError::MissingTarget(cmd))?;

    if let Some(rest) = arg.strip_prefix('%') {
        match rest.parse::<Jid>() {
            Ok(jid) if jid > 0 => Ok(JobRef::Jid(jid)),
            _ => Err(ShellError::InvalidTarget(cmd)),
        }
    } else {
        match arg.parse::<i32>() {
            Ok(pid) if pid > 0 => Ok(JobRef::Pid(pid)),
            _ => Err(ShellError::InvalidTarget(cmd)),
        }
    }
}
