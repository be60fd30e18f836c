//! bg / fg — Resume a job in the background or foreground.
//!
//! Both resolve a `<pid|%jid>` target, send SIGCONT to the job's process
//! group, and flip its state. `fg` then parks the main flow on the
//! foreground waiter until the job exits or stops again.

use std::sync::Arc;

use async_trait::async_trait;
use nix::sys::signal::Signal;
use nix::unistd::Pid;

use crate::builtins::{parse_target, Builtin, JobRef};
use crate::error::ShellError;
use crate::job::{JobRegistry, JobState};
use crate::signals::signal_group;
use crate::wait;

/// Bg tool: resume a job in the background.
pub struct Bg;

#[async_trait]
impl Builtin for Bg {
    fn name(&self) -> &'static str {
        "bg"
    }

    async fn run(&self, argv: &[String], jobs: &Arc<JobRegistry>) -> Result<(), ShellError> {
        resume("bg", argv, jobs, false).await
    }
}

/// Fg tool: resume a job in the foreground and wait for it.
pub struct Fg;

#[async_trait]
impl Builtin for Fg {
    fn name(&self) -> &'static str {
        "fg"
    }

    async fn run(&self, argv: &[String], jobs: &Arc<JobRegistry>) -> Result<(), ShellError> {
        resume("fg", argv, jobs, true).await
    }
}

async fn resume(
    cmd: &'static str,
    argv: &[String],
    jobs: &Arc<JobRegistry>,
    foreground: bool,
) -> Result<(), ShellError> {
    let target = parse_target(cmd, argv.get(1).map(String::as_str))?;

    let mut table = jobs.lock().await;
    let job = match target {
        JobRef::Pid(raw) => table
            .by_pid_mut(Pid::from_raw(raw))
            .ok_or(ShellError::NoSuchProcess(raw))?,
        JobRef::Jid(jid) => table.by_jid_mut(jid).ok_or(ShellError::NoSuchJob(jid))?,
    };

    let (jid, pid, cmdline) = (job.jid, job.pid, job.cmdline.clone());

    // Continue the group before touching the table entry: if the job died
    // out from under us, the killpg fails and the state must stay as-is
    // for the reaper to clean up.
    signal_group(pid, Signal::SIGCONT)?;
    job.state = if foreground {
        JobState::Foreground
    } else {
        JobState::Background
    };
    drop(table);

    if foreground {
        wait::wait_foreground(jobs, pid).await;
    } else {
        println!("[{jid}] ({pid}) {cmdline}");
    }
    Ok(())
}
