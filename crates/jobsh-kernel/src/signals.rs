//! Signal dispatch: the asynchronous side of job control.
//!
//! The OS-level handlers are converted into streams (`tokio::signal`) and
//! consumed by one dedicated task, so the "handlers" here run as ordinary
//! async code that takes the registry lock like everyone else. Signal
//! delivery can still preempt the main flow at any await point — the lock
//! is what keeps the job table consistent.
//!
//! Terminal-generated signals are forwarded to the foreground job's whole
//! process group, not the single pid: a launched command may have spawned
//! children of its own, and they must stop or die with it.

use std::sync::Arc;

use nix::sys::signal::{killpg, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;

use crate::error::ShellError;
use crate::job::{JobRegistry, JobState, Jid};

/// Send `sig` to the process group owned by the job whose leader is `pid`.
///
/// Every job is launched as its own group leader, so the group id equals
/// the job's pid.
pub fn signal_group(pid: Pid, sig: Signal) -> nix::Result<()> {
    killpg(pid, sig)
}

/// Install the signal streams and spawn the dispatcher task.
///
/// Must be called from within a tokio runtime. Installation failure is
/// fatal for the shell; the caller aborts with a diagnostic.
pub fn spawn_dispatcher(jobs: Arc<JobRegistry>) -> Result<JoinHandle<()>, ShellError> {
    let mut child = signal(SignalKind::child())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut suspend = signal(SignalKind::from_raw(Signal::SIGTSTP as i32))?;
    let mut quit = signal(SignalKind::quit())?;

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = child.recv() => reap_children(&jobs).await,
                _ = interrupt.recv() => interrupt_foreground(&jobs).await,
                _ = suspend.recv() => suspend_foreground(&jobs).await,
                _ = quit.recv() => {
                    println!("Terminating after receipt of SIGQUIT signal");
                    std::process::exit(1);
                }
            }
        }
    });

    Ok(handle)
}

/// Reap every child whose status has changed, without blocking.
///
/// Exited or signal-killed children are deleted from the table; stopped
/// children transition to `Stopped`. SIGCHLD coalesces, so one wakeup may
/// cover several children — loop until `waitpid` has nothing left.
pub async fn reap_children(jobs: &JobRegistry) {
    let mut table = jobs.lock().await;
    loop {
        match waitpid(
            Pid::from_raw(-1),
            Some(WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED),
        ) {
            Ok(WaitStatus::Exited(pid, _)) | Ok(WaitStatus::Signaled(pid, _, _)) => {
                if table.delete(pid) {
                    tracing::debug!(pid = pid.as_raw(), "reaped child");
                } else {
                    tracing::warn!(pid = pid.as_raw(), "reaped untracked child");
                }
            }
            Ok(WaitStatus::Stopped(pid, _)) => {
                if let Some(job) = table.by_pid_mut(pid) {
                    job.state = JobState::Stopped;
                }
            }
            // StillAlive, or ECHILD once every child is gone.
            _ => break,
        }
    }
}

/// Ctrl-C: forward SIGINT to the foreground job's process group.
///
/// No-op when nothing is in the foreground. The table entry is cleaned up
/// by the reaper once the kill takes effect.
pub async fn interrupt_foreground(jobs: &JobRegistry) {
    let table = jobs.lock().await;
    let Some(pid) = table.foreground_pid() else {
        return;
    };
    let jid = table.by_pid(pid).map(|j| j.jid).unwrap_or(0);

    if let Err(e) = signal_group(pid, Signal::SIGINT) {
        tracing::warn!(pid = pid.as_raw(), error = %e, "failed to interrupt job");
        return;
    }
    println!("{}", terminated_report(jid, pid, Signal::SIGINT));
}

/// Ctrl-Z: forward SIGTSTP to the foreground job's process group and mark
/// it stopped. The foreground waiter observes the transition and returns
/// control to the prompt.
pub async fn suspend_foreground(jobs: &JobRegistry) {
    let mut table = jobs.lock().await;
    let Some(pid) = table.foreground_pid() else {
        return;
    };

    if let Err(e) = signal_group(pid, Signal::SIGTSTP) {
        tracing::warn!(pid = pid.as_raw(), error = %e, "failed to suspend job");
        return;
    }
    if let Some(job) = table.by_pid_mut(pid) {
        job.state = JobState::Stopped;
        println!("{}", stopped_report(job.jid, pid, Signal::SIGTSTP));
    }
}

/// Report line for a foreground job killed by `sig`.
fn terminated_report(jid: Jid, pid: Pid, sig: Signal) -> String {
    format!("Job [{jid}] ({pid}) terminated by signal {}", sig as i32)
}

/// Report line for a foreground job suspended by `sig`.
fn stopped_report(jid: Jid, pid: Pid, sig: Signal) -> String {
    format!("Job [{jid}] ({pid}) stopped by signal {}", sig as i32)
}
