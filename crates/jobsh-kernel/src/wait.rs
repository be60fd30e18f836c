//! Blocking the main flow on the foreground job.

use std::time::Duration;

use nix::unistd::Pid;

use crate::job::JobRegistry;

/// How often the waiter re-checks the table. Coarse is fine here; the
/// prompt only has to come back soon after the job exits or stops, and
/// each sleep yields the runtime to the dispatcher task.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Block until the job identified by `pid` is no longer the foreground
/// job: the reaper deleted it, the suspend handler stopped it, or it was
/// never foreground to begin with (already complete — returns at once).
///
/// The sleep between polls yields to the runtime so the dispatcher task
/// can run; there is no timeout, so a child that ignores every signal
/// hangs the shell (accepted limitation).
pub async fn wait_foreground(jobs: &JobRegistry, pid: Pid) {
    loop {
        {
            let table = jobs.lock().await;
            if table.foreground_pid() != Some(pid) {
                return;
            }
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
