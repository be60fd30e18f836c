//! Launching external commands as tracked jobs.
//!
//! The launch protocol holds the registry lock across spawn-and-register,
//! the port of the original's sigprocmask window: the reaper takes the
//! same lock before `waitpid`, so even a child that exits instantly is
//! registered by the time it can be reaped.

use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use nix::unistd::Pid;

use crate::error::ShellError;
use crate::job::{JobRegistry, JobState};
use crate::wait;

/// Spawn `argv` as a new job.
///
/// Foreground launches block until the job leaves the foreground (exit,
/// kill, or stop). Background launches print the `[jid] (pid) cmdline`
/// announcement and return immediately.
///
/// Capacity is checked before the child is created — a full table fails
/// the launch cleanly instead of leaving an untracked process running.
pub async fn launch(
    jobs: &Arc<JobRegistry>,
    argv: &[String],
    background: bool,
    cmdline: &str,
) -> Result<(), ShellError> {
    let Some(program) = argv.first() else {
        return Ok(());
    };

    let path = if program.contains('/') {
        program.clone()
    } else {
        let path_var = std::env::var("PATH").unwrap_or_default();
        resolve_in_path(program, &path_var)
            .ok_or_else(|| ShellError::CommandNotFound(program.clone()))?
    };

    let mut table = jobs.lock().await;
    if table.is_full() {
        return Err(ShellError::TableFull);
    }

    // process_group(0) makes the child the leader of a fresh group whose
    // id is its own pid, so terminal signals aimed at the shell's group
    // never reach it directly. exec resets signal dispositions, and the
    // shell never touches the signal mask, so the child starts clean.
    let mut command = Command::new(&path);
    command.args(&argv[1..]).process_group(0);

    let child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ShellError::CommandNotFound(program.clone())
        } else {
            ShellError::Io(e)
        }
    })?;

    // The Child handle is dropped without waiting; reaping belongs to the
    // signal dispatcher's waitpid loop.
    let pid = Pid::from_raw(child.id() as i32);
    let state = if background {
        JobState::Background
    } else {
        JobState::Foreground
    };
    let jid = table.add(pid, state, cmdline).ok_or(ShellError::TableFull)?;
    tracing::debug!(pid = pid.as_raw(), jid, background, "launched job");
    drop(table);

    if background {
        println!("[{jid}] ({pid}) {cmdline}");
    } else {
        wait::wait_foreground(jobs, pid).await;
    }
    Ok(())
}

/// Search the colon-separated `path_var` for an executable named `name`.
pub fn resolve_in_path(name: &str, path_var: &str) -> Option<String> {
    for dir in path_var.split(':') {
        if dir.is_empty() {
            continue;
        }

        let full_path = format!("{dir}/{name}");
        let path = Path::new(&full_path);

        if path.is_file() {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(metadata) = path.metadata() {
                if metadata.permissions().mode() & 0o111 != 0 {
                    return Some(full_path);
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_finds_executables_on_path() {
        // /bin/sh exists and is executable everywhere we run.
        let resolved = resolve_in_path("sh", "/nonexistent:/bin:/usr/bin");
        assert!(resolved.is_some());
        assert!(resolved.unwrap().ends_with("/sh"));
    }

    #[test]
    fn resolve_misses_unknown_names() {
        assert_eq!(resolve_in_path("no-such-binary-xyz", "/bin:/usr/bin"), None);
        assert_eq!(resolve_in_path("sh", ""), None);
    }

    #[test]
    fn resolve_requires_execute_bit() {
        let dir = std::env::temp_dir().join("jobsh-resolve-test");
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("plainfile");
        std::fs::write(&file, b"not a program").unwrap();

        let path_var = dir.to_string_lossy().into_owned();
        assert_eq!(resolve_in_path("plainfile", &path_var), None);
    }

    #[tokio::test]
    async fn unknown_command_is_a_local_failure() {
        let jobs = Arc::new(JobRegistry::new());
        let argv = vec!["no-such-binary-xyz".to_string()];
        let err = launch(&jobs, &argv, false, "no-such-binary-xyz")
            .await
            .unwrap_err();
        assert!(matches!(err, ShellError::CommandNotFound(_)));
        assert!(jobs.lock().await.is_empty());
    }

    #[tokio::test]
    async fn empty_argv_is_a_noop() {
        let jobs = Arc::new(JobRegistry::new());
        launch(&jobs, &[], false, "").await.unwrap();
        assert!(jobs.lock().await.is_empty());
    }
}
