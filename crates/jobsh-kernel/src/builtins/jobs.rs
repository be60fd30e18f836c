//! jobs — List the tracked jobs.

use std::sync::Arc;

use async_trait::async_trait;

use crate::builtins::Builtin;
use crate::error::ShellError;
use crate::job::{JobRegistry, JobTable};

/// Jobs tool: print one line per live job, in slot order.
pub struct Jobs;

#[async_trait]
impl Builtin for Jobs {
    fn name(&self) -> &'static str {
        "jobs"
    }

    async fn run(&self, _argv: &[String], jobs: &Arc<JobRegistry>) -> Result<(), ShellError> {
        let table = jobs.lock().await;
        print!("{}", render(&table));
        Ok(())
    }
}

/// Format the listing: `[jid] (pid) <State> cmdline`, newline-terminated.
pub fn render(table: &JobTable) -> String {
    let mut out = String::new();
    for job in table.iter() {
        out.push_str(&format!(
            "[{}] ({}) {} {}\n",
            job.jid, job.pid, job.state, job.cmdline
        ));
    }
    out
}
