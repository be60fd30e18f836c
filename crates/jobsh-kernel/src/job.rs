//! The job table: every child process the shell is tracking.
//!
//! `JobTable` is a pure data structure — fixed capacity, slot-addressed,
//! no locking of its own. `JobRegistry` wraps it in a mutex and is the
//! handle every component shares. Mutating the table while the signal
//! dispatcher is live is only sound while holding the registry guard.

use nix::unistd::Pid;
use tokio::sync::{Mutex, MutexGuard};

/// Default number of job slots. A tunable constant, not an invariant.
pub const MAX_JOBS: usize = 16;

/// Shell-local job identifier, distinct from the OS pid.
pub type Jid = u32;

/// Lifecycle state of a tracked job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Holds the shell's blocking attention. At most one job at a time.
    Foreground,
    /// Running independently of the prompt.
    Background,
    /// Suspended, waiting for SIGCONT.
    Stopped,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Background jobs list as "Running" — the traditional format.
        match self {
            JobState::Foreground => write!(f, "Foreground"),
            JobState::Background => write!(f, "Running"),
            JobState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// One tracked child process.
#[derive(Debug, Clone)]
pub struct Job {
    /// OS process id. Also the id of the process group the job owns.
    pub pid: Pid,
    /// Shell-local job id, unique among live jobs.
    pub jid: Jid,
    pub state: JobState,
    /// Original invocation text, retained for display.
    pub cmdline: String,
}

/// Fixed-capacity registry of jobs.
///
/// Slots are reused, so `iter()` yields slot order, not creation order.
/// Invariants maintained by `add`/`delete`:
/// - at most one job is `Foreground`;
/// - live pids and jids are pairwise distinct;
/// - `next_jid` advances only on insertion (wrapping to 1 past capacity,
///   skipping any jid still held by a live job) and is recomputed to
///   `max(live jid) + 1` on deletion.
#[derive(Debug)]
pub struct JobTable {
    slots: Vec<Option<Job>>,
    next_jid: Jid,
}

impl JobTable {
    pub fn new() -> Self {
        Self::with_capacity(MAX_JOBS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            next_jid: 1,
        }
    }

    /// Insert a job into the first free slot and assign it the next jid.
    ///
    /// Returns the assigned jid, or `None` if `pid` is not a real child
    /// pid or the table is full.
    pub fn add(&mut self, pid: Pid, state: JobState, cmdline: &str) -> Option<Jid> {
        if pid.as_raw() < 1 {
            return None;
        }

        let free = self.slots.iter().position(|s| s.is_none())?;

        // The counter may have wrapped while older jobs are still live;
        // walk forward until the candidate jid is unused. Terminates
        // because a non-full table always has a free jid in 1..=capacity.
        let mut jid = self.next_jid;
        while self.by_jid(jid).is_some() {
            jid += 1;
            if jid > self.slots.len() as Jid {
                jid = 1;
            }
        }

        self.slots[free] = Some(Job {
            pid,
            jid,
            state,
            cmdline: cmdline.to_string(),
        });

        self.next_jid = jid + 1;
        if self.next_jid > self.slots.len() as Jid {
            self.next_jid = 1;
        }
        Some(jid)
    }

    /// Clear the slot holding `pid`. Returns false if no live job has it.
    pub fn delete(&mut self, pid: Pid) -> bool {
        if pid.as_raw() < 1 {
            return false;
        }

        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|j| j.pid == pid) {
                *slot = None;
                self.next_jid = self.max_jid() + 1;
                return true;
            }
        }
        false
    }

    /// Largest jid among live jobs, or 0 if the table is empty.
    pub fn max_jid(&self) -> Jid {
        self.iter().map(|j| j.jid).max().unwrap_or(0)
    }

    pub fn by_pid(&self, pid: Pid) -> Option<&Job> {
        if pid.as_raw() < 1 {
            return None;
        }
        self.iter().find(|j| j.pid == pid)
    }

    pub fn by_pid_mut(&mut self, pid: Pid) -> Option<&mut Job> {
        if pid.as_raw() < 1 {
            return None;
        }
        self.iter_mut().find(|j| j.pid == pid)
    }

    pub fn by_jid(&self, jid: Jid) -> Option<&Job> {
        if jid < 1 {
            return None;
        }
        self.iter().find(|j| j.jid == jid)
    }

    pub fn by_jid_mut(&mut self, jid: Jid) -> Option<&mut Job> {
        if jid < 1 {
            return None;
        }
        self.iter_mut().find(|j| j.jid == jid)
    }

    /// Pid of the unique foreground job, if any.
    pub fn foreground_pid(&self) -> Option<Pid> {
        self.iter()
            .find(|j| j.state == JobState::Foreground)
            .map(|j| j.pid)
    }

    /// Live jobs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Job> {
        self.slots.iter_mut().filter_map(|s| s.as_mut())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to the job table.
///
/// This is the port's equivalent of the original's "block SIGCHLD, SIGINT
/// and SIGTSTP around the critical section": the dispatcher task and the
/// main flow take the same lock, so a held guard excludes the asynchronous
/// mutators for its whole scope.
#[derive(Debug)]
pub struct JobRegistry {
    table: Mutex<JobTable>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(JobTable::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: Mutex::new(JobTable::with_capacity(capacity)),
        }
    }

    /// Acquire the table. Hold the guard across every multi-step
    /// read-modify-write that must appear atomic to the signal path.
    pub async fn lock(&self) -> MutexGuard<'_, JobTable> {
        self.table.lock().await
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(raw: i32) -> Pid {
        Pid::from_raw(raw)
    }

    #[test]
    fn add_assigns_monotonic_jids() {
        let mut table = JobTable::new();
        assert_eq!(table.add(pid(100), JobState::Background, "a &"), Some(1));
        assert_eq!(table.add(pid(101), JobState::Background, "b &"), Some(2));
        assert_eq!(table.add(pid(102), JobState::Foreground, "c"), Some(3));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn add_rejects_bad_pid() {
        let mut table = JobTable::new();
        assert_eq!(table.add(pid(0), JobState::Background, "x"), None);
        assert_eq!(table.add(pid(-5), JobState::Background, "x"), None);
        assert!(table.is_empty());
    }

    #[test]
    fn add_fails_when_full() {
        let mut table = JobTable::with_capacity(2);
        assert!(table.add(pid(100), JobState::Background, "a").is_some());
        assert!(table.add(pid(101), JobState::Background, "b").is_some());
        assert!(table.is_full());
        assert_eq!(table.add(pid(102), JobState::Background, "c"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn delete_clears_slot_and_recomputes_counter() {
        let mut table = JobTable::new();
        table.add(pid(100), JobState::Background, "a");
        table.add(pid(101), JobState::Background, "b");
        table.add(pid(102), JobState::Background, "c");

        assert!(table.delete(pid(102)));
        // Counter falls back to max(live jid) + 1.
        assert_eq!(table.add(pid(103), JobState::Background, "d"), Some(3));

        assert!(!table.delete(pid(999)));
        assert!(!table.delete(pid(0)));
    }

    #[test]
    fn jid_wraps_at_capacity_but_full_table_rejects() {
        let mut table = JobTable::with_capacity(2);
        table.add(pid(100), JobState::Background, "a");
        // Second add wraps the counter past capacity back to 1 ...
        table.add(pid(101), JobState::Background, "b");
        // ... but the table is now full, so the wrapped value can never
        // collide with a live jid.
        assert_eq!(table.add(pid(102), JobState::Background, "c"), None);

        // Deleting recomputes, so the next jid is fresh again.
        table.delete(pid(100));
        assert_eq!(table.add(pid(102), JobState::Background, "c"), Some(3));
    }

    #[test]
    fn wrapped_counter_skips_live_jids() {
        let mut table = JobTable::with_capacity(4);
        for raw in 100..104 {
            table.add(pid(raw), JobState::Background, "x");
        }
        // Free two slots; the delete recompute pushes the counter to
        // max(live jid) + 1 = 5.
        table.delete(pid(101)); // jid 2
        table.delete(pid(102)); // jid 3

        // This add takes jid 5 and wraps the counter back to 1, which
        // is still held by a live job.
        assert_eq!(table.add(pid(200), JobState::Background, "y"), Some(5));
        // The next add must not reissue jid 1.
        assert_eq!(table.add(pid(201), JobState::Background, "z"), Some(2));

        let jids: Vec<Jid> = table.iter().map(|j| j.jid).collect();
        for (i, jid) in jids.iter().enumerate() {
            assert!(!jids[i + 1..].contains(jid), "duplicate jid {jid}");
        }
    }

    #[test]
    fn live_jids_and_pids_are_pairwise_distinct() {
        let mut table = JobTable::new();
        for raw in 100..110 {
            table.add(pid(raw), JobState::Background, "x");
        }
        table.delete(pid(103));
        table.delete(pid(107));
        table.add(pid(200), JobState::Background, "y");

        let jids: Vec<Jid> = table.iter().map(|j| j.jid).collect();
        let pids: Vec<i32> = table.iter().map(|j| j.pid.as_raw()).collect();
        for (i, jid) in jids.iter().enumerate() {
            assert!(!jids[i + 1..].contains(jid), "duplicate jid {jid}");
        }
        for (i, p) in pids.iter().enumerate() {
            assert!(!pids[i + 1..].contains(p), "duplicate pid {p}");
        }
    }

    #[test]
    fn lookup_by_pid_and_jid() {
        let mut table = JobTable::new();
        table.add(pid(100), JobState::Background, "a &");
        table.add(pid(101), JobState::Stopped, "b");

        assert_eq!(table.by_pid(pid(101)).unwrap().jid, 2);
        assert_eq!(table.by_jid(1).unwrap().pid, pid(100));
        assert!(table.by_pid(pid(0)).is_none());
        assert!(table.by_jid(0).is_none());
        assert!(table.by_pid(pid(555)).is_none());
        assert!(table.by_jid(9).is_none());
    }

    #[test]
    fn foreground_pid_tracks_the_unique_foreground_job() {
        let mut table = JobTable::new();
        assert_eq!(table.foreground_pid(), None);

        table.add(pid(100), JobState::Background, "a &");
        table.add(pid(101), JobState::Foreground, "b");
        assert_eq!(table.foreground_pid(), Some(pid(101)));
        assert_eq!(
            table.iter().filter(|j| j.state == JobState::Foreground).count(),
            1
        );

        table.by_pid_mut(pid(101)).unwrap().state = JobState::Stopped;
        assert_eq!(table.foreground_pid(), None);
    }

    #[test]
    fn add_then_delete_round_trips() {
        let mut table = JobTable::new();
        table.add(pid(100), JobState::Background, "keep &");
        let before: Vec<(i32, Jid)> =
            table.iter().map(|j| (j.pid.as_raw(), j.jid)).collect();

        table.add(pid(200), JobState::Foreground, "transient");
        table.delete(pid(200));

        let after: Vec<(i32, Jid)> =
            table.iter().map(|j| (j.pid.as_raw(), j.jid)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn iter_yields_slot_order_after_reuse() {
        let mut table = JobTable::new();
        table.add(pid(100), JobState::Background, "a");
        table.add(pid(101), JobState::Background, "b");
        table.add(pid(102), JobState::Background, "c");
        table.delete(pid(100));
        // Reuses slot 0, so it lists first despite being newest.
        table.add(pid(103), JobState::Background, "d");

        let pids: Vec<i32> = table.iter().map(|j| j.pid.as_raw()).collect();
        assert_eq!(pids, vec![103, 101, 102]);
    }

    #[tokio::test]
    async fn registry_guard_serializes_mutation() {
        let registry = JobRegistry::new();
        {
            let mut table = registry.lock().await;
            table.add(pid(100), JobState::Background, "a &");
        }
        let table = registry.lock().await;
        assert_eq!(table.len(), 1);
    }
}
