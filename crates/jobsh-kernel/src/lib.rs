//! jobsh-kernel: The job-control core of jobsh.
//!
//! This crate provides:
//!
//! - **Jobs**: The fixed-capacity job table and the shared `JobRegistry`
//! - **Signals**: The dispatcher task that reaps children and forwards
//!   terminal-generated signals to the foreground process group
//! - **Launch**: Spawning external commands in their own process group
//! - **Wait**: Blocking the main flow on the foreground job
//! - **Builtins**: `quit`, `jobs`, `bg`, `fg`
//! - **Parse**: Command-line tokenization
//!
//! # Concurrency discipline
//!
//! The job table is shared between the main flow (launcher, builtins) and
//! the signal dispatcher task. All access goes through the `JobRegistry`
//! mutex; holding its guard across a read-modify-write sequence is what
//! makes that sequence atomic relative to the asynchronous signal path.
//! In particular, spawn-then-register happens under one guard, so the
//! reaper can never observe an unregistered child.

pub mod builtins;
pub mod error;
pub mod job;
pub mod launch;
pub mod parse;
pub mod signals;
pub mod wait;

pub use error::ShellError;
pub use job::{Job, JobRegistry, JobState, JobTable, Jid, MAX_JOBS};
