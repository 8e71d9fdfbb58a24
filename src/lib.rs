//! A task runner that routes each external command of a task through a configured
//! custom shell, such as `docker run --rm alpine`, `ssh host` or `bash -c`.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
/// Shared flag that asks a running task to stop.
pub type CancellationToken = Arc<AtomicBool>;

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;
