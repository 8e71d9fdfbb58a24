//! # Core Logic
//!
//! Everything between the task file and the OS boundary.
//!
//! - **`classifier`**: picks separate-args or join mode for a custom shell.
//! - **`quoting`**: POSIX single-quote escaping used by join mode.
//! - **`environment`**: builds child environments from script variables.
//! - **`expand`**: `~` and `$VAR` expansion.
//! - **`script`**: the line interpreter behind `run_command`.
//! - **`config_loader`**: reads `shroute.toml`.
//! - **`task_executor`**: resolves task settings and runs a task's commands.

pub mod classifier;
pub mod config_loader;
pub mod environment;
pub mod expand;
pub mod quoting;
pub mod script;
pub mod task_executor;
