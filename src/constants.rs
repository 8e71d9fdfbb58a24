// src/constants.rs

//! Fixed names and values used across the crate.

/// The default name of the task file looked up in the current directory.
pub const PROJECT_CONFIG_FILENAME: &str = "shroute.toml";

/// The null device path. Redirections to it are served in memory on every platform.
pub const DEV_NULL: &str = "/dev/null";

/// POSIX option that is always enabled for task commands.
pub const ERREXIT_OPT: &str = "e";

/// Exit status reported when a task is interrupted (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Interval between child status checks while waiting for a dispatched command.
pub const CHILD_POLL_INTERVAL_MS: u64 = 20;
