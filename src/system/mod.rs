//! # System Interaction Layer
//!
//! The boundary between the command runner and the operating system.
//!
//! ## Modules
//!
//! - **`dispatcher`**: Spawns one subprocess per external command, either directly or through
//!   the configured custom shell, and maps its outcome to an exit status. Cancellation kills
//!   the child instead of waiting for it.
//! - **`io`**: Standard stream plumbing for subprocesses and redirections, including the
//!   in-memory `/dev/null` used on every platform.

pub mod dispatcher;
pub mod io;
