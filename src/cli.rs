// src/cli.rs

//! Command-line arguments.

use crate::constants::PROJECT_CONFIG_FILENAME;
use clap::Parser;
use std::path::PathBuf;

/// shroute: runs tasks from `shroute.toml`, routing external commands through a custom shell.
///
/// A task's `sh` setting decides how each external command is executed:
///
/// - Prefix wrappers (`docker run --rm alpine`, `ssh user@host`, `sudo`) receive the
///   command and its arguments as separate trailing arguments.
/// - Command-string shells (`bash -c`, `sh -c`, `zsh -c`, `pwsh -c`, ...) receive the whole
///   command as one quoted string.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The task to run. Omit it together with `--list` to see the available tasks.
    pub task: Option<String>,

    /// Path to the task file.
    #[arg(short, long, default_value = PROJECT_CONFIG_FILENAME)]
    pub file: PathBuf,

    /// Overrides the custom shell for this run (split on whitespace), e.g. "bash -c".
    #[arg(long)]
    pub sh: Option<String>,

    /// Cancels the task after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Lists the tasks defined in the task file.
    #[arg(short, long)]
    pub list: bool,
}
