// src/core/task_executor.rs

//! Task planning (setting inheritance) and sequential execution of a task's commands.

use crate::{
    CancellationToken,
    core::{
        environment,
        expand::{self, ExpandError},
        script::{self, RunCommandOptions, RunError},
    },
    models::{ProjectConfig, ShellSpec, TaskConfig, Variable},
    system::io::IoStreams,
};
use colored::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while planning or running a task.
#[derive(Error, Debug)]
pub enum TaskError {
    /// No task with this name exists in the config.
    #[error("Task '{0}' not found.")]
    UnknownTask(String),
    /// An `env` key that cannot be an environment variable name.
    #[error("Task '{task}' has an invalid env name '{name}'.")]
    InvalidEnvName {
        /// Task being planned.
        task: String,
        /// Offending key.
        name: String,
    },
    /// The task `dir` could not be expanded.
    #[error("Could not expand directory of task '{task}': {source}")]
    Dir {
        /// Task being planned.
        task: String,
        /// Expansion failure.
        #[source]
        source: ExpandError,
    },
    /// One of the task's commands failed or exited non-zero.
    #[error("Task '{task}' failed: {source}")]
    Run {
        /// Task being run.
        task: String,
        /// Runner failure.
        #[source]
        source: RunError,
    },
}

impl TaskError {
    /// The script exit status behind this error, if the task simply exited non-zero.
    pub fn exit_status(&self) -> Option<u8> {
        match self {
            Self::Run { source, .. } => source.exit_status(),
            _ => None,
        }
    }

    /// Whether the task stopped because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Run {
                source: RunError::Cancelled,
                ..
            }
        )
    }
}

/// Everything needed to run one task's commands, after config inheritance.
#[derive(Debug, Clone)]
pub struct TaskPlan {
    /// Task name.
    pub name: String,
    /// Command text, one entry per runner invocation.
    pub cmds: Vec<String>,
    /// Working directory.
    pub dir: PathBuf,
    /// `NAME=VALUE` entries for the runner.
    pub env: Vec<String>,
    /// Global then task POSIX options.
    pub posix_opts: Vec<String>,
    /// Effective custom shell, if any.
    pub sh: Option<ShellSpec>,
}

/// Resolves a task against its project.
///
/// The custom shell is picked from `sh_override`, then the task's `sh`, then the global
/// `sh`. Environment layers are the process environment, then the global `env`, then the
/// task's `env`. The task `dir` is expanded and made relative to `root`.
pub fn plan_task(
    config: &ProjectConfig,
    name: &str,
    root: &Path,
    sh_override: Option<ShellSpec>,
) -> Result<TaskPlan, TaskError> {
    let task: &TaskConfig = config
        .tasks
        .get(name)
        .ok_or_else(|| TaskError::UnknownTask(name.to_string()))?;

    let mut vars = environment::import_process_env();
    for (key, value) in config.env.iter().chain(task.env.iter()) {
        if !environment::is_valid_env_name(key) {
            return Err(TaskError::InvalidEnvName {
                task: name.to_string(),
                name: key.clone(),
            });
        }
        vars.insert(key.clone(), Variable::exported(value.clone()));
    }

    let dir = match &task.dir {
        Some(dir) => {
            let expanded = expand::expand_literal(&dir.to_string_lossy(), &vars)
                .map_err(|source| TaskError::Dir {
                    task: name.to_string(),
                    source,
                })?;
            root.join(expanded)
        }
        None => root.to_path_buf(),
    };

    let sh = sh_override
        .or_else(|| task.sh.clone())
        .or_else(|| config.sh.clone())
        .filter(|spec| !spec.is_empty());

    Ok(TaskPlan {
        name: name.to_string(),
        cmds: task.cmds.clone(),
        dir,
        env: environment::project_vars(&vars),
        posix_opts: config.set.iter().chain(task.set.iter()).cloned().collect(),
        sh,
    })
}

/// Runs every command of a planned task in order, stopping at the first failure.
pub fn execute_task(
    plan: &TaskPlan,
    cancellation_token: &CancellationToken,
) -> Result<(), TaskError> {
    if plan.cmds.is_empty() {
        println!("{}", "Task is empty. Nothing to execute.".yellow());
        return Ok(());
    }
    if let Some(sh) = &plan.sh {
        log::debug!(
            "Task '{}' routes external commands through {:?}",
            plan.name,
            sh.tokens()
        );
    }

    for cmd in &plan.cmds {
        println!("{} {}", "→".blue(), cmd.green());
        let opts = RunCommandOptions {
            command: cmd.clone(),
            dir: plan.dir.clone(),
            env: plan.env.clone(),
            posix_opts: plan.posix_opts.clone(),
            sh: plan.sh.clone(),
            streams: IoStreams::default(),
        };
        script::run_command(Some(&opts), cancellation_token).map_err(|source| TaskError::Run {
            task: plan.name.clone(),
            source,
        })?;
    }
    Ok(())
}
