// src/system/dispatcher.rs

//! Spawning external commands, either through a custom shell or directly.

use crate::{
    CancellationToken,
    constants::CHILD_POLL_INTERVAL_MS,
    core::{classifier, environment, quoting},
    models::{DispatchMode, ExecutionContext, ShellSpec},
};
use std::process::{Child, Command, ExitStatus};
use std::sync::atomic::Ordering;
use std::time::Duration;
use thiserror::Error;

/// Why a dispatched command did not succeed.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The shell spec has no program.
    #[error("No custom shell program configured (empty `sh`).")]
    EmptyShell,
    /// The program could not be spawned or waited on.
    #[error("Command '{program}' could not be executed: {source}")]
    Launch {
        /// Program that failed to start.
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// The child finished with a non-zero status.
    #[error("exit status {0}")]
    ExitStatus(u8),
    /// The cancellation token was set.
    #[error("Operation was cancelled.")]
    Cancelled,
}

impl DispatchError {
    /// The status a script should report for this outcome, if it is a plain exit status.
    pub fn exit_status(&self) -> Option<u8> {
        match self {
            Self::ExitStatus(code) => Some(*code),
            _ => None,
        }
    }
}

/// Forwards external commands to a configured custom shell.
///
/// The calling convention is fixed when the dispatcher is built:
///
/// - **Separate args** (`docker run --rm alpine`, `ssh user@host`, `sudo`): every expanded
///   argument is appended as its own OS argument.
/// - **Join** (`bash -c`, `sh -c`, `pwsh -c`, ...): the arguments are single-quoted and joined
///   into one string passed after the command-string flag, so the shell re-parses it as a
///   command line with the original word boundaries.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    spec: ShellSpec,
    mode: DispatchMode,
}

impl CommandDispatcher {
    /// Builds a dispatcher for `spec`, classifying its calling convention once.
    pub fn new(spec: ShellSpec) -> Result<Self, DispatchError> {
        if spec.is_empty() {
            return Err(DispatchError::EmptyShell);
        }
        let mode = classifier::classify(&spec);
        log::debug!("Custom shell {:?} uses {:?} mode.", spec.tokens(), mode);
        Ok(Self { spec, mode })
    }

    /// The configured shell spec.
    pub fn spec(&self) -> &ShellSpec {
        &self.spec
    }

    /// The calling convention chosen for the spec.
    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Returns the program and the full OS argument vector for an expanded invocation.
    pub fn build_argv<S: AsRef<str>>(&self, args: &[S]) -> (&str, Vec<String>) {
        let program = self.spec.program().unwrap_or_default();
        let mut argv: Vec<String> = self.spec.prefix_args().to_vec();
        match self.mode {
            DispatchMode::SeparateArgs => {
                argv.extend(args.iter().map(|a| a.as_ref().to_string()));
            }
            DispatchMode::Join => argv.push(quoting::join(args)),
        }
        (program, argv)
    }

    /// Runs one external command through the custom shell and waits for it.
    ///
    /// An empty invocation does nothing.
    pub fn dispatch<S: AsRef<str>>(
        &self,
        args: &[S],
        ctx: &ExecutionContext,
    ) -> Result<(), DispatchError> {
        if args.is_empty() {
            return Ok(());
        }
        let (program, argv) = self.build_argv(args);
        spawn_and_wait(program, &argv, ctx)
    }
}

/// Runs an external command without a custom shell: `args[0]` is the program.
pub fn run_direct<S: AsRef<str>>(args: &[S], ctx: &ExecutionContext) -> Result<(), DispatchError> {
    let Some((program, rest)) = args.split_first() else {
        return Ok(());
    };
    let argv: Vec<String> = rest.iter().map(|a| a.as_ref().to_string()).collect();
    spawn_and_wait(program.as_ref(), &argv, ctx)
}

fn spawn_and_wait(
    program: &str,
    argv: &[String],
    ctx: &ExecutionContext,
) -> Result<(), DispatchError> {
    let launch_err = |source: std::io::Error| DispatchError::Launch {
        program: program.to_string(),
        source,
    };

    if is_cancelled(&ctx.cancellation) {
        return Err(DispatchError::Cancelled);
    }

    let mut command = Command::new(program);
    command
        .args(argv)
        .current_dir(dunce::simplified(&ctx.dir))
        .env_clear()
        .stdin(ctx.streams.stdin.to_stdio().map_err(launch_err)?)
        .stdout(ctx.streams.stdout.to_stdio().map_err(launch_err)?)
        .stderr(ctx.streams.stderr.to_stdio().map_err(launch_err)?);
    command.envs(environment::project_pairs(&ctx.vars));

    log::trace!("Spawning {} {:?} in {}", program, argv, ctx.dir.display());
    let child = command.spawn().map_err(launch_err)?;
    let status = wait_for_child(child, &ctx.cancellation).map_err(|e| match e {
        WaitOutcome::Cancelled => DispatchError::Cancelled,
        WaitOutcome::Io(source) => launch_err(source),
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(DispatchError::ExitStatus(exit_code(status)))
    }
}

enum WaitOutcome {
    Cancelled,
    Io(std::io::Error),
}

/// Waits for the child without blocking on it, so a cancellation request can kill it.
fn wait_for_child(mut child: Child, token: &CancellationToken) -> Result<ExitStatus, WaitOutcome> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if is_cancelled(token) {
                    log::debug!(
                        "Cancellation requested, killing child process (PID: {})...",
                        child.id()
                    );
                    if let Err(e) = child.kill() {
                        log::warn!("Failed to kill child process {}: {}", child.id(), e);
                    }
                    // Reap it so no zombie is left behind.
                    child.wait().ok();
                    return Err(WaitOutcome::Cancelled);
                }
                std::thread::sleep(Duration::from_millis(CHILD_POLL_INTERVAL_MS));
            }
            Err(e) => return Err(WaitOutcome::Io(e)),
        }
    }
}

fn is_cancelled(token: &CancellationToken) -> bool {
    token.load(Ordering::SeqCst)
}

/// Maps a finished child's status to a shell exit code.
fn exit_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return u8::try_from(code).unwrap_or(u8::MAX);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return u8::try_from(128 + signal).unwrap_or(u8::MAX);
        }
    }
    u8::MAX
}
