// src/core/script.rs

//! # Command Runner
//!
//! Runs a task's command text line by line. This is a deliberately small interpreter: one
//! command per line, POSIX word quoting, `$VAR`/`~` expansion per word, a handful of
//! builtins and simple redirections. Everything else is an external command, which is
//! handed to the [`CommandDispatcher`] when a custom shell is configured, or spawned
//! directly otherwise.

use crate::{
    CancellationToken,
    constants::ERREXIT_OPT,
    core::{
        environment,
        expand::{self, ExpandError},
    },
    models::{ExecutionContext, ShellSpec, VarValue, Variable},
    system::{
        dispatcher::{self, CommandDispatcher, DispatchError},
        io::{self, IoStreams},
    },
};
use lazy_static::lazy_static;
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use thiserror::Error;

lazy_static! {
    static ref ASSIGNMENT_RE: Regex =
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)=(.*)$").expect("valid assignment regex");
    static ref ARRAY_ASSIGNMENT_RE: Regex =
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)=\((.*)$").expect("valid array assignment regex");
    static ref NAME_RE: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid name regex");
    static ref REDIRECT_RE: Regex =
        Regex::new(r"^(2>|>>|>|<)(.*)$").expect("valid redirection regex");
}

/// Text of capture group `idx`, or `""` when it did not participate.
fn group<'h>(caps: &regex::Captures<'h>, idx: usize) -> &'h str {
    caps.get(idx).map_or("", |m| m.as_str())
}

/// Errors from [`run_command`].
#[derive(Error, Debug)]
pub enum RunError {
    /// No options were given.
    #[error("run_command: nil options given")]
    NilOptions,
    /// A POSIX option the runner does not support.
    #[error("Invalid shell option '{0}'.")]
    InvalidOption(String),
    /// A line could not be split or expanded.
    #[error("Line {line}: {source}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Expansion failure.
        #[source]
        source: ExpandError,
    },
    /// `NAME=(...)` without a closing parenthesis.
    #[error("Line {line}: malformed array assignment '{text}'.")]
    ArrayAssignment {
        /// 1-based line number.
        line: usize,
        /// The assignment as written.
        text: String,
    },
    /// A redirection operator at the end of a line.
    #[error("Redirection '{0}' is missing a target.")]
    MissingRedirectTarget(String),
    /// A redirection target could not be opened.
    #[error("Could not open '{path}': {source}")]
    Redirect {
        /// Target path.
        path: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// The working directory could not be resolved.
    #[error("Could not resolve working directory '{path}': {source}")]
    Dir {
        /// Requested directory.
        path: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// Writing builtin output failed.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
    /// An external command could not be dispatched.
    #[error(transparent)]
    Dispatch(DispatchError),
    /// The script finished with a non-zero status.
    #[error("exit status {0}")]
    ExitStatus(u8),
    /// The cancellation token was set.
    #[error("Operation was cancelled.")]
    Cancelled,
}

impl RunError {
    /// The exit status to report for a script that ended with a non-zero status.
    pub fn exit_status(&self) -> Option<u8> {
        match self {
            Self::ExitStatus(code) => Some(*code),
            _ => None,
        }
    }
}

/// Options for [`run_command`].
#[derive(Debug, Default)]
pub struct RunCommandOptions {
    /// Command text, one command per line.
    pub command: String,
    /// Working directory. Empty means the current directory.
    pub dir: PathBuf,
    /// `NAME=VALUE` entries. When empty, the process environment is used.
    pub env: Vec<String>,
    /// POSIX options such as `"x"` or `"errexit"`. `errexit` is always added.
    pub posix_opts: Vec<String>,
    /// Custom shell for external commands.
    pub sh: Option<ShellSpec>,
    /// Standard streams of the script.
    pub streams: IoStreams,
}

/// Runs the command text described by `opts`.
///
/// Returns `Ok(())` when the script finishes with status 0, `RunError::ExitStatus(n)` when
/// it finishes (or aborts under `errexit`) with status `n`, and other errors for failures
/// that are not exit statuses.
pub fn run_command(
    opts: Option<&RunCommandOptions>,
    cancellation_token: &CancellationToken,
) -> Result<(), RunError> {
    let opts = opts.ok_or(RunError::NilOptions)?;

    let mut posix_opts = opts.posix_opts.clone();
    posix_opts.push(ERREXIT_OPT.to_string());

    let vars = if opts.env.is_empty() {
        environment::import_process_env()
    } else {
        environment::import_env_list(&opts.env)
    };

    let dispatcher = match &opts.sh {
        Some(spec) if !spec.is_empty() => {
            Some(CommandDispatcher::new(spec.clone()).map_err(RunError::Dispatch)?)
        }
        _ => None,
    };

    let mut interpreter = Interpreter {
        ctx: ExecutionContext {
            dir: resolve_dir(&opts.dir)?,
            streams: opts.streams.try_clone()?,
            vars,
            cancellation: cancellation_token.clone(),
        },
        dispatcher,
        errexit: false,
        xtrace: false,
    };
    for opt in &posix_opts {
        if !interpreter.set_option(opt, true) {
            return Err(RunError::InvalidOption(opt.clone()));
        }
    }

    match interpreter.run(&opts.command)? {
        0 => Ok(()),
        code => Err(RunError::ExitStatus(code)),
    }
}

/// An existing directory is canonicalized. A missing one is kept as an absolute path,
/// since the task may create it before anything runs there.
fn resolve_dir(dir: &Path) -> Result<PathBuf, RunError> {
    let dir_err = |source| RunError::Dir {
        path: dir.display().to_string(),
        source,
    };
    let cwd = std::env::current_dir().map_err(dir_err)?;
    if dir.as_os_str().is_empty() {
        return Ok(cwd);
    }
    let absolute = cwd.join(dir);
    if absolute.is_dir() {
        dunce::canonicalize(&absolute).map_err(dir_err)
    } else {
        log::debug!(
            "Working directory '{}' does not exist yet; using it as is.",
            absolute.display()
        );
        Ok(absolute)
    }
}

enum Flow {
    Continue(u8),
    Exit(u8),
}

struct Interpreter {
    ctx: ExecutionContext,
    dispatcher: Option<CommandDispatcher>,
    errexit: bool,
    xtrace: bool,
}

impl Interpreter {
    fn set_option(&mut self, opt: &str, enable: bool) -> bool {
        match opt {
            "e" | "errexit" => self.errexit = enable,
            "x" | "xtrace" => self.xtrace = enable,
            _ => return false,
        }
        true
    }

    fn run(&mut self, script: &str) -> Result<u8, RunError> {
        let mut status = 0;
        for (idx, line) in script.lines().enumerate() {
            if self.ctx.cancellation.load(Ordering::SeqCst) {
                return Err(RunError::Cancelled);
            }
            let line_no = idx + 1;
            let words = shlex::split(line).ok_or_else(|| RunError::Parse {
                line: line_no,
                source: ExpandError::UnbalancedQuotes(line.to_string()),
            })?;
            if words.is_empty() {
                continue;
            }
            match self.run_words(line_no, words)? {
                Flow::Exit(code) => return Ok(code),
                Flow::Continue(code) => {
                    status = code;
                    if status != 0 && self.errexit {
                        log::debug!("Line {} exited with status {}; stopping.", line_no, status);
                        return Ok(status);
                    }
                }
            }
        }
        Ok(status)
    }

    fn expand(&self, line: usize, word: &str) -> Result<String, RunError> {
        expand::expand_literal(word, &self.ctx.vars)
            .map_err(|source| RunError::Parse { line, source })
    }

    fn run_words(&mut self, line: usize, words: Vec<String>) -> Result<Flow, RunError> {
        let Some((first, tail)) = words.split_first() else {
            return Ok(Flow::Continue(0));
        };
        if let Some(caps) = ARRAY_ASSIGNMENT_RE.captures(first) {
            let name = group(&caps, 1).to_string();
            let head = group(&caps, 2).to_string();
            self.assign_array(line, name, head, tail)?;
            return Ok(Flow::Continue(0));
        }

        // Leading `NAME=value` words.
        let mut assignments = Vec::new();
        let mut rest = words.as_slice();
        while let Some((first, tail)) = rest.split_first() {
            let Some(caps) = ASSIGNMENT_RE.captures(first) else {
                break;
            };
            let value = self.expand(line, group(&caps, 2))?;
            assignments.push((group(&caps, 1).to_string(), value));
            rest = tail;
        }

        if rest.is_empty() {
            for (name, value) in assignments {
                self.set_var(name, value);
            }
            return Ok(Flow::Continue(0));
        }

        let mut streams = self.ctx.streams.try_clone()?;
        let mut args = Vec::with_capacity(rest.len());
        let mut iter = rest.iter();
        while let Some(word) = iter.next() {
            let Some(caps) = REDIRECT_RE.captures(word) else {
                args.push(self.expand(line, word)?);
                continue;
            };
            let op = group(&caps, 1).to_string();
            let target = match group(&caps, 2) {
                "" => iter
                    .next()
                    .ok_or_else(|| RunError::MissingRedirectTarget(op.clone()))?
                    .clone(),
                attached => attached.to_string(),
            };
            let target = self.expand(line, &target)?;
            self.apply_redirect(&mut streams, &op, &target)?;
        }

        if args.is_empty() {
            return Ok(Flow::Continue(0));
        }
        if self.xtrace {
            writeln!(streams.stderr, "+ {}", args.join(" "))?;
        }
        self.run_simple(args, assignments, streams)
    }

    fn apply_redirect(
        &self,
        streams: &mut IoStreams,
        op: &str,
        target: &str,
    ) -> Result<(), RunError> {
        let redirect_err = |source| RunError::Redirect {
            path: target.to_string(),
            source,
        };
        let dir = &self.ctx.dir;
        match op {
            "<" => streams.stdin = io::open_input(target, dir).map_err(redirect_err)?,
            ">" => streams.stdout = io::open_output(target, false, dir).map_err(redirect_err)?,
            ">>" => streams.stdout = io::open_output(target, true, dir).map_err(redirect_err)?,
            _ => streams.stderr = io::open_output(target, false, dir).map_err(redirect_err)?,
        }
        Ok(())
    }

    fn run_simple(
        &mut self,
        args: Vec<String>,
        assignments: Vec<(String, String)>,
        mut streams: IoStreams,
    ) -> Result<Flow, RunError> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Flow::Continue(0));
        };
        let status = match name.as_str() {
            "true" | ":" => 0,
            "false" => 1,
            "echo" => {
                let (newline, words) = match rest.split_first() {
                    Some((flag, words)) if flag == "-n" => (false, words),
                    _ => (true, rest),
                };
                write!(streams.stdout, "{}", words.join(" "))?;
                if newline {
                    writeln!(streams.stdout)?;
                }
                streams.stdout.flush()?;
                0
            }
            "exit" => {
                let code = match rest.first() {
                    Some(arg) => match arg.parse::<i64>() {
                        Ok(n) => u8::try_from(n.rem_euclid(256)).unwrap_or(u8::MAX),
                        Err(_) => {
                            writeln!(streams.stderr, "exit: {}: numeric argument required", arg)?;
                            2
                        }
                    },
                    None => 0,
                };
                return Ok(Flow::Exit(code));
            }
            "export" => self.builtin_export(rest, &mut streams)?,
            "unset" => {
                for name in rest {
                    self.ctx.vars.remove(name);
                }
                0
            }
            "cd" => self.builtin_cd(rest.first(), &mut streams)?,
            "set" => self.builtin_set(rest, &mut streams)?,
            _ => self.run_external(&args, assignments, streams)?,
        };
        Ok(Flow::Continue(status))
    }

    fn run_external(
        &self,
        args: &[String],
        assignments: Vec<(String, String)>,
        streams: IoStreams,
    ) -> Result<u8, RunError> {
        let mut vars = self.ctx.vars.clone();
        for (name, value) in assignments {
            vars.insert(name, Variable::exported(value));
        }
        let ctx = ExecutionContext {
            dir: self.ctx.dir.clone(),
            streams,
            vars,
            cancellation: self.ctx.cancellation.clone(),
        };

        let result = match &self.dispatcher {
            Some(dispatcher) => dispatcher.dispatch(args, &ctx),
            None => dispatcher::run_direct(args, &ctx),
        };
        match result {
            Ok(()) => Ok(0),
            Err(DispatchError::ExitStatus(code)) => Ok(code),
            Err(DispatchError::Cancelled) => Err(RunError::Cancelled),
            Err(e) => Err(RunError::Dispatch(e)),
        }
    }

    fn builtin_export(
        &mut self,
        args: &[String],
        streams: &mut IoStreams,
    ) -> Result<u8, RunError> {
        let mut status = 0;
        for arg in args {
            let (name, value) = match arg.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (arg.as_str(), None),
            };
            if !NAME_RE.is_match(name) {
                writeln!(streams.stderr, "export: '{}': not a valid identifier", arg)?;
                status = 1;
                continue;
            }
            match value {
                Some(value) => {
                    self.ctx.vars.insert(name.to_string(), Variable::exported(value));
                }
                // Marks the name so a later assignment is exported too.
                None => {
                    self.ctx
                        .vars
                        .entry(name.to_string())
                        .or_insert(Variable {
                            value: VarValue::Unset,
                            exported: true,
                        })
                        .exported = true;
                }
            }
        }
        Ok(status)
    }

    fn builtin_cd(
        &mut self,
        target: Option<&String>,
        streams: &mut IoStreams,
    ) -> Result<u8, RunError> {
        let target = match target {
            Some(t) => PathBuf::from(t),
            None => match self.ctx.vars.get("HOME") {
                Some(home) => PathBuf::from(home.as_str()),
                None => {
                    writeln!(streams.stderr, "cd: HOME not set")?;
                    return Ok(1);
                }
            },
        };
        let new_dir = self.ctx.dir.join(&target);
        match dunce::canonicalize(&new_dir) {
            Ok(dir) if dir.is_dir() => {
                self.ctx.dir = dir;
                Ok(0)
            }
            _ => {
                writeln!(streams.stderr, "cd: {}: No such directory", target.display())?;
                Ok(1)
            }
        }
    }

    fn builtin_set(&mut self, args: &[String], streams: &mut IoStreams) -> Result<u8, RunError> {
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let (enable, flags) = match arg.split_at_checked(1) {
                Some(("-", flags)) => (true, flags),
                Some(("+", flags)) => (false, flags),
                _ => {
                    writeln!(streams.stderr, "set: {}: invalid option", arg)?;
                    return Ok(2);
                }
            };
            let ok = if flags == "o" {
                iter.next().is_some_and(|name| self.set_option(name, enable))
            } else {
                flags.chars().all(|c| self.set_option(&c.to_string(), enable))
            };
            if !ok {
                writeln!(streams.stderr, "set: {}: invalid option", arg)?;
                return Ok(2);
            }
        }
        Ok(0)
    }

    fn set_var(&mut self, name: String, value: String) {
        let exported = self.ctx.vars.get(&name).is_some_and(|v| v.exported);
        self.ctx.vars.insert(
            name,
            Variable {
                value: VarValue::String(value),
                exported,
            },
        );
    }

    fn assign_array(
        &mut self,
        line: usize,
        name: String,
        head: String,
        tail: &[String],
    ) -> Result<(), RunError> {
        let malformed = || RunError::ArrayAssignment {
            line,
            text: format!("{}=({} {})", name, head, tail.join(" ")),
        };
        let mut raw: Vec<&str> = Vec::with_capacity(tail.len() + 1);
        if !head.is_empty() {
            raw.push(&head);
        }
        raw.extend(tail.iter().map(String::as_str));
        let last = raw.pop().ok_or_else(malformed)?;
        let last = last.strip_suffix(')').ok_or_else(malformed)?;
        if !last.is_empty() {
            raw.push(last);
        }

        let items = raw
            .into_iter()
            .map(|item| self.expand(line, item))
            .collect::<Result<Vec<_>, _>>()?;
        let exported = self.ctx.vars.get(&name).is_some_and(|v| v.exported);
        self.ctx.vars.insert(
            name,
            Variable {
                value: VarValue::Indexed(items),
                exported,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::io::OutputStream;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use tempfile::{NamedTempFile, TempDir};

    fn token() -> CancellationToken {
        Arc::new(AtomicBool::new(false))
    }

    /// Runs `command` with stdout captured, returning the result and the captured text.
    fn run_captured(command: &str, sh: &[&str]) -> (Result<(), RunError>, String) {
        let out = NamedTempFile::new().unwrap();
        let opts = RunCommandOptions {
            command: command.to_string(),
            sh: (!sh.is_empty()).then(|| ShellSpec::from(sh)),
            streams: IoStreams {
                stdout: OutputStream::File(out.reopen().unwrap()),
                ..IoStreams::default()
            },
            ..RunCommandOptions::default()
        };
        let result = run_command(Some(&opts), &token());
        let written = std::fs::read_to_string(out.path()).unwrap();
        (result, written)
    }

    #[test]
    fn test_nil_options() {
        let err = run_command(None, &token()).unwrap_err();
        assert!(matches!(err, RunError::NilOptions));
    }

    #[test]
    fn test_invalid_posix_option() {
        let opts = RunCommandOptions {
            command: "true".into(),
            posix_opts: vec!["pipefail".into()],
            ..RunCommandOptions::default()
        };
        let err = run_command(Some(&opts), &token()).unwrap_err();
        assert!(matches!(err, RunError::InvalidOption(opt) if opt == "pipefail"));
    }

    #[test]
    fn test_builtins_and_variables() {
        let (result, out) = run_captured(
            "# greet\nNAME=world\necho hello $NAME\necho -n \"quoted  ${NAME}\"",
            &[],
        );
        assert!(result.is_ok());
        assert_eq!(out, "hello world\nquoted  world");
    }

    #[test]
    fn test_errexit_stops_at_first_failure() {
        let (result, out) = run_captured("echo one\nfalse\necho two", &[]);
        assert!(matches!(result, Err(RunError::ExitStatus(1))));
        assert_eq!(out, "one\n");
    }

    #[test]
    fn test_set_plus_e_continues() {
        let (result, out) = run_captured("set +e\nfalse\necho after", &[]);
        assert!(result.is_ok());
        assert_eq!(out, "after\n");
    }

    #[test]
    fn test_exit_builtin() {
        let (result, out) = run_captured("echo before\nexit 4\necho never", &[]);
        assert!(matches!(result, Err(RunError::ExitStatus(4))));
        assert_eq!(out, "before\n");

        let (result, _) = run_captured("exit 0\nfalse", &[]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_exit_status_wraps_modulo_256() {
        let (result, _) = run_captured("exit 259", &[]);
        assert!(matches!(result, Err(RunError::ExitStatus(3))));
        let (result, _) = run_captured("exit -1", &[]);
        assert!(matches!(result, Err(RunError::ExitStatus(255))));
        let (result, _) = run_captured("exit 256", &[]);
        assert!(result.is_ok());
        let (result, _) = run_captured("exit nope", &[]);
        assert!(matches!(result, Err(RunError::ExitStatus(2))));
    }

    fn interpreter(env: &[&str]) -> Interpreter {
        Interpreter {
            ctx: ExecutionContext {
                dir: PathBuf::from("."),
                streams: IoStreams::default(),
                vars: environment::import_env_list(env),
                cancellation: token(),
            },
            dispatcher: None,
            errexit: true,
            xtrace: false,
        }
    }

    #[test]
    fn test_export_before_assignment_exports_later_value() {
        let mut interpreter = interpreter(&["PATH=/usr/bin:/bin"]);
        assert_eq!(interpreter.run("export LATER").unwrap(), 0);
        assert_eq!(interpreter.ctx.vars["LATER"].value, VarValue::Unset);
        assert_eq!(environment::project(&interpreter.ctx), vec!["PATH=/usr/bin:/bin"]);

        assert_eq!(interpreter.run("LATER=v\necho $LATER").unwrap(), 0);
        assert!(interpreter.ctx.vars["LATER"].exported);
        assert_eq!(
            environment::project(&interpreter.ctx),
            vec!["LATER=v", "PATH=/usr/bin:/bin"]
        );

        assert_eq!(interpreter.run("unset LATER\nLATER=w").unwrap(), 0);
        assert!(!interpreter.ctx.vars["LATER"].exported);
    }

    #[test]
    fn test_redirect_to_dev_null() {
        let (result, out) = run_captured("echo hidden > /dev/null\necho shown", &[]);
        assert!(result.is_ok());
        assert_eq!(out, "shown\n");
    }

    #[test]
    fn test_redirect_to_file_in_dir() {
        let dir = TempDir::new().unwrap();
        let opts = RunCommandOptions {
            command: "echo first >out.txt\necho second >> out.txt".into(),
            dir: dir.path().to_path_buf(),
            ..RunCommandOptions::default()
        };
        run_command(Some(&opts), &token()).unwrap();
        let content = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_missing_redirect_target() {
        let (result, _) = run_captured("echo x >", &[]);
        assert!(matches!(result, Err(RunError::MissingRedirectTarget(op)) if op == ">"));
    }

    #[test]
    fn test_unbalanced_quotes() {
        let (result, _) = run_captured("echo 'oops", &[]);
        assert!(matches!(result, Err(RunError::Parse { line: 1, .. })));
    }

    #[test]
    fn test_array_assignment_is_not_a_string() {
        let mut interpreter = interpreter(&["PATH=/usr/bin:/bin"]);
        assert_eq!(interpreter.run("LIST=(a 'b c' d)\nexport LIST").unwrap(), 0);
        let list = &interpreter.ctx.vars["LIST"];
        assert_eq!(
            list.value,
            VarValue::Indexed(vec!["a".into(), "b c".into(), "d".into()])
        );
        assert!(list.exported);
        assert_eq!(environment::project(&interpreter.ctx), vec!["PATH=/usr/bin:/bin"]);
    }

    #[test]
    fn test_missing_dir_is_kept_absolute() {
        let resolved = resolve_dir(Path::new("not/created/yet")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("not/created/yet"));
    }

    #[cfg(unix)]
    #[test]
    fn test_join_mode_end_to_end() {
        let (result, out) =
            run_captured("printf '[%s]' 'hello world' \"it's\"", &["sh", "-c"]);
        assert!(result.is_ok());
        assert_eq!(out, "[hello world][it's]");
    }

    #[cfg(unix)]
    #[test]
    fn test_separate_args_wrapper_end_to_end() {
        let (result, out) = run_captured("printf '%s|' a 'b c'", &["env"]);
        assert!(result.is_ok());
        assert_eq!(out, "a|b c|");
    }

    #[cfg(unix)]
    #[test]
    fn test_external_exit_status_propagates() {
        let (result, out) = run_captured("sh -c 'exit 3'\necho unreachable", &["sh", "-c"]);
        assert!(matches!(result, Err(RunError::ExitStatus(3))));
        assert!(out.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_exported_vars_reach_later_commands() {
        let (result, out) = run_captured(
            concat!(
                "export FOO=bar\n",
                "HIDDEN=nope\n",
                "sh -c 'printenv FOO; printenv HIDDEN || echo missing'\n",
                "ONESHOT=yes printenv ONESHOT\n",
                "sh -c 'printenv ONESHOT || echo gone'",
            ),
            &["sh", "-c"],
        );
        assert!(result.is_ok());
        assert_eq!(out, "bar\nmissing\nyes\ngone\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_export_of_unset_name_reaches_child() {
        let (result, out) = run_captured(
            "export LATER\nsh -c 'printenv LATER || echo absent'\nLATER=v\nsh -c 'printenv LATER'",
            &["sh", "-c"],
        );
        assert!(result.is_ok());
        assert_eq!(out, "absent\nv\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_cd_changes_dispatch_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let opts = RunCommandOptions {
            command: "cd sub\ntouch here".into(),
            dir: dir.path().to_path_buf(),
            sh: Some(ShellSpec::from(&["sh", "-c"][..])),
            ..RunCommandOptions::default()
        };
        run_command(Some(&opts), &token()).unwrap();
        assert!(dir.path().join("sub").join("here").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_error_is_not_an_exit_status() {
        let (result, _) = run_captured("anything", &["definitely-not-a-real-shell-xyz"]);
        let err = result.unwrap_err();
        assert!(matches!(err, RunError::Dispatch(DispatchError::Launch { .. })));
        assert_eq!(err.exit_status(), None);
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancelled = token();
        cancelled.store(true, Ordering::SeqCst);
        let opts = RunCommandOptions {
            command: "echo never".into(),
            ..RunCommandOptions::default()
        };
        let err = run_command(Some(&opts), &cancelled).unwrap_err();
        assert!(matches!(err, RunError::Cancelled));
    }
}
