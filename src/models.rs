// src/models.rs

//! Configuration and interpreter data types shared across the crate.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;
use std::path::PathBuf;
use std::str::FromStr;

use crate::CancellationToken;
use crate::system::io::IoStreams;

// --- SHELL SPECIFICATION ---

/// The configured alternate shell, as an ordered list of tokens.
///
/// `tokens[0]` is the program to execute, the rest are fixed prefix arguments
/// (one of which may be a command-string flag such as `-c`).
///
/// In `shroute.toml` it can be written either as a string, which is split on
/// whitespace, or as an explicit array:
///
/// ```toml
/// sh = "docker run --rm alpine"
/// sh = ["ssh", "user@host"]
/// ```
///
/// The string form cannot express a token containing a space; use the array
/// form for that.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(from = "RawShellSpec")]
pub struct ShellSpec(Vec<String>);

/// The two node shapes accepted for `sh`. Anything else is rejected by serde
/// while the config file is parsed.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawShellSpec {
    Line(String),
    Tokens(Vec<String>),
}

impl From<RawShellSpec> for ShellSpec {
    fn from(raw: RawShellSpec) -> Self {
        match raw {
            RawShellSpec::Line(line) => line.parse().unwrap_or_default(),
            RawShellSpec::Tokens(tokens) => Self(tokens),
        }
    }
}

impl FromStr for ShellSpec {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.split_whitespace().map(str::to_string).collect()))
    }
}

impl From<Vec<String>> for ShellSpec {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl From<&[&str]> for ShellSpec {
    fn from(tokens: &[&str]) -> Self {
        Self(tokens.iter().map(|t| t.to_string()).collect())
    }
}

impl ShellSpec {
    /// All tokens, program first.
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Whether no program is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The executable name or path (`spec[0]`).
    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// The fixed arguments placed before the forwarded command (`spec[1..]`).
    pub fn prefix_args(&self) -> &[String] {
        self.0.get(1..).unwrap_or(&[])
    }
}

/// How expanded arguments are handed to the custom shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Each argument becomes its own OS-level argument (`docker run --rm alpine echo hi`).
    SeparateArgs,
    /// All arguments are quoted and joined into one OS-level argument (`bash -c "'echo' 'hi'"`).
    Join,
}

// --- INTERPRETER STATE ---

/// The value held by a script variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarValue {
    /// Declared (for example by `export NAME`) but never assigned.
    Unset,
    /// A plain string.
    String(String),
    /// An indexed array.
    Indexed(Vec<String>),
    /// An associative array.
    Associative(BTreeMap<String, String>),
}

/// A script variable. Only exported string variables reach child processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Current value.
    pub value: VarValue,
    /// Whether the variable is passed on to child processes.
    pub exported: bool,
}

impl Variable {
    /// An exported string variable.
    pub fn exported(value: impl Into<String>) -> Self {
        Self {
            value: VarValue::String(value.into()),
            exported: true,
        }
    }

    /// A string variable that stays inside the script.
    pub fn local(value: impl Into<String>) -> Self {
        Self {
            value: VarValue::String(value.into()),
            exported: false,
        }
    }

    /// The value as a plain string. Arrays yield their first element, like `$arr` does.
    pub fn as_str(&self) -> &str {
        match &self.value {
            VarValue::Unset => "",
            VarValue::String(s) => s,
            VarValue::Indexed(items) => items.first().map(String::as_str).unwrap_or(""),
            VarValue::Associative(map) => map.get("0").map(String::as_str).unwrap_or(""),
        }
    }
}

/// Everything the dispatcher reads from the interpreter for a single external command.
/// Owned by the interpreter; borrowed for the duration of one dispatch.
#[derive(Debug)]
pub struct ExecutionContext {
    /// Working directory for spawned commands.
    pub dir: PathBuf,
    /// Standard streams for spawned commands.
    pub streams: IoStreams,
    /// Script variables. Exported strings form the child environment.
    pub vars: BTreeMap<String, Variable>,
    /// Set to stop the running command.
    pub cancellation: CancellationToken,
}

// --- `shroute.toml` MODELS ---

/// Represents the deserialized structure of a `shroute.toml` file.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ProjectConfig {
    /// Custom shell for every task that does not set its own.
    pub sh: Option<ShellSpec>,
    /// Variables exported to every task.
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// POSIX options enabled for every task.
    #[serde(default)]
    pub set: Vec<String>,
    /// Tasks by name.
    #[serde(default)]
    pub tasks: HashMap<String, TaskConfig>,
}

/// One `[tasks.<name>]` table.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TaskConfig {
    /// Commands, run in order.
    #[serde(default)]
    pub cmds: Vec<String>,
    /// Shown by `--list`.
    pub desc: Option<String>,
    /// Overrides the global `sh`.
    pub sh: Option<ShellSpec>,
    /// Working directory, relative to the config file.
    pub dir: Option<PathBuf>,
    /// Variables layered over the global `env`.
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// POSIX options added after the global ones.
    #[serde(default)]
    pub set: Vec<String>,
}
