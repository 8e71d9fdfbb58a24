// src/core/classifier.rs

//! Chooses how arguments are handed to a custom shell.

use crate::models::{DispatchMode, ShellSpec};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::path::Path;

lazy_static! {
    /// Shells that accept a whole command line through a flag, keyed by their canonical
    /// name (lowercase basename without `.exe`). To support another shell, add it here.
    static ref SHELL_TABLE: HashMap<&'static str, &'static str> = HashMap::from([
        // POSIX-compatible shells
        ("sh", "-c"),
        ("bash", "-c"),
        ("zsh", "-c"),
        ("dash", "-c"),
        ("ksh", "-c"),
        ("fish", "-c"),
        // PowerShell (cross-platform)
        ("pwsh", "-c"),
        ("powershell", "-c"),
    ]);
}

/// Reduces a program name or path to the key used in the shell table:
/// basename, lowercased, with a trailing `.exe` removed.
pub fn canonical_shell_name(program: &str) -> String {
    let base = Path::new(program)
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| program.to_lowercase());
    match base.strip_suffix(".exe") {
        Some(stripped) => stripped.to_string(),
        None => base,
    }
}

/// The command-string flag registered for a canonical shell name, if any.
pub fn command_string_flag(shell_name: &str) -> Option<&'static str> {
    SHELL_TABLE.get(shell_name).copied()
}

/// Decides the calling convention for a shell spec.
///
/// Join mode requires both:
/// 1. `spec[0]` names a shell in the table, and
/// 2. the last token is exactly that shell's command-string flag.
///
/// So `bash -c` joins while `bash -x`, `bash -c extra` and `myshell -c` do not.
/// Specs with fewer than two tokens always use separate arguments.
pub fn classify(spec: &ShellSpec) -> DispatchMode {
    let tokens = spec.tokens();
    if tokens.len() < 2 {
        return DispatchMode::SeparateArgs;
    }
    let (Some(program), Some(last)) = (tokens.first(), tokens.last()) else {
        return DispatchMode::SeparateArgs;
    };
    let Some(flag) = command_string_flag(&canonical_shell_name(program)) else {
        return DispatchMode::SeparateArgs;
    };
    if last == flag {
        DispatchMode::Join
    } else {
        DispatchMode::SeparateArgs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(tokens: &[&str]) -> ShellSpec {
        ShellSpec::from(tokens)
    }

    #[test]
    fn test_classify_truth_table() {
        let cases: &[(&[&str], DispatchMode)] = &[
            (&["bash", "-c"], DispatchMode::Join),
            (&["bash", "-x"], DispatchMode::SeparateArgs),
            (&["bash", "-c", "extra"], DispatchMode::SeparateArgs),
            (&["pwsh", "-nop", "-c"], DispatchMode::Join),
            (&["myshell", "-c"], DispatchMode::SeparateArgs),
            (&["docker", "run", "--rm", "alpine"], DispatchMode::SeparateArgs),
            (&[], DispatchMode::SeparateArgs),
            (&["bash"], DispatchMode::SeparateArgs),
        ];
        for (tokens, expected) in cases {
            assert_eq!(classify(&spec(tokens)), *expected, "classify({:?})", tokens);
        }
    }

    #[test]
    fn test_classify_uses_basename_and_strips_exe() {
        assert_eq!(classify(&spec(&["/usr/bin/zsh", "-c"])), DispatchMode::Join);
        assert_eq!(classify(&spec(&["BASH.EXE", "-c"])), DispatchMode::Join);
        assert_eq!(classify(&spec(&["PowerShell.exe", "-NoProfile", "-c"])), DispatchMode::Join);
    }

    #[test]
    fn test_classify_flag_match_is_exact() {
        assert_eq!(classify(&spec(&["bash", "-C"])), DispatchMode::SeparateArgs);
        assert_eq!(classify(&spec(&["sh", "-ec"])), DispatchMode::SeparateArgs);
    }

    #[test]
    fn test_canonical_shell_name() {
        assert_eq!(canonical_shell_name("/bin/Dash"), "dash");
        assert_eq!(canonical_shell_name("fish.exe"), "fish");
        assert_eq!(canonical_shell_name("sudo"), "sudo");
        assert_eq!(command_string_flag("ksh"), Some("-c"));
        assert_eq!(command_string_flag("docker"), None);
    }
}
