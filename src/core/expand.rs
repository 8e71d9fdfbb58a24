// src/core/expand.rs

//! `~` and `$VAR` expansion against the interpreter's variables.

use crate::models::Variable;
use std::collections::BTreeMap;
use std::convert::Infallible;
use thiserror::Error;

/// Errors from word splitting and expansion.
#[derive(Error, Debug)]
pub enum ExpandError {
    /// A quote was opened and never closed.
    #[error("Unbalanced quotes in '{0}'.")]
    UnbalancedQuotes(String),
    /// `shellexpand` rejected the input.
    #[error("Failed to expand '{input}': {message}")]
    Lookup {
        /// Word being expanded.
        input: String,
        /// Reason reported by the expander.
        message: String,
    },
}

/// Expands `~` and `$VAR` / `${VAR}` references in a single word.
///
/// Variables are looked up in `vars`; unset ones expand to an empty string, as in a shell.
pub fn expand_literal(s: &str, vars: &BTreeMap<String, Variable>) -> Result<String, ExpandError> {
    if s.is_empty() {
        return Ok(String::new());
    }
    let home_dir = || {
        vars.get("HOME")
            .map(|home| home.as_str().to_string())
            .or_else(|| dirs::home_dir().map(|p| p.to_string_lossy().into_owned()))
    };
    let context = |name: &str| -> Result<Option<String>, Infallible> {
        Ok(Some(
            vars.get(name)
                .map(|var| var.as_str().to_string())
                .unwrap_or_default(),
        ))
    };
    shellexpand::full_with_context(s, home_dir, context)
        .map(|expanded| expanded.into_owned())
        .map_err(|e| ExpandError::Lookup {
            input: s.to_string(),
            message: e.to_string(),
        })
}

/// Splits `s` into words using POSIX quoting rules, then expands each word.
pub fn expand_fields(
    s: &str,
    vars: &BTreeMap<String, Variable>,
) -> Result<Vec<String>, ExpandError> {
    let words = shlex::split(s).ok_or_else(|| ExpandError::UnbalancedQuotes(s.to_string()))?;
    words
        .iter()
        .map(|word| expand_literal(word, vars))
        .collect()
}
