// src/core/environment.rs

//! Projection of interpreter variables into a child process environment.

use crate::models::{ExecutionContext, VarValue, Variable};
use std::collections::BTreeMap;

/// Builds the `NAME=VALUE` list handed to a child process.
///
/// Only variables that are exported and hold a plain string are included. The result is
/// ordered by name and recomputed on every call, so later `export`s are always visible.
pub fn project(ctx: &ExecutionContext) -> Vec<String> {
    project_vars(&ctx.vars)
}

/// Same as [`project`], for a bare variable table.
pub fn project_vars(vars: &BTreeMap<String, Variable>) -> Vec<String> {
    project_pairs(vars)
        .map(|(name, value)| format!("{}={}", name, value))
        .collect()
}

/// The exported string variables as `(name, value)` pairs, ordered by name.
/// Used to fill a child environment without re-splitting `NAME=VALUE` text.
pub fn project_pairs(
    vars: &BTreeMap<String, Variable>,
) -> impl Iterator<Item = (&str, &str)> + '_ {
    vars.iter().filter_map(|(name, var)| match &var.value {
        VarValue::String(value) if var.exported => Some((name.as_str(), value.as_str())),
        _ => None,
    })
}

/// Whether `name` can be placed in a child environment: non-empty, without `=` or NUL.
pub fn is_valid_env_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['=', '\0'])
}

/// Imports the current process environment as exported string variables.
///
/// Entries whose name or value is not valid UTF-8 are skipped.
pub fn import_process_env() -> BTreeMap<String, Variable> {
    std::env::vars_os()
        .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
            (Ok(name), Ok(value)) => Some((name, Variable::exported(value))),
            (name, _) => {
                log::debug!(
                    "Skipping non UTF-8 environment variable {:?}.",
                    name.unwrap_or_else(|raw| raw.to_string_lossy().into_owned())
                );
                None
            }
        })
        .collect()
}

/// Parses a `NAME=VALUE` list into exported string variables. Entries without `=` are skipped.
pub fn import_env_list<S: AsRef<str>>(environ: &[S]) -> BTreeMap<String, Variable> {
    environ
        .iter()
        .filter_map(|entry| {
            let (name, value) = entry.as_ref().split_once('=')?;
            Some((name.to_string(), Variable::exported(value)))
        })
        .collect()
}
