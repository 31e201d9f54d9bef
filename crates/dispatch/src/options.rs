//! Input-option derivation and dispatch-input assembly.
//!
//! A workflow's configurable inputs are not declared explicitly; they are
//! inferred from the environment variable names its steps read. Names with the
//! [`INPUT_PREFIX`] carry free text, everything else is a toggle.

use std::collections::{BTreeMap, BTreeSet};

use crate::{OptionKind, WorkflowOption};

/// Key prefix that marks a string-valued workflow input.
pub const INPUT_PREFIX: &str = "INPUT_";

/// Turns a collection of environment variable names into workflow options.
///
/// Duplicate names collapse into a single option. The result is sorted by name;
/// callers should treat it as a set.
pub fn derive_options<I, S>(keys: I) -> Vec<WorkflowOption>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let distinct: BTreeSet<String> = keys
        .into_iter()
        .map(|key| key.as_ref().to_string())
        .collect();

    distinct
        .into_iter()
        .map(|name| {
            let kind = if name.starts_with(INPUT_PREFIX) {
                OptionKind::String
            } else {
                OptionKind::Boolean
            };
            WorkflowOption { name, kind }
        })
        .collect()
}

/// Builds the `inputs` map of a dispatch request.
///
/// Booleans are rendered as the literal strings `"true"` / `"false"`. String
/// values are passed through unchanged and win on a name collision, which
/// cannot happen for options produced by [`derive_options`].
pub fn dispatch_inputs(
    booleans: &BTreeMap<String, bool>,
    strings: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut inputs: BTreeMap<String, String> = booleans
        .iter()
        .map(|(name, value)| (name.clone(), value.to_string()))
        .collect();
    inputs.extend(strings.iter().map(|(name, value)| (name.clone(), value.clone())));
    inputs
}
