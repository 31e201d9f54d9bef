//! Wire and value types for the workflow-dispatch domain.
//!
//! The response records mirror the subset of GitHub's JSON that GhDispatch
//! consumes; unknown fields are ignored on decode so additions on GitHub's side
//! never break parsing.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::options::derive_options;
use crate::WorkflowId;

// ---------------------------------------------------------------------------
// Workflows and branches
// ---------------------------------------------------------------------------

/// A GitHub Actions workflow defined in the repository.
///
/// Identity is [`Workflow::id`]; the name is what the dispatch endpoint is
/// addressed with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Workflow {
    /// GitHub-assigned workflow id.
    pub id: WorkflowId,
    /// Display name of the workflow.
    pub name: String,
}

/// Body of the list-workflows endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowList {
    pub workflows: Vec<Workflow>,
}

/// One element of the list-branches endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Branch {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Workflow options
// ---------------------------------------------------------------------------

/// Value type of a configurable workflow input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// A toggle, dispatched as `"true"` or `"false"`.
    Boolean,
    /// Free text, dispatched as-is.
    String,
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionKind::Boolean => f.write_str("boolean"),
            OptionKind::String => f.write_str("string"),
        }
    }
}

/// A configurable input inferred from a workflow's step environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowOption {
    pub name: String,
    pub kind: OptionKind,
}

// ---------------------------------------------------------------------------
// Pinned workflow configuration
// ---------------------------------------------------------------------------

/// Body of the workflow-config endpoint.
///
/// Transient: only consumed to produce the workflow's option set.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigResponse {
    pub config: WorkflowConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A single job step. Only the key names of `env` are significant, so values
/// are kept as raw JSON (the pinned YAML may carry booleans or numbers).
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub env: Option<BTreeMap<String, serde_json::Value>>,
}

impl ConfigResponse {
    /// Returns the distinct environment variable names across every job step.
    pub fn env_keys(&self) -> BTreeSet<&str> {
        self.config
            .jobs
            .iter()
            .flat_map(|job| job.steps.iter())
            .filter_map(|step| step.env.as_ref())
            .flat_map(|env| env.keys().map(String::as_str))
            .collect()
    }

    /// Derives the workflow's configurable inputs from its step environment.
    pub fn workflow_options(&self) -> Vec<WorkflowOption> {
        derive_options(self.env_keys())
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// JSON body POSTed to the dispatch endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Branch (or other git ref) the run executes against.
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Workflow inputs, every value already rendered as a string.
    pub inputs: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
