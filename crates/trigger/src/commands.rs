//! Debounced user commands.

/// A user-facing action, with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    FilterBranches(String),
    FetchWorkflowOptions,
    TriggerWorkflow,
}

/// Debounce key: commands of the same kind collapse into the latest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Refresh,
    FilterBranches,
    FetchWorkflowOptions,
    TriggerWorkflow,
}

impl Command {
    pub fn kind(&self) -> ActionKind {
        match self {
            Command::Refresh => ActionKind::Refresh,
            Command::FilterBranches(_) => ActionKind::FilterBranches,
            Command::FetchWorkflowOptions => ActionKind::FetchWorkflowOptions,
            Command::TriggerWorkflow => ActionKind::TriggerWorkflow,
        }
    }
}
