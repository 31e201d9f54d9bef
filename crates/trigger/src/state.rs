//! Observable session state of the trigger front-end.
//!
//! [`TriggerSession`] is the single value a presentation layer renders. It is
//! only mutated by [`crate::TriggerActions`], which publishes every change
//! through a `watch` channel.

use std::collections::BTreeMap;

use dispatch::{
    dispatch_inputs, filter_branches, AlertId, OptionKind, Timestamp, Workflow, WorkflowId,
    WorkflowOption,
};
use serde::Serialize;

/// A user-facing error message awaiting acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertMessage {
    pub id: AlertId,
    pub message: String,
    pub raised_at: Timestamp,
}

impl AlertMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: AlertId::new_random(),
            message: message.into(),
            raised_at: Timestamp::now(),
        }
    }
}

impl std::fmt::Display for AlertMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Record of the last successful dispatch, for a success banner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchReceipt {
    pub workflow: Workflow,
    pub git_ref: String,
    pub inputs: BTreeMap<String, String>,
    pub dispatched_at: Timestamp,
}

/// Everything the trigger screen shows.
///
/// `branches` is always the subset of `all_branches` matching `search_text`.
/// The option maps belong to the workflow recorded in `options_loaded_for`;
/// they are emptied whenever a refresh starts, options are re-fetched, or a
/// different workflow is selected.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TriggerSession {
    pub workflows: Vec<Workflow>,
    pub selected_workflow: Option<Workflow>,
    pub selected_branch: Option<String>,

    /// Last fully fetched branch list.
    pub all_branches: Vec<String>,
    /// Branches matching `search_text`, in fetch order.
    pub branches: Vec<String>,
    pub search_text: String,

    pub boolean_options: BTreeMap<String, bool>,
    pub string_options: BTreeMap<String, String>,
    pub options_loaded_for: Option<WorkflowId>,

    pub is_refreshing: bool,
    pub is_fetching_options: bool,
    pub is_triggering: bool,

    pub alert: Option<AlertMessage>,
    pub last_dispatch: Option<DispatchReceipt>,
}

impl TriggerSession {
    /// Returns `true` while any network-backed action is in flight.
    pub fn is_busy(&self) -> bool {
        self.is_refreshing || self.is_fetching_options || self.is_triggering
    }

    /// Returns `true` when the option maps were derived for the selected workflow.
    pub fn options_ready(&self) -> bool {
        match (&self.selected_workflow, self.options_loaded_for) {
            (Some(workflow), Some(loaded)) => workflow.id == loaded,
            _ => false,
        }
    }

    /// Replaces the current alert.
    pub fn raise(&mut self, message: impl Into<String>) {
        self.alert = Some(AlertMessage::new(message));
    }

    pub(crate) fn clear_options(&mut self) {
        self.boolean_options.clear();
        self.string_options.clear();
        self.options_loaded_for = None;
    }

    /// Initialises every option to its empty value: `false` or `""`.
    pub(crate) fn load_options(&mut self, workflow_id: WorkflowId, options: Vec<WorkflowOption>) {
        self.clear_options();
        for option in options {
            match option.kind {
                OptionKind::Boolean => {
                    self.boolean_options.insert(option.name, false);
                }
                OptionKind::String => {
                    self.string_options.insert(option.name, String::new());
                }
            }
        }
        self.options_loaded_for = Some(workflow_id);
    }

    /// Adopts freshly fetched workflows and branches.
    ///
    /// Selections survive only if they still exist in the new lists.
    pub(crate) fn apply_refresh(&mut self, workflows: Vec<Workflow>, branches: Vec<String>) {
        self.selected_workflow = self
            .selected_workflow
            .take()
            .and_then(|selected| workflows.iter().find(|w| w.id == selected.id).cloned());
        self.selected_branch = self
            .selected_branch
            .take()
            .filter(|selected| branches.contains(selected));

        self.workflows = workflows;
        self.all_branches = branches;
        self.branches = filter_branches(&self.all_branches, &self.search_text);
    }

    pub(crate) fn apply_search(&mut self, search: String) {
        self.branches = filter_branches(&self.all_branches, &search);
        self.search_text = search;
    }

    /// Input map for a dispatch of the selected workflow.
    pub fn dispatch_inputs(&self) -> BTreeMap<String, String> {
        dispatch_inputs(&self.boolean_options, &self.string_options)
    }
}
