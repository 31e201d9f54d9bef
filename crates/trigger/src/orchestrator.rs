//! [`TriggerOrchestrator`]: debounced front door to [`TriggerActions`].

use std::sync::Arc;
use std::time::Duration;

use dispatch::{BranchPagination, WorkflowApi, WorkflowId};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::actions::TriggerActions;
use crate::commands::{ActionKind, Command};
use crate::debounce::Debouncer;
use crate::state::TriggerSession;

/// Quiet period after which a burst of identical actions fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Tuning knobs for a [`TriggerOrchestrator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerSettings {
    pub debounce: Duration,
    pub pagination: BranchPagination,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            pagination: BranchPagination::default(),
        }
    }
}

/// Session owner for an interactive front-end.
///
/// Refresh, branch filtering, option fetching, and triggering are debounced
/// per action kind: only the last call of a burst runs. Selections and option
/// edits apply immediately. Observe results through [`subscribe`](Self::subscribe).
pub struct TriggerOrchestrator<A: ?Sized> {
    actions: TriggerActions<A>,
    debouncer: Debouncer<ActionKind, Command>,
}

impl<A> TriggerOrchestrator<A>
where
    A: WorkflowApi + ?Sized + 'static,
{
    /// Creates the orchestrator and starts its debounce task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(api: Arc<A>, settings: TriggerSettings) -> Self {
        let actions = TriggerActions::new(api, settings.pagination);
        let runner = actions.clone();
        let (debouncer, _task) = Debouncer::spawn(settings.debounce, move |command: Command| {
            let actions = runner.clone();
            async move { actions.execute(command).await }
        });
        Self { actions, debouncer }
    }

    /// Immediate (non-debounced) access to the actions.
    pub fn actions(&self) -> &TriggerActions<A> {
        &self.actions
    }

    pub fn subscribe(&self) -> watch::Receiver<TriggerSession> {
        self.actions.subscribe()
    }

    pub fn snapshot(&self) -> TriggerSession {
        self.actions.snapshot()
    }

    /// Queues a command behind the debounce window.
    pub fn submit(&self, command: Command) {
        debug!(?command, "Command submitted");
        if !self.debouncer.submit(command.kind(), command) {
            warn!("Debounce task has stopped; command dropped");
        }
    }

    pub fn refresh(&self) {
        self.submit(Command::Refresh);
    }

    pub fn filter_branches(&self, search: impl Into<String>) {
        self.submit(Command::FilterBranches(search.into()));
    }

    pub fn fetch_workflow_options(&self) {
        self.submit(Command::FetchWorkflowOptions);
    }

    pub fn trigger_workflow(&self) {
        self.submit(Command::TriggerWorkflow);
    }

    /// Selects a workflow and queues a fetch of its options.
    ///
    /// Reselecting the current workflow keeps edited values; the fetch is only
    /// queued when its options are not loaded yet.
    pub fn select_workflow(&self, workflow_id: WorkflowId) -> bool {
        let selected = self.actions.select_workflow(workflow_id);
        if selected && !self.actions.snapshot().options_ready() {
            self.fetch_workflow_options();
        }
        selected
    }

    pub fn select_branch(&self, branch: &str) -> bool {
        self.actions.select_branch(branch)
    }

    pub fn clear_workflow_selection(&self) {
        self.actions.clear_workflow_selection();
    }

    pub fn clear_branch_selection(&self) {
        self.actions.clear_branch_selection();
    }

    pub fn set_boolean_option(&self, name: &str, value: bool) -> bool {
        self.actions.set_boolean_option(name, value)
    }

    pub fn set_string_option(&self, name: &str, value: impl Into<String>) -> bool {
        self.actions.set_string_option(name, value)
    }

    pub fn dismiss_alert(&self) {
        self.actions.dismiss_alert();
    }
}
