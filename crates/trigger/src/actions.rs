//! The trigger actions, executed immediately.
//!
//! Every action catches its own errors: failures are logged and turned into a
//! single [`AlertMessage`](crate::AlertMessage) on the session, and side effects
//! already applied (such as cleared option maps) are left in place.

use std::sync::Arc;

use dispatch::{collect_all_branches, BranchPagination, Timestamp, WorkflowApi, WorkflowId};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::commands::Command;
use crate::state::{DispatchReceipt, TriggerSession};

/// Alert raised when a refresh fails, whatever the cause.
pub const REFRESH_FAILED_MESSAGE: &str = "Something went wrong";

/// Owns the session state and runs actions against a [`WorkflowApi`].
///
/// Cloning is cheap: clones share the API handle and the state channel.
pub struct TriggerActions<A: ?Sized> {
    api: Arc<A>,
    state: Arc<watch::Sender<TriggerSession>>,
    pagination: BranchPagination,
}

impl<A: ?Sized> Clone for TriggerActions<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
            pagination: self.pagination,
        }
    }
}

impl<A> TriggerActions<A>
where
    A: WorkflowApi + ?Sized,
{
    pub fn new(api: Arc<A>, pagination: BranchPagination) -> Self {
        let (state, _) = watch::channel(TriggerSession::default());
        Self { api, state: Arc::new(state), pagination }
    }

    /// Returns a receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<TriggerSession> {
        self.state.subscribe()
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> TriggerSession {
        self.state.borrow().clone()
    }

    fn update(&self, mutate: impl FnOnce(&mut TriggerSession)) {
        self.state.send_modify(mutate);
    }

    /// Runs the action a [`Command`] describes.
    pub async fn execute(&self, command: Command) {
        match command {
            Command::Refresh => self.refresh().await,
            Command::FilterBranches(search) => self.filter_branches(search),
            Command::FetchWorkflowOptions => self.fetch_workflow_options().await,
            Command::TriggerWorkflow => self.trigger_workflow().await,
        }
    }

    // -----------------------------------------------------------------------
    // Network-backed actions
    // -----------------------------------------------------------------------

    /// Reloads workflows and the complete branch list.
    ///
    /// Both fetches run concurrently; the first failure wins and neither list
    /// is adopted.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        self.update(|session| {
            session.is_refreshing = true;
            session.clear_options();
        });

        let api = self.api.as_ref();
        let result = tokio::try_join!(
            api.list_workflows(),
            collect_all_branches(api, self.pagination)
        );

        match result {
            Ok((workflows, branches)) => {
                info!(
                    workflows = workflows.len(),
                    branches = branches.len(),
                    "Refreshed workflows and branches"
                );
                self.update(|session| {
                    session.apply_refresh(workflows, branches);
                    session.is_refreshing = false;
                });
            }
            Err(e) => {
                error!(error = %e, "Refresh failed");
                self.update(|session| {
                    session.raise(REFRESH_FAILED_MESSAGE);
                    session.is_refreshing = false;
                });
            }
        }
    }

    /// Loads the options of the selected workflow, each set to its empty value.
    ///
    /// A result that arrives after the selection moved to another workflow is
    /// discarded, and so is the alert for a failure of such a fetch.
    #[instrument(skip(self))]
    pub async fn fetch_workflow_options(&self) {
        let Some(workflow) = self.snapshot().selected_workflow else {
            warn!("Options requested without a selected workflow");
            self.update(|session| session.raise("No workflow selected"));
            return;
        };

        self.update(|session| {
            session.is_fetching_options = true;
            session.clear_options();
        });

        let result = self.api.list_workflow_options(workflow.id).await;

        match result {
            Ok(options) => {
                debug!(workflow_id = %workflow.id, count = options.len(), "Fetched workflow options");
                self.update(|session| {
                    session.is_fetching_options = false;
                    if selected_id(session) == Some(workflow.id) {
                        session.load_options(workflow.id, options);
                    } else {
                        debug!(workflow_id = %workflow.id, "Selection changed; discarding options");
                    }
                });
            }
            Err(e) => {
                error!(workflow_id = %workflow.id, error = %e, "Fetching workflow options failed");
                self.update(|session| {
                    session.is_fetching_options = false;
                    if selected_id(session) == Some(workflow.id) {
                        session.raise(format!("Error fetching workflow options: {e}"));
                    }
                });
            }
        }
    }

    /// Dispatches the selected workflow on the selected branch with the
    /// current option values.
    #[instrument(skip(self))]
    pub async fn trigger_workflow(&self) {
        let session = self.snapshot();
        let Some(workflow) = session.selected_workflow.clone() else {
            self.update(|session| session.raise("No workflow selected"));
            return;
        };
        let Some(branch) = session.selected_branch.clone() else {
            self.update(|session| session.raise("No branch selected"));
            return;
        };
        if !session.options_ready() {
            self.update(|session| {
                session.raise(format!(
                    "Workflow options for '{}' have not been loaded",
                    workflow.name
                ));
            });
            return;
        }

        self.update(|session| session.is_triggering = true);
        let inputs = session.dispatch_inputs();

        let result = self
            .api
            .dispatch_workflow(&workflow.name, &branch, &inputs)
            .await;

        match result {
            Ok(()) => {
                info!(workflow = %workflow.name, branch = %branch, "Workflow triggered successfully");
                self.update(|session| {
                    session.is_triggering = false;
                    session.last_dispatch = Some(DispatchReceipt {
                        workflow,
                        git_ref: branch,
                        inputs,
                        dispatched_at: Timestamp::now(),
                    });
                });
            }
            Err(e) => {
                error!(workflow = %workflow.name, branch = %branch, error = %e, "Triggering workflow failed");
                self.update(|session| {
                    session.is_triggering = false;
                    session.raise(format!("Error triggering workflow: {e}"));
                });
            }
        }
    }

    // -----------------------------------------------------------------------
    // Local edits
    // -----------------------------------------------------------------------

    /// Recomputes the displayed branches for `search`.
    pub fn filter_branches(&self, search: impl Into<String>) {
        let search = search.into();
        self.update(|session| session.apply_search(search));
    }

    /// Selects a workflow from the loaded list.
    ///
    /// Choosing a different workflow empties the option maps; the caller is
    /// expected to fetch options before triggering. Returns `false` (and
    /// raises an alert) for an unknown id.
    pub fn select_workflow(&self, workflow_id: WorkflowId) -> bool {
        let mut selected = false;
        self.update(|session| {
            let Some(workflow) = session.workflows.iter().find(|w| w.id == workflow_id).cloned()
            else {
                session.raise(format!("Unknown workflow {workflow_id}"));
                return;
            };
            if selected_id(session) != Some(workflow_id) {
                session.clear_options();
            }
            session.selected_workflow = Some(workflow);
            selected = true;
        });
        selected
    }

    /// Selects a branch from the full branch list. Returns `false` (and raises
    /// an alert) for an unknown branch.
    pub fn select_branch(&self, branch: &str) -> bool {
        let mut selected = false;
        self.update(|session| {
            if session.all_branches.iter().any(|b| b == branch) {
                session.selected_branch = Some(branch.to_string());
                selected = true;
            } else {
                session.raise(format!("Unknown branch '{branch}'"));
            }
        });
        selected
    }

    /// Clears the workflow selection together with its option maps.
    pub fn clear_workflow_selection(&self) {
        self.update(|session| {
            session.selected_workflow = None;
            session.clear_options();
        });
    }

    pub fn clear_branch_selection(&self) {
        self.update(|session| session.selected_branch = None);
    }

    /// Sets a boolean option. Returns `false` if no such option is loaded.
    pub fn set_boolean_option(&self, name: &str, value: bool) -> bool {
        let mut applied = false;
        self.update(|session| {
            if let Some(slot) = session.boolean_options.get_mut(name) {
                *slot = value;
                applied = true;
            }
        });
        applied
    }

    /// Sets a string option. Returns `false` if no such option is loaded.
    pub fn set_string_option(&self, name: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        let mut applied = false;
        self.update(|session| {
            if let Some(slot) = session.string_options.get_mut(name) {
                *slot = value;
                applied = true;
            }
        });
        applied
    }

    pub fn dismiss_alert(&self) {
        self.update(|session| session.alert = None);
    }
}

fn selected_id(session: &TriggerSession) -> Option<WorkflowId> {
    session.selected_workflow.as_ref().map(|w| w.id)
}
