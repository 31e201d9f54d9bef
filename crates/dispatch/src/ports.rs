//! Port trait for GitHub workflow access.
//!
//! The `github` crate implements [`WorkflowApi`] over HTTP; the `trigger` crate
//! depends only on this trait, which keeps it testable with in-memory doubles.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::{ApiError, Workflow, WorkflowId, WorkflowOption};

/// Typed access to the workflow endpoints of one repository.
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    /// Lists every workflow defined in the repository.
    async fn list_workflows(&self) -> Result<Vec<Workflow>, ApiError>;

    /// Lists one page of branch names, in response order.
    ///
    /// Pages are 1-based. Use [`crate::collect_all_branches`] to materialise
    /// the full list.
    async fn list_branches(&self, page: u32, per_page: u32) -> Result<Vec<String>, ApiError>;

    /// Derives the configurable inputs of a workflow from its pinned configuration.
    async fn list_workflow_options(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<Vec<WorkflowOption>, ApiError>;

    /// Dispatches a run of `workflow` (id or name) against `git_ref`.
    async fn dispatch_workflow(
        &self,
        workflow: &str,
        git_ref: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<(), ApiError>;
}
