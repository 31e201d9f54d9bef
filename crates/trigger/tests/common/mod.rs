//! In-memory [`WorkflowApi`] double shared by the trigger integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;
use dispatch::{ApiError, OptionKind, Workflow, WorkflowApi, WorkflowId, WorkflowOption};

/// Arguments of one recorded dispatch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchCall {
    pub workflow: String,
    pub git_ref: String,
    pub inputs: BTreeMap<String, String>,
}

#[derive(Default)]
pub struct FakeApi {
    pub workflows: Mutex<Vec<Workflow>>,
    pub branches: Mutex<Vec<String>>,
    pub options: Mutex<BTreeMap<WorkflowId, Vec<WorkflowOption>>>,

    pub fail_workflows: AtomicBool,
    pub fail_branches: AtomicBool,
    pub fail_options: AtomicBool,
    pub fail_dispatch: AtomicBool,

    /// While set, option fetches wait for `release_options` before answering.
    pub hold_options: AtomicBool,
    options_gate: Notify,

    pub workflow_calls: AtomicUsize,
    pub branch_calls: AtomicUsize,
    pub option_calls: AtomicUsize,
    pub dispatches: Mutex<Vec<DispatchCall>>,
}

impl FakeApi {
    /// Two workflows, three branches, and options for workflow 2.
    pub fn seeded() -> Self {
        let api = Self::default();
        *api.workflows.lock().unwrap() = vec![workflow(1, "CI"), workflow(2, "Deploy")];
        *api.branches.lock().unwrap() = strings(&["main", "dev", "release-1"]);
        api.options.lock().unwrap().insert(
            WorkflowId::new(2),
            vec![
                option("DEBUG", OptionKind::Boolean),
                option("DRY_RUN", OptionKind::Boolean),
                option("INPUT_TAG", OptionKind::String),
            ],
        );
        api
    }

    pub fn set_failing(flag: &AtomicBool, failing: bool) {
        flag.store(failing, Ordering::SeqCst);
    }

    pub fn release_options(&self) {
        self.options_gate.notify_one();
    }

    pub fn dispatch_calls(&self) -> Vec<DispatchCall> {
        self.dispatches.lock().unwrap().clone()
    }
}

fn failure(what: &str) -> ApiError {
    ApiError::Http { status: 500, message: format!("{what} unavailable") }
}

#[async_trait]
impl WorkflowApi for FakeApi {
    async fn list_workflows(&self) -> Result<Vec<Workflow>, ApiError> {
        self.workflow_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_workflows.load(Ordering::SeqCst) {
            return Err(failure("workflows"));
        }
        Ok(self.workflows.lock().unwrap().clone())
    }

    async fn list_branches(&self, page: u32, per_page: u32) -> Result<Vec<String>, ApiError> {
        self.branch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_branches.load(Ordering::SeqCst) {
            return Err(failure("branches"));
        }
        let skip = ((page - 1) * per_page) as usize;
        Ok(self
            .branches
            .lock()
            .unwrap()
            .iter()
            .skip(skip)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn list_workflow_options(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<Vec<WorkflowOption>, ApiError> {
        self.option_calls.fetch_add(1, Ordering::SeqCst);
        if self.hold_options.load(Ordering::SeqCst) {
            self.options_gate.notified().await;
        }
        if self.fail_options.load(Ordering::SeqCst) {
            return Err(failure("config"));
        }
        Ok(self
            .options
            .lock()
            .unwrap()
            .get(&workflow_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn dispatch_workflow(
        &self,
        workflow: &str,
        git_ref: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<(), ApiError> {
        if self.fail_dispatch.load(Ordering::SeqCst) {
            return Err(ApiError::DispatchFailed {
                status: 422,
                message: "Unexpected inputs provided".into(),
            });
        }
        self.dispatches.lock().unwrap().push(DispatchCall {
            workflow: workflow.to_string(),
            git_ref: git_ref.to_string(),
            inputs: inputs.clone(),
        });
        Ok(())
    }
}

pub fn workflow(id: u64, name: &str) -> Workflow {
    Workflow { id: WorkflowId::new(id), name: name.to_string() }
}

pub fn option(name: &str, kind: OptionKind) -> WorkflowOption {
    WorkflowOption { name: name.to_string(), kind }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
