//! Workflow-dispatch domain for GhDispatch.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, and the error type used throughout the workspace. Infrastructure
//! crates implement the [`WorkflowApi`] port defined here; they never add
//! domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; the `github` crate defines *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`WorkflowId`, `AlertId`) |
//! | [`types`] | Wire and value types (`Workflow`, `WorkflowOption`, `DispatchRequest`, etc.) |
//! | [`options`] | Input-option derivation and dispatch-input assembly |
//! | [`branches`] | Branch filtering and the pagination aggregator |
//! | [`ports`] | The [`WorkflowApi`] trait implemented by infrastructure |
//! | [`errors`] | [`ApiError`] |

pub mod branches;
pub mod errors;
pub mod identifiers;
pub mod options;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use branches::{collect_all_branches, filter_branches, BranchPagination};
pub use errors::ApiError;
pub use identifiers::{AlertId, WorkflowId};
pub use options::{derive_options, dispatch_inputs, INPUT_PREFIX};
pub use ports::WorkflowApi;
pub use types::{
    Branch, ConfigResponse, DispatchRequest, Job, OptionKind, Step, Timestamp, Workflow,
    WorkflowConfig, WorkflowList, WorkflowOption,
};
