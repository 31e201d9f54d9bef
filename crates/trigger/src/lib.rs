//! GhDispatch trigger session orchestration.
//!
//! This crate owns the state behind a "trigger a workflow" screen and
//! sequences calls to the [`dispatch::WorkflowApi`] port in response to user
//! actions: refresh, branch filtering, option fetching, and triggering.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Actions sequence calls between the domain rules in
//! the [`dispatch`] crate and the injected API. They contain no HTTP details.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`state`] | [`TriggerSession`] and the alert/receipt records it carries |
//! | [`actions`] | [`TriggerActions`]: immediate execution of every action |
//! | [`commands`] | [`Command`] and its debounce key [`ActionKind`] |
//! | [`debounce`] | Generic trailing-edge [`Debouncer`] |
//! | [`orchestrator`] | [`TriggerOrchestrator`]: debounced front door |

pub mod actions;
pub mod commands;
pub mod debounce;
pub mod orchestrator;
pub mod state;

pub use actions::{TriggerActions, REFRESH_FAILED_MESSAGE};
pub use commands::{ActionKind, Command};
pub use debounce::Debouncer;
pub use orchestrator::{TriggerOrchestrator, TriggerSettings, DEFAULT_DEBOUNCE};
pub use state::{AlertMessage, DispatchReceipt, TriggerSession};
