//! GhDispatch GitHub infrastructure adapter.
//!
//! Implements the [`dispatch::WorkflowApi`] port against GitHub's REST API for
//! a single `(owner, repo)` pair.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! URL construction, authentication headers, status handling, and response
//! decoding live here; the [`dispatch`] and `trigger` crates never see them.
//!
//! ## Transport
//!
//! [`GithubClient`] is generic over an [`HttpTransport`]. Production code uses
//! [`ReqwestTransport`]; tests inject a double that replays canned responses.

pub mod client;
pub mod transport;

pub use client::{GithubClient, GithubConfig, ACCEPT_MEDIA_TYPE, DEFAULT_API_URL};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
