//! Error type for the workflow API port.
//!
//! [`ApiError`] is produced by every [`crate::WorkflowApi`] implementation and
//! by the pagination aggregator. The trigger orchestrator converts it into a
//! user-facing alert at the action boundary; nothing in the workspace treats
//! it as fatal.

use thiserror::Error;

/// Failures of a GitHub workflow API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client configuration cannot produce a valid request URL.
    ///
    /// Produced at client construction: unparsable base URL, or an empty
    /// owner or repository name.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The request never produced an HTTP response (DNS, TLS, connection reset, timeout).
    #[error("Transport error: {message}")]
    Transport {
        /// Description supplied by the transport.
        message: String,
    },

    /// A read endpoint answered with a non-2xx status.
    #[error("GitHub API returned {status}: {message}")]
    Http {
        /// HTTP status code of the response.
        status: u16,
        /// GitHub's error `message`, or the raw body when it is not JSON.
        message: String,
    },

    /// The response body does not match the expected shape.
    #[error("Failed to decode {context} response: {source}")]
    Decode {
        /// Which response was being decoded (e.g. `"workflows"`).
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The request body could not be serialised.
    #[error("Failed to encode request body: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    /// The dispatch endpoint answered with a non-2xx status.
    #[error("Failed to trigger workflow (status {status}): {message}")]
    DispatchFailed {
        /// HTTP status code of the response.
        status: u16,
        /// GitHub's error `message`, or the raw body when it is not JSON.
        message: String,
    },
}

impl ApiError {
    /// Returns the HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } | ApiError::DispatchFailed { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
