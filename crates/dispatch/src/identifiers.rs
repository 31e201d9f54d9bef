//! Newtype domain identifiers.
//!
//! Identities that travel between crates are wrapped in distinct newtypes so a
//! [`WorkflowId`] can never be confused with a page number or any other `u64`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a GitHub Actions workflow within a repository.
///
/// Wraps the integer id assigned by GitHub. Serialises transparently so it
/// decodes straight from the `id` field of the workflows response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(u64);

impl WorkflowId {
    /// Creates a new identifier from a raw integer.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for WorkflowId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

/// Identifies one alert raised by the trigger session.
///
/// Generated fresh for every alert so a presentation layer can tell two
/// consecutive alerts with identical text apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertId(Uuid);

impl AlertId {
    /// Generates a new random alert identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for AlertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_id_decodes_from_bare_integer() {
        let id: WorkflowId = serde_json::from_str("161335").unwrap();
        assert_eq!(id.as_u64(), 161335);
        assert_eq!(id.to_string(), "161335");
    }

    #[test]
    fn workflow_id_parses_from_str() {
        assert_eq!("42".parse::<WorkflowId>().unwrap(), WorkflowId::new(42));
        assert!("ci.yml".parse::<WorkflowId>().is_err());
    }

    #[test]
    fn alert_ids_are_unique() {
        assert_ne!(AlertId::new_random(), AlertId::new_random());
    }
}
