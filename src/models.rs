use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the authoritative store
pub type RegistrantId = u64;

/// One validated, persisted person record in the roster
///
/// Registrants are immutable once created. The serialized form uses the
/// camelCase field names of the durable cache snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Registrant {
    pub id: RegistrantId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub city: String,
    pub postal_code: String,
    pub registered_at: DateTime<Utc>,
}

impl Registrant {
    /// "First Last" as sent to the remote store
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A registration candidate that already passed the form validator
///
/// Values are trimmed; email casing is preserved as typed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrantInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub city: String,
    pub postal_code: String,
}

/// Routing class of a failed roster operation
///
/// `Business` failures belong next to the offending field (email),
/// `Server` failures belong to the form as a whole.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Business,
    Server,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Business => write!(f, "Business"),
            FailureKind::Server => write!(f, "Server"),
        }
    }
}

/// Outcome of [`crate::roster::RosterManager::add`]
#[derive(Debug, Clone, PartialEq)]
pub enum AddResult {
    Added(Registrant),
    Rejected { error: String, kind: FailureKind },
}

impl AddResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AddResult::Added(_))
    }

    pub fn registrant(&self) -> Option<&Registrant> {
        match self {
            AddResult::Added(registrant) => Some(registrant),
            AddResult::Rejected { .. } => None,
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            AddResult::Added(_) => None,
            AddResult::Rejected { kind, .. } => Some(*kind),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AddResult::Added(_) => None,
            AddResult::Rejected { error, .. } => Some(error),
        }
    }

    /// Caller-facing JSON shape: `{ success, registrant }` or
    /// `{ success: false, error, kind }`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AddResult::Added(registrant) => serde_json::json!({
                "success": true,
                "registrant": registrant,
            }),
            AddResult::Rejected { error, kind } => serde_json::json!({
                "success": false,
                "error": error,
                "kind": kind,
            }),
        }
    }
}

/// Normalized failure of a load or remove call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterFailure {
    pub message: String,
    pub kind: FailureKind,
}

impl fmt::Display for RosterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl std::error::Error for RosterFailure {}
