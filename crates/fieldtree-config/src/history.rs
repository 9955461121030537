//! Append-only operation log persisted with the preferences.

use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operation that produced a history record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationKind {
    /// Directory tree creation.
    Create,
    /// Archive creation for a container.
    Compress,
}

impl OperationKind {
    /// Upper-case label used in listings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Compress => "COMPRESS",
        }
    }
}

impl Display for OperationKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Final state of a recorded operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationOutcome {
    /// The operation completed.
    Success,
    /// The operation failed, fully or in part.
    Error,
}

impl OperationOutcome {
    /// Upper-case label used in listings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
        }
    }
}

/// Single entry in the operation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationRecord {
    /// Time the operation finished.
    pub timestamp: DateTime<Utc>,
    /// Operation type.
    pub kind: OperationKind,
    /// Human-readable summary of what was attempted.
    pub description: String,
    /// Whether the operation succeeded.
    pub outcome: OperationOutcome,
    /// Failure summary for unsuccessful operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl OperationRecord {
    /// Record a successful operation stamped with the current time.
    #[must_use]
    pub fn success(kind: OperationKind, description: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            description: description.into(),
            outcome: OperationOutcome::Success,
            detail: None,
        }
    }

    /// Record a failed operation stamped with the current time.
    #[must_use]
    pub fn failure(
        kind: OperationKind,
        description: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            description: description.into(),
            outcome: OperationOutcome::Error,
            detail: Some(detail.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serialises_upper_case_tags() -> Result<(), serde_json::Error> {
        let record = OperationRecord::failure(OperationKind::Create, "100", "validation");
        let value = serde_json::to_value(&record)?;
        assert_eq!(value["kind"], "CREATE");
        assert_eq!(value["outcome"], "ERROR");
        assert_eq!(value["detail"], "validation");

        let success = serde_json::to_value(OperationRecord::success(
            OperationKind::Compress,
            "3 archives",
        ))?;
        assert!(success.get("detail").is_none());
        Ok(())
    }

    #[test]
    fn labels_match_display() {
        assert_eq!(OperationKind::Compress.to_string(), "COMPRESS");
        assert_eq!(OperationOutcome::Success.as_str(), "SUCCESS");
    }
}
