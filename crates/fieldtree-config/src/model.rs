//! Typed preference models.
//!
//! # Design
//! - Pure data carriers persisted by the preference store.
//! - Every field has a default so older or partial documents still load.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::defaults::HISTORY_LIMIT;
use crate::error::{ConfigError, ConfigResult};
use crate::history::OperationRecord;
use crate::validate::validate_compression_level;

/// Compression applied to archive entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMethod {
    /// Entries are stored without compression.
    Stored,
    /// Entries are compressed with deflate.
    #[default]
    Deflated,
}

impl CompressionMethod {
    /// Render the method as its lowercase string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Deflated => "deflated",
        }
    }
}

impl Display for CompressionMethod {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for CompressionMethod {
    type Err = ConfigError;

    fn from_str(value: &str) -> ConfigResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stored" | "store" | "none" => Ok(Self::Stored),
            "deflated" | "deflate" => Ok(Self::Deflated),
            _ => Err(ConfigError::InvalidField {
                section: "archive",
                field: "method",
                value: Some(value.to_string()),
                reason: "unknown compression method",
            }),
        }
    }
}

/// How device directories are written into archives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ArchivePolicy {
    /// Compression method applied to file entries.
    pub method: CompressionMethod,
    /// Optional compression level (`0..=9`); `None` uses the method default.
    pub level: Option<i32>,
}

impl ArchivePolicy {
    /// Check that the policy can be applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when the level is out of range.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(level) = self.level {
            validate_compression_level(level)?;
        }
        Ok(())
    }
}

/// Persistent preference document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Preferences {
    /// Directory under which containers were last created.
    pub last_root: Option<PathBuf>,
    /// Archive settings used by the compress command.
    pub archive: ArchivePolicy,
    /// Most recent operations, oldest first.
    pub history: Vec<OperationRecord>,
}

impl Preferences {
    /// Append an operation record, keeping only the most recent entries.
    pub fn record(&mut self, record: OperationRecord) {
        self.history.push(record);
        self.trim_history();
    }

    /// Iterate the history newest first, optionally limited.
    pub fn recent(&self, limit: Option<usize>) -> impl Iterator<Item = &OperationRecord> {
        self.history
            .iter()
            .rev()
            .take(limit.unwrap_or(HISTORY_LIMIT))
    }

    pub(crate) fn trim_history(&mut self) {
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history = self.history.split_off(excess);
        }
    }
}
