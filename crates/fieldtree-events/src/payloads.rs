//! Event payload types carried between the filesystem jobs and their observers.

use chrono::{DateTime, Utc};

/// Identifier assigned to each event published on the bus.
pub type EventId = u64;

/// Default number of events a lagging subscriber may fall behind by.
pub const DEFAULT_CAPACITY: usize = 1_024;

/// Typed domain events surfaced while building trees and archives.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Directory creation for a device started.
    TreeStarted {
        /// Device directory name (`INV-<id>-<kind>`).
        device: String,
        /// Number of sub-unit directories requested.
        sub_units: u32,
    },
    /// Directory creation for a device finished.
    TreeCompleted {
        /// Device directory name.
        device: String,
        /// Sub-unit directories that did not exist before the run.
        created: u32,
    },
    /// Directory creation for a device failed.
    TreeFailed {
        /// Device directory name.
        device: String,
        /// Human-readable failure summary.
        message: String,
    },
    /// Compression of a device directory started.
    ArchiveStarted {
        /// Device directory name.
        device: String,
        /// Archive path being written.
        destination: String,
    },
    /// Compression of a device directory finished.
    ArchiveCompleted {
        /// Device directory name.
        device: String,
        /// Archive path that was written.
        destination: String,
        /// Number of file entries written.
        files: u64,
    },
    /// Compression of a device directory failed; sibling jobs continue.
    ArchiveFailed {
        /// Device directory name.
        device: String,
        /// Human-readable failure summary.
        message: String,
    },
    /// Incremental progress of the running operation.
    Progress {
        /// Completed fraction in `0.0..=1.0`.
        fraction: f64,
        /// Label describing the unit of work in flight.
        label: String,
    },
    /// All device directories of a container were processed.
    BatchCompleted {
        /// Archives written successfully.
        archived: usize,
        /// Devices whose archive could not be written.
        failed: usize,
    },
}

impl Event {
    /// Machine-friendly discriminator for log and JSON consumers.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TreeStarted { .. } => "tree_started",
            Self::TreeCompleted { .. } => "tree_completed",
            Self::TreeFailed { .. } => "tree_failed",
            Self::ArchiveStarted { .. } => "archive_started",
            Self::ArchiveCompleted { .. } => "archive_completed",
            Self::ArchiveFailed { .. } => "archive_failed",
            Self::Progress { .. } => "progress",
            Self::BatchCompleted { .. } => "batch_completed",
        }
    }
}

/// Metadata wrapper around events. Each envelope tracks the event id and
/// emission timestamp.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct EventEnvelope {
    /// Sequential identifier assigned by the bus.
    pub id: EventId,
    /// Time the event was published.
    pub timestamp: DateTime<Utc>,
    /// Event payload.
    pub event: Event,
}
