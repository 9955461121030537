//! Request and job models for tree creation and archiving.
//!
//! # Design
//! - Raw request fields are parsed into a [`FolderSpec`] in one pass so every
//!   broken rule is reported together.
//! - A parsed spec is the only input the directory builder accepts.

use std::fmt::{self, Display, Formatter};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FsOpsError, FsOpsResult, Violation};

/// Accepted device identifiers.
pub const DEVICE_ID_RANGE: RangeInclusive<u32> = 1..=50;

/// Accepted number of sub-unit directories per device.
pub const SUB_UNIT_RANGE: RangeInclusive<u32> = 1..=100;

/// Measurement device families deployed in the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceKind {
    /// PV peak power measurement device.
    Pvpm,
    /// Installation safety tester.
    Metrel,
}

impl DeviceKind {
    /// Every supported kind, in display order.
    pub const ALL: [Self; 2] = [Self::Pvpm, Self::Metrel];

    /// Label used in device directory names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pvpm => "PVPM",
            Self::Metrel => "METREL",
        }
    }
}

impl Display for DeviceKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = FsOpsError;

    fn from_str(value: &str) -> FsOpsResult<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| FsOpsError::InvalidInput {
                field: "device_kind",
                reason: "unknown device kind",
                value: Some(value.to_string()),
            })
    }
}

/// Raw form input for a device tree, exactly as entered.
#[derive(Debug, Clone, Copy)]
pub struct FolderRequest<'a> {
    /// Container identifier, used verbatim as a directory name.
    pub container_id: &'a str,
    /// Device identifier; must be numeric.
    pub device_id: &'a str,
    /// Device family.
    pub device_kind: DeviceKind,
    /// Number of sub-unit directories; must be numeric.
    pub sub_unit_count: &'a str,
}

/// Validated description of one device tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderSpec {
    /// Container directory name.
    pub container_id: String,
    /// Device identifier as entered, trimmed; its value lies within
    /// [`DEVICE_ID_RANGE`].
    pub device_id: String,
    /// Device family.
    pub device_kind: DeviceKind,
    /// Sub-unit count within [`SUB_UNIT_RANGE`].
    pub sub_unit_count: u32,
}

impl FolderSpec {
    /// Validate every field of `request`.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::Validation`] listing every violated rule.
    pub fn parse(request: &FolderRequest<'_>) -> FsOpsResult<Self> {
        let mut violations = Vec::new();

        let container_id = request.container_id.trim();
        if container_id.is_empty() {
            violations.push(Violation::new("container_id", "must not be empty", ""));
        } else if !is_single_segment(container_id) {
            violations.push(Violation::new(
                "container_id",
                "must be a single directory name",
                container_id,
            ));
        }

        let device_id = parse_bounded(
            "device_id",
            request.device_id,
            &DEVICE_ID_RANGE,
            "must be between 1 and 50",
            &mut violations,
        )
        .map(|_| request.device_id.trim());
        let sub_unit_count = parse_bounded(
            "sub_unit_count",
            request.sub_unit_count,
            &SUB_UNIT_RANGE,
            "must be between 1 and 100",
            &mut violations,
        );

        match (device_id, sub_unit_count) {
            (Some(device_id), Some(sub_unit_count)) if violations.is_empty() => Ok(Self {
                container_id: container_id.to_string(),
                device_id: device_id.to_string(),
                device_kind: request.device_kind,
                sub_unit_count,
            }),
            _ => Err(FsOpsError::Validation { violations }),
        }
    }
}

fn is_single_segment(value: &str) -> bool {
    !matches!(value, "." | "..") && !value.contains(['/', '\\'])
}

fn parse_bounded(
    field: &'static str,
    raw: &str,
    range: &RangeInclusive<u32>,
    range_reason: &'static str,
    violations: &mut Vec<Violation>,
) -> Option<u32> {
    let value = raw.trim();
    if value.is_empty() {
        violations.push(Violation::new(field, "must not be empty", ""));
        return None;
    }
    if !value.bytes().all(|byte| byte.is_ascii_digit()) {
        violations.push(Violation::new(field, "must be a number", value));
        return None;
    }
    match value.parse::<u32>() {
        Ok(parsed) if range.contains(&parsed) => Some(parsed),
        _ => {
            violations.push(Violation::new(field, range_reason, value));
            None
        }
    }
}

/// State of one device archive while it is being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveJob {
    /// Device directory being archived.
    pub source_dir: PathBuf,
    /// Archive file being written; never pre-existing.
    pub destination_path: PathBuf,
    /// Regular files found below the source before writing started.
    pub entries_total: u64,
    /// Regular files written so far.
    pub entries_processed: u64,
}

impl ArchiveJob {
    /// Prepare a job; counts are filled in when it runs.
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>, destination_path: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            destination_path: destination_path.into(),
            entries_total: 0,
            entries_processed: 0,
        }
    }

    /// Completed share of file entries, or `1.0` for a job without files.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.entries_total == 0 {
            1.0
        } else {
            self.entries_processed as f64 / self.entries_total as f64
        }
    }
}
