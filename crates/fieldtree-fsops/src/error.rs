//! # Design
//!
//! - Provide structured, constant-message errors for tree and archive operations.
//! - Capture operation context (paths, fields, inputs) to make failures reproducible in tests.
//! - Preserve source errors without interpolating context into error messages;
//!   [`FsOpsError::detail`] renders the context for people.

use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::PathBuf;

use fieldtree_config::ConfigError;
use serde::Serialize;
use thiserror::Error;

use crate::layout::DEVICE_PREFIX;

/// Result type for filesystem operations.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// One rule broken by a folder request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Field that failed validation.
    pub field: &'static str,
    /// Static reason for the failure.
    pub reason: &'static str,
    /// Offending value when available.
    pub value: Option<String>,
}

impl Violation {
    pub(crate) fn new(field: &'static str, reason: &'static str, value: &str) -> Self {
        Self {
            field,
            reason,
            value: (!value.is_empty()).then(|| value.to_string()),
        }
    }
}

impl Display for Violation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {}", self.field, self.reason)?;
        if let Some(value) = &self.value {
            write!(formatter, " (got '{value}')")?;
        }
        Ok(())
    }
}

/// Errors produced by tree creation and archiving.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// IO failures while interacting with the filesystem.
    #[error("fsops io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Walkdir traversal failures.
    #[error("fsops walkdir failure")]
    Walkdir {
        /// Operation that triggered the walkdir failure.
        operation: &'static str,
        /// Path involved in the walkdir failure.
        path: PathBuf,
        /// Underlying walkdir error.
        source: walkdir::Error,
    },
    /// Zip archive failures.
    #[error("fsops zip failure")]
    Zip {
        /// Operation that triggered the archive failure.
        operation: &'static str,
        /// Path involved in the archive failure.
        path: PathBuf,
        /// Underlying zip error.
        source: zip::result::ZipError,
    },
    /// One or more folder request fields were rejected; nothing was created.
    #[error("fsops validation failed")]
    Validation {
        /// Every rule the request broke, in field order.
        violations: Vec<Violation>,
    },
    /// Input validation failures for paths handed to the archive builder.
    #[error("fsops invalid input")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// Archive policy could not be applied.
    #[error("fsops invalid policy")]
    InvalidPolicy {
        /// Underlying configuration error.
        source: ConfigError,
    },
    /// Directory creation stopped part way; created directories are kept.
    #[error("fsops directory creation interrupted")]
    BuildInterrupted {
        /// Sub-unit directories newly created before the failure.
        created: u32,
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The archive destination appeared between resolution and creation.
    #[error("fsops archive destination exists")]
    DestinationExists {
        /// Destination that would have been overwritten.
        path: PathBuf,
    },
    /// The container holds no device directories to compress.
    #[error("fsops nothing to compress")]
    NoDevices {
        /// Container that was scanned.
        container: PathBuf,
    },
}

impl FsOpsError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn walkdir(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: walkdir::Error,
    ) -> Self {
        Self::Walkdir {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn zip(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: zip::result::ZipError,
    ) -> Self {
        Self::Zip {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Whether the error only signals that there was no work to do.
    #[must_use]
    pub const fn is_no_work(&self) -> bool {
        matches!(self, Self::NoDevices { .. })
    }

    /// Render the error together with its context for user-facing output.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Io {
                operation,
                path,
                source,
            } => format!("{operation} failed for {}: {source}", path.display()),
            Self::Walkdir {
                operation,
                path,
                source,
            } => format!("{operation} failed below {}: {source}", path.display()),
            Self::Zip {
                operation,
                path,
                source,
            } => format!("{operation} failed for {}: {source}", path.display()),
            Self::Validation { violations } => violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
            Self::InvalidInput {
                field,
                reason,
                value,
            } => value.as_ref().map_or_else(
                || format!("{field} {reason}"),
                |value| format!("{field} {reason} (got '{value}')"),
            ),
            Self::InvalidPolicy { source } => source.detail(),
            Self::BuildInterrupted {
                created,
                path,
                source,
            } => format!(
                "created {created} sub-unit directories before {} failed: {source}",
                path.display()
            ),
            Self::DestinationExists { path } => {
                format!("archive {} already exists", path.display())
            }
            Self::NoDevices { container } => format!(
                "no {DEVICE_PREFIX}* directories to compress in {}",
                container.display()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use fieldtree_test_support::fixtures::temp_dir;
    use std::error::Error;
    use walkdir::WalkDir;

    fn io_error() -> io::Error {
        io::Error::other("io")
    }

    #[test]
    fn fsops_error_helpers_build_variants() -> Result<()> {
        let io_err = FsOpsError::io("read", "path", io_error());
        assert!(matches!(io_err, FsOpsError::Io { .. }));
        assert!(io_err.source().is_some());

        let temp = temp_dir()?;
        let missing = temp.path().join("missing");
        let walkdir_error = WalkDir::new(&missing)
            .into_iter()
            .next()
            .and_then(Result::err)
            .ok_or_else(|| anyhow!("expected walkdir error"))?;
        let walk_err = FsOpsError::walkdir("walk", &missing, walkdir_error);
        assert!(matches!(walk_err, FsOpsError::Walkdir { .. }));
        assert!(walk_err.source().is_some());

        let zip_err = FsOpsError::zip("pack", "archive.zip", zip::result::ZipError::FileNotFound);
        assert!(matches!(zip_err, FsOpsError::Zip { .. }));
        assert!(zip_err.source().is_some());
        Ok(())
    }

    #[test]
    fn messages_stay_constant_while_detail_carries_context() {
        let err = FsOpsError::BuildInterrupted {
            created: 2,
            path: PathBuf::from("/plant/100/INV-3-PVPM/String-3"),
            source: io_error(),
        };
        assert_eq!(err.to_string(), "fsops directory creation interrupted");
        let detail = err.detail();
        assert!(detail.contains("created 2 sub-unit directories"));
        assert!(detail.contains("String-3"));
    }

    #[test]
    fn validation_detail_lists_every_violation() {
        let err = FsOpsError::Validation {
            violations: vec![
                Violation::new("container_id", "must not be empty", ""),
                Violation::new("device_id", "must be between 1 and 50", "77"),
            ],
        };
        assert_eq!(
            err.detail(),
            "container_id must not be empty; device_id must be between 1 and 50 (got '77')"
        );
    }

    #[test]
    fn no_devices_is_classified_as_no_work() {
        let err = FsOpsError::NoDevices {
            container: PathBuf::from("100"),
        };
        assert!(err.is_no_work());
        assert!(err.detail().contains("INV-*"));
        assert!(!FsOpsError::io("x", "y", io_error()).is_no_work());
    }
}
