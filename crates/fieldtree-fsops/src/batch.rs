//! Container-level discovery and batch reporting.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::archive::ArchiveSummary;
use crate::error::{FsOpsError, FsOpsResult};
use crate::layout::is_device_dir_name;

/// Device directories directly below `container`, sorted by name.
///
/// # Errors
///
/// Returns an error when the container cannot be listed.
pub fn discover_devices(container: &Path) -> FsOpsResult<Vec<PathBuf>> {
    let entries = fs::read_dir(container)
        .map_err(|err| FsOpsError::io("batch.read_container", container, err))?;
    let mut devices = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| FsOpsError::io("batch.read_entry", container, err))?;
        let file_type = entry
            .file_type()
            .map_err(|err| FsOpsError::io("batch.file_type", entry.path(), err))?;
        if file_type.is_dir() && is_device_dir_name(&entry.file_name().to_string_lossy()) {
            devices.push(entry.path());
        }
    }
    devices.sort();
    Ok(devices)
}

/// Name shown for a device directory in reports and events.
pub(crate) fn device_label(device_dir: &Path) -> String {
    device_dir.file_name().map_or_else(
        || device_dir.to_string_lossy().into_owned(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// A device whose archive was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchivedDevice {
    /// Device directory name.
    pub device: String,
    /// Details of the written archive.
    pub archive: ArchiveSummary,
}

/// A device whose archive could not be written.
#[derive(Debug)]
pub struct FailedDevice {
    /// Device directory name.
    pub device: String,
    /// Archive path that was attempted; it may hold a partial archive.
    pub destination: PathBuf,
    /// Why the job failed.
    pub error: FsOpsError,
}

/// Outcome of compressing every device of a container.
#[derive(Debug, Default)]
pub struct CompressReport {
    /// Devices archived successfully, in processing order.
    pub archived: Vec<ArchivedDevice>,
    /// Devices that failed, in processing order.
    pub failed: Vec<FailedDevice>,
}

impl CompressReport {
    /// Whether every device was archived.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of devices processed.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.archived.len() + self.failed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use fieldtree_test_support::fixtures::{temp_dir, write_file};

    #[test]
    fn discovery_keeps_only_device_directories() -> Result<()> {
        let temp = temp_dir()?;
        let container = temp.path();
        fs::create_dir_all(container.join("INV-2-METREL"))?;
        fs::create_dir_all(container.join("INV-1-PVPM"))?;
        fs::create_dir_all(container.join("notes"))?;
        write_file(&container.join("INV-3-PVPM.zip"), b"")?;
        write_file(&container.join("INV-4-PVPM"), b"file, not dir")?;

        let devices = discover_devices(container)?;
        let names: Vec<String> = devices.iter().map(|path| device_label(path)).collect();
        assert_eq!(names, vec!["INV-1-PVPM", "INV-2-METREL"]);
        Ok(())
    }

    #[test]
    fn discovery_of_missing_container_fails() -> Result<()> {
        let temp = temp_dir()?;
        let result = discover_devices(&temp.path().join("absent"));
        assert!(matches!(
            result,
            Err(FsOpsError::Io { operation: "batch.read_container", .. })
        ));
        Ok(())
    }

    #[test]
    fn report_counts_processed_devices() {
        let mut report = CompressReport::default();
        assert!(report.is_success());
        report.failed.push(FailedDevice {
            device: "INV-1-PVPM".to_string(),
            destination: PathBuf::from("INV-1-PVPM.zip"),
            error: FsOpsError::DestinationExists {
                path: PathBuf::from("INV-1-PVPM.zip"),
            },
        });
        assert!(!report.is_success());
        assert_eq!(report.processed(), 1);
    }
}
