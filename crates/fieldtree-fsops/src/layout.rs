//! Naming rules shared by the directory and archive builders.

use std::path::{Path, PathBuf};

use crate::model::{DeviceKind, FolderSpec};

/// Prefix identifying device directories inside a container.
pub const DEVICE_PREFIX: &str = "INV-";

/// Prefix of the numbered sub-unit directories inside a device directory.
pub const SUB_UNIT_PREFIX: &str = "String-";

/// Extension of written archives.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Directory name of a device: `INV-<id>-<kind>`.
#[must_use]
pub fn device_dir_name(device_id: &str, kind: DeviceKind) -> String {
    format!("{DEVICE_PREFIX}{device_id}-{kind}")
}

/// Directory name of the `index`th sub-unit, counting from one.
#[must_use]
pub fn sub_unit_dir_name(index: u32) -> String {
    format!("{SUB_UNIT_PREFIX}{index}")
}

/// Whether a directory name marks a device directory.
#[must_use]
pub fn is_device_dir_name(name: &str) -> bool {
    name.starts_with(DEVICE_PREFIX)
}

impl FolderSpec {
    /// Name of the device directory this spec describes.
    #[must_use]
    pub fn device_dir_name(&self) -> String {
        device_dir_name(&self.device_id, self.device_kind)
    }

    /// `root/<container>`.
    #[must_use]
    pub fn container_path(&self, root: &Path) -> PathBuf {
        root.join(&self.container_id)
    }

    /// `root/<container>/INV-<id>-<kind>`.
    #[must_use]
    pub fn device_path(&self, root: &Path) -> PathBuf {
        self.container_path(root).join(self.device_dir_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_field_conventions() {
        assert_eq!(device_dir_name("3", DeviceKind::Pvpm), "INV-3-PVPM");
        assert_eq!(device_dir_name("12", DeviceKind::Metrel), "INV-12-METREL");
        assert_eq!(sub_unit_dir_name(7), "String-7");
        assert!(is_device_dir_name("INV-3-PVPM"));
        assert!(!is_device_dir_name("inv-3-pvpm"));
        assert!(!is_device_dir_name("String-1"));
    }

    #[test]
    fn spec_paths_nest_under_root() {
        let spec = FolderSpec {
            container_id: "100".to_string(),
            device_id: "3".to_string(),
            device_kind: DeviceKind::Pvpm,
            sub_unit_count: 5,
        };
        let root = Path::new("/plants");
        assert_eq!(spec.container_path(root), Path::new("/plants/100"));
        assert_eq!(spec.device_path(root), Path::new("/plants/100/INV-3-PVPM"));
    }
}
