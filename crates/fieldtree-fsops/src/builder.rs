//! Directory builder: materialises `<root>/<container>/INV-<id>-<kind>/String-<n>`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{FsOpsError, FsOpsResult};
use crate::layout::sub_unit_dir_name;
use crate::model::{FolderRequest, FolderSpec};
use crate::progress::ProgressSink;

/// Result of building one device tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeOutcome {
    /// Device directory that now exists.
    pub device_dir: PathBuf,
    /// Sub-unit directories that did not exist before this run.
    pub created: u32,
    /// Sub-unit directories the device holds after this run.
    pub total: u32,
}

/// Validate `request` and build its tree below `root`.
///
/// # Errors
///
/// Returns [`FsOpsError::Validation`] before touching the filesystem when any
/// field is invalid, otherwise the errors of [`build_tree`].
pub fn build(
    root: &Path,
    request: &FolderRequest<'_>,
    progress: &dyn ProgressSink,
) -> FsOpsResult<TreeOutcome> {
    let spec = FolderSpec::parse(request)?;
    build_tree(root, &spec, progress)
}

/// Create every directory of `spec` below `root`.
///
/// Existing directories are reused, so repeating a build is harmless. After
/// the `i`th sub-unit exists, `i / count` is reported.
///
/// # Errors
///
/// Returns [`FsOpsError::BuildInterrupted`] when a directory cannot be
/// created. Directories created before the failure are left in place.
pub fn build_tree(
    root: &Path,
    spec: &FolderSpec,
    progress: &dyn ProgressSink,
) -> FsOpsResult<TreeOutcome> {
    let device_dir = spec.device_path(root);
    let mut created = 0_u32;

    for index in 1..=spec.sub_unit_count {
        let name = sub_unit_dir_name(index);
        let leaf = device_dir.join(&name);
        let existed = leaf.is_dir();
        fs::create_dir_all(&leaf).map_err(|source| FsOpsError::BuildInterrupted {
            created,
            path: leaf.clone(),
            source,
        })?;
        if existed {
            debug!(path = %leaf.display(), "sub-unit directory already present");
        } else {
            created += 1;
        }
        progress.report(f64::from(index) / f64::from(spec.sub_unit_count), &name);
    }

    Ok(TreeOutcome {
        device_dir,
        created,
        total: spec.sub_unit_count,
    })
}
