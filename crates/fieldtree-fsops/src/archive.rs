//! Archive builder: packs one device directory into a zip file.
//!
//! # Design
//! - Entry names are rooted at the device directory name and use `/`
//!   separators, so extracting next to the archive recreates the tree.
//! - Every subdirectory gets an explicit entry; the root gets one only when
//!   nothing else was written, so empty device directories survive a round trip.
//! - The destination is created exclusively and never overwritten.

use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};

use fieldtree_config::{ArchivePolicy, CompressionMethod};
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::FileOptions;

use crate::error::{FsOpsError, FsOpsResult};
use crate::layout::ARCHIVE_EXTENSION;
use crate::model::ArchiveJob;
use crate::progress::ProgressSink;

/// Entries larger than this need zip64 extensions.
const ZIP64_THRESHOLD: u64 = 0xFFFF_FFFF;

/// Outcome of a finished archive job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
    /// Archive that was written.
    pub destination: PathBuf,
    /// Regular file entries written.
    pub files: u64,
    /// Directory entries written.
    pub directories: u64,
}

/// First free archive path for `base_name` inside `container`.
///
/// Tries `<base>.zip`, then `<base>_1.zip`, `<base>_2.zip`, and so on.
#[must_use]
pub fn resolve_destination(container: &Path, base_name: &str) -> PathBuf {
    let candidate = container.join(format!("{base_name}.{ARCHIVE_EXTENSION}"));
    if !candidate.exists() {
        return candidate;
    }
    let mut suffix = 1_u64;
    loop {
        let candidate = container.join(format!("{base_name}_{suffix}.{ARCHIVE_EXTENSION}"));
        if !candidate.exists() {
            return candidate;
        }
        suffix += 1;
    }
}

/// Archive `source_dir` into `destination` in one call.
///
/// # Errors
///
/// See [`ArchiveJob::run`].
pub fn compress_directory(
    source_dir: &Path,
    destination: &Path,
    policy: &ArchivePolicy,
    progress: &dyn ProgressSink,
) -> FsOpsResult<ArchiveSummary> {
    ArchiveJob::new(source_dir, destination).run(policy, progress)
}

impl ArchiveJob {
    /// Write the archive, reporting the share of files written after each file.
    ///
    /// A source without files reports `1.0` once at the end. Symlinks and
    /// special files are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error when the policy is invalid, the source is not a
    /// directory, the destination already exists, or reading and writing
    /// fails. A partially written archive is left on disk.
    pub fn run(
        mut self,
        policy: &ArchivePolicy,
        progress: &dyn ProgressSink,
    ) -> FsOpsResult<ArchiveSummary> {
        policy
            .validate()
            .map_err(|source| FsOpsError::InvalidPolicy { source })?;
        let root_name = self.check_paths()?;
        self.entries_total = count_files(&self.source_dir)?;

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.destination_path)
            .map_err(|err| {
                if err.kind() == io::ErrorKind::AlreadyExists {
                    FsOpsError::DestinationExists {
                        path: self.destination_path.clone(),
                    }
                } else {
                    FsOpsError::io("archive.create", &self.destination_path, err)
                }
            })?;
        let mut writer = ZipWriter::new(file);
        let directories = self.write_entries(&mut writer, &root_name, policy, progress)?;
        writer
            .finish()
            .map_err(|err| FsOpsError::zip("archive.finish", &self.destination_path, err))?;

        if self.entries_total == 0 {
            progress.report(1.0, &root_name);
        }
        debug!(
            source = %self.source_dir.display(),
            destination = %self.destination_path.display(),
            files = self.entries_processed,
            directories,
            "archive written"
        );
        Ok(ArchiveSummary {
            destination: self.destination_path,
            files: self.entries_processed,
            directories,
        })
    }

    fn check_paths(&self) -> FsOpsResult<String> {
        let metadata = fs::metadata(&self.source_dir)
            .map_err(|err| FsOpsError::io("archive.stat_source", &self.source_dir, err))?;
        if !metadata.is_dir() {
            return Err(FsOpsError::InvalidInput {
                field: "source_dir",
                reason: "not a directory",
                value: Some(self.source_dir.to_string_lossy().into_owned()),
            });
        }
        if self.destination_path.starts_with(&self.source_dir) {
            return Err(FsOpsError::InvalidInput {
                field: "destination_path",
                reason: "inside the source directory",
                value: Some(self.destination_path.to_string_lossy().into_owned()),
            });
        }
        let name = self
            .source_dir
            .file_name()
            .ok_or_else(|| FsOpsError::InvalidInput {
                field: "source_dir",
                reason: "has no directory name",
                value: Some(self.source_dir.to_string_lossy().into_owned()),
            })?;
        utf8_segment(name, &self.source_dir).map(str::to_string)
    }

    fn write_entries(
        &mut self,
        writer: &mut ZipWriter<File>,
        root_name: &str,
        policy: &ArchivePolicy,
        progress: &dyn ProgressSink,
    ) -> FsOpsResult<u64> {
        let directory_options = FileOptions::default();
        let mut directories = 0_u64;

        for entry in WalkDir::new(&self.source_dir).sort_by_file_name() {
            let entry = entry
                .map_err(|err| FsOpsError::walkdir("archive.walk", &self.source_dir, err))?;
            if entry.depth() == 0 {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.source_dir).map_err(|_| {
                FsOpsError::InvalidInput {
                    field: "source_dir",
                    reason: "strip_prefix",
                    value: Some(entry.path().to_string_lossy().into_owned()),
                }
            })?;
            let name = entry_name(root_name, relative, entry.path())?;
            let file_type = entry.file_type();

            if file_type.is_dir() {
                writer
                    .add_directory(format!("{name}/"), directory_options)
                    .map_err(|err| FsOpsError::zip("archive.add_directory", entry.path(), err))?;
                directories += 1;
            } else if file_type.is_file() {
                let metadata = entry
                    .metadata()
                    .map_err(|err| FsOpsError::walkdir("archive.metadata", entry.path(), err))?;
                let mut input = File::open(entry.path())
                    .map_err(|err| FsOpsError::io("archive.open_file", entry.path(), err))?;
                writer
                    .start_file(name, file_options(policy, &metadata))
                    .map_err(|err| FsOpsError::zip("archive.start_file", entry.path(), err))?;
                io::copy(&mut input, writer)
                    .map_err(|err| FsOpsError::io("archive.copy_file", entry.path(), err))?;
                self.entries_processed += 1;
                progress.report(self.fraction(), root_name);
            } else {
                debug!(path = %entry.path().display(), "skipping non-regular entry");
            }
        }

        if directories == 0 && self.entries_processed == 0 {
            writer
                .add_directory(format!("{root_name}/"), directory_options)
                .map_err(|err| FsOpsError::zip("archive.add_directory", &self.source_dir, err))?;
            directories += 1;
        }
        Ok(directories)
    }
}

fn count_files(source: &Path) -> FsOpsResult<u64> {
    let mut total = 0_u64;
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|err| FsOpsError::walkdir("archive.count", source, err))?;
        if entry.file_type().is_file() {
            total += 1;
        }
    }
    Ok(total)
}

fn entry_name(root_name: &str, relative: &Path, path: &Path) -> FsOpsResult<String> {
    let mut name = String::from(root_name);
    for component in relative.components() {
        if let Component::Normal(segment) = component {
            name.push('/');
            name.push_str(utf8_segment(segment, path)?);
        }
    }
    Ok(name)
}

// Entry names map one-to-one onto file names; no lossy conversion.
fn utf8_segment<'a>(segment: &'a OsStr, path: &Path) -> FsOpsResult<&'a str> {
    segment.to_str().ok_or_else(|| FsOpsError::InvalidInput {
        field: "source_dir",
        reason: "entry name is not valid UTF-8",
        value: Some(path.to_string_lossy().into_owned()),
    })
}

fn file_options(policy: &ArchivePolicy, metadata: &fs::Metadata) -> FileOptions {
    let options = match policy.method {
        CompressionMethod::Stored => {
            FileOptions::default().compression_method(zip::CompressionMethod::Stored)
        }
        CompressionMethod::Deflated => FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(policy.level),
    };
    with_permissions(options, metadata).large_file(metadata.len() >= ZIP64_THRESHOLD)
}

#[cfg(unix)]
fn with_permissions(options: FileOptions, metadata: &fs::Metadata) -> FileOptions {
    use std::os::unix::fs::PermissionsExt;
    options.unix_permissions(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn with_permissions(options: FileOptions, _metadata: &fs::Metadata) -> FileOptions {
    options
}
