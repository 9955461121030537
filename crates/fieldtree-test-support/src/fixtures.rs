//! Test fixtures for filesystem and archive assertions.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{Result, anyhow};
use tempfile::TempDir;
use zip::ZipArchive;

/// Summary of a single archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntrySummary {
    /// Entry name as stored in the central directory.
    pub name: String,
    /// Whether the entry is a directory marker.
    pub is_dir: bool,
    /// Uncompressed size in bytes.
    pub size: u64,
}

/// Create a scratch directory removed when the guard drops.
///
/// # Errors
///
/// Returns an error when the system temp directory is not writable.
pub fn temp_dir() -> Result<TempDir> {
    Ok(tempfile::Builder::new().prefix("fieldtree-").tempdir()?)
}

/// Write `contents` to `path`, creating parent directories first.
///
/// # Errors
///
/// Returns an error when any directory or the file cannot be written.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// List the entries of a zip archive in central-directory order.
///
/// # Errors
///
/// Returns an error when the archive cannot be opened or decoded.
pub fn zip_entries(archive: &Path) -> Result<Vec<ZipEntrySummary>> {
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    let mut entries = Vec::with_capacity(zip.len());
    for index in 0..zip.len() {
        let entry = zip.by_index(index)?;
        entries.push(ZipEntrySummary {
            name: entry.name().to_string(),
            is_dir: entry.is_dir(),
            size: entry.size(),
        });
    }
    Ok(entries)
}

/// Names of all archive entries, sorted.
///
/// # Errors
///
/// Returns an error when the archive cannot be opened or decoded.
pub fn zip_entry_names(archive: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = zip_entries(archive)?
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    names.sort();
    Ok(names)
}

/// Extract every entry of `archive` below `target`, rejecting unsafe names.
///
/// # Errors
///
/// Returns an error when the archive is unreadable, contains absolute or
/// parent-relative names, or the target cannot be written.
pub fn extract_archive(archive: &Path, target: &Path) -> Result<()> {
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let destination = target.join(sanitize_entry_name(entry.name())?);
        if entry.is_dir() {
            fs::create_dir_all(&destination)?;
            continue;
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut output = File::create(&destination)?;
        io::copy(&mut entry, &mut output)?;
    }
    Ok(())
}

fn sanitize_entry_name(name: &str) -> Result<PathBuf> {
    let mut sanitized = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(segment) => sanitized.push(segment),
            Component::CurDir => {}
            _ => return Err(anyhow!("unsafe archive entry name '{name}'")),
        }
    }
    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sanitize_rejects_parent_segments() {
        assert!(sanitize_entry_name("../escape.txt").is_err());
        assert!(sanitize_entry_name("/abs/path").is_err());
        assert!(sanitize_entry_name("INV-1-PVPM/String-1/").is_ok());
    }

    #[test]
    fn zip_helpers_list_and_extract() -> Result<()> {
        let temp = temp_dir()?;
        let archive = temp.path().join("sample.zip");
        {
            let mut writer = zip::ZipWriter::new(File::create(&archive)?);
            let options = zip::write::FileOptions::default();
            writer.add_directory("root/empty/", options)?;
            writer.start_file("root/file.txt", options)?;
            writer.write_all(b"payload")?;
            writer.finish()?;
        }

        let entries = zip_entries(&archive)?;
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|entry| entry.is_dir && entry.size == 0));
        assert_eq!(
            zip_entry_names(&archive)?,
            vec!["root/empty/".to_string(), "root/file.txt".to_string()]
        );

        let target = temp.path().join("out");
        extract_archive(&archive, &target)?;
        assert!(target.join("root/empty").is_dir());
        assert_eq!(fs::read(target.join("root/file.txt"))?, b"payload");
        Ok(())
    }
}
