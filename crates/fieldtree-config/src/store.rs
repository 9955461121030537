//! JSON-backed preference store.
//!
//! # Design
//! - A missing file is not an error; defaults are returned.
//! - Writes land in a sibling temporary file that is renamed over the target,
//!   so an interrupted save never leaves a truncated document behind.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::model::Preferences;

/// Reads and writes the preference document at a fixed path.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// Create a store bound to `path`; nothing is read until [`Self::load`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the preference document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences, returning defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or is not a valid
    /// preference document.
    pub fn load(&self) -> ConfigResult<Preferences> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no preference file; using defaults");
                return Ok(Preferences::default());
            }
            Err(err) => return Err(ConfigError::io("preferences.read", &self.path, err)),
        };

        let mut prefs: Preferences = serde_json::from_str(&raw)
            .map_err(|err| ConfigError::json("preferences.parse", &self.path, err))?;
        prefs.archive.validate()?;
        prefs.trim_history();
        Ok(prefs)
    }

    /// Load preferences, falling back to defaults when the document is unusable.
    #[must_use]
    pub fn load_or_default(&self) -> Preferences {
        match self.load() {
            Ok(prefs) => prefs,
            Err(err) => {
                warn!(
                    error = %err,
                    detail = ?err,
                    path = %self.path.display(),
                    "preference file unusable; starting from defaults"
                );
                Preferences::default()
            }
        }
    }

    /// Persist preferences.
    ///
    /// # Errors
    ///
    /// Returns an error when the document cannot be serialised or written.
    pub fn save(&self, prefs: &Preferences) -> ConfigResult<()> {
        let serialised = serde_json::to_string_pretty(prefs)
            .map_err(|err| ConfigError::json("preferences.serialize", &self.path, err))?;

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| ConfigError::io("preferences.create_parent", parent, err))?;
        }

        let staging = self.staging_path();
        fs::write(&staging, serialised)
            .map_err(|err| ConfigError::io("preferences.write", &staging, err))?;
        fs::rename(&staging, &self.path)
            .map_err(|err| ConfigError::io("preferences.rename", &self.path, err))
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}
