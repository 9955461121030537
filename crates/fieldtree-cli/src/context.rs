//! Shared state, error types, and exit codes for command handlers.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

use fieldtree_config::{OperationRecord, PreferenceStore, Preferences};
use tracing::warn;

use crate::cli::OutputFormat;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Preferences and output settings for one invocation.
pub(crate) struct AppContext {
    pub(crate) store: PreferenceStore,
    pub(crate) prefs: Preferences,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Load preferences from `path`; unusable documents fall back to defaults.
    pub(crate) fn load(path: impl Into<PathBuf>, output: OutputFormat) -> Self {
        let store = PreferenceStore::new(path);
        let prefs = store.load_or_default();
        Self {
            store,
            prefs,
            output,
        }
    }

    /// Root for new containers: the explicit argument, else the last one used.
    pub(crate) fn resolve_root(&self, explicit: Option<PathBuf>) -> CliResult<PathBuf> {
        explicit
            .or_else(|| self.prefs.last_root.clone())
            .ok_or_else(|| {
                CliError::validation("no root directory remembered yet; pass --root <DIR>")
            })
    }

    /// Remember `root` for the next `create`.
    pub(crate) fn remember_root(&mut self, root: &Path) {
        self.prefs.last_root = Some(root.to_path_buf());
    }

    /// Append `record` to the history and save right away.
    pub(crate) fn record(&mut self, record: OperationRecord) {
        self.prefs.record(record);
        self.persist();
    }

    /// Save preferences; failures are logged and otherwise ignored.
    pub(crate) fn persist(&self) {
        if let Err(err) = self.store.save(&self.prefs) {
            warn!(
                error = %err,
                detail = ?err,
                path = %self.store.path().display(),
                "failed to save preferences"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use fieldtree_config::{OperationKind, OperationOutcome};
    use fieldtree_test_support::fixtures::temp_dir;

    #[test]
    fn cli_error_maps_exit_codes_and_messages() {
        let validation = CliError::validation("device_id must be a number");
        assert_eq!(validation.exit_code(), 2);
        assert_eq!(validation.display_message(), "device_id must be a number");

        let failure = CliError::failure(anyhow!("inner").context("outer"));
        assert_eq!(failure.exit_code(), 3);
        assert_eq!(failure.display_message(), "outer: inner");
        assert_eq!(failure.to_string(), "cli error");
    }

    #[test]
    fn root_falls_back_to_remembered_value() -> Result<()> {
        let temp = temp_dir()?;
        let mut ctx = AppContext::load(temp.path().join("prefs.json"), OutputFormat::Table);
        assert!(matches!(ctx.resolve_root(None), Err(CliError::Validation(_))));

        ctx.remember_root(temp.path());
        assert!(matches!(ctx.resolve_root(None), Ok(root) if root == temp.path()));
        let explicit = temp.path().join("other");
        assert!(matches!(ctx.resolve_root(Some(explicit.clone())), Ok(root) if root == explicit));
        Ok(())
    }

    #[test]
    fn record_saves_immediately() -> Result<()> {
        let temp = temp_dir()?;
        let path = temp.path().join("prefs.json");
        let mut ctx = AppContext::load(&path, OutputFormat::Json);
        ctx.record(OperationRecord::failure(
            OperationKind::Compress,
            "100",
            "no device directories",
        ));

        let reloaded = PreferenceStore::new(&path).load()?;
        assert_eq!(reloaded.history.len(), 1);
        assert_eq!(reloaded.history[0].outcome, OperationOutcome::Error);
        Ok(())
    }

    #[test]
    fn unwritable_store_does_not_fail_the_command() -> Result<()> {
        let temp = temp_dir()?;
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, b"x")?;
        let mut ctx = AppContext::load(blocker.join("prefs.json"), OutputFormat::Table);
        ctx.record(OperationRecord::success(OperationKind::Create, "100"));
        assert_eq!(ctx.prefs.history.len(), 1);
        Ok(())
    }
}
