//! Error types for preference operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for preference operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Section that failed validation.
        section: &'static str,
        /// Field that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// File system operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// Preference document could not be parsed or serialised.
    #[error("preference document is not valid json")]
    Json {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source serde error.
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: serde_json::Error,
    ) -> Self {
        Self::Json {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Render the error together with its context for user-facing output.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidField {
                section,
                field,
                value,
                reason,
            } => value.as_ref().map_or_else(
                || format!("{section}.{field} {reason}"),
                |value| format!("{section}.{field} {reason} (got '{value}')"),
            ),
            Self::Io {
                operation,
                path,
                source,
            } => format!("{operation} failed for {}: {source}", path.display()),
            Self::Json {
                operation,
                path,
                source,
            } => format!("{operation} failed for {}: {source}", path.display()),
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_helpers_preserve_sources() {
        let io_err = ConfigError::io("read", "prefs.json", io::Error::other("io"));
        assert!(matches!(io_err, ConfigError::Io { .. }));
        assert!(io_err.source().is_some());

        let json_source = serde_json::from_str::<serde_json::Value>("{").err();
        if let Some(source) = json_source {
            let json_err = ConfigError::json("parse", "prefs.json", source);
            assert_eq!(json_err.to_string(), "preference document is not valid json");
            assert!(json_err.source().is_some());
        } else {
            panic!("expected malformed json to fail parsing");
        }
    }

    #[test]
    fn detail_names_section_and_value() {
        let err = ConfigError::InvalidField {
            section: "archive",
            field: "level",
            value: Some("12".to_string()),
            reason: "must be between 0 and 9",
        };
        assert_eq!(
            err.detail(),
            "archive.level must be between 0 and 9 (got '12')"
        );
    }
}
