//! Validation helpers for preference values supplied by users.

use crate::defaults::MAX_COMPRESSION_LEVEL;
use crate::error::{ConfigError, ConfigResult};

pub(crate) fn validate_compression_level(level: i32) -> ConfigResult<()> {
    if (0..=MAX_COMPRESSION_LEVEL).contains(&level) {
        Ok(())
    } else {
        Err(ConfigError::InvalidField {
            section: "archive",
            field: "level",
            value: Some(level.to_string()),
            reason: "must be between 0 and 9",
        })
    }
}

/// Parse a compression level entered as text.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an integer in `0..=9`.
pub fn parse_compression_level(value: &str) -> ConfigResult<i32> {
    let level = value
        .trim()
        .parse::<i32>()
        .map_err(|_| ConfigError::InvalidField {
            section: "archive",
            field: "level",
            value: Some(value.to_string()),
            reason: "must be an integer",
        })?;
    validate_compression_level(level)?;
    Ok(level)
}
