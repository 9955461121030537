//! Default values and retention policies for the preference document.
//!
//! # Design
//! - Centralize defaults so the store, the CLI, and tests agree.
//! - Keep retention limits explicit.

/// File name used when no preference path is supplied.
pub const DEFAULT_PREFERENCES_FILE: &str = "fieldtree.json";
/// Environment variable overriding the preference file location.
pub const PREFERENCES_ENV: &str = "FIELDTREE_CONFIG";
/// Number of operation records retained in the history.
pub const HISTORY_LIMIT: usize = 50;
/// Highest accepted deflate compression level.
pub(crate) const MAX_COMPRESSION_LEVEL: i32 = 9;
