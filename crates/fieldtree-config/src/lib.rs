#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! File-backed preferences: archive policy, last used root, operation history.
//!
//! Layout: `model.rs` (preference document), `history.rs` (operation log
//! records), `store.rs` (JSON persistence), `validate.rs` (value parsing),
//! `defaults.rs` (file names and retention limits).

pub mod defaults;
pub mod error;
pub mod history;
pub mod model;
pub mod store;
pub mod validate;

pub use defaults::{DEFAULT_PREFERENCES_FILE, HISTORY_LIMIT, PREFERENCES_ENV};
pub use error::{ConfigError, ConfigResult};
pub use history::{OperationKind, OperationOutcome, OperationRecord};
pub use model::{ArchivePolicy, CompressionMethod, Preferences};
pub use store::PreferenceStore;
pub use validate::parse_compression_level;
