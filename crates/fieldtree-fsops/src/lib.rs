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

//! Field data folder trees and their per-device zip archives.
//!
//! Layout: `model.rs` (requests, specs, archive jobs), `layout.rs` (naming
//! rules), `builder.rs` (directory creation), `archive.rs` (zip writing),
//! `batch.rs` (device discovery and reports), `progress.rs` (progress sinks),
//! `service.rs` (event-publishing front end).

pub mod archive;
pub mod batch;
pub mod builder;
pub mod error;
pub mod layout;
pub mod model;
pub mod progress;
pub mod service;

pub use archive::{ArchiveSummary, compress_directory, resolve_destination};
pub use batch::{ArchivedDevice, CompressReport, FailedDevice, discover_devices};
pub use builder::{TreeOutcome, build, build_tree};
pub use error::{FsOpsError, FsOpsResult, Violation};
pub use layout::{DEVICE_PREFIX, SUB_UNIT_PREFIX, device_dir_name, sub_unit_dir_name};
pub use model::{
    ArchiveJob, DEVICE_ID_RANGE, DeviceKind, FolderRequest, FolderSpec, SUB_UNIT_RANGE,
};
pub use progress::{EventProgress, NoProgress, ProgressSink};
pub use service::FsOpsService;
