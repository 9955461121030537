//! Event-publishing front end for tree creation and container compression.

use std::path::{Path, PathBuf};

use fieldtree_config::ArchivePolicy;
use fieldtree_events::{Event, EventBus};
use tracing::{info, warn};

use crate::archive::{ArchiveSummary, compress_directory, resolve_destination};
use crate::batch::{ArchivedDevice, CompressReport, FailedDevice, device_label, discover_devices};
use crate::builder::{TreeOutcome, build_tree};
use crate::error::{FsOpsError, FsOpsResult};
use crate::model::{FolderRequest, FolderSpec};
use crate::progress::{BatchSlot, EventProgress, ProgressSink};

/// Runs filesystem jobs and reports their lifecycle on the shared event bus.
#[derive(Clone)]
pub struct FsOpsService {
    events: EventBus,
    policy: ArchivePolicy,
}

impl FsOpsService {
    /// Construct a service that publishes on `events` and uses the default archive policy.
    #[must_use]
    pub fn new(events: EventBus) -> Self {
        Self {
            events,
            policy: ArchivePolicy::default(),
        }
    }

    /// Use `policy` for every archive written by this service.
    #[must_use]
    pub const fn with_policy(mut self, policy: ArchivePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validate `request` and create its device tree below `root`.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::Validation`] without touching the filesystem when
    /// the request is invalid, or [`FsOpsError::BuildInterrupted`] when a
    /// directory cannot be created.
    pub fn create_tree(
        &self,
        root: &Path,
        request: &FolderRequest<'_>,
    ) -> FsOpsResult<TreeOutcome> {
        let spec = FolderSpec::parse(request).inspect_err(|err| {
            warn!(error = %err, detail = %err.detail(), "folder request rejected");
        })?;
        let device = spec.device_dir_name();
        self.publish_event(Event::TreeStarted {
            device: device.clone(),
            sub_units: spec.sub_unit_count,
        });

        let progress = EventProgress::new(self.events.clone());
        match build_tree(root, &spec, &progress) {
            Ok(outcome) => {
                info!(
                    device = %device,
                    path = %outcome.device_dir.display(),
                    created = outcome.created,
                    total = outcome.total,
                    "device tree ready"
                );
                self.publish_event(Event::TreeCompleted {
                    device,
                    created: outcome.created,
                });
                Ok(outcome)
            }
            Err(error) => {
                let detail = error.detail();
                warn!(device = %device, error = %error, detail = %detail, "device tree incomplete");
                self.publish_event(Event::TreeFailed {
                    device,
                    message: detail,
                });
                Err(error)
            }
        }
    }

    /// Archive every device directory of `container` into sibling zip files.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::NoDevices`] when the container holds no device
    /// directories, or an IO error when it cannot be listed. Failures of
    /// individual devices are collected in the report instead.
    pub fn compress_container(&self, container: &Path) -> FsOpsResult<CompressReport> {
        let devices = discover_devices(container)?;
        if devices.is_empty() {
            warn!(container = %container.display(), "no device directories to compress");
            return Err(FsOpsError::NoDevices {
                container: container.to_path_buf(),
            });
        }
        Ok(self.compress_devices(container, &devices))
    }

    /// Archive each of `devices` into `container`, one independent job per device.
    ///
    /// Overall progress advances by one slot per device; a failed device
    /// still completes its slot and the remaining devices are processed.
    #[must_use]
    pub fn compress_devices(&self, container: &Path, devices: &[PathBuf]) -> CompressReport {
        let progress = EventProgress::new(self.events.clone());
        let total = devices.len();
        let mut report = CompressReport::default();

        for (index, device_dir) in devices.iter().enumerate() {
            let device = device_label(device_dir);
            let destination = resolve_destination(container, &device);
            self.publish_event(Event::ArchiveStarted {
                device: device.clone(),
                destination: destination.to_string_lossy().into_owned(),
            });

            let slot = BatchSlot::new(&progress, index, total);
            match self.compress_device(device_dir, &destination, &slot) {
                Ok(archive) => {
                    self.publish_event(Event::ArchiveCompleted {
                        device: device.clone(),
                        destination: archive.destination.to_string_lossy().into_owned(),
                        files: archive.files,
                    });
                    report.archived.push(ArchivedDevice { device, archive });
                }
                Err(error) => {
                    let detail = error.detail();
                    warn!(
                        device = %device,
                        error = %error,
                        detail = %detail,
                        "device archive failed"
                    );
                    self.publish_event(Event::ArchiveFailed {
                        device: device.clone(),
                        message: detail,
                    });
                    slot.report(1.0, &device);
                    report.failed.push(FailedDevice {
                        device,
                        destination,
                        error,
                    });
                }
            }
        }

        info!(
            container = %container.display(),
            archived = report.archived.len(),
            failed = report.failed.len(),
            "container compression finished"
        );
        self.publish_event(Event::BatchCompleted {
            archived: report.archived.len(),
            failed: report.failed.len(),
        });
        report
    }

    fn compress_device(
        &self,
        device_dir: &Path,
        destination: &Path,
        progress: &dyn ProgressSink,
    ) -> FsOpsResult<ArchiveSummary> {
        let summary = compress_directory(device_dir, destination, &self.policy, progress)?;
        info!(
            source = %device_dir.display(),
            destination = %summary.destination.display(),
            files = summary.files,
            directories = summary.directories,
            method = %self.policy.method,
            "device archived"
        );
        Ok(summary)
    }

    fn publish_event(&self, event: Event) {
        self.events.publish(event);
    }
}
