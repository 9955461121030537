use anyhow::anyhow;
use fieldtree_config::{ArchivePolicy, OperationKind, OperationRecord};
use fieldtree_events::EventBus;
use fieldtree_fsops::FsOpsService;
use tracing::warn;

use crate::cli::CompressArgs;
use crate::commands::run_with_progress;
use crate::context::{AppContext, CliError, CliResult};
use crate::output::{ProgressRenderer, render_compress_report};

pub(crate) async fn handle_compress(ctx: &mut AppContext, args: CompressArgs) -> CliResult<()> {
    let policy = ArchivePolicy {
        method: args.method.unwrap_or(ctx.prefs.archive.method),
        level: args.level.or(ctx.prefs.archive.level),
    };
    policy
        .validate()
        .map_err(|err| {
            CliError::validation(format!("invalid archive policy: {}", err.detail()))
        })?;

    let container = args.container;
    let description = format!("container {}", container.display());
    let events = EventBus::new();
    let service = FsOpsService::new(events.clone()).with_policy(policy);
    let job_container = container.clone();
    let result = run_with_progress(&events, ProgressRenderer::new(ctx.output), move || {
        service.compress_container(&job_container)
    })
    .await?;

    match result {
        Ok(report) => {
            let archived = report.archived.len();
            let failed = report.failed.len();
            if report.is_success() {
                ctx.record(OperationRecord::success(
                    OperationKind::Compress,
                    format!("{description}: {archived} archives"),
                ));
            } else {
                let devices = report
                    .failed
                    .iter()
                    .map(|failure| failure.device.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                ctx.record(OperationRecord::failure(
                    OperationKind::Compress,
                    format!("{description}: {archived} archives"),
                    format!("failed: {devices}"),
                ));
            }
            render_compress_report(&container, &report, ctx.output)?;
            if failed == 0 {
                Ok(())
            } else {
                Err(CliError::failure(anyhow!(
                    "{failed} of {} devices could not be archived",
                    archived + failed
                )))
            }
        }
        Err(err) if err.is_no_work() => {
            let detail = err.detail();
            ctx.record(OperationRecord::failure(
                OperationKind::Compress,
                description,
                detail.clone(),
            ));
            warn!(container = %container.display(), "nothing to compress");
            eprintln!("warning: {detail}");
            Ok(())
        }
        Err(err) => {
            let detail = err.detail();
            ctx.record(OperationRecord::failure(
                OperationKind::Compress,
                description,
                detail.clone(),
            ));
            Err(CliError::failure(anyhow!(
                "compression of {} failed: {detail}",
                container.display()
            )))
        }
    }
}
