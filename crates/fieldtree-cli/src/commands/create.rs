use anyhow::anyhow;
use fieldtree_config::{OperationKind, OperationRecord};
use fieldtree_events::EventBus;
use fieldtree_fsops::{FolderRequest, FsOpsError, FsOpsService};

use crate::cli::CreateArgs;
use crate::commands::run_with_progress;
use crate::context::{AppContext, CliError, CliResult};
use crate::output::{ProgressRenderer, render_tree_outcome};

pub(crate) async fn handle_create(ctx: &mut AppContext, args: CreateArgs) -> CliResult<()> {
    let root = ctx.resolve_root(args.root.clone())?;
    let description = format!(
        "container {} device {} ({}) with {} sub-units",
        args.container, args.device, args.kind, args.strings
    );

    let events = EventBus::new();
    let service = FsOpsService::new(events.clone());
    let job_root = root.clone();
    let result = run_with_progress(&events, ProgressRenderer::new(ctx.output), move || {
        service.create_tree(
            &job_root,
            &FolderRequest {
                container_id: &args.container,
                device_id: &args.device,
                device_kind: args.kind,
                sub_unit_count: &args.strings,
            },
        )
    })
    .await?;

    match result {
        Ok(outcome) => {
            ctx.remember_root(&root);
            ctx.record(OperationRecord::success(
                OperationKind::Create,
                format!("{description}: {} new", outcome.created),
            ));
            render_tree_outcome(&outcome, ctx.output)
        }
        Err(err) => {
            let detail = err.detail();
            ctx.record(OperationRecord::failure(
                OperationKind::Create,
                description,
                detail.clone(),
            ));
            Err(match err {
                FsOpsError::Validation { .. } => {
                    CliError::validation(format!("invalid request: {detail}"))
                }
                _ => CliError::failure(anyhow!("directory creation failed: {detail}")),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use anyhow::Result;
    use fieldtree_config::{OperationOutcome, PreferenceStore};
    use fieldtree_fsops::DeviceKind;
    use fieldtree_test_support::fixtures::temp_dir;

    fn args(device: &str, root: Option<std::path::PathBuf>) -> CreateArgs {
        CreateArgs {
            container: "100".to_string(),
            device: device.to_string(),
            kind: DeviceKind::Pvpm,
            strings: "3".to_string(),
            root,
        }
    }

    #[tokio::test]
    async fn create_builds_tree_and_remembers_root() -> Result<()> {
        let temp = temp_dir()?;
        let prefs_path = temp.path().join("prefs.json");
        let root = temp.path().join("plants");
        let mut ctx = AppContext::load(&prefs_path, OutputFormat::Json);

        let result = handle_create(&mut ctx, args("3", Some(root.clone()))).await;
        assert!(result.is_ok());
        assert!(root.join("100/INV-3-PVPM/String-3").is_dir());

        let saved = PreferenceStore::new(&prefs_path).load()?;
        assert_eq!(saved.last_root, Some(root.clone()));
        assert_eq!(saved.history.len(), 1);

        let again = handle_create(&mut ctx, args("4", None)).await;
        assert!(again.is_ok());
        assert!(root.join("100/INV-4-PVPM").is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_request_is_a_validation_error_and_is_logged() -> Result<()> {
        let temp = temp_dir()?;
        let root = temp.path().join("plants");
        let mut ctx = AppContext::load(temp.path().join("prefs.json"), OutputFormat::Table);

        let result = handle_create(&mut ctx, args("99", Some(root.clone()))).await;
        let Err(err) = result else {
            panic!("out of range device id should fail");
        };
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("device_id"));
        assert!(!root.exists());
        assert_eq!(
            ctx.prefs.history.last().map(|record| record.outcome),
            Some(OperationOutcome::Error)
        );
        assert_eq!(ctx.prefs.last_root, None);
        Ok(())
    }
}
