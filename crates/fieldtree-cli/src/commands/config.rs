use crate::cli::ConfigSetArgs;
use crate::context::{AppContext, CliError, CliResult};
use crate::output::render_preferences;

pub(crate) fn handle_config_get(ctx: &AppContext) -> CliResult<()> {
    render_preferences(ctx.store.path(), &ctx.prefs, ctx.output)
}

pub(crate) fn handle_config_set(ctx: &mut AppContext, args: &ConfigSetArgs) -> CliResult<()> {
    if args.method.is_none() && args.level.is_none() && !args.clear_level && args.root.is_none() {
        return Err(CliError::validation(
            "nothing to change; pass --method, --level, --clear-level, or --root",
        ));
    }

    let mut archive = ctx.prefs.archive;
    if let Some(method) = args.method {
        archive.method = method;
    }
    if args.clear_level {
        archive.level = None;
    } else if let Some(level) = args.level {
        archive.level = Some(level);
    }
    archive
        .validate()
        .map_err(|err| {
            CliError::validation(format!("invalid archive policy: {}", err.detail()))
        })?;

    ctx.prefs.archive = archive;
    if let Some(root) = &args.root {
        ctx.remember_root(root);
    }
    ctx.persist();
    render_preferences(ctx.store.path(), &ctx.prefs, ctx.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use anyhow::Result;
    use fieldtree_config::{CompressionMethod, PreferenceStore};
    use fieldtree_test_support::fixtures::temp_dir;

    fn set_args() -> ConfigSetArgs {
        ConfigSetArgs {
            method: None,
            level: None,
            clear_level: false,
            root: None,
        }
    }

    #[test]
    fn set_without_changes_is_rejected() -> Result<()> {
        let temp = temp_dir()?;
        let mut ctx = AppContext::load(temp.path().join("prefs.json"), OutputFormat::Table);
        let result = handle_config_set(&mut ctx, &set_args());
        assert!(matches!(result, Err(CliError::Validation(_))));
        Ok(())
    }

    #[test]
    fn set_updates_and_persists_policy() -> Result<()> {
        let temp = temp_dir()?;
        let path = temp.path().join("prefs.json");
        let mut ctx = AppContext::load(&path, OutputFormat::Json);

        let args = ConfigSetArgs {
            method: Some(CompressionMethod::Stored),
            level: Some(4),
            ..set_args()
        };
        assert!(handle_config_set(&mut ctx, &args).is_ok());

        let saved = PreferenceStore::new(&path).load()?;
        assert_eq!(saved.archive.method, CompressionMethod::Stored);
        assert_eq!(saved.archive.level, Some(4));

        let clear = ConfigSetArgs {
            clear_level: true,
            root: Some(temp.path().to_path_buf()),
            ..set_args()
        };
        assert!(handle_config_set(&mut ctx, &clear).is_ok());
        let saved = PreferenceStore::new(&path).load()?;
        assert_eq!(saved.archive.level, None);
        assert_eq!(saved.last_root.as_deref(), Some(temp.path()));
        Ok(())
    }
}
