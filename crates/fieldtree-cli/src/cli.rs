//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use fieldtree_config::{
    CompressionMethod, DEFAULT_PREFERENCES_FILE, PREFERENCES_ENV, parse_compression_level,
};
use fieldtree_fsops::DeviceKind;
use fieldtree_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, command_span, init_logging};
use tracing::Instrument;
use uuid::Uuid;

use crate::commands::{
    handle_compress, handle_config_get, handle_config_set, handle_create, handle_history,
};
use crate::context::{AppContext, CliError, CliResult};

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    if let Err(err) = init_telemetry(&cli) {
        eprintln!("error: {}", err.display_message());
        return err.exit_code();
    }

    let trace_id = Uuid::new_v4().to_string();
    let span = command_span(command_label(&cli.command), &trace_id);
    match dispatch(cli).instrument(span).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

fn init_telemetry(cli: &Cli) -> CliResult<()> {
    let config = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format,
        build_sha: option_env!("FIELDTREE_BUILD_SHA").unwrap_or("dev"),
    };
    init_logging(&config).map_err(CliError::failure)
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let mut ctx = AppContext::load(cli.config, cli.output);

    let result = match cli.command {
        Command::Create(args) => handle_create(&mut ctx, args).await,
        Command::Compress(args) => handle_compress(&mut ctx, args).await,
        Command::History(args) => handle_history(&ctx, &args),
        Command::Config(ConfigCommand::Get) => handle_config_get(&ctx),
        Command::Config(ConfigCommand::Set(args)) => handle_config_set(&mut ctx, &args),
    };

    ctx.persist();
    result
}

#[derive(Parser)]
#[command(
    name = "fieldtree",
    version,
    about = "Create field data folder trees and archive their device directories"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = PREFERENCES_ENV,
        default_value = DEFAULT_PREFERENCES_FILE,
        help = "Preference file holding the archive policy and operation history"
    )]
    pub(crate) config: PathBuf,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for command results"
    )]
    pub(crate) output: OutputFormat,
    #[arg(long, global = true, env = "FIELDTREE_LOG", default_value = DEFAULT_LOG_LEVEL)]
    pub(crate) log_level: String,
    #[arg(
        long,
        global = true,
        value_parser = parse_log_format,
        default_value = "auto",
        help = "Log format: json, pretty, or auto"
    )]
    pub(crate) log_format: LogFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Create `<root>/<container>/INV-<device>-<kind>/String-1..N`.
    Create(CreateArgs),
    /// Zip every INV-* directory of a container into a sibling archive.
    Compress(CompressArgs),
    /// List recent operations, newest first.
    History(HistoryArgs),
    /// Show or change stored preferences.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommand {
    Get,
    Set(ConfigSetArgs),
}

#[derive(Args)]
pub(crate) struct CreateArgs {
    #[arg(long, help = "Container identifier (directory name under the root)")]
    pub(crate) container: String,
    #[arg(long, help = "Device identifier, 1 to 50")]
    pub(crate) device: String,
    #[arg(long, value_parser = parse_device_kind, help = "Device kind: PVPM or METREL")]
    pub(crate) kind: DeviceKind,
    #[arg(long, help = "Number of String-N directories, 1 to 100")]
    pub(crate) strings: String,
    #[arg(long, help = "Root directory; defaults to the last root used")]
    pub(crate) root: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct CompressArgs {
    #[arg(help = "Container directory holding INV-* device directories")]
    pub(crate) container: PathBuf,
    #[arg(long, value_parser = parse_method, help = "Override the stored compression method")]
    pub(crate) method: Option<CompressionMethod>,
    #[arg(
        long,
        value_parser = parse_compression_level,
        help = "Override the stored compression level (0-9)"
    )]
    pub(crate) level: Option<i32>,
}

#[derive(Args)]
pub(crate) struct HistoryArgs {
    #[arg(long, help = "Show at most this many records")]
    pub(crate) limit: Option<usize>,
}

#[derive(Args)]
pub(crate) struct ConfigSetArgs {
    #[arg(long, value_parser = parse_method)]
    pub(crate) method: Option<CompressionMethod>,
    #[arg(long, value_parser = parse_compression_level, conflicts_with = "clear_level")]
    pub(crate) level: Option<i32>,
    #[arg(long, help = "Use the compression method's default level")]
    pub(crate) clear_level: bool,
    #[arg(long, help = "Root directory used by create when --root is omitted")]
    pub(crate) root: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn parse_device_kind(value: &str) -> Result<DeviceKind, String> {
    value
        .parse()
        .map_err(|_| format!("unknown device kind '{value}' (expected PVPM or METREL)"))
}

fn parse_method(value: &str) -> Result<CompressionMethod, String> {
    value
        .parse()
        .map_err(|_| format!("unknown compression method '{value}' (expected stored or deflated)"))
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value
        .parse()
        .map_err(|_| format!("unknown log format '{value}' (expected json, pretty, or auto)"))
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Create(_) => "create",
        Command::Compress(_) => "compress",
        Command::History(_) => "history",
        Command::Config(ConfigCommand::Get) => "config_get",
        Command::Config(ConfigCommand::Set(_)) => "config_set",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("fieldtree").chain(args.iter().copied()))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn create_keeps_numeric_fields_raw() {
        let cli = parse(&[
            "create",
            "--container",
            "100",
            "--device",
            "abc",
            "--kind",
            "metrel",
            "--strings",
            "5",
        ]);
        let Ok(Cli {
            command: Command::Create(args),
            ..
        }) = cli
        else {
            panic!("create should parse");
        };
        assert_eq!(args.device, "abc");
        assert_eq!(args.kind, DeviceKind::Metrel);
        assert!(args.root.is_none());
    }

    #[test]
    fn unknown_kind_is_rejected_by_the_parser() {
        let result = parse(&[
            "create",
            "--container",
            "100",
            "--device",
            "3",
            "--kind",
            "fluke",
            "--strings",
            "5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn compress_accepts_overrides() {
        let cli = parse(&["--output", "json", "compress", "plants/100", "--method", "stored"]);
        let Ok(cli) = cli else {
            panic!("compress should parse");
        };
        assert_eq!(cli.output, OutputFormat::Json);
        let Command::Compress(args) = &cli.command else {
            panic!("expected compress");
        };
        assert_eq!(args.container, PathBuf::from("plants/100"));
        assert_eq!(args.method, Some(CompressionMethod::Stored));
        assert_eq!(args.level, None);

        assert!(parse(&["compress", "100", "--level", "12"]).is_err());
    }

    #[test]
    fn config_set_rejects_conflicting_level_flags() {
        assert!(parse(&["config", "set", "--level", "3", "--clear-level"]).is_err());
        assert!(parse(&["config", "set", "--clear-level"]).is_ok());
    }

    #[test]
    fn log_level_flag_overrides_the_shared_default() {
        let Ok(cli) = parse(&["--log-level", "debug", "history"]) else {
            panic!("history should parse");
        };
        assert_eq!(cli.log_level, "debug");
        assert_eq!(DEFAULT_LOG_LEVEL, "warn");
    }

    #[test]
    fn command_label_matches_variants() {
        let Ok(cli) = parse(&["history", "--limit", "5"]) else {
            panic!("history should parse");
        };
        assert_eq!(command_label(&cli.command), "history");
        let Ok(cli) = parse(&["config", "get"]) else {
            panic!("config get should parse");
        };
        assert_eq!(command_label(&cli.command), "config_get");
    }
}
