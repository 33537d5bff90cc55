// crates/json-depot-cli/src/main.rs
// ============================================================================
// Module: JSON Depot CLI Entry Point
// Description: Command dispatcher for serving, ingesting, and listing records.
// Purpose: Operate a JSON Depot store from the command line.
// Dependencies: clap, json-depot-config, json-depot-core, json-depot-server, tokio
// ============================================================================

//! ## Overview
//! The JSON Depot CLI starts the HTTP server and offers offline access to the
//! configured store: file ingestion through the same pipeline the server uses,
//! record listing, and store statistics. Errors are written to stderr and
//! reported through a failing exit code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use json_depot_config::DepotConfig;
use json_depot_core::IngestError;
use json_depot_core::IngestOutcome;
use json_depot_core::IngestPipeline;
use json_depot_core::JsonDocument;
use json_depot_core::JsonStore;
use json_depot_core::RecordDataFormat;
use json_depot_core::RecordId;
use json_depot_core::RecordView;
use json_depot_core::RetrievalService;
use json_depot_core::SharedJsonStore;
use json_depot_server::DepotServer;
use json_depot_server::init_logging;
use json_depot_server::open_json_store;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "json-depot", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the JSON Depot HTTP server.
    Serve(ServeCommand),
    /// Validate a JSON file and store it.
    Ingest(IngestCommand),
    /// Print every stored record.
    Records(RecordsCommand),
    /// Store utilities.
    Store {
        /// Selected store subcommand.
        #[command(subcommand)]
        command: StoreCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Shared `--config` argument.
#[derive(Args, Debug)]
struct ConfigArg {
    /// Optional config file path (defaults to json-depot.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Config selection.
    #[command(flatten)]
    config: ConfigArg,
}

/// Configuration for the `ingest` command.
#[derive(Args, Debug)]
struct IngestCommand {
    /// JSON file to ingest.
    #[arg(long, value_name = "PATH")]
    file: PathBuf,
    /// Config selection.
    #[command(flatten)]
    config: ConfigArg,
}

/// Configuration for the `records` command.
#[derive(Args, Debug)]
struct RecordsCommand {
    /// Config selection.
    #[command(flatten)]
    config: ConfigArg,
    /// Payload representation (overrides `retrieval.data_format`).
    #[arg(long, value_enum, value_name = "FORMAT")]
    format: Option<FormatArg>,
}

/// Store subcommands.
#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Print the number of stored records.
    Stats(StoreStatsCommand),
}

/// Configuration for the `store stats` command.
#[derive(Args, Debug)]
struct StoreStatsCommand {
    /// Config selection.
    #[command(flatten)]
    config: ConfigArg,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a JSON Depot configuration file.
    Validate(ConfigValidateCommand),
}

/// Configuration for the `config validate` command.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Config selection.
    #[command(flatten)]
    config: ConfigArg,
}

/// Record payload representation argument.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    /// Stored text as-is.
    Raw,
    /// Re-parsed JSON structures.
    Parsed,
}

impl From<FormatArg> for RecordDataFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Raw => Self::Raw,
            FormatArg::Parsed => Self::Parsed,
        }
    }
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// Output of a successful `ingest`.
#[derive(Serialize)]
struct IngestOutput {
    /// Assigned record identifier.
    id: RecordId,
    /// Parsed document.
    data: JsonDocument,
}

/// Output of `records`.
#[derive(Serialize)]
struct RecordsOutput {
    /// Records in insertion order.
    data: Vec<RecordView>,
}

/// Output of `store stats`.
#[derive(Serialize)]
struct StoreStatsOutput {
    /// Number of stored records.
    record_count: u64,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

impl From<IngestError> for CliError {
    fn from(error: IngestError) -> Self {
        Self::new(error.user_message().to_string())
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("json-depot {version}"))?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = cli.command else {
        Cli::command()
            .print_help()
            .map_err(|err| CliError::new(format!("failed to write help: {err}")))?;
        return Ok(ExitCode::SUCCESS);
    };
    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Ingest(command) => command_ingest(&command),
        Commands::Records(command) => command_records(&command),
        Commands::Store {
            command,
        } => match command {
            StoreCommand::Stats(command) => command_store_stats(&command),
        },
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Validate(command) => command_config_validate(&command),
        },
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.config.as_deref())?;
    init_logging(&config.logging).map_err(|err| CliError::new(err.to_string()))?;
    let server = tokio::task::spawn_blocking(move || DepotServer::from_config(&config))
        .await
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `ingest` command.
fn command_ingest(command: &IngestCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.config.as_deref())?;
    let store = open_store(&config)?;
    let outcome = ingest_file(&IngestPipeline::new(store), &command.file)?;
    write_json(&IngestOutput {
        id: outcome.id,
        data: outcome.value,
    })?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `records` command.
fn command_records(command: &RecordsCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.config.as_deref())?;
    let format = command.format.map_or(config.retrieval.data_format, RecordDataFormat::from);
    let service = RetrievalService::new(open_store(&config)?, format);
    let data = service
        .get_all()
        .map_err(|err| CliError::new(format!("Failed to fetch data: {err}")))?;
    write_json(&RecordsOutput {
        data,
    })?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `store stats` command.
fn command_store_stats(command: &StoreStatsCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.config.as_deref())?;
    let record_count = open_store(&config)?
        .count()
        .map_err(|err| CliError::new(format!("failed to count records: {err}")))?;
    write_json(&StoreStatsOutput {
        record_count,
    })?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `config validate` command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.config.as_deref())?;
    let source = config
        .source_path
        .as_ref()
        .map_or_else(|| "built-in defaults".to_string(), |path| path.display().to_string());
    write_stdout_line(&format!("Config valid ({source})"))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads and validates configuration.
fn load_config(path: Option<&Path>) -> CliResult<DepotConfig> {
    DepotConfig::load(path).map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

/// Opens the configured store.
fn open_store(config: &DepotConfig) -> CliResult<SharedJsonStore> {
    open_json_store(&config.store)
        .map_err(|err| CliError::new(format!("failed to open store: {err}")))
}

/// Runs a file through the ingestion pipeline, declaring its size up front.
fn ingest_file(pipeline: &IngestPipeline, path: &Path) -> CliResult<IngestOutcome> {
    let metadata = fs::metadata(path)
        .map_err(|err| CliError::new(format!("failed to read {}: {err}", path.display())))?;
    let declared = Some(metadata.len());
    IngestPipeline::check_declared_length(declared)?;
    let bytes = fs::read(path)
        .map_err(|err| CliError::new(format!("failed to read {}: {err}", path.display())))?;
    let text = String::from_utf8(bytes).map_err(|_| IngestError::InvalidSyntax)?;
    Ok(pipeline.ingest(Some(&text), declared)?)
}

/// Writes a value as one line of JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let payload = serde_json::to_string(value)
        .map_err(|err| CliError::new(format!("failed to serialize output: {err}")))?;
    write_stdout_line(&payload)
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = writeln!(std::io::stderr(), "{message}");
    ExitCode::FAILURE
}
