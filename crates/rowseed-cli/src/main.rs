mod logging;
mod redact;
mod settings;

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use rowseed_core::{DatabaseSchema, Error as CoreError, SCHEMA_VERSION, validate_schema};
use rowseed_generate::{
    Connection, Dialect, GenerationError, Insert, InsertOptions, Links, Offline,
    RelationshipKind, RelationshipPolicy, RunError, connect, parse_links,
};
use schemars::schema_for;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use logging::{LoggingError, init_logging};
use redact::redact_connection_string;
use settings::{RunSettings, SettingsError, load_settings};

/// Pending progress updates per table before new ones are dropped.
const PROGRESS_CAPACITY: usize = 64;

#[derive(Debug, Error)]
enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("progress task failed: {0}")]
    Progress(#[from] tokio::task::JoinError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "rowseed", version, about = "Bulk-insert random rows into MySQL and PostgreSQL tables")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and insert rows into one or more tables.
    Run(RunArgs),
    /// Print the JSON schema of the schema document format.
    JsonSchema(JsonSchemaArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Schema document (JSON) describing the target tables.
    #[arg(long, value_name = "PATH")]
    schema: PathBuf,
    /// Table to fill, as `schema.table` or bare name. Repeat to fill several
    /// tables in the given order.
    #[arg(long = "table", value_name = "TABLE", required = true)]
    tables: Vec<String>,
    /// Rows to insert into each table.
    #[arg(long)]
    rows: u64,
    /// Database connection string; the scheme selects MySQL or PostgreSQL.
    #[arg(long, env = "ROWSEED_DATABASE_URL", value_name = "CONNECTION_STRING")]
    conn: Option<String>,
    /// TOML settings file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Rows per INSERT statement.
    #[arg(long)]
    bulk_size: Option<u64>,
    /// Seed for value generation and random sampling.
    #[arg(long)]
    seed: Option<u64>,
    /// Chance that a nullable column gets NULL.
    #[arg(long)]
    null_probability: Option<f64>,
    /// Skip rows that collide with existing keys.
    #[arg(long, default_value_t = false)]
    ignore_duplicates: bool,
    /// Relationship used when no override matches: `random-1-n` or `1-1`.
    #[arg(long, value_name = "KIND")]
    default_relationship: Option<String>,
    /// 1-1 overrides as `table=referenced_table` pairs separated by `;`.
    #[arg(long, value_name = "LINKS")]
    one_to_one: Option<String>,
    /// Random 1-N overrides as `table=referenced_table` pairs separated by `;`.
    #[arg(long, value_name = "LINKS")]
    random_one_to_many: Option<String>,
    /// Print statements instead of executing them.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Write dry-run statements to this file instead of stdout.
    #[arg(long, value_name = "PATH", requires = "dry_run")]
    out: Option<PathBuf>,
    /// Append JSON log lines to this file instead of logging to stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

#[derive(Args, Debug)]
struct JsonSchemaArgs {
    /// Write to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run(args).await,
        Command::JsonSchema(args) => print_json_schema(args),
    }
}

async fn run(args: RunArgs) -> Result<(), CliError> {
    init_logging(args.log_file.as_deref())?;

    let settings = match &args.config {
        Some(path) => load_settings(path)?,
        None => RunSettings::default(),
    };

    let run_id = Uuid::new_v4();
    let timer = Instant::now();

    let schema: DatabaseSchema = serde_json::from_str(&std::fs::read_to_string(&args.schema)?)?;
    validate_schema(&schema)?;
    if schema.schema_version != SCHEMA_VERSION {
        tracing::warn!(
            found = %schema.schema_version,
            expected = SCHEMA_VERSION,
            "schema document version differs"
        );
    }

    let bulk_size = args.bulk_size.unwrap_or(settings.bulk_size);
    let seed = args
        .seed
        .or(settings.seed)
        .unwrap_or_else(|| run_id.as_u64_pair().0);
    let options = InsertOptions {
        seed,
        null_probability: args.null_probability.unwrap_or(settings.null_probability),
        ignore_duplicates: args.ignore_duplicates || settings.ignore_duplicates,
        current_year: None,
    };
    let policy = build_policy(&args, &settings)?;

    let connection = open_connection(&args, &schema).await?;
    let sink = match &args.out {
        Some(path) => Some(File::create(path)?),
        None => None,
    };

    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        started_at = %chrono::Utc::now().to_rfc3339(),
        dialect = ?connection.dialect(),
        tables = args.tables.len(),
        rows = args.rows,
        bulk_size,
        seed,
        dry_run = args.dry_run
    );

    let mut total = 0;
    for name in &args.tables {
        let table = schema.table(name)?;
        let mut insert = Insert::new(table, connection.as_ref(), &policy, &options)?;
        if let Some(file) = &sink {
            insert.set_writer(file.try_clone()?);
        }

        let progress = spawn_progress_logger(
            table.qualified_name(),
            insert.notify_channel(PROGRESS_CAPACITY),
        );
        let outcome = if args.dry_run {
            insert.dry_run(args.rows, bulk_size).await
        } else {
            insert.run(args.rows, bulk_size).await
        };
        progress.await?;

        match outcome {
            Ok(rows) => total += rows,
            Err(err) => {
                tracing::error!(
                    event = "run_finished",
                    run_id = %run_id,
                    status = "failed",
                    table = %table.qualified_name(),
                    rows = total + err.rows_committed,
                    error = %err
                );
                return Err(err.into());
            }
        }
    }

    tracing::info!(
        event = "run_finished",
        run_id = %run_id,
        status = "success",
        rows = total,
        duration_ms = timer.elapsed().as_millis() as u64
    );

    Ok(())
}

async fn open_connection(
    args: &RunArgs,
    schema: &DatabaseSchema,
) -> Result<Box<dyn Connection>, CliError> {
    match &args.conn {
        Some(url) => {
            tracing::info!(
                event = "connecting",
                connection = %redact_connection_string(url)
            );
            Ok(connect(url, args.max_connections).await?)
        }
        None if args.dry_run => {
            let dialect = Dialect::from_engine(&schema.engine).ok_or_else(|| {
                CliError::InvalidConfig(format!("unsupported engine '{}'", schema.engine))
            })?;
            tracing::info!(event = "offline", dialect = ?dialect);
            Ok(Box::new(Offline::new(dialect)))
        }
        None => Err(CliError::InvalidConfig(
            "connection string is required (--conn or ROWSEED_DATABASE_URL)".to_string(),
        )),
    }
}

fn build_policy(args: &RunArgs, settings: &RunSettings) -> Result<RelationshipPolicy, CliError> {
    let raw = args
        .default_relationship
        .as_deref()
        .unwrap_or(&settings.default_relationship);

    let mut policy = RelationshipPolicy::new(RelationshipKind::parse_lossy(raw));
    policy.one_to_one = merge_links(&settings.one_to_one, args.one_to_one.as_deref())?;
    policy.random_one_to_many =
        merge_links(&settings.random_one_to_many, args.random_one_to_many.as_deref())?;
    Ok(policy)
}

fn merge_links(base: &Links, extra: Option<&str>) -> Result<Links, CliError> {
    let mut links = base.clone();
    if let Some(raw) = extra {
        for (table, referenced) in parse_links(raw)? {
            links.entry(table).or_default().extend(referenced);
        }
    }
    Ok(links)
}

fn spawn_progress_logger(table: String, mut progress: mpsc::Receiver<u64>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut inserted = 0;
        while let Some(rows) = progress.recv().await {
            inserted += rows;
            tracing::info!(event = "progress", table = %table, rows, inserted);
        }
    })
}

fn print_json_schema(args: JsonSchemaArgs) -> Result<(), CliError> {
    let schema = schema_for!(DatabaseSchema);
    let json = serde_json::to_string_pretty(&schema)?;
    match args.out {
        Some(path) => std::fs::write(path, format!("{json}\n"))?,
        None => println!("{json}"),
    }
    Ok(())
}
