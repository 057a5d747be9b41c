use std::env;
use std::path::PathBuf;

use rowseed_core::DatabaseSchema;
use rowseed_generate::{Dialect, Insert, InsertOptions, Offline, RelationshipPolicy};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let mut schema_path: Option<PathBuf> = None;
    let mut table: Option<String> = None;
    let mut rows: u64 = 10;
    let mut bulk_size: u64 = 1000;
    let mut seed: u64 = 0;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--schema" => schema_path = args.next().map(PathBuf::from),
            "--table" => table = args.next(),
            "--rows" => rows = args.next().ok_or("missing --rows value")?.parse()?,
            "--bulk-size" => bulk_size = args.next().ok_or("missing --bulk-size value")?.parse()?,
            "--seed" => seed = args.next().ok_or("missing --seed value")?.parse()?,
            _ => return Err(format!("unexpected argument {arg}").into()),
        }
    }

    let schema_path = schema_path.ok_or("missing --schema path")?;
    let table = table.ok_or("missing --table name")?;
    let schema_json = std::fs::read_to_string(&schema_path)?;
    let schema: DatabaseSchema = serde_json::from_str(&schema_json)?;

    let dialect = Dialect::from_engine(&schema.engine)
        .ok_or_else(|| format!("unsupported engine {}", schema.engine))?;
    let connection = Offline::new(dialect);
    let policy = RelationshipPolicy::default();
    let options = InsertOptions {
        seed,
        ..InsertOptions::default()
    };

    let table = schema.table(&table)?;
    let mut insert = Insert::new(table, &connection, &policy, &options)?;
    let written = insert.dry_run(rows, bulk_size).await?;

    eprintln!("rows={written}");
    Ok(())
}
