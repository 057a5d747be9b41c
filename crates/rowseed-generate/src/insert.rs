use std::io::{self, Write};
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use rowseed_core::{Table, validate_table};

use crate::assembler::RowAssembler;
use crate::connection::Connection;
use crate::errors::{GenerationError, RunError};
use crate::model::InsertOptions;
use crate::planner::plan_chunks;
use crate::relationship::RelationshipPolicy;

/// Batched insert of random rows into one table.
///
/// Rows are produced in chunks of `bulk_size`, one INSERT statement per chunk,
/// executed in order. A failed statement stops the run; earlier statements
/// stay committed and their row count is reported in the [`RunError`].
pub struct Insert<'a> {
    assembler: RowAssembler<'a>,
    connection: &'a dyn Connection,
    writer: Box<dyn Write + Send + 'a>,
    notify: Option<mpsc::Sender<u64>>,
}

impl<'a> Insert<'a> {
    /// Prepare an insert for `table`. Invalid table metadata is rejected here,
    /// before any statement runs.
    pub fn new(
        table: &'a Table,
        connection: &'a dyn Connection,
        policy: &'a RelationshipPolicy,
        options: &InsertOptions,
    ) -> Result<Self, GenerationError> {
        validate_table(table)?;
        if !(0.0..=1.0).contains(&options.null_probability) {
            return Err(GenerationError::InvalidArgument(format!(
                "null probability {} is outside [0, 1]",
                options.null_probability
            )));
        }

        Ok(Self {
            assembler: RowAssembler::new(table, connection, policy, options),
            connection,
            writer: Box::new(io::stdout()),
            notify: None,
        })
    }

    /// Sink for dry-run statements; stdout by default.
    pub fn set_writer(&mut self, writer: impl Write + Send + 'a) {
        self.writer = Box::new(writer);
    }

    /// Request a progress channel carrying the rows produced per statement.
    ///
    /// Any previously requested channel is closed. The channel closes when the
    /// next run finishes, whatever its outcome. Updates are dropped while the
    /// channel is full.
    pub fn notify_channel(&mut self, capacity: usize) -> mpsc::Receiver<u64> {
        if self.notify.take().is_some() {
            debug!("replacing progress channel");
        }
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        self.notify = Some(sender);
        receiver
    }

    /// Insert `total` rows and return the rows the database reports as affected.
    pub async fn run(&mut self, total: u64, bulk_size: u64) -> Result<u64, RunError> {
        self.execute(total, bulk_size, false).await
    }

    /// Write each statement to the sink instead of executing it. Returns the
    /// number of rows rendered.
    pub async fn dry_run(&mut self, total: u64, bulk_size: u64) -> Result<u64, RunError> {
        self.execute(total, bulk_size, true).await
    }

    async fn execute(
        &mut self,
        total: u64,
        bulk_size: u64,
        dry_run: bool,
    ) -> Result<u64, RunError> {
        // dropped on every return path, which closes the channel
        let notify = self.notify.take();

        let plan = plan_chunks(total, bulk_size).map_err(|err| RunError::new(0, err))?;
        let table = self.assembler.table();
        let started = Instant::now();

        info!(
            schema = %table.schema,
            table = %table.name,
            rows = total,
            bulk_size,
            statements = plan.statement_count(),
            dry_run,
            "insert started"
        );

        let mut committed = 0;
        let mut first_row = 0;
        for (statement_index, size) in plan.chunks().enumerate() {
            match self.process_chunk(first_row, size, dry_run).await {
                Ok(rows) => {
                    committed += rows;
                    debug!(
                        table = %table.qualified_name(),
                        statement_index,
                        first_row,
                        rows,
                        "statement completed"
                    );
                    report_progress(notify.as_ref(), rows);
                }
                Err(err) => {
                    error!(
                        table = %table.qualified_name(),
                        statement_index,
                        first_row,
                        rows_committed = committed,
                        error = %err,
                        "statement failed"
                    );
                    return Err(RunError::new(committed, err));
                }
            }
            first_row += size;
        }

        if dry_run {
            self.writer
                .flush()
                .map_err(|err| RunError::new(committed, err.into()))?;
        }

        info!(
            schema = %table.schema,
            table = %table.name,
            rows = committed,
            duration_ms = started.elapsed().as_millis() as u64,
            dry_run,
            "insert completed"
        );
        Ok(committed)
    }

    async fn process_chunk(
        &mut self,
        first_row: u64,
        size: u64,
        dry_run: bool,
    ) -> Result<u64, GenerationError> {
        let count = usize::try_from(size).map_err(|_| {
            GenerationError::InvalidArgument(format!("chunk of {size} rows is too large"))
        })?;

        let Some(statement) = self.assembler.build_chunk(first_row, count).await? else {
            return Ok(0);
        };

        if dry_run {
            writeln!(self.writer, "{statement}")?;
            return Ok(size);
        }

        self.connection.execute(&statement).await
    }
}

fn report_progress(notify: Option<&mpsc::Sender<u64>>, rows: u64) {
    let Some(sender) = notify else {
        return;
    };
    match sender.try_send(rows) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            warn!(rows, "progress channel full, dropping update");
        }
        Err(TrySendError::Closed(_)) => {
            debug!(rows, "progress receiver gone");
        }
    }
}
