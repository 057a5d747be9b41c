#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use rowseed_core::{DatabaseSchema, Table};
use rowseed_generate::{Connection, Dialect, GenerationError, TextRow};

pub fn load_schema() -> DatabaseSchema {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/shop.schema.json");
    let contents =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing json at {}", path.display()));
    serde_json::from_str(&contents).expect("parse schema")
}

pub fn table(schema: &DatabaseSchema, name: &str) -> Table {
    schema.table(name).expect("fixture table").clone()
}

/// In-memory connection that records statements and serves parent rows.
pub struct FakeConnection {
    dialect: Dialect,
    parents: HashMap<String, Vec<TextRow>>,
    statements: Mutex<Vec<String>>,
    queries: Mutex<Vec<String>>,
    fail_on: Option<usize>,
    empty_sample: bool,
}

impl FakeConnection {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            parents: HashMap::new(),
            statements: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            fail_on: None,
            empty_sample: false,
        }
    }

    /// Serve `rows` for queries against `schema.table`, in this order.
    pub fn with_parent(mut self, schema: &str, table: &str, rows: Vec<Vec<&str>>) -> Self {
        let key = format!(
            "{}.{}",
            self.dialect.escape_identifier(schema),
            self.dialect.escape_identifier(table)
        );
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|value| Some(value.to_string())).collect())
            .collect();
        self.parents.insert(key, rows);
        self
    }

    /// Fail the `n`-th executed statement, counting from 1.
    pub fn failing_on(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }

    /// Make the probabilistic sample query come back empty.
    pub fn with_empty_sample(mut self) -> Self {
        self.empty_sample = true;
        self
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().expect("lock").clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("lock").clone()
    }

    fn parent_rows(&self, query: &str) -> Vec<TextRow> {
        let source = query
            .split(" FROM ")
            .nth(1)
            .and_then(|rest| rest.split(' ').next())
            .unwrap_or_default();
        self.parents.get(source).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Connection for FakeConnection {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn execute(&self, statement: &str) -> Result<u64, GenerationError> {
        let mut statements = self.statements.lock().expect("lock");
        statements.push(statement.to_string());
        if self.fail_on == Some(statements.len()) {
            return Err(GenerationError::Database(sqlx::Error::Protocol(
                "injected failure".to_string(),
            )));
        }
        Ok(parse_tuples(statement).len() as u64)
    }

    async fn fetch_text_rows(&self, query: &str) -> Result<Vec<TextRow>, GenerationError> {
        self.queries.lock().expect("lock").push(query.to_string());

        let rows = self.parent_rows(query);
        let limit = number_after(query, " LIMIT ").unwrap_or(rows.len());

        if query.contains(" OFFSET ") {
            let offset = number_after(query, " OFFSET ").unwrap_or(0);
            return Ok(rows.into_iter().skip(offset).take(limit).collect());
        }

        let sampled = query.contains("RAND() <") || query.contains("TABLESAMPLE");
        if sampled && self.empty_sample {
            return Ok(Vec::new());
        }
        Ok(rows.into_iter().take(limit).collect())
    }
}

fn number_after(query: &str, marker: &str) -> Option<usize> {
    query
        .split(marker)
        .nth(1)?
        .split(' ')
        .next()?
        .parse()
        .ok()
}

/// Split the VALUES section of an INSERT into rows of raw literal tokens.
pub fn parse_tuples(statement: &str) -> Vec<Vec<String>> {
    let Some((_, values)) = statement.split_once(" VALUES ") else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut token = String::new();
    let mut depth = 0;
    let mut in_quote = false;
    let mut chars = values.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quote {
            token.push(ch);
            match ch {
                '\\' => {
                    if let Some(next) = chars.next() {
                        token.push(next);
                    }
                }
                '\'' if chars.peek() == Some(&'\'') => {
                    token.push('\'');
                    chars.next();
                }
                '\'' => in_quote = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '\'' => {
                in_quote = true;
                token.push(ch);
            }
            '(' => {
                depth += 1;
                if depth > 1 {
                    token.push(ch);
                }
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    if !token.is_empty() || !row.is_empty() {
                        row.push(std::mem::take(&mut token));
                    }
                    rows.push(std::mem::take(&mut row));
                } else {
                    token.push(ch);
                }
            }
            ',' if depth == 1 => row.push(std::mem::take(&mut token)),
            _ if depth == 0 => {}
            _ => token.push(ch),
        }
    }

    rows
}

/// Strip the quotes and doubled quotes from a text literal.
pub fn unquote(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    Some(inner.replace("''", "'"))
}

/// Cloneable in-memory sink for dry-run output.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.bytes.lock().expect("lock").clone()).expect("utf8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self
            .bytes
            .lock()
            .map_err(|_| io::Error::other("failed to lock buffer"))?;
        bytes.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that rejects every write.
pub struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
