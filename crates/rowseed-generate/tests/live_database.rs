use std::env;

use anyhow::{Context, Result, anyhow};
use rowseed_core::{Column, ColumnType, ForeignKey, Table};
use rowseed_generate::{
    Connection, Dialect, Insert, InsertOptions, RelationshipPolicy, connect,
};

fn database_url() -> Result<String> {
    env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .context("set TEST_DATABASE_URL or DATABASE_URL for integration tests")
}

fn fixture_sql(dialect: Dialect) -> &'static [&'static str] {
    match dialect {
        Dialect::MySql => &[
            "DROP TABLE IF EXISTS rowseed_orders",
            "DROP TABLE IF EXISTS rowseed_customers",
            "CREATE TABLE rowseed_customers (id INT AUTO_INCREMENT PRIMARY KEY, name VARCHAR(16) NOT NULL, score SMALLINT NULL)",
            "CREATE TABLE rowseed_orders (id INT AUTO_INCREMENT PRIMARY KEY, customer_id INT NOT NULL, placed_at DATETIME NULL, FOREIGN KEY (customer_id) REFERENCES rowseed_customers (id))",
        ],
        Dialect::Postgres => &[
            "DROP TABLE IF EXISTS rowseed_orders",
            "DROP TABLE IF EXISTS rowseed_customers",
            "CREATE TABLE rowseed_customers (id SERIAL PRIMARY KEY, name VARCHAR(16) NOT NULL, score SMALLINT NULL)",
            "CREATE TABLE rowseed_orders (id SERIAL PRIMARY KEY, customer_id INT NOT NULL REFERENCES rowseed_customers (id), placed_at TIMESTAMP NULL)",
        ],
    }
}

async fn current_schema(connection: &dyn Connection) -> Result<String> {
    let query = match connection.dialect() {
        Dialect::MySql => "SELECT DATABASE()",
        Dialect::Postgres => "SELECT current_schema()",
    };
    let rows = connection.fetch_text_rows(query).await?;
    rows.into_iter()
        .next()
        .and_then(|row| row.into_iter().next().flatten())
        .ok_or_else(|| anyhow!("no current schema"))
}

async fn count_rows(connection: &dyn Connection, table: &str) -> Result<u64> {
    let query = match connection.dialect() {
        Dialect::MySql => format!("SELECT CAST(COUNT(*) AS CHAR) FROM {table}"),
        Dialect::Postgres => format!("SELECT COUNT(*)::text FROM {table}"),
    };
    let rows = connection.fetch_text_rows(&query).await?;
    let count = rows
        .into_iter()
        .next()
        .and_then(|row| row.into_iter().next().flatten())
        .ok_or_else(|| anyhow!("empty count"))?;
    Ok(count.parse()?)
}

fn tables(schema: &str) -> (Table, Table) {
    let mut id = Column::new("id", ColumnType::new("int"), false);
    id.is_auto_increment = true;
    let mut name = ColumnType::new("varchar");
    name.character_max_length = Some(16);

    let customers = Table {
        schema: schema.to_string(),
        name: "rowseed_customers".to_string(),
        columns: vec![
            id.clone(),
            Column::new("name", name, false),
            Column::new("score", ColumnType::new("smallint"), true),
        ],
        foreign_keys: Vec::new(),
    };

    let orders = Table {
        schema: schema.to_string(),
        name: "rowseed_orders".to_string(),
        columns: vec![
            id,
            Column::new("customer_id", ColumnType::new("int"), false),
            Column::new("placed_at", ColumnType::new("datetime"), true),
        ],
        foreign_keys: vec![ForeignKey {
            name: None,
            columns: vec!["customer_id".to_string()],
            referenced_schema: schema.to_string(),
            referenced_table: "rowseed_customers".to_string(),
            referenced_columns: vec!["id".to_string()],
        }],
    };

    (customers, orders)
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn inserts_parents_then_children() -> Result<()> {
    let url = database_url()?;
    let connection = connect(&url, 5).await.context("connecting to database")?;

    for statement in fixture_sql(connection.dialect()) {
        connection
            .execute(statement)
            .await
            .with_context(|| format!("executing fixture {statement}"))?;
    }

    let schema = current_schema(connection.as_ref()).await?;
    let (customers, orders) = tables(&schema);
    let options = InsertOptions::default();

    let policy = RelationshipPolicy::default();
    let mut insert = Insert::new(&customers, connection.as_ref(), &policy, &options)?;
    assert_eq!(insert.run(25, 10).await?, 25);

    let mut insert = Insert::new(&orders, connection.as_ref(), &policy, &options)?;
    assert_eq!(insert.run(60, 16).await?, 60);

    let policy = RelationshipPolicy::default().with_one_to_one("rowseed_orders", "rowseed_customers");
    let mut insert = Insert::new(&orders, connection.as_ref(), &policy, &options)?;
    assert_eq!(insert.run(25, 7).await?, 25);

    assert_eq!(count_rows(connection.as_ref(), "rowseed_customers").await?, 25);
    assert_eq!(count_rows(connection.as_ref(), "rowseed_orders").await?, 85);

    Ok(())
}
