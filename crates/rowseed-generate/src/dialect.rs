use serde::{Deserialize, Serialize};

/// Share of the parent table kept by server-side random sampling.
pub const SAMPLE_FRACTION: f64 = 0.1;

/// SQL flavour used to render statements and sampling queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    MySql,
    Postgres,
}

impl Dialect {
    /// Pick a dialect from a connection string scheme.
    pub fn from_connection_string(conn: &str) -> Option<Self> {
        if conn.starts_with("mysql://") {
            Some(Dialect::MySql)
        } else if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
            Some(Dialect::Postgres)
        } else {
            None
        }
    }

    /// Pick a dialect from the `engine` field of a schema document.
    pub fn from_engine(engine: &str) -> Option<Self> {
        match engine.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Dialect::MySql),
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            _ => None,
        }
    }

    pub fn escape_identifier(self, ident: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", ident.replace('`', "``")),
            Dialect::Postgres => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    /// Comma-joined list of escaped identifiers.
    pub fn escaped_names<'a>(self, names: impl IntoIterator<Item = &'a str>) -> String {
        names
            .into_iter()
            .map(|name| self.escape_identifier(name))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn qualified(self, schema: &str, table: &str) -> String {
        format!(
            "{}.{}",
            self.escape_identifier(schema),
            self.escape_identifier(table)
        )
    }

    /// `INSERT INTO schema.table (columns) VALUES ` with the rows still to follow.
    pub fn insert_header(
        self,
        schema: &str,
        table: &str,
        escaped_columns: &str,
        ignore_duplicates: bool,
    ) -> String {
        let verb = match (self, ignore_duplicates) {
            (Dialect::MySql, true) => "INSERT IGNORE INTO",
            _ => "INSERT INTO",
        };
        format!(
            "{verb} {} ({escaped_columns}) VALUES ",
            self.qualified(schema, table)
        )
    }

    /// Text appended after the last row of an INSERT.
    pub fn insert_trailer(self, ignore_duplicates: bool) -> &'static str {
        match (self, ignore_duplicates) {
            (Dialect::Postgres, true) => " ON CONFLICT DO NOTHING",
            _ => "",
        }
    }

    pub fn quote_text(self, text: &str) -> String {
        let escaped = match self {
            Dialect::MySql => text.replace('\\', "\\\\").replace('\'', "''"),
            Dialect::Postgres => text.replace('\'', "''"),
        };
        format!("'{escaped}'")
    }

    pub fn bytes_literal(self, bytes: &[u8]) -> String {
        match self {
            Dialect::MySql => format!("X'{}'", hex::encode_upper(bytes)),
            Dialect::Postgres => format!("'\\x{}'", hex::encode(bytes)),
        }
    }

    pub fn bool_literal(self, value: bool) -> &'static str {
        match (self, value) {
            (Dialect::MySql, true) => "1",
            (Dialect::MySql, false) => "0",
            (Dialect::Postgres, true) => "TRUE",
            (Dialect::Postgres, false) => "FALSE",
        }
    }

    fn text_projection(self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|column| match self {
                Dialect::MySql => format!("CAST({} AS CHAR)", self.escape_identifier(column)),
                Dialect::Postgres => format!("{}::text", self.escape_identifier(column)),
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Probabilistic sample of the parent table; avoids a full scan.
    pub fn random_sample_query(
        self,
        schema: &str,
        table: &str,
        columns: &[String],
        limit: usize,
    ) -> String {
        let projection = self.text_projection(columns);
        let source = self.qualified(schema, table);
        match self {
            Dialect::MySql => format!(
                "SELECT {projection} FROM {source} WHERE RAND() < {SAMPLE_FRACTION} LIMIT {limit}"
            ),
            Dialect::Postgres => format!(
                "SELECT {projection} FROM {source} TABLESAMPLE BERNOULLI ({}) LIMIT {limit}",
                SAMPLE_FRACTION * 100.0
            ),
        }
    }

    /// Random ordering over the whole parent table, used when sampling finds nothing.
    pub fn random_order_query(
        self,
        schema: &str,
        table: &str,
        columns: &[String],
        limit: usize,
    ) -> String {
        let random = match self {
            Dialect::MySql => "RAND()",
            Dialect::Postgres => "random()",
        };
        format!(
            "SELECT {} FROM {} ORDER BY {random} LIMIT {limit}",
            self.text_projection(columns),
            self.qualified(schema, table)
        )
    }

    /// Parent rows in a stable order, starting at `offset`.
    pub fn ordered_query(
        self,
        schema: &str,
        table: &str,
        columns: &[String],
        limit: usize,
        offset: u64,
    ) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY {} LIMIT {limit} OFFSET {offset}",
            self.text_projection(columns),
            self.qualified(schema, table),
            self.escaped_names(columns.iter().map(String::as_str))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<String> {
        vec!["id".to_string(), "region".to_string()]
    }

    #[test]
    fn detects_dialect_from_connection_string() {
        assert_eq!(
            Dialect::from_connection_string("mysql://root@localhost/db"),
            Some(Dialect::MySql)
        );
        assert_eq!(
            Dialect::from_connection_string("postgresql://localhost/db"),
            Some(Dialect::Postgres)
        );
        assert_eq!(Dialect::from_connection_string("sqlite://db"), None);
    }

    #[test]
    fn escapes_identifiers() {
        assert_eq!(Dialect::MySql.escape_identifier("we`ird"), "`we``ird`");
        assert_eq!(Dialect::Postgres.escape_identifier("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(Dialect::MySql.escaped_names(["a", "b"]), "`a`,`b`");
    }

    #[test]
    fn renders_insert_header_and_trailer() {
        let header = Dialect::MySql.insert_header("shop", "orders", "`a`,`b`", false);
        assert_eq!(header, "INSERT INTO `shop`.`orders` (`a`,`b`) VALUES ");

        let header = Dialect::MySql.insert_header("shop", "orders", "`a`", true);
        assert!(header.starts_with("INSERT IGNORE INTO"));
        assert_eq!(Dialect::MySql.insert_trailer(true), "");

        let header = Dialect::Postgres.insert_header("public", "orders", "\"a\"", true);
        assert!(header.starts_with("INSERT INTO \"public\".\"orders\""));
        assert_eq!(
            Dialect::Postgres.insert_trailer(true),
            " ON CONFLICT DO NOTHING"
        );
    }

    #[test]
    fn quotes_literals() {
        assert_eq!(Dialect::MySql.quote_text("it's \\ok"), "'it''s \\\\ok'");
        assert_eq!(Dialect::Postgres.quote_text("it's \\ok"), "'it''s \\ok'");
        assert_eq!(Dialect::MySql.bytes_literal(&[0xab, 0x01]), "X'AB01'");
        assert_eq!(Dialect::Postgres.bytes_literal(&[0xab, 0x01]), "'\\xab01'");
    }

    #[test]
    fn renders_sampling_queries() {
        let mysql = Dialect::MySql.random_sample_query("shop", "stores", &columns(), 5);
        assert_eq!(
            mysql,
            "SELECT CAST(`id` AS CHAR),CAST(`region` AS CHAR) FROM `shop`.`stores` WHERE RAND() < 0.1 LIMIT 5"
        );

        let pg = Dialect::Postgres.random_sample_query("public", "stores", &columns(), 5);
        assert_eq!(
            pg,
            "SELECT \"id\"::text,\"region\"::text FROM \"public\".\"stores\" TABLESAMPLE BERNOULLI (10) LIMIT 5"
        );

        let ordered = Dialect::MySql.ordered_query("shop", "stores", &columns(), 3, 6);
        assert!(ordered.ends_with("ORDER BY `id`,`region` LIMIT 3 OFFSET 6"));

        let fallback = Dialect::Postgres.random_order_query("public", "stores", &columns(), 2);
        assert!(fallback.ends_with("ORDER BY random() LIMIT 2"));
    }
}
