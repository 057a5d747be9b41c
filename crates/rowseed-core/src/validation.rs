use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::schema::{DatabaseSchema, Table};

/// Validate internal consistency of every table in a schema snapshot.
pub fn validate_schema(schema: &DatabaseSchema) -> Result<()> {
    let mut seen = BTreeSet::new();
    for table in &schema.tables {
        if !seen.insert(table.qualified_name()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate table name: {}",
                table.qualified_name()
            )));
        }
        validate_table(table)?;
    }
    Ok(())
}

/// Validate a single table.
///
/// This checks:
/// - duplicate column names
/// - foreign key columns exist and are insertable
/// - local and referenced column lists have the same arity
/// - no column belongs to two foreign keys
pub fn validate_table(table: &Table) -> Result<()> {
    let mut columns = BTreeSet::new();
    for column in &table.columns {
        if !columns.insert(column.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate column name: {}.{}",
                table.qualified_name(),
                column.name
            )));
        }
    }

    let mut owners: BTreeMap<&str, usize> = BTreeMap::new();
    for (index, fk) in table.foreign_keys.iter().enumerate() {
        if fk.columns.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "foreign key without columns on {}: {}",
                table.qualified_name(),
                fk.describe()
            )));
        }

        if fk.columns.len() != fk.referenced_columns.len() {
            return Err(Error::InvalidSchema(format!(
                "foreign key column count mismatch on {}: {}",
                table.qualified_name(),
                fk.describe()
            )));
        }

        for name in &fk.columns {
            let column = table.column(name).ok_or_else(|| {
                Error::InvalidSchema(format!(
                    "foreign key column not found: {}.{}",
                    table.qualified_name(),
                    name
                ))
            })?;

            if !column.is_insertable() {
                return Err(Error::InvalidSchema(format!(
                    "foreign key column is filled by the database: {}.{}",
                    table.qualified_name(),
                    name
                )));
            }

            if let Some(previous) = owners.insert(name.as_str(), index) {
                if previous != index {
                    return Err(Error::InvalidSchema(format!(
                        "column {}.{} belongs to more than one foreign key",
                        table.qualified_name(),
                        name
                    )));
                }
                return Err(Error::InvalidSchema(format!(
                    "column {}.{} is listed twice in {}",
                    table.qualified_name(),
                    name,
                    fk.describe()
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ForeignKey;
    use crate::schema::Column;
    use crate::types::ColumnType;

    fn fk(columns: &[&str], referenced: &[&str]) -> ForeignKey {
        ForeignKey {
            name: None,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            referenced_schema: "app".to_string(),
            referenced_table: "parents".to_string(),
            referenced_columns: referenced.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn table(foreign_keys: Vec<ForeignKey>) -> Table {
        Table {
            schema: "app".to_string(),
            name: "children".to_string(),
            columns: vec![
                Column::new("a", ColumnType::new("int"), false),
                Column::new("b", ColumnType::new("int"), false),
            ],
            foreign_keys,
        }
    }

    #[test]
    fn accepts_disjoint_foreign_keys() {
        let table = table(vec![fk(&["a"], &["id"]), fk(&["b"], &["id"])]);
        assert!(validate_table(&table).is_ok());
    }

    #[test]
    fn rejects_overlapping_foreign_keys() {
        let table = table(vec![fk(&["a"], &["id"]), fk(&["a", "b"], &["id", "x"])]);
        let err = validate_table(&table).unwrap_err();
        assert!(err.to_string().contains("more than one foreign key"));
    }

    #[test]
    fn rejects_arity_mismatch() {
        let table = table(vec![fk(&["a", "b"], &["id"])]);
        let err = validate_table(&table).unwrap_err();
        assert!(err.to_string().contains("column count mismatch"));
    }

    #[test]
    fn rejects_unknown_foreign_key_column() {
        let table = table(vec![fk(&["missing"], &["id"])]);
        assert!(matches!(
            validate_table(&table),
            Err(Error::InvalidSchema(_))
        ));
    }

    #[test]
    fn rejects_duplicate_tables() {
        let schema = DatabaseSchema {
            schema_version: "0.1".to_string(),
            engine: "mysql".to_string(),
            database: None,
            tables: vec![table(Vec::new()), table(Vec::new())],
        };
        let err = validate_schema(&schema).unwrap_err();
        assert!(err.to_string().contains("duplicate table name"));
    }
}
