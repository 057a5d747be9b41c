use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Foreign key definition preserving column ordering.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKey {
    #[serde(default)]
    pub name: Option<String>,
    /// Referencing columns on the owning table.
    pub columns: Vec<String>,
    pub referenced_schema: String,
    pub referenced_table: String,
    /// Referenced columns, positionally matched with `columns`.
    pub referenced_columns: Vec<String>,
}

impl ForeignKey {
    /// Human-readable identity used in logs and error context.
    pub fn describe(&self) -> String {
        let target = format!(
            "{}.{}({})",
            self.referenced_schema,
            self.referenced_table,
            self.referenced_columns.join(",")
        );
        match &self.name {
            Some(name) => format!("{name} ({}) -> {target}", self.columns.join(",")),
            None => format!("({}) -> {target}", self.columns.join(",")),
        }
    }
}
