use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Declared type metadata for a column, as reported by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnType {
    /// Catalog type name (e.g. `varchar`, `bigint unsigned`, `character varying`).
    pub data_type: String,
    #[serde(default)]
    pub character_max_length: Option<i64>,
    #[serde(default)]
    pub numeric_precision: Option<i64>,
    #[serde(default)]
    pub numeric_scale: Option<i64>,
    /// Literal set for `enum`/`set` columns.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

impl ColumnType {
    pub fn new(data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            character_max_length: None,
            numeric_precision: None,
            numeric_scale: None,
            enum_values: Vec::new(),
        }
    }

    /// Classify the catalog type name into a generator family.
    pub fn kind(&self) -> DataType {
        DataType::parse(&self.data_type)
    }
}

/// Integer widths with distinct generation ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerKind {
    Small,
    Medium,
    Int,
    Big,
}

impl IntegerKind {
    /// Upper bound (inclusive) used when drawing values for this width.
    pub fn max_value(self) -> i64 {
        match self {
            IntegerKind::Small => 0xFF,
            IntegerKind::Medium => 0x7FFFF,
            IntegerKind::Int => 0x7FFF_FFFF,
            IntegerKind::Big => 0x7FFF_FFFF_FFFF_FFFF,
        }
    }
}

/// Closed set of column type families understood by the generators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// `tinyint` and `bit`: integers in `[0, 1]`.
    TinyInt,
    /// `bool`/`boolean`: `[0, 1]` rendered as a boolean literal.
    Boolean,
    Integer(IntegerKind),
    /// `float`, `double`, `decimal`, `numeric`.
    Decimal,
    /// `char`/`varchar`.
    String,
    /// Text and blob families.
    Text,
    /// `binary`/`varbinary`/`bytea`.
    Binary,
    Date,
    DateTime,
    Time,
    Year,
    /// `enum` and `set`.
    Enum,
    Unsupported(String),
}

impl DataType {
    pub fn parse(raw: &str) -> DataType {
        let normalized = normalize_type_name(raw);
        match normalized.as_str() {
            "tinyint" | "bit" => DataType::TinyInt,
            "bool" | "boolean" => DataType::Boolean,
            "smallint" | "int2" => DataType::Integer(IntegerKind::Small),
            "mediumint" => DataType::Integer(IntegerKind::Medium),
            "int" | "integer" | "int4" => DataType::Integer(IntegerKind::Int),
            "bigint" | "int8" => DataType::Integer(IntegerKind::Big),
            "float" | "double" | "decimal" | "numeric" | "real" | "double precision"
            | "float4" | "float8" => DataType::Decimal,
            "char" | "varchar" | "character" | "character varying" | "bpchar" => DataType::String,
            "tinytext" | "text" | "mediumtext" | "longtext" | "tinyblob" | "blob"
            | "mediumblob" | "longblob" => DataType::Text,
            "binary" | "varbinary" | "bytea" => DataType::Binary,
            "date" => DataType::Date,
            "datetime" | "timestamp" | "timestamp without time zone"
            | "timestamp with time zone" | "timestamptz" => DataType::DateTime,
            "time" | "time without time zone" => DataType::Time,
            "year" => DataType::Year,
            "enum" | "set" => DataType::Enum,
            "int1" => DataType::TinyInt,
            "int3" | "middleint" => DataType::Integer(IntegerKind::Medium),
            other if is_integer_spelling(other) => DataType::Integer(IntegerKind::Big),
            _ => DataType::Unsupported(raw.to_string()),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, DataType::Unsupported(_))
    }
}

fn is_integer_spelling(name: &str) -> bool {
    name.ends_with("int") && !matches!(name, "point" | "multipoint")
}

/// Lowercase, drop `(...)` modifiers and `unsigned`/`zerofill` qualifiers.
fn normalize_type_name(raw: &str) -> String {
    let mut stripped = String::with_capacity(raw.len());
    let mut depth = 0_u32;
    for ch in raw.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => stripped.push(ch),
            _ => {}
        }
    }

    stripped
        .to_lowercase()
        .split_whitespace()
        .filter(|word| *word != "unsigned" && *word != "zerofill")
        .collect::<Vec<_>>()
        .join(" ")
}
