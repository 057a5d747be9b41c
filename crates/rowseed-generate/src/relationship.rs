use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::GenerationError;

/// How a child row picks its parent row for a foreign key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// Child row `i` maps to parent row `i` in referenced-column order.
    #[serde(rename = "1-1")]
    OneToOne,
    /// Each child row draws an independent random parent row.
    #[default]
    #[serde(rename = "random-1-n", alias = "db-random-1-n")]
    RandomOneToMany,
}

impl RelationshipKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipKind::OneToOne => "1-1",
            RelationshipKind::RandomOneToMany => "random-1-n",
        }
    }

    /// Parse a configured kind, falling back to random 1-N for anything unknown.
    pub fn parse_lossy(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            warn!(
                relationship = %raw,
                fallback = RelationshipKind::RandomOneToMany.as_str(),
                "unknown relationship kind"
            );
            RelationshipKind::RandomOneToMany
        })
    }
}

impl FromStr for RelationshipKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1-1" => Ok(RelationshipKind::OneToOne),
            "random-1-n" | "db-random-1-n" | "1-n" => Ok(RelationshipKind::RandomOneToMany),
            other => Err(format!(
                "unknown relationship '{other}', expected 'random-1-n' or '1-1'"
            )),
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Referencing table name -> referenced table names.
pub type Links = BTreeMap<String, BTreeSet<String>>;

/// Read-only mapping from (table, referenced table) to a relationship kind.
#[derive(Debug, Clone, Default)]
pub struct RelationshipPolicy {
    pub default_relationship: RelationshipKind,
    pub one_to_one: Links,
    pub random_one_to_many: Links,
}

impl RelationshipPolicy {
    pub fn new(default_relationship: RelationshipKind) -> Self {
        Self {
            default_relationship,
            ..Self::default()
        }
    }

    pub fn with_one_to_one(mut self, table: &str, referenced_table: &str) -> Self {
        self.one_to_one
            .entry(table.to_string())
            .or_default()
            .insert(referenced_table.to_string());
        self
    }

    pub fn with_random_one_to_many(mut self, table: &str, referenced_table: &str) -> Self {
        self.random_one_to_many
            .entry(table.to_string())
            .or_default()
            .insert(referenced_table.to_string());
        self
    }

    /// Explicit 1-1 override, then explicit random 1-N override, then the default.
    pub fn resolve(&self, table: &str, referenced_table: &str) -> RelationshipKind {
        if links_contain(&self.one_to_one, table, referenced_table) {
            return RelationshipKind::OneToOne;
        }
        if links_contain(&self.random_one_to_many, table, referenced_table) {
            return RelationshipKind::RandomOneToMany;
        }
        self.default_relationship
    }
}

fn links_contain(links: &Links, table: &str, referenced_table: &str) -> bool {
    links
        .get(table)
        .is_some_and(|targets| targets.contains(referenced_table))
}

/// Parse `"citizens=ssns;orders=customers"` into links.
pub fn parse_links(raw: &str) -> Result<Links, GenerationError> {
    let mut links = Links::new();
    for item in raw.split(';').map(str::trim).filter(|item| !item.is_empty()) {
        let (table, referenced) = item
            .split_once('=')
            .map(|(table, referenced)| (table.trim(), referenced.trim()))
            .filter(|(table, referenced)| !table.is_empty() && !referenced.is_empty())
            .ok_or_else(|| {
                GenerationError::InvalidArgument(format!(
                    "invalid relationship link '{item}', expected table=referenced_table"
                ))
            })?;
        links
            .entry(table.to_string())
            .or_default()
            .insert(referenced.to_string());
    }
    Ok(links)
}
