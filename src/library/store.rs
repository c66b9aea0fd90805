//! Opaque row store
//!
//! The library persists through a backend-as-a-service whose only contract
//! is insert/select/delete over JSON rows. No schema is enforced here; the
//! library shapes rows and the store moves them.

use crate::{Result, VoiceLensError};
use log::debug;
use serde_json::Value;
use std::collections::HashMap;

/// Single equality predicate, e.g. `user_id = "..."`
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: String,
    pub equals: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, equals: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            equals: equals.into(),
        }
    }

    /// Whether a row satisfies the predicate
    pub fn matches(&self, row: &Value) -> bool {
        row.get(&self.column) == Some(&self.equals)
    }
}

/// Query parameters for a select
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub filter: Option<Filter>,

    /// Column to order by (compared as JSON strings/numbers)
    pub order_by: Option<String>,

    /// Descending order when true
    pub descending: bool,

    pub limit: Option<usize>,
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filtered(filter: Filter) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    pub fn order_by(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order_by = Some(column.into());
        self.descending = descending;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Row store trait
///
/// Implementations report failure per operation; callers never roll back
/// in-memory state speculatively.
pub trait RowStore {
    fn insert(&mut self, table: &str, row: Value) -> Result<()>;

    fn select(&self, table: &str, selection: &Selection) -> Result<Vec<Value>>;

    /// Delete all rows matching the filter
    fn delete(&mut self, table: &str, filter: &Filter) -> Result<()>;
}

/// In-process row store
///
/// Used by tests and by the CLI when no remote backend is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RowStore for MemoryStore {
    fn insert(&mut self, table: &str, row: Value) -> Result<()> {
        if !row.is_object() {
            return Err(VoiceLensError::Persistence(format!(
                "Row for table '{}' is not a JSON object",
                table
            )));
        }
        debug!("Inserting row into '{}'", table);
        self.tables.entry(table.to_string()).or_default().push(row);
        Ok(())
    }

    fn select(&self, table: &str, selection: &Selection) -> Result<Vec<Value>> {
        let rows = self.tables.get(table).cloned().unwrap_or_default();

        let mut rows: Vec<Value> = match &selection.filter {
            Some(filter) => rows.into_iter().filter(|r| filter.matches(r)).collect(),
            None => rows,
        };

        if let Some(column) = &selection.order_by {
            rows.sort_by(|a, b| {
                let av = a.get(column).map(value_sort_key).unwrap_or_default();
                let bv = b.get(column).map(value_sort_key).unwrap_or_default();
                if selection.descending {
                    bv.cmp(&av)
                } else {
                    av.cmp(&bv)
                }
            });
        }

        if let Some(limit) = selection.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    fn delete(&mut self, table: &str, filter: &Filter) -> Result<()> {
        if let Some(rows) = self.tables.get_mut(table) {
            let before = rows.len();
            rows.retain(|r| !filter.matches(r));
            debug!("Deleted {} rows from '{}'", before - rows.len(), table);
        }
        Ok(())
    }
}

/// Comparable key for ordering JSON values
///
/// RFC 3339 timestamps and plain strings compare lexicographically, which is
/// all the library's order-by columns need.
fn value_sort_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
