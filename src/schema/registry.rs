//! Per-table column type categories recorded by the schema pass.

use ahash::AHashMap;

/// How a column's values are re-encoded by the data pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// `boolean` columns: `0` → `false`, anything else → `true`
    Boolean,
    /// `text` columns: escaped string literal
    Text,
    /// Everything else passes through
    Other,
}

impl ColumnKind {
    /// Classify a lower-cased type category.
    pub fn from_category(category: &str) -> Self {
        match category {
            "boolean" => ColumnKind::Boolean,
            "text" => ColumnKind::Text,
            _ => ColumnKind::Other,
        }
    }
}

/// Column type categories per table, in declaration order.
///
/// Only the schema pass records entries; once handed to the data pass via
/// [`SchemaTranslator::seal`](super::SchemaTranslator::seal) it is read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRegistry {
    tables: AHashMap<String, Vec<String>>,
}

impl TypeRegistry {
    pub(crate) fn record(&mut self, table: &str, categories: Vec<String>) {
        self.tables.insert(table.to_string(), categories);
    }

    pub(crate) fn clear(&mut self) {
        self.tables.clear();
    }

    /// Categories recorded for a table.
    pub fn get(&self, table: &str) -> Option<&[String]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    /// Category of the column at `index`, if the table has that many columns.
    pub fn column_type(&self, table: &str, index: usize) -> Option<&str> {
        self.get(table)
            .and_then(|columns| columns.get(index))
            .map(String::as_str)
    }

    /// Re-encoding kinds for a table, in column order.
    pub fn kinds(&self, table: &str) -> Option<Vec<ColumnKind>> {
        self.get(table)
            .map(|columns| columns.iter().map(|c| ColumnKind::from_category(c)).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
