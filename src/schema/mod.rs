//! Schema pass: rewrites CREATE TABLE blocks and inline keys.
//!
//! The translator walks the dump line by line. Lines inside a
//! `CREATE TABLE ... (` / `);` block are buffered; when the block closes the
//! table definition is emitted and the column type categories are recorded.
//! Inline `PRIMARY KEY`, `UNIQUE KEY` and `KEY` clauses become standalone
//! `CREATE [UNIQUE] INDEX` statements placed right after their table.

mod registry;

pub use registry::{ColumnKind, TypeRegistry};

use crate::dialect::DialectRules;
use crate::error::{DumpError, Result};
use crate::input::{open_dump, LineReader};
use crate::writer::TableWriter;
use ahash::AHashSet;
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;

const CREATE_TABLE: &str = "CREATE TABLE";
const BLOCK_END: &str = ");";
const KEY_MARKER: &str = "KEY";

/// Counters for one schema pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchemaStats {
    pub tables: u64,
    pub indexes: u64,
}

/// Kind of index generated from a key clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexKind {
    Unique,
    Plain,
}

impl IndexKind {
    fn from_clause(first_token: &str) -> Option<Self> {
        match first_token {
            "PRIMARY" | "UNIQUE" => Some(IndexKind::Unique),
            "KEY" => Some(IndexKind::Plain),
            _ => None,
        }
    }
}

/// A buffered line of the current block with its source line number.
type Pending = (usize, String);

pub struct SchemaTranslator {
    rules: DialectRules,
    output: Vec<String>,
    registry: TypeRegistry,
    stats: SchemaStats,
}

impl Default for SchemaTranslator {
    fn default() -> Self {
        Self::new(DialectRules::default())
    }
}

impl SchemaTranslator {
    pub fn new(rules: DialectRules) -> Self {
        Self {
            rules,
            output: Vec::new(),
            registry: TypeRegistry::default(),
            stats: SchemaStats::default(),
        }
    }

    /// Translate the schema of a dump file.
    pub fn parse(&mut self, path: &Path) -> Result<()> {
        let reader = open_dump(path, None)?;
        self.parse_reader(reader)
    }

    /// Translate the schema read from `reader`, replacing any previous state.
    pub fn parse_reader<R: Read>(&mut self, reader: R) -> Result<()> {
        self.output.clear();
        self.registry.clear();
        self.stats = SchemaStats::default();

        let mut lines = LineReader::new(reader);
        let mut table: Option<String> = None;
        let mut in_create = false;
        let mut rows: Vec<Pending> = Vec::new();
        let mut keys: Vec<Pending> = Vec::new();

        while let Some((line_no, raw)) = lines.next_line()? {
            if self.rules.is_dropped(&raw) {
                continue;
            }

            let cleaned = self.rules.cleanup(&raw);
            let line = self.rules.translate_line(&cleaned);

            let opens_block = line.starts_with(CREATE_TABLE);
            if opens_block {
                table = Some(table_name(&line, line_no)?);
                in_create = true;
            } else if in_create && line.starts_with(BLOCK_END) {
                if let Some(name) = table.as_deref() {
                    self.create_table(name, &rows, line_no)?;
                }
                rows.clear();
                in_create = false;
            }

            if in_create {
                if !opens_block && line.contains(KEY_MARKER) {
                    keys.push((line_no, strip_trailing_comma(line.trim()).to_string()));
                } else {
                    rows.push((line_no, strip_trailing_comma(&line).to_string()));
                }
            } else {
                self.output.push(line);
                if !keys.is_empty() {
                    if let Some(name) = table.as_deref() {
                        self.create_keys(name, &keys)?;
                    }
                    keys.clear();
                }
            }
        }

        if in_create {
            let line = rows.first().map(|(n, _)| *n).unwrap_or_default();
            return Err(DumpError::malformed(
                line,
                format!(
                    "CREATE TABLE {} is never closed",
                    table.as_deref().unwrap_or_default()
                ),
            ));
        }

        Ok(())
    }

    /// Emit DROP + CREATE for a closed block and record its column types.
    fn create_table(&mut self, name: &str, rows: &[Pending], close_line: usize) -> Result<()> {
        let ((_, header), columns) = rows.split_first().ok_or_else(|| {
            DumpError::malformed(close_line, format!("empty CREATE TABLE {}", name))
        })?;

        let categories = columns
            .iter()
            .map(|(line_no, row)| {
                row.to_lowercase()
                    .split_whitespace()
                    .nth(1)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        DumpError::malformed(
                            *line_no,
                            format!("column definition without a type in {}: {}", name, row.trim()),
                        )
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        self.output.push(format!("DROP TABLE IF EXISTS {};", name));
        self.output.push(header.clone());
        self.output.push(
            columns
                .iter()
                .map(|(_, row)| row.as_str())
                .collect::<Vec<_>>()
                .join(",\n"),
        );
        self.registry.record(name, categories);
        self.stats.tables += 1;

        Ok(())
    }

    /// Emit index statements for the buffered key clauses of `name`.
    ///
    /// Index names are deduplicated within one table's clauses only; a table
    /// defined again later gets its indexes recreated after its DROP.
    fn create_keys(&mut self, name: &str, keys: &[Pending]) -> Result<()> {
        let mut emitted = AHashSet::with_capacity(keys.len());
        for (line_no, key) in keys {
            let tokens: Vec<&str> = key.split_whitespace().collect();
            let (Some(first), Some(columns)) = (tokens.first(), tokens.last()) else {
                continue;
            };
            let Some(kind) = IndexKind::from_clause(first) else {
                continue;
            };

            let inner = columns
                .strip_prefix('(')
                .and_then(|c| c.strip_suffix(')'))
                .ok_or_else(|| {
                    DumpError::malformed(
                        *line_no,
                        format!("key clause without a column list: {}", key),
                    )
                })?;
            let index_name = format!("{}_{}_idx", name, inner.replace(',', "_"));

            if !emitted.insert(index_name.clone()) {
                continue;
            }

            let stmt = match kind {
                IndexKind::Unique => {
                    format!("CREATE UNIQUE INDEX {} ON {} {};", index_name, name, columns)
                }
                IndexKind::Plain => format!("CREATE INDEX {} ON {} {};", index_name, name, columns),
            };
            self.output.push(stmt);
            self.stats.indexes += 1;
        }

        Ok(())
    }

    /// Translated schema statements, in emission order.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn type_registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Hand the recorded column types over to the data pass.
    ///
    /// The translator's registry is left empty until the next `parse`.
    pub fn seal(&mut self) -> TypeRegistry {
        std::mem::take(&mut self.registry)
    }

    pub fn stats(&self) -> SchemaStats {
        self.stats
    }

    /// Write the schema to `path`, replacing its contents.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut writer = TableWriter::create(path)?;
        for line in &self.output {
            writer.write_statement(line)?;
        }
        writer.close()?;
        Ok(())
    }

    /// Write the schema to an arbitrary sink, one entry per line.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        for line in &self.output {
            out.write_all(line.as_bytes())?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Table name of a `CREATE TABLE [IF NOT EXISTS] <name> (` line.
fn table_name(line: &str, line_no: usize) -> Result<String> {
    let mut tokens = line.split_whitespace().skip(2).peekable();
    if tokens.peek() == Some(&"IF") {
        tokens.nth(2);
    }

    tokens
        .next()
        .and_then(|t| t.split('(').next())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| DumpError::malformed(line_no, format!("missing table name: {}", line)))
}

fn strip_trailing_comma(line: &str) -> &str {
    line.strip_suffix(',').unwrap_or(line)
}
