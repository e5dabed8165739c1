//! Data pass: re-encodes extended INSERT statements into per-table files.
//!
//! Every `INSERT INTO t VALUES (...),(...);` line is split into tuples,
//! each tuple into values, and the values are re-encoded against the column
//! types recorded by the schema pass. Tuples are re-batched into INSERTs of
//! at most `batch_size` rows and written to `data_for_<t>.sql`.

mod encode;
mod tokenizer;

pub use encode::{reencode_tuple, reencode_value, FALSE_LITERAL, NULL_LITERAL, TRUE_LITERAL};
pub use tokenizer::{split_values, QuoteState, TupleTokenizer};

use crate::error::{DumpError, Result};
use crate::input::{chomp, open_dump, LineReader};
use crate::schema::TypeRegistry;
use crate::writer::{data_file_name, TableWriter};
use ahash::AHashSet;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const DEFAULT_BATCH_SIZE: usize = 100;

const INSERT_PREFIX: &str = "INSERT";
const VALUES_MARKER: &str = " VALUES (";
const INSERT_TERMINATOR: &str = ");";
const TUPLE_SEPARATOR: &str = "),(";

/// Counters accumulated over every data pass of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataStats {
    /// INSERT lines read
    pub insert_lines: u64,
    /// Tuples re-encoded
    pub tuples: u64,
    /// Batched INSERT statements written
    pub statements: u64,
    /// Tuples per table
    pub tables: BTreeMap<String, u64>,
}

/// The per-table output currently open.
enum TableStream {
    Idle,
    Open {
        table: String,
        writer: Option<TableWriter>,
    },
}

impl TableStream {
    fn is_open_for(&self, name: &str) -> bool {
        matches!(self, TableStream::Open { table, .. } if table == name)
    }
}

pub struct DataReencoder {
    output_dir: PathBuf,
    batch_size: usize,
    quiet: bool,
    dry_run: bool,
    stream: TableStream,
    /// Tables whose data file was already created during this run
    started: AHashSet<String>,
    stats: DataStats,
}

impl DataReencoder {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            batch_size: DEFAULT_BATCH_SIZE,
            quiet: false,
            dry_run: false,
            stream: TableStream::Idle,
            started: AHashSet::new(),
            stats: DataStats::default(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn stats(&self) -> &DataStats {
        &self.stats
    }

    /// Path of the data file written for `table`.
    pub fn data_path(&self, table: &str) -> PathBuf {
        self.output_dir.join(data_file_name(table))
    }

    /// Re-encode the INSERT statements of a dump file.
    pub fn parse(&mut self, path: &Path, registry: &TypeRegistry) -> Result<()> {
        let reader = open_dump(path, None)?;
        self.parse_reader(reader, registry)
    }

    /// Re-encode the INSERT statements read from `reader`.
    ///
    /// The open table file is always closed before returning, on error too.
    pub fn parse_reader<R: Read>(&mut self, reader: R, registry: &TypeRegistry) -> Result<()> {
        let result = self.process_lines(LineReader::new(reader), registry);
        let closed = self.close_stream();
        result?;
        closed
    }

    fn process_lines<R: Read>(
        &mut self,
        mut lines: LineReader<R>,
        registry: &TypeRegistry,
    ) -> Result<()> {
        while let Some((line_no, raw)) = lines.next_line()? {
            if raw.starts_with(INSERT_PREFIX) {
                self.process_insert(line_no, &raw, registry)?;
            }
        }
        Ok(())
    }

    fn process_insert(&mut self, line_no: usize, raw: &str, registry: &TypeRegistry) -> Result<()> {
        let line = chomp(raw).replace(crate::dialect::IDENTIFIER_QUOTE, "");

        let marker = memchr::memmem::find(line.as_bytes(), VALUES_MARKER.as_bytes())
            .ok_or_else(|| DumpError::malformed(line_no, "INSERT without ' VALUES ('"))?;
        let (lhs, rhs) = (&line[..marker], &line[marker + VALUES_MARKER.len()..]);

        let table = lhs
            .split_whitespace()
            .last()
            .ok_or_else(|| DumpError::malformed(line_no, "INSERT without a table name"))?;
        if table.starts_with('(') || table.ends_with(')') {
            return Err(DumpError::malformed(
                line_no,
                format!("INSERT with an explicit column list is not supported: {}", lhs),
            ));
        }

        let kinds = registry
            .kinds(table)
            .ok_or_else(|| DumpError::UnknownTable(table.to_string()))?;

        let body = rhs.strip_suffix(INSERT_TERMINATOR).ok_or_else(|| {
            DumpError::malformed(line_no, format!("INSERT INTO {} is not terminated by ');'", table))
        })?;

        let tuples: Vec<String> = body
            .split(TUPLE_SEPARATOR)
            .map(|tuple| reencode_tuple(&split_values(tuple), &kinds))
            .collect();

        self.switch_to(table)?;
        self.stats.insert_lines += 1;
        self.stats.tuples += tuples.len() as u64;
        *self.stats.tables.entry(table.to_string()).or_default() += tuples.len() as u64;

        for batch in tuples.chunks(self.batch_size) {
            let stmt = format!("INSERT INTO {} VALUES ({});", table, batch.join("),("));
            if let TableStream::Open {
                writer: Some(writer),
                ..
            } = &mut self.stream
            {
                writer.write_statement(&stmt)?;
            }
            self.stats.statements += 1;
        }

        Ok(())
    }

    /// Make `name` the open table, closing the previous one.
    ///
    /// A table seen for the first time in this run gets a fresh file; a table
    /// that comes back after another one is appended to.
    fn switch_to(&mut self, name: &str) -> Result<()> {
        if self.stream.is_open_for(name) {
            return Ok(());
        }
        self.close_stream()?;

        if !self.quiet {
            eprintln!("Writing the data for the {} table", name);
        }

        let writer = if self.dry_run {
            None
        } else {
            let path = self.data_path(name);
            if self.started.insert(name.to_string()) {
                Some(TableWriter::create(&path)?)
            } else {
                Some(TableWriter::append(&path)?)
            }
        };

        self.stream = TableStream::Open {
            table: name.to_string(),
            writer,
        };
        Ok(())
    }

    fn close_stream(&mut self) -> Result<()> {
        if let TableStream::Open {
            writer: Some(writer),
            ..
        } = std::mem::replace(&mut self.stream, TableStream::Idle)
        {
            writer.close()?;
        }
        Ok(())
    }
}
