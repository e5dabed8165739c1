use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

pub const WRITER_BUFFER_SIZE: usize = 256 * 1024;
pub const STMT_BUFFER_COUNT: usize = 100;

/// File name of the data file for a table.
pub fn data_file_name(table: &str) -> String {
    format!("data_for_{}.sql", table)
}

/// Buffered writer for one output file, flushed every `STMT_BUFFER_COUNT` statements.
pub struct TableWriter {
    writer: BufWriter<File>,
    write_count: usize,
}

impl TableWriter {
    /// Create (or truncate) the file.
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::from_file(file))
    }

    /// Open the file for appending, creating it if needed.
    pub fn append(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: File) -> Self {
        Self {
            writer: BufWriter::with_capacity(WRITER_BUFFER_SIZE, file),
            write_count: 0,
        }
    }

    pub fn write_statement(&mut self, stmt: &str) -> std::io::Result<()> {
        self.writer.write_all(stmt.as_bytes())?;
        self.writer.write_all(b"\n")?;

        self.write_count += 1;
        if self.write_count >= STMT_BUFFER_COUNT {
            self.write_count = 0;
            self.writer.flush()?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.write_count = 0;
        self.writer.flush()
    }

    /// Flush and close, surfacing any write error that `Drop` would swallow.
    pub fn close(mut self) -> std::io::Result<()> {
        self.flush()
    }
}
