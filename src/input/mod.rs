//! Dump input: compression detection and line-oriented reading.

mod progress;

pub use progress::ProgressReader;

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Compression format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    /// Detect compression format from file extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("gz" | "gzip") => Compression::Gzip,
            Some("bz2" | "bzip2") => Compression::Bzip2,
            Some("xz" | "lzma") => Compression::Xz,
            Some("zst" | "zstd") => Compression::Zstd,
            _ => Compression::None,
        }
    }

    /// Wrap a reader with the appropriate decompressor
    pub fn wrap_reader<'a>(&self, reader: Box<dyn Read + 'a>) -> std::io::Result<Box<dyn Read + 'a>> {
        Ok(match self {
            Compression::None => reader,
            Compression::Gzip => Box::new(flate2::read::GzDecoder::new(reader)),
            Compression::Bzip2 => Box::new(bzip2::read::BzDecoder::new(reader)),
            Compression::Xz => Box::new(xz2::read::XzDecoder::new(reader)),
            Compression::Zstd => Box::new(zstd::stream::read::Decoder::new(reader)?),
        })
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Bzip2 => write!(f, "bzip2"),
            Compression::Xz => write!(f, "xz"),
            Compression::Zstd => write!(f, "zstd"),
        }
    }
}

/// Open a dump file, decompressing it if its extension says so.
///
/// `progress` receives the number of compressed bytes read so far.
pub fn open_dump(
    path: &Path,
    progress: Option<Box<dyn Fn(u64)>>,
) -> std::io::Result<Box<dyn Read>> {
    let file = File::open(path)?;
    let compression = Compression::from_path(path);

    match progress {
        Some(cb) => compression.wrap_reader(Box::new(ProgressReader::new(file, move |b| cb(b)))),
        None => compression.wrap_reader(Box::new(file)),
    }
}

/// Reads a dump line by line, tracking 1-based line numbers.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected; the
/// trailing newline is kept, as the schema pass needs to see it.
pub struct LineReader<R: Read> {
    reader: BufReader<R>,
    buf: Vec<u8>,
    line_no: usize,
}

impl<R: Read> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::with_capacity(READ_BUFFER_SIZE, reader),
            buf: Vec::with_capacity(4 * 1024),
            line_no: 0,
        }
    }

    /// Read the next line, returning its number and contents.
    pub fn next_line(&mut self) -> std::io::Result<Option<(usize, String)>> {
        self.buf.clear();
        let n = self.reader.read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some((
            self.line_no,
            String::from_utf8_lossy(&self.buf).into_owned(),
        )))
    }
}

/// Strip a trailing `\n` or `\r\n`.
pub fn chomp(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
