//! Byte-counting reader used to drive the `--progress` spinner.

use std::io::Read;

/// Wraps a reader and reports the running total of bytes read.
pub struct ProgressReader<R: Read> {
    reader: R,
    on_read: Box<dyn Fn(u64)>,
    total: u64,
}

impl<R: Read> ProgressReader<R> {
    pub fn new<F>(reader: R, on_read: F) -> Self
    where
        F: Fn(u64) + 'static,
    {
        Self {
            reader,
            on_read: Box::new(on_read),
            total: 0,
        }
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.total += n as u64;
            (self.on_read)(self.total);
        }
        Ok(n)
    }
}
