use std::io::{self, Read, Write};

use crate::Buffer;

impl Buffer {
    /// Read up to `n` bytes from `reader` into the free tail with a single `read` call.
    ///
    /// Returns the number of bytes read, which become part of the content. A return of 0 with
    /// `n > 0` means the reader reached end of stream. Errors from the reader are returned as-is
    /// and are never retried.
    pub fn read_from<R: Read + ?Sized>(&mut self, reader: &mut R, n: usize) -> io::Result<usize> {
        let tail = self.reserve(n)?;
        let read = reader.read(&mut tail[..n])?;
        self.advance_after_read(read, n)
    }

    /// Write the content to `writer` with a single `write` call.
    ///
    /// Returns the number of bytes written, which are consumed from the front of the content.
    /// Errors from the writer are returned as-is and are never retried.
    pub fn write_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> io::Result<usize> {
        let written = writer.write(self.as_slice())?;
        self.consume_after_write(written)
    }

    pub(crate) fn advance_after_read(&mut self, read: usize, n: usize) -> io::Result<usize> {
        if read > n {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("reader reported {read} bytes for a {n} byte read"),
            ));
        }
        self.length += read;
        self.check_invariants();
        Ok(read)
    }

    pub(crate) fn consume_after_write(&mut self, written: usize) -> io::Result<usize> {
        if written > self.length {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "writer reported {written} bytes for a {} byte write",
                    self.length
                ),
            ));
        }
        self.skip(written);
        Ok(written)
    }
}
