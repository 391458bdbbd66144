use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::Buffer;

impl Buffer {
    /// Asynchronously read up to `n` bytes from `reader` into the free tail with a single read.
    ///
    /// See [`Buffer::read_from`].
    pub async fn read_from_async<R>(&mut self, reader: &mut R, n: usize) -> io::Result<usize>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let tail = self.reserve(n)?;
        let read = reader.read(&mut tail[..n]).await?;
        self.advance_after_read(read, n)
    }

    /// Asynchronously write the content to `writer` with a single write.
    ///
    /// See [`Buffer::write_to`].
    pub async fn write_to_async<W>(&mut self, writer: &mut W) -> io::Result<usize>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let written = writer.write(self.as_slice()).await?;
        self.consume_after_write(written)
    }
}
