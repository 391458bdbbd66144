use bytes::Bytes;
use dynbuf_error::{DynbufResult, dynbuf_bail};

use crate::Buffer;

impl Buffer {
    /// Take the content out of the buffer as a right-sized allocation.
    ///
    /// The content is moved to the front of the storage, which is then shrunk to the content
    /// length and handed over without copying. The buffer is left empty with no storage.
    ///
    /// # Errors
    ///
    /// Fails on an empty buffer, or if the allocator cannot shrink the storage. The buffer is
    /// unchanged on failure.
    pub fn extract(&mut self) -> DynbufResult<Bytes> {
        if self.length == 0 {
            dynbuf_bail!(EmptyBuffer: "cannot extract content from an empty buffer");
        }
        self.repack();

        let Some(mut storage) = self.storage.take() else {
            dynbuf_bail!(EmptyBuffer: "cannot extract content from a buffer without storage");
        };
        if let Err(err) = self.allocator.reallocate(&mut storage, self.length) {
            self.storage = Some(storage);
            return Err(err);
        }

        log::debug!("Extracting {} bytes from buffer", self.length);
        self.skip = 0;
        self.length = 0;
        self.check_invariants();
        Ok(Bytes::from(storage))
    }

    /// Take the content out of the buffer followed by a `\0` terminator.
    ///
    /// Unlike [`extract`][Buffer::extract] this succeeds on an empty buffer, returning just the
    /// terminator.
    ///
    /// # Errors
    ///
    /// Fails if the storage cannot be grown for the terminator or shrunk to the content. The
    /// buffer is unchanged on failure.
    pub fn extract_text(&mut self) -> DynbufResult<Bytes> {
        self.append(b"\0")?;
        self.extract().inspect_err(|_| {
            // The terminator is the last byte, drop it again.
            self.truncate(self.length - 1);
        })
    }

    /// Copy the content into a new allocation, leaving the buffer unchanged.
    ///
    /// # Errors
    ///
    /// Fails on an empty buffer.
    pub fn duplicate(&self) -> DynbufResult<Bytes> {
        if self.length == 0 {
            dynbuf_bail!(EmptyBuffer: "cannot duplicate an empty buffer");
        }

        let mut copy = self.allocator.allocate(self.length)?;
        copy.copy_from_slice(self.as_slice());
        Ok(Bytes::from(copy))
    }

    /// Copy the content into a new allocation followed by a `\0` terminator.
    ///
    /// Succeeds on an empty buffer, returning just the terminator.
    pub fn duplicate_text(&self) -> DynbufResult<Bytes> {
        let mut copy = self.allocator.allocate(self.length + 1)?;
        copy[..self.length].copy_from_slice(self.as_slice());
        copy[self.length] = 0;
        Ok(Bytes::from(copy))
    }
}
