use crate::Buffer;

impl Buffer {
    /// Discard up to `n` bytes from the front of the content without moving any data.
    ///
    /// `n` is clamped to the content length. Sequential readers should prefer this over
    /// [`remove_before`][Buffer::remove_before], which shifts the remaining bytes.
    pub fn skip(&mut self, n: usize) {
        let n = n.min(self.length);
        self.skip += n;
        self.length -= n;
        self.reset_skip_if_empty();
    }

    /// Remove up to `n` bytes immediately preceding `offset`, returning how many were removed.
    ///
    /// `offset` is clamped to the content length and `n` to `offset`.
    pub fn remove_before(&mut self, offset: usize, n: usize) -> usize {
        let offset = offset.min(self.length);
        let n = n.min(offset);
        if n == 0 {
            return 0;
        }

        let start = self.skip + offset;
        let end = self.skip + self.length;
        self.storage_mut().copy_within(start..end, start - n);
        self.length -= n;
        self.reset_skip_if_empty();
        n
    }

    /// Remove up to `n` bytes starting at `offset`, returning how many were removed.
    ///
    /// `offset` is clamped to the content length and `n` to the bytes after it.
    pub fn remove_after(&mut self, offset: usize, n: usize) -> usize {
        let offset = offset.min(self.length);
        let n = n.min(self.length - offset);
        if n == 0 {
            return 0;
        }

        let start = self.skip + offset;
        let end = self.skip + self.length;
        self.storage_mut().copy_within(start + n..end, start);
        self.length -= n;
        self.reset_skip_if_empty();
        n
    }

    /// Remove up to `n` bytes from the end of the content, returning how many were removed.
    #[inline]
    pub fn remove(&mut self, n: usize) -> usize {
        self.remove_before(self.length, n)
    }

    fn reset_skip_if_empty(&mut self) {
        if self.length == 0 {
            self.skip = 0;
        }
        self.check_invariants();
    }
}
