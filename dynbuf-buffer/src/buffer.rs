use std::ffi::CStr;
use std::fmt::{Debug, Formatter};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use dynbuf_error::{DynbufResult, dynbuf_bail, dynbuf_err};

use crate::debug::ContentPreview;
use crate::{Allocator, default_allocator};

/// Floor for the first allocation made when content is added to a buffer without storage.
pub const MIN_ALLOCATION: usize = 32;

/// A resizable byte buffer with a movable start offset.
///
/// The backing storage is split into three regions:
///
/// ```text
///                      capacity
///  <----------------------------------------->
///
///   skipped           length
///  <------> <------------------------>
///
/// +--------+--------------------------+--------+
/// |        |         content          |  free  |
/// +--------+--------------------------+--------+
/// ```
///
/// Consuming from the front only moves the start offset. The skipped prefix is reclaimed by
/// sliding the content down before the buffer grows, so sequential readers never copy data they
/// have not consumed yet.
pub struct Buffer {
    pub(crate) storage: Option<Box<[u8]>>,
    pub(crate) skip: usize,
    pub(crate) length: usize,
    pub(crate) allocator: Arc<dyn Allocator>,
}

impl Buffer {
    /// Create an empty buffer using the process-wide default allocator.
    ///
    /// Does not allocate.
    pub fn new() -> Self {
        Self::new_in(default_allocator())
    }

    /// Create an empty buffer backed by the given allocator.
    pub fn new_in(allocator: Arc<dyn Allocator>) -> Self {
        Self {
            storage: None,
            skip: 0,
            length: 0,
            allocator,
        }
    }

    /// Create an empty buffer with `capacity` bytes of storage, using the default allocator.
    ///
    /// If capacity is 0, does not perform any allocations.
    pub fn with_capacity(capacity: usize) -> DynbufResult<Self> {
        Self::with_capacity_in(capacity, default_allocator())
    }

    /// Create an empty buffer with `capacity` bytes of storage from the given allocator.
    pub fn with_capacity_in(capacity: usize, allocator: Arc<dyn Allocator>) -> DynbufResult<Self> {
        let mut buffer = Self::new_in(allocator);
        if capacity > 0 {
            buffer.resize(capacity)?;
        }
        Ok(buffer)
    }

    /// Create a buffer holding `len` zero bytes.
    pub fn zeroed(len: usize) -> DynbufResult<Self> {
        let mut buffer = Self::new();
        if len > 0 {
            buffer.storage = Some(buffer.allocator.allocate_zeroed(len, 1)?);
            buffer.length = len;
        }
        Ok(buffer)
    }

    /// Create a buffer holding a copy of `data`.
    pub fn copy_from(data: impl AsRef<[u8]>) -> DynbufResult<Self> {
        let mut buffer = Self::new();
        buffer.append(data.as_ref())?;
        Ok(buffer)
    }

    /// The live content of the buffer.
    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        match &self.storage {
            Some(storage) => &storage[self.skip..self.skip + self.length],
            None => &[],
        }
    }

    /// The live content of the buffer, mutably.
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match &mut self.storage {
            Some(storage) => &mut storage[self.skip..self.skip + self.length],
            None => &mut [],
        }
    }

    /// Returns the number of live bytes.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns whether the buffer holds no live bytes.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Total size of the backing storage, including the skipped prefix and the free tail.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.storage.as_ref().map_or(0, |storage| storage.len())
    }

    /// Number of consumed bytes still occupying the front of the storage.
    #[inline(always)]
    pub fn skipped(&self) -> usize {
        self.skip
    }

    /// Bytes available after the content without moving or growing the storage.
    #[inline(always)]
    pub fn free_space(&self) -> usize {
        self.capacity() - self.length - self.skip
    }

    /// The allocator backing this buffer.
    pub fn allocator(&self) -> &Arc<dyn Allocator> {
        &self.allocator
    }

    /// Ensure at least `size` bytes of free space are available after the content, returning a
    /// writable view over the whole free tail.
    ///
    /// Bytes written to the view become part of the content after a call to
    /// [`increase_length`][Buffer::increase_length].
    pub fn reserve(&mut self, size: usize) -> DynbufResult<&mut [u8]> {
        self.ensure_free_space(size)?;
        Ok(self.free_tail_mut())
    }

    /// Extend the content by `n` bytes already written into the free tail.
    ///
    /// # Errors
    ///
    /// Fails without modifying the buffer if `n` exceeds the free space.
    pub fn increase_length(&mut self, n: usize) -> DynbufResult<()> {
        if n > self.free_space() {
            dynbuf_bail!(
                "length increment too large: {} bytes requested, {} available",
                n,
                self.free_space()
            );
        }
        self.length += n;
        self.check_invariants();
        Ok(())
    }

    /// Insert `data` at `offset` within the content, shifting everything after it.
    ///
    /// Appending is an insert at `offset == len()`. Inserting empty `data` always succeeds without
    /// touching the buffer, whatever the offset.
    ///
    /// # Errors
    ///
    /// Fails with [`OutOfBounds`][dynbuf_error::DynbufError::OutOfBounds] if `offset` is past the
    /// end of the content, or if the storage cannot grow. The buffer is unchanged on failure.
    pub fn insert(&mut self, offset: usize, data: &[u8]) -> DynbufResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        if offset > self.length {
            dynbuf_bail!(OutOfBounds: offset, 0, self.length);
        }

        self.make_room(data.len())?;

        let start = self.skip + offset;
        let end = self.skip + self.length;
        let storage = self.storage_mut();
        storage.copy_within(start..end, start + data.len());
        storage[start..start + data.len()].copy_from_slice(data);

        self.length += data.len();
        self.check_invariants();
        Ok(())
    }

    /// Append `data` after the content.
    #[inline]
    pub fn append(&mut self, data: &[u8]) -> DynbufResult<()> {
        self.insert(self.length, data)
    }

    /// Append the content of another buffer, leaving it unmodified.
    pub fn append_buffer(&mut self, other: &Buffer) -> DynbufResult<()> {
        self.append(other.as_slice())
    }

    /// Append the UTF-8 bytes of a string.
    pub fn append_str(&mut self, text: &str) -> DynbufResult<()> {
        self.append(text.as_bytes())
    }

    /// Append a null-terminated string, excluding its terminator.
    pub fn append_cstr(&mut self, text: &CStr) -> DynbufResult<()> {
        self.append(text.to_bytes())
    }

    /// Shorten the content to at most `len` bytes, keeping the front.
    pub fn truncate(&mut self, len: usize) {
        self.length = self.length.min(len);
        if self.length == 0 {
            self.skip = 0;
        }
        self.check_invariants();
    }

    /// Drop the content while keeping the storage for reuse.
    pub fn clear(&mut self) {
        self.skip = 0;
        self.length = 0;
    }

    /// Drop the content and release the storage.
    pub fn reset(&mut self) {
        if let Some(storage) = self.storage.take() {
            self.allocator.release(storage);
        }
        self.skip = 0;
        self.length = 0;
    }

    /// Make sure the free tail holds at least `size` bytes.
    ///
    /// Reclaims the skipped prefix first, then grows the storage by exactly the missing amount.
    pub(crate) fn ensure_free_space(&mut self, size: usize) -> DynbufResult<()> {
        if self.free_space() >= size {
            return Ok(());
        }
        self.repack();

        let free_space = self.free_space();
        if free_space < size {
            self.grow(size - free_space)?;
        }
        Ok(())
    }

    /// Make sure an insert of `size` bytes fits, growing geometrically.
    fn make_room(&mut self, size: usize) -> DynbufResult<()> {
        if self.storage.is_none() {
            return self.resize(size.max(MIN_ALLOCATION));
        }
        if self.free_space() >= size {
            return Ok(());
        }
        self.repack();
        if self.free_space() >= size {
            return Ok(());
        }

        let capacity = self.capacity();
        let new_capacity = if size > capacity {
            capacity.checked_add(size)
        } else {
            capacity.checked_mul(2)
        }
        .ok_or_else(|| dynbuf_err!("buffer capacity overflow growing {} by {}", capacity, size))?;
        self.resize(new_capacity)
    }

    /// Slide the content down to offset 0, turning the skipped prefix into free space.
    pub(crate) fn repack(&mut self) {
        if self.skip == 0 {
            return;
        }
        log::trace!(
            "Repacking {} bytes, reclaiming {} skipped bytes",
            self.length,
            self.skip
        );

        let (skip, length) = (self.skip, self.length);
        self.storage_mut().copy_within(skip..skip + length, 0);
        self.skip = 0;
    }

    fn grow(&mut self, size: usize) -> DynbufResult<()> {
        let new_capacity = self
            .capacity()
            .checked_add(size)
            .ok_or_else(|| dynbuf_err!("buffer capacity overflow growing by {}", size))?;
        self.resize(new_capacity)
    }

    fn resize(&mut self, capacity: usize) -> DynbufResult<()> {
        log::trace!(
            "Resizing buffer storage from {} to {} bytes",
            self.capacity(),
            capacity
        );
        match self.storage.as_mut() {
            Some(storage) => self.allocator.reallocate(storage, capacity)?,
            None => {
                let storage = self.allocator.allocate(capacity)?;
                self.storage = Some(storage);
            }
        }
        Ok(())
    }

    pub(crate) fn storage_mut(&mut self) -> &mut [u8] {
        self.storage.as_deref_mut().unwrap_or_default()
    }

    pub(crate) fn free_tail_mut(&mut self) -> &mut [u8] {
        let end = self.skip + self.length;
        &mut self.storage_mut()[end..]
    }

    #[inline(always)]
    pub(crate) fn check_invariants(&self) {
        debug_assert!(
            self.skip + self.length <= self.capacity(),
            "skip {} + length {} exceeds capacity {}",
            self.skip,
            self.length,
            self.capacity()
        );
        debug_assert!(
            self.length > 0 || self.skip == 0,
            "empty buffer with skip {}",
            self.skip
        );
        debug_assert_eq!(self.storage.is_none(), self.capacity() == 0);
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let Some(storage) = self.storage.take() {
            self.allocator.release(storage);
        }
    }
}

impl Debug for Buffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("length", &self.length)
            .field("skip", &self.skip)
            .field("capacity", &self.capacity())
            .field("content", &ContentPreview(self.as_slice()))
            .finish()
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl DerefMut for Buffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Buffer {}

impl std::io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Write for Buffer {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.append_str(s).map_err(|_| std::fmt::Error)
    }
}

#[cfg(test)]
mod test {
    use std::ffi::CString;
    use std::sync::Arc;

    use dynbuf_error::DynbufError;
    use rstest::rstest;

    use crate::allocator::test::CappedAllocator;
    use crate::{Allocator, Buffer, MIN_ALLOCATION};

    fn buffer_of(content: &[u8]) -> Buffer {
        Buffer::copy_from(content).unwrap()
    }

    #[test]
    fn new_does_not_allocate() {
        let buf = Buffer::new();
        assert!(buf.storage.is_none());
        assert_eq!(buf.capacity(), 0);
        assert_eq!(buf.free_space(), 0);
        assert!(buf.is_empty());
        assert_eq!(buf.as_slice(), b"");
    }

    #[test]
    fn with_capacity() {
        let buf = Buffer::with_capacity(8).unwrap();
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.free_space(), 8);
        assert!(buf.is_empty());

        let buf = Buffer::with_capacity(0).unwrap();
        assert!(buf.storage.is_none());
    }

    #[test]
    fn zeroed() {
        let buf = Buffer::zeroed(5).unwrap();
        assert_eq!(buf.as_slice(), &[0u8; 5]);
        assert_eq!(Buffer::zeroed(0).unwrap().capacity(), 0);
    }

    #[test]
    fn insert_scenario() {
        let mut buf = Buffer::new();
        buf.insert(0, b"abc").unwrap();
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.as_slice(), b"abc");

        buf.insert(2, b"123").unwrap();
        assert_eq!(buf.len(), 6);
        assert_eq!(buf.as_slice(), b"ab123c");

        buf.insert(6, b"de").unwrap();
        assert_eq!(buf.len(), 8);
        assert_eq!(buf.as_slice(), b"ab123cde");
    }

    #[rstest]
    #[case(b"", 0, b"xyz", b"xyz")]
    #[case(b"hello", 0, b">", b">hello")]
    #[case(b"hello", 5, b"!", b"hello!")]
    #[case(b"hello", 3, b"--", b"hel--lo")]
    fn insert_splices(
        #[case] content: &[u8],
        #[case] offset: usize,
        #[case] data: &[u8],
        #[case] expected: &[u8],
    ) {
        let mut buf = buffer_of(content);
        buf.insert(offset, data).unwrap();
        assert_eq!(buf.as_slice(), expected);
        assert_eq!(buf.len(), content.len() + data.len());
    }

    #[test]
    fn insert_invalid_offset() {
        let mut buf = buffer_of(b"abc");
        let err = buf.insert(4, b"x").unwrap_err();
        assert!(matches!(err, DynbufError::OutOfBounds(4, 0, 3, _)));
        assert_eq!(buf.as_slice(), b"abc");
    }

    #[test]
    fn insert_empty_is_noop() {
        let mut buf = Buffer::new();
        buf.insert(0, b"").unwrap();
        assert!(buf.storage.is_none());

        // The offset is not checked for an empty insert.
        buf.insert(10, b"").unwrap();
        assert!(buf.storage.is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn first_allocation_has_floor() {
        let mut buf = Buffer::new();
        buf.append(b"abc").unwrap();
        assert_eq!(buf.capacity(), MIN_ALLOCATION);

        let mut buf = Buffer::new();
        buf.append(&[7u8; 100]).unwrap();
        assert_eq!(buf.capacity(), 100);
    }

    #[test]
    fn growth_doubles() {
        let mut buf = Buffer::with_capacity(8).unwrap();
        buf.append(b"12345678").unwrap();
        buf.append(b"9").unwrap();
        assert_eq!(buf.capacity(), 16);
        assert_eq!(buf.as_slice(), b"123456789");
    }

    #[test]
    fn large_insert_grows_by_request() {
        let mut buf = Buffer::with_capacity(8).unwrap();
        buf.append(b"1234").unwrap();
        buf.append(&[0u8; 20]).unwrap();
        assert_eq!(buf.capacity(), 28);
        assert_eq!(buf.len(), 24);
    }

    #[test]
    fn repack_before_grow() {
        let mut buf = Buffer::with_capacity(8).unwrap();
        buf.append(b"abcdefgh").unwrap();
        buf.skip(4);
        assert_eq!(buf.skipped(), 4);
        assert_eq!(buf.free_space(), 0);

        buf.append(b"ijkl").unwrap();
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.skipped(), 0);
        assert_eq!(buf.as_slice(), b"efghijkl");
    }

    #[test]
    fn skipped_prefix_reclaimed() {
        let mut buf = Buffer::with_capacity(8).unwrap();
        buf.append(b"hello").unwrap();
        buf.skip(5);
        assert_eq!(buf.free_space(), 8);
        assert_eq!(buf.capacity(), 8);
    }

    #[test]
    fn reserve_then_increase_length() {
        let mut buf = buffer_of(b"ab");
        let tail = buf.reserve(3).unwrap();
        assert!(tail.len() >= 3);
        tail[..3].copy_from_slice(b"cde");
        buf.increase_length(3).unwrap();
        assert_eq!(buf.as_slice(), b"abcde");
    }

    #[test]
    fn reserve_grows_exactly() {
        let mut buf = Buffer::with_capacity(4).unwrap();
        buf.append(b"abc").unwrap();
        let tail = buf.reserve(5).unwrap();
        assert_eq!(tail.len(), 5);
        assert_eq!(buf.capacity(), 8);
    }

    #[test]
    fn reserve_reclaims_skipped_prefix() {
        let mut buf = Buffer::with_capacity(8).unwrap();
        buf.append(b"abcdef").unwrap();
        buf.skip(4);
        let tail = buf.reserve(6).unwrap();
        assert_eq!(tail.len(), 6);
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.as_slice(), b"ef");
    }

    #[test]
    fn increase_length_too_large() {
        let mut buf = Buffer::with_capacity(4).unwrap();
        buf.append(b"ab").unwrap();
        let err = buf.increase_length(3).unwrap_err();
        assert!(matches!(err, DynbufError::InvalidArgument(..)));
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn append_variants() {
        let mut buf = Buffer::new();
        buf.append_str("abc").unwrap();
        buf.append_cstr(&CString::new("def").unwrap()).unwrap();

        let other = buffer_of(b"ghi");
        buf.append_buffer(&other).unwrap();
        assert_eq!(buf.as_slice(), b"abcdefghi");
        assert_eq!(other.as_slice(), b"ghi");
    }

    #[test]
    fn truncate() {
        let mut buf = buffer_of(b"abcdef");
        buf.skip(1);
        buf.truncate(10);
        assert_eq!(buf.as_slice(), b"bcdef");
        buf.truncate(2);
        assert_eq!(buf.as_slice(), b"bc");
        buf.truncate(0);
        assert!(buf.is_empty());
        assert_eq!(buf.skipped(), 0);
    }

    #[test]
    fn clear_keeps_storage() {
        let mut buf = buffer_of(b"abcdef");
        buf.skip(2);
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.skipped(), 0);
        assert_eq!(buf.capacity(), MIN_ALLOCATION);
    }

    #[test]
    fn reset_releases_storage() {
        let mut buf = buffer_of(b"abcdef");
        buf.reset();
        assert!(buf.is_empty());
        assert!(buf.storage.is_none());
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn failed_growth_leaves_buffer_intact() {
        let allocator = CappedAllocator::new(16);
        let mut buf = Buffer::with_capacity_in(8, allocator).unwrap();
        buf.append(b"abcdefgh").unwrap();
        buf.skip(2);

        let err = buf.append(&[0u8; 32]).unwrap_err();
        assert!(err.is_allocation_failure());
        assert_eq!(buf.as_slice(), b"cdefgh");
        assert_eq!(buf.capacity(), 8);

        let err = buf.reserve(64).unwrap_err();
        assert!(err.is_allocation_failure());
        assert_eq!(buf.as_slice(), b"cdefgh");
    }

    #[test]
    fn allocator_is_used() {
        let allocator = CappedAllocator::new(1024);
        let mut buf = Buffer::new_in(allocator.clone());
        buf.append(b"abc").unwrap();
        buf.append(&[1u8; 40]).unwrap();
        assert_eq!(
            allocator
                .requests
                .load(std::sync::atomic::Ordering::Relaxed),
            2
        );
    }

    #[test]
    fn default_allocator_swap() {
        let allocator = CappedAllocator::new(usize::MAX);
        crate::set_default_allocator(Some(allocator.clone()));
        let buf = Buffer::new();
        crate::set_default_allocator(None);

        let expected: Arc<dyn Allocator> = allocator;
        assert!(Arc::ptr_eq(buf.allocator(), &expected));
    }

    #[test]
    fn io_write_appends() {
        use std::io::Write;

        let mut buf = Buffer::new();
        write!(buf, "{}-{}", 1, 2).unwrap();
        assert_eq!(buf.as_slice(), b"1-2");
    }

    #[test]
    fn deref_and_eq() {
        let mut buf = buffer_of(b"abc");
        buf[0] = b'x';
        assert_eq!(&buf[..], b"xbc");
        assert_eq!(buf, buffer_of(b"xbc"));
    }

    #[test]
    fn debug_truncates() {
        let buf = buffer_of(&[1u8; 64]);
        let debug = format!("{buf:?}");
        assert!(debug.contains("length: 64"));
        assert!(debug.contains("..."));
    }

    fn assert_invariants(buf: &Buffer) {
        assert!(buf.skipped() + buf.len() <= buf.capacity());
        assert!(!buf.is_empty() || buf.skipped() == 0);
        assert_eq!(buf.storage.is_none(), buf.capacity() == 0);
    }

    #[test]
    fn random_operations_match_model() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0x0b0f_fe12);
        let mut buf = Buffer::new();
        let mut model: Vec<u8> = Vec::new();

        for step in 0..5_000 {
            match rng.random_range(0..9) {
                0 | 1 => {
                    let data: Vec<u8> = (0..rng.random_range(0..48)).map(|_| rng.random()).collect();
                    let offset = rng.random_range(0..=model.len());
                    buf.insert(offset, &data).unwrap();
                    model.splice(offset..offset, data);
                }
                2 => {
                    let data: Vec<u8> = (0..rng.random_range(0..16)).map(|_| rng.random()).collect();
                    buf.append(&data).unwrap();
                    model.extend_from_slice(&data);
                }
                3 => {
                    let n = rng.random_range(0..=model.len() + 4);
                    buf.skip(n);
                    model.drain(..n.min(model.len()));
                }
                4 => {
                    let offset = rng.random_range(0..=model.len() + 2);
                    let n = rng.random_range(0..8);
                    let offset_clamped = offset.min(model.len());
                    let expected = n.min(offset_clamped);
                    assert_eq!(buf.remove_before(offset, n), expected);
                    model.drain(offset_clamped - expected..offset_clamped);
                }
                5 => {
                    let offset = rng.random_range(0..=model.len() + 2);
                    let n = rng.random_range(0..8);
                    let offset_clamped = offset.min(model.len());
                    let expected = n.min(model.len() - offset_clamped);
                    assert_eq!(buf.remove_after(offset, n), expected);
                    model.drain(offset_clamped..offset_clamped + expected);
                }
                6 => {
                    let len = rng.random_range(0..=model.len() + 2);
                    buf.truncate(len);
                    model.truncate(len);
                }
                7 => {
                    let n = rng.random_range(0..32);
                    let tail = buf.reserve(n).unwrap();
                    let fill = rng.random_range(0..=n);
                    tail[..fill].fill(b'r');
                    buf.increase_length(fill).unwrap();
                    model.extend(std::iter::repeat_n(b'r', fill));
                }
                _ => {
                    if rng.random_bool(0.1) {
                        buf.reset();
                        model.clear();
                    }
                }
            }
            assert_eq!(buf.as_slice(), model.as_slice(), "diverged at step {step}");
            assert_invariants(&buf);
        }
    }
}
