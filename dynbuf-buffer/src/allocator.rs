use std::fmt::Debug;
use std::sync::Arc;

use dynbuf_error::{DynbufResult, dynbuf_err};
use parking_lot::RwLock;

/// A pluggable source of backing storage for a [`Buffer`][crate::Buffer].
///
/// Blocks handed out by an allocator are always initialised, so a buffer can expose its free
/// tail as a plain `&mut [u8]` without any unsafe code.
///
/// Implementations must be shareable across threads since the process-wide default allocator
/// may be captured by buffers living on any thread.
pub trait Allocator: Debug + Send + Sync {
    /// Allocate a block of exactly `size` bytes.
    fn allocate(&self, size: usize) -> DynbufResult<Box<[u8]>>;

    /// Allocate a zero-filled block large enough for `count` items of `size` bytes each.
    fn allocate_zeroed(&self, count: usize, size: usize) -> DynbufResult<Box<[u8]>>;

    /// Resize `block` to exactly `new_size` bytes, preserving its prefix.
    ///
    /// On failure the block must be left untouched.
    fn reallocate(&self, block: &mut Box<[u8]>, new_size: usize) -> DynbufResult<()>;

    /// Return a block to the allocator.
    fn release(&self, block: Box<[u8]>);
}

/// The default [`Allocator`], backed by the global allocator.
///
/// Out-of-memory conditions are reported as errors instead of aborting the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn allocate(&self, size: usize) -> DynbufResult<Box<[u8]>> {
        let mut block = Vec::new();
        block
            .try_reserve_exact(size)
            .map_err(|e| dynbuf_err!(AllocationFailed: size, "{}", e))?;
        block.resize(size, 0);
        Ok(block.into_boxed_slice())
    }

    fn allocate_zeroed(&self, count: usize, size: usize) -> DynbufResult<Box<[u8]>> {
        let total = count.checked_mul(size).ok_or_else(|| {
            dynbuf_err!(AllocationFailed: usize::MAX, "{} * {} bytes overflows", count, size)
        })?;
        self.allocate(total)
    }

    fn reallocate(&self, block: &mut Box<[u8]>, new_size: usize) -> DynbufResult<()> {
        let mut vec = std::mem::take(block).into_vec();
        if new_size > vec.len() {
            if let Err(e) = vec.try_reserve_exact(new_size - vec.len()) {
                *block = vec.into_boxed_slice();
                return Err(dynbuf_err!(AllocationFailed: new_size, "{}", e));
            }
            vec.resize(new_size, 0);
        } else {
            vec.truncate(new_size);
        }
        *block = vec.into_boxed_slice();
        Ok(())
    }

    fn release(&self, block: Box<[u8]>) {
        drop(block);
    }
}

static DEFAULT_ALLOCATOR: RwLock<Option<Arc<dyn Allocator>>> = RwLock::new(None);

/// Replace the process-wide default allocator.
///
/// Buffers capture the default allocator when they are constructed, so the swap only affects
/// buffers created afterwards. Passing `None` restores the [`SystemAllocator`].
///
/// This is intended to be called once during start-up, before any buffer is created.
pub fn set_default_allocator(allocator: Option<Arc<dyn Allocator>>) {
    log::debug!(
        "Swapping default buffer allocator (custom: {})",
        allocator.is_some()
    );
    *DEFAULT_ALLOCATOR.write() = allocator;
}

/// The allocator new buffers are created with.
pub fn default_allocator() -> Arc<dyn Allocator> {
    DEFAULT_ALLOCATOR
        .read()
        .clone()
        .unwrap_or_else(|| Arc::new(SystemAllocator))
}
