#![deny(missing_docs)]

//! A resizable byte buffer for I/O-bound code.
//!
//! [`Buffer`] owns one contiguous block of storage and tracks two offsets into it: how many bytes
//! at the front have already been consumed, and how many live bytes follow them. Appends grow the
//! storage geometrically, consumption from the front is O(1), and the consumed prefix is reclaimed
//! in place before any reallocation. This lets streaming parsers read, inspect and discard data
//! without copying what they have not consumed yet.
//!
//! Storage comes from an [`Allocator`], either injected per buffer or taken from the
//! process-wide default.

pub use allocator::*;
pub use buffer::*;

mod allocator;
mod buf;
mod buffer;
mod consume;
mod debug;
mod extract;
mod format;
mod io;
mod macros;
#[cfg(feature = "tokio")]
mod tokio;

#[doc(hidden)]
pub mod __private {
    pub use dynbuf_error::DynbufExpect;
}
