/// A macro for constructing buffers akin to `vec![..]`.
///
/// Panics if the storage cannot be allocated.
#[macro_export]
macro_rules! buffer {
    () => (
        $crate::Buffer::new()
    );
    ($elem:expr; $n:expr) => (
        $crate::__private::DynbufExpect::dynbuf_expect(
            $crate::Buffer::copy_from(&[$elem; $n]),
            "allocating buffer",
        )
    );
    ($($x:expr),+ $(,)?) => (
        $crate::__private::DynbufExpect::dynbuf_expect(
            $crate::Buffer::copy_from(&[$($x),+]),
            "allocating buffer",
        )
    );
}

/// Append formatted text to a buffer, akin to `write!(..)`.
///
/// Expands to [`Buffer::append_fmt`][crate::Buffer::append_fmt] with the literal template, and
/// evaluates to the number of bytes appended.
#[macro_export]
macro_rules! buffer_fmt {
    ($buf:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $buf.append_fmt($fmt, format_args!($fmt $(, $arg)*))
    };
}
