#![deny(missing_docs)]

//! Error handling for the dynbuf crates.
//!
//! Every fallible buffer operation returns a [`DynbufResult`]. The error carries a descriptive
//! message and a backtrace captured at the point of failure, so callers never need to consult
//! any out-of-band state to find out what went wrong.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::{fmt, io};

/// A string that can be used as an error message.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    fn from(msg: T) -> Self {
        Self(msg.into())
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// A backtrace captured where an error was created.
///
/// Rendered as part of the error's `Display` output. Not exposed through `Error::provide`, which
/// is unstable.
pub struct ErrBacktrace(Backtrace);

impl ErrBacktrace {
    /// Capture a backtrace if `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE` enables it.
    #[inline]
    pub fn capture() -> Self {
        Self(Backtrace::capture())
    }
}

impl Deref for ErrBacktrace {
    type Target = Backtrace;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrBacktrace {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Debug for ErrBacktrace {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

/// The top-level error type for dynbuf.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum DynbufError {
    /// An offset was outside the live content of a buffer.
    #[error("index {0} out of bounds from {1} to {2}\nBacktrace:\n{3}")]
    OutOfBounds(usize, usize, usize, ErrBacktrace),
    /// An argument was rejected before any state was modified.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, ErrBacktrace),
    /// The allocator could not provide the requested number of bytes.
    #[error("cannot allocate {0} bytes: {1}\nBacktrace:\n{2}")]
    AllocationFailed(usize, ErrString, ErrBacktrace),
    /// The operation requires a buffer with live content.
    #[error("{0}\nBacktrace:\n{1}")]
    EmptyBuffer(ErrString, ErrBacktrace),
    /// Rendering formatted text failed.
    #[error("{0}\nBacktrace:\n{1}")]
    FormatError(ErrString, ErrBacktrace),
    /// A wrapped I/O error.
    #[error("{0}\nBacktrace:\n{1}")]
    IOError(#[source] io::Error, ErrBacktrace),
    /// A wrapper for other errors, carrying additional context.
    #[error("{0}: {1}")]
    Context(ErrString, #[source] Box<DynbufError>),
}

impl DynbufError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        DynbufError::Context(msg.into(), Box::new(self))
    }

    /// Returns the innermost error, skipping any context wrappers.
    pub fn root(&self) -> &DynbufError {
        match self {
            DynbufError::Context(_, inner) => inner.root(),
            other => other,
        }
    }

    /// Whether the root cause is an allocation failure.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self.root(), DynbufError::AllocationFailed(..))
    }
}

impl Debug for DynbufError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl From<io::Error> for DynbufError {
    fn from(value: io::Error) -> Self {
        DynbufError::IOError(value, ErrBacktrace::capture())
    }
}

impl From<fmt::Error> for DynbufError {
    fn from(_: fmt::Error) -> Self {
        DynbufError::FormatError("cannot format string".into(), ErrBacktrace::capture())
    }
}

impl From<DynbufError> for io::Error {
    fn from(value: DynbufError) -> Self {
        match value {
            DynbufError::IOError(err, _) => err,
            err if err.is_allocation_failure() => io::Error::new(io::ErrorKind::OutOfMemory, err),
            err => io::Error::other(err),
        }
    }
}

/// A type alias for Results that return DynbufErrors as their error type.
pub type DynbufResult<T> = Result<T, DynbufError>;

/// A convenient macro for creating a DynbufError.
#[macro_export]
macro_rules! dynbuf_err {
    (OutOfBounds: $idx:expr, $start:expr, $stop:expr) => {{
        $crate::__private::must_use(
            $crate::DynbufError::OutOfBounds($idx, $start, $stop, $crate::ErrBacktrace::capture())
        )
    }};
    (AllocationFailed: $size:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        $crate::__private::must_use(
            $crate::DynbufError::AllocationFailed($size, format!($fmt, $($arg),*).into(), $crate::ErrBacktrace::capture())
        )
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        $crate::__private::must_use(
            $crate::DynbufError::$variant(format!($fmt, $($arg),*).into(), $crate::ErrBacktrace::capture())
        )
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::dynbuf_err!(InvalidArgument: $fmt, $($arg),*)
    };
}

/// A convenient macro for returning a DynbufError.
#[macro_export]
macro_rules! dynbuf_bail {
    ($($tt:tt)+) => {
        return Err($crate::dynbuf_err!($($tt)+))
    };
}

/// A convenient macro for panicking with a DynbufError in the presence of a programmer error
/// (e.g., an invariant has been violated).
#[macro_export]
macro_rules! dynbuf_panic {
    (OutOfBounds: $idx:expr, $start:expr, $stop:expr) => {{
        $crate::dynbuf_panic!($crate::dynbuf_err!(OutOfBounds: $idx, $start, $stop))
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::dynbuf_panic!($crate::dynbuf_err!($variant: $fmt, $($arg),*))
    };
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::dynbuf_panic!($crate::dynbuf_err!($fmt, $($arg),*))
    };
    ($err:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let err: $crate::DynbufError = $err;
        panic!("{}", err.with_context(format!($fmt, $($arg),*)))
    }};
    ($err:expr) => {{
        let err: $crate::DynbufError = $err;
        panic!("{}", err)
    }};
}

/// A trait for unwrapping a DynbufResult.
pub trait DynbufUnwrap {
    /// The type of the value being unwrapped.
    type Output;

    /// Returns the value of the result if it is Ok, otherwise panics with the error.
    /// Should be called only in contexts where the error condition represents a bug (programmer error).
    fn dynbuf_unwrap(self) -> Self::Output;
}

impl<T, E> DynbufUnwrap for Result<T, E>
where
    E: Into<DynbufError>,
{
    type Output = T;

    #[inline(always)]
    fn dynbuf_unwrap(self) -> Self::Output {
        self.map_err(Into::<DynbufError>::into)
            .unwrap_or_else(|err| dynbuf_panic!(err))
    }
}

/// A trait for expect-ing a DynbufResult or an Option.
pub trait DynbufExpect {
    /// The type of the value being expected.
    type Output;

    /// Returns the value of the result if it is Ok, otherwise panics with the error.
    /// Should be called only in contexts where the error condition represents a bug (programmer error).
    fn dynbuf_expect(self, msg: &str) -> Self::Output;
}

impl<T, E> DynbufExpect for Result<T, E>
where
    E: Into<DynbufError>,
{
    type Output = T;

    #[inline(always)]
    fn dynbuf_expect(self, msg: &str) -> Self::Output {
        self.map_err(Into::<DynbufError>::into)
            .unwrap_or_else(|e| dynbuf_panic!(e.with_context(msg.to_string())))
    }
}

impl<T> DynbufExpect for Option<T> {
    type Output = T;

    #[inline(always)]
    fn dynbuf_expect(self, msg: &str) -> Self::Output {
        self.unwrap_or_else(|| {
            let err = DynbufError::InvalidArgument(msg.to_string().into(), ErrBacktrace::capture());
            dynbuf_panic!(err)
        })
    }
}

#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub const fn must_use(error: crate::DynbufError) -> crate::DynbufError {
        error
    }
}
