use std::fmt;

use dynbuf_error::{DynbufResult, dynbuf_bail, dynbuf_err};

use crate::Buffer;

/// Renders into a fixed window, counting every byte the output would need even when it does not
/// fit.
struct TailWriter<'a> {
    window: &'a mut [u8],
    required: usize,
}

impl fmt::Write for TailWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.required < self.window.len() {
            let n = s.len().min(self.window.len() - self.required);
            self.window[self.required..self.required + n].copy_from_slice(&s.as_bytes()[..n]);
        }
        self.required = self.required.checked_add(s.len()).ok_or(fmt::Error)?;
        Ok(())
    }
}

impl Buffer {
    /// Append formatted text rendered directly into the free tail, returning the number of bytes
    /// appended.
    ///
    /// `format` is the template `args` was built from. Its length is the first guess for the
    /// rendered size. When the output does not fit, the tail is grown to the exact size the render
    /// reported and the render is retried.
    ///
    /// Prefer the [`buffer_fmt!`][crate::buffer_fmt] macro, which passes the template for you.
    ///
    /// # Errors
    ///
    /// Fails if `format` is empty, if a formatting trait implementation reports an error, or if
    /// the storage cannot grow. The content is unchanged on failure.
    pub fn append_fmt(&mut self, format: &str, args: fmt::Arguments<'_>) -> DynbufResult<usize> {
        if format.is_empty() {
            dynbuf_bail!("empty format string");
        }

        let mut wanted = format.len() + 1;
        loop {
            self.ensure_free_space(wanted)?;

            let mut writer = TailWriter {
                window: self.free_tail_mut(),
                required: 0,
            };
            fmt::write(&mut writer, args)
                .map_err(|_| dynbuf_err!(FormatError: "cannot format string: {}", format))?;

            let required = writer.required;
            if required <= self.free_space() {
                self.length += required;
                self.check_invariants();
                return Ok(required);
            }
            wanted = required;
        }
    }
}
