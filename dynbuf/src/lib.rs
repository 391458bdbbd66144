//! Resizable byte buffers with zero-copy consumption from the front.
//!
//! ```
//! use dynbuf::{Buffer, buffer_fmt};
//!
//! let mut buf = Buffer::new();
//! buf.append(b"GET /index.html\r\n").unwrap();
//! buffer_fmt!(buf, "Host: {}\r\n", "example.com").unwrap();
//!
//! let line_end = buf.iter().position(|b| *b == b'\n').unwrap();
//! assert_eq!(&buf[..line_end + 1], b"GET /index.html\r\n");
//! buf.skip(line_end + 1);
//! assert_eq!(buf.as_slice(), b"Host: example.com\r\n");
//! ```

pub use dynbuf_buffer::*;
pub use dynbuf_error as error;
