use std::fmt::{Debug, Formatter, Write};

/// Content bytes shown before the rest is summarised.
const PREVIEW_BYTES: usize = 32;

/// Renders buffer content as an escaped byte string, e.g. `b"GET /\r\n"`, cutting it short after
/// [`PREVIEW_BYTES`].
pub(crate) struct ContentPreview<'a>(pub(crate) &'a [u8]);

impl Debug for ContentPreview<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let shown = &self.0[..self.0.len().min(PREVIEW_BYTES)];
        f.write_str("b\"")?;
        for byte in shown {
            for c in std::ascii::escape_default(*byte) {
                f.write_char(char::from(c))?;
            }
        }
        f.write_char('"')?;
        if self.0.len() > shown.len() {
            write!(f, "... {} more", self.0.len() - shown.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::ContentPreview;

    #[test]
    fn escapes_bytes() {
        let rendered = format!("{:?}", ContentPreview(b"GET /\r\n\x00"));
        assert_eq!(rendered, r#"b"GET /\r\n\x00""#);
    }

    #[test]
    fn cuts_long_content() {
        let rendered = format!("{:?}", ContentPreview(&[b'a'; 40]));
        assert_eq!(rendered, format!("b\"{}\"... 8 more", "a".repeat(32)));
    }
}
