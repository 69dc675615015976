//! Escaping for text and attribute values, and the encoding sink.

use crate::config::OutputEncoding;
use quick_xml::escape::escape;
use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Escape character data.
pub fn escape_text(raw: &str, encoding: OutputEncoding) -> String {
    finish(escape(raw), encoding, false)
}

/// Escape an attribute value. Whitespace other than the space character is
/// written as character references so that it survives normalization.
pub fn escape_attr(raw: &str, encoding: OutputEncoding) -> String {
    finish(escape(raw), encoding, true)
}

fn finish(escaped: Cow<'_, str>, encoding: OutputEncoding, attr: bool) -> String {
    let mut out = String::with_capacity(escaped.len());
    for c in escaped.chars() {
        let c = if allowed(c) { c } else { char::REPLACEMENT_CHARACTER };
        match c {
            '\t' if attr => out.push_str("&#9;"),
            '\n' if attr => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c if !encoding.can_encode(c) => {
                let _ = write!(out, "&#x{:X};", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Characters permitted by XML 1.0.
fn allowed(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Transcodes the UTF-8 written by the XML writer into the output encoding.
///
/// Everything outside the encoding has already been replaced by character
/// references, so a character that cannot be represented is an error.
pub struct EncodedWriter<W: Write> {
    inner: W,
    encoding: OutputEncoding,
    /// Bytes of an incomplete UTF-8 sequence from the previous write.
    pending: Vec<u8>,
}

impl<W: Write> EncodedWriter<W> {
    pub fn new(inner: W, encoding: OutputEncoding) -> Self {
        Self {
            inner,
            encoding,
            pending: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for EncodedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.encoding == OutputEncoding::Utf8 {
            self.inner.write_all(buf)?;
            return Ok(buf.len());
        }

        self.pending.extend_from_slice(buf);
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(s) => s.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        };
        let text = String::from_utf8_lossy(&self.pending[..valid]);
        let mut bytes = Vec::with_capacity(valid);
        for c in text.chars() {
            if !self.encoding.can_encode(c) {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "character U+{:04X} cannot be written as {}",
                        c as u32,
                        self.encoding.label()
                    ),
                ));
            }
            bytes.push(c as u32 as u8);
        }
        self.inner.write_all(&bytes)?;
        self.pending.drain(..valid);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
