//! Text-encoding policy and the serializer's byte sink.
//!
//! The engine itself only knows the fast ASCII path. Hosts that need a
//! different text encoding for particular headers supply an
//! [`EncodingSelector`], which maps a header name to an optional
//! [`ValueCodec`]; returning `None` keeps the default behavior. The
//! [`HeaderSink`] trait is the serializer's only view of the outside world:
//! it accepts verbatim bytes, ASCII text, custom-encoded text, and decimal
//! integers.

use bytes::{BufMut, BytesMut};

use crate::error::HeaderError;

/// A custom text codec for one or more header values.
pub trait ValueCodec: Send + Sync {
    /// Decodes raw wire bytes into text.
    fn decode(&self, raw: &[u8]) -> Result<String, HeaderError>;

    /// Encodes text into wire bytes, appending to `dst`.
    fn encode(&self, text: &str, dst: &mut Vec<u8>);
}

/// Maps a header name to an optional custom codec.
///
/// `None` selects the fast ASCII path, which is the right answer for nearly
/// every header on every request.
pub trait EncodingSelector: Send + Sync {
    fn codec_for(&self, name: &str) -> Option<&dyn ValueCodec>;
}

/// The default selector: no custom encodings for any header.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultEncoding;

impl EncodingSelector for DefaultEncoding {
    fn codec_for(&self, _name: &str) -> Option<&dyn ValueCodec> {
        None
    }
}

/// Decodes bytes on the default path: ASCII verbatim, with a Latin-1 fallback
/// for bytes above 0x7F so no input is ever rejected here.
pub(crate) fn decode_ascii(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(text) if text.is_ascii() => text.to_owned(),
        _ => raw.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Field-value characters rejected by eager validation: controls other than
/// HTAB, and DEL.
pub(crate) fn is_forbidden_field_char(b: u8) -> bool {
    (b < 0x20 && b != b'\t') || b == 0x7F
}

/// An external byte sink the serializer writes into.
///
/// The engine's contribution is a pure, non-blocking byte-production step;
/// buffering and flushing are the sink's business.
pub trait HeaderSink {
    /// Writes a verbatim byte sequence.
    fn put_slice(&mut self, bytes: &[u8]);

    /// Writes ASCII text.
    fn put_ascii(&mut self, text: &str) {
        self.put_slice(text.as_bytes());
    }

    /// Writes text under a caller-supplied codec.
    fn put_encoded(&mut self, text: &str, codec: &dyn ValueCodec) {
        let mut buf = Vec::with_capacity(text.len());
        codec.encode(text, &mut buf);
        self.put_slice(&buf);
    }

    /// Writes an unsigned integer as decimal text, with no intermediate
    /// string allocation.
    fn put_dec(&mut self, value: u64) {
        // u64::MAX has 20 decimal digits
        let mut digits = [0u8; 20];
        let mut pos = digits.len();
        let mut value = value;
        loop {
            pos -= 1;
            digits[pos] = b'0' + (value % 10) as u8;
            value /= 10;
            if value == 0 {
                break;
            }
        }
        self.put_slice(&digits[pos..]);
    }
}

impl HeaderSink for BytesMut {
    fn put_slice(&mut self, bytes: &[u8]) {
        BufMut::put_slice(self, bytes);
    }
}

impl HeaderSink for Vec<u8> {
    fn put_slice(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_ascii_fast_path() {
        assert_eq!(decode_ascii(b"text/html"), "text/html");
        assert_eq!(decode_ascii(b""), "");
    }

    #[test]
    fn decode_ascii_latin1_fallback() {
        assert_eq!(decode_ascii(&[0x63, 0x61, 0x66, 0xE9]), "caf\u{e9}");
    }

    #[test]
    fn put_dec_writes_decimal_text() {
        let mut sink = Vec::new();
        sink.put_dec(0);
        HeaderSink::put_slice(&mut sink, b"|");
        sink.put_dec(1234567890);
        HeaderSink::put_slice(&mut sink, b"|");
        sink.put_dec(u64::MAX);
        assert_eq!(sink, b"0|1234567890|18446744073709551615");
    }

    #[test]
    fn forbidden_chars() {
        assert!(is_forbidden_field_char(b'\0'));
        assert!(is_forbidden_field_char(b'\r'));
        assert!(is_forbidden_field_char(b'\n'));
        assert!(is_forbidden_field_char(0x7F));
        assert!(!is_forbidden_field_char(b'\t'));
        assert!(!is_forbidden_field_char(b' '));
        assert!(!is_forbidden_field_char(b'~'));
        assert!(!is_forbidden_field_char(0x80));
    }
}
