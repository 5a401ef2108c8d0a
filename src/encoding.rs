//! Decoding raw page bytes to UTF-8.
//!
//! Charset precedence: byte order mark, the HTTP `Content-Type` header,
//! a `<meta>` declaration in the first kilobyte, then UTF-8.

use encoding_rs::{Encoding, UTF_8};

use crate::patterns::{CONTENT_TYPE_CHARSET, META_CHARSET};

/// How much of the document is scanned for a `<meta>` charset.
const META_SCAN_BYTES: usize = 1024;

/// Charset label from a `Content-Type` value (`text/html; charset=...`).
#[must_use]
pub fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    CONTENT_TYPE_CHARSET
        .captures(content_type)
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
}

/// Charset declared by a `<meta>` tag near the top of `html`.
#[must_use]
pub fn charset_from_meta(html: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&html[..html.len().min(META_SCAN_BYTES)]);
    META_CHARSET
        .captures(&head)
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
}

/// Pick the encoding of `html` served with `content_type`.
#[must_use]
pub fn detect_encoding(html: &[u8], content_type: Option<&str>) -> &'static Encoding {
    Encoding::for_bom(html)
        .map(|(encoding, _)| encoding)
        .or_else(|| content_type.and_then(charset_from_content_type))
        .or_else(|| charset_from_meta(html))
        .unwrap_or(UTF_8)
}

/// Decode `html` to UTF-8; undecodable sequences become U+FFFD.
#[must_use]
pub fn decode_html(html: &[u8], content_type: Option<&str>) -> String {
    let encoding = detect_encoding(html, content_type);
    let (decoded, _, _) = encoding.decode(html);
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_charset_is_used() {
        let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body>Caf\xE9</body></html>";
        // ISO-8859-1 is an alias of windows-1252 in encoding_rs
        assert_eq!(detect_encoding(html, None).name(), "windows-1252");
        assert!(decode_html(html, None).contains("Café"));
    }

    #[test]
    fn http_equiv_charset_is_used() {
        let html = br#"<META HTTP-EQUIV="content-type" CONTENT="text/html; CHARSET=windows-1252">"#;
        assert_eq!(detect_encoding(html, None).name(), "windows-1252");
    }

    #[test]
    fn header_wins_over_meta() {
        let html = b"<meta charset=\"utf-8\"><p>\x93Hello\x94</p>";
        let decoded = decode_html(html, Some("text/html; charset=windows-1252"));
        assert!(decoded.contains("\u{201C}Hello\u{201D}"));
    }

    #[test]
    fn bom_wins_over_everything() {
        let html = b"\xEF\xBB\xBF<meta charset=\"windows-1252\"><p>Caf\xC3\xA9</p>";
        assert_eq!(detect_encoding(html, Some("text/html; charset=latin1")), UTF_8);
        assert!(decode_html(html, None).contains("Café"));
    }

    #[test]
    fn defaults_to_utf8_and_tolerates_invalid_bytes() {
        let html = b"<p>Test \xFF\xFE Invalid</p>";
        assert_eq!(detect_encoding(html, Some("text/html")), UTF_8);
        let decoded = decode_html(html, None);
        assert!(decoded.contains("Test"));
        assert!(decoded.contains('\u{FFFD}'));
    }
}
