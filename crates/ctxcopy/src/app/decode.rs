//! Best-effort text decoding with a NUL-byte binary heuristic.
//!
//! Encodings are tried strictly, in order: UTF-8, GB18030, GBK, Windows-1252, and finally
//! Latin-1. Latin-1 maps every byte, so once the binary check passes a decode always succeeds.

use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, GB18030, GBK, UTF_8, WINDOWS_1252};

/// Number of leading bytes inspected for a NUL byte.
pub const BINARY_SNIFF_LEN: usize = 8000;

/// Character encodings the decoder knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Gb18030,
    Gbk,
    Windows1252,
    Latin1,
}

impl TextEncoding {
    /// Priority order used when decoding.
    pub const PRIORITY: [TextEncoding; 5] = [
        TextEncoding::Utf8,
        TextEncoding::Gb18030,
        TextEncoding::Gbk,
        TextEncoding::Windows1252,
        TextEncoding::Latin1,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Gb18030 => "gb18030",
            TextEncoding::Gbk => "gbk",
            TextEncoding::Windows1252 => "windows-1252",
            TextEncoding::Latin1 => "latin-1",
        }
    }

    fn encoding(&self) -> Option<&'static Encoding> {
        match self {
            TextEncoding::Utf8 => Some(UTF_8),
            TextEncoding::Gb18030 => Some(GB18030),
            // encoding_rs decodes GBK with the GB18030 decoder; this step only keeps the order.
            TextEncoding::Gbk => Some(GBK),
            TextEncoding::Windows1252 => Some(WINDOWS_1252),
            TextEncoding::Latin1 => None,
        }
    }

    /// Strict decode: `None` on any malformed sequence.
    fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self.encoding() {
            Some(encoding) => encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
            None => Some(bytes.iter().copied().map(char::from).collect()),
        }
    }
}

/// Text recovered from a file along with the encoding that accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub encoding: TextEncoding,
}

/// Whether the sniffed prefix of `bytes` contains a NUL byte.
pub fn looks_binary(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(BINARY_SNIFF_LEN)].contains(&0)
}

/// Decode raw bytes, or `None` when they look binary.
pub fn decode_bytes(bytes: &[u8]) -> Option<Decoded> {
    if looks_binary(bytes) {
        return None;
    }

    TextEncoding::PRIORITY.iter().find_map(|encoding| {
        encoding.decode(bytes).map(|text| Decoded {
            text,
            encoding: *encoding,
        })
    })
}

/// Read and decode a file. Unreadable or binary files yield `None`.
pub fn decode_file(path: &Path) -> Option<String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "skipping unreadable file");
            return None;
        }
    };

    match decode_bytes(&bytes) {
        Some(decoded) => {
            tracing::trace!(path = %path.display(), encoding = decoded.encoding.label(), "decoded");
            Some(decoded.text)
        }
        None => {
            tracing::debug!(path = %path.display(), "skipping binary file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_is_tried_first() {
        let decoded = decode_bytes("héllo 🚀\n".as_bytes()).unwrap();
        assert_eq!(decoded.text, "héllo 🚀\n");
        assert_eq!(decoded.encoding, TextEncoding::Utf8);
    }

    #[test]
    fn utf8_bom_is_preserved() {
        let decoded = decode_bytes(b"\xef\xbb\xbfabc").unwrap();
        assert_eq!(decoded.text, "\u{feff}abc");
    }

    #[test]
    fn falls_back_to_gb18030_for_chinese_text() {
        // "中文" encoded as GBK/GB18030.
        let decoded = decode_bytes(&[0xd6, 0xd0, 0xce, 0xc4]).unwrap();
        assert_eq!(decoded.text, "中文");
        assert_eq!(decoded.encoding, TextEncoding::Gb18030);
    }

    #[test]
    fn falls_back_to_windows_1252_for_truncated_multibyte() {
        // A trailing lead byte is malformed for both UTF-8 and GB18030.
        let decoded = decode_bytes(b"caf\xe9").unwrap();
        assert_eq!(decoded.text, "café");
        assert_eq!(decoded.encoding, TextEncoding::Windows1252);
    }

    #[test]
    fn latin1_maps_every_byte() {
        let bytes: Vec<u8> = (1u8..=255).collect();
        let text = TextEncoding::Latin1.decode(&bytes).unwrap();
        assert_eq!(text.chars().count(), 255);
    }

    #[test]
    fn nul_in_prefix_marks_binary() {
        assert!(decode_bytes(b"abc\0def").is_none());

        let mut late_nul = vec![b'a'; BINARY_SNIFF_LEN];
        late_nul.push(0);
        assert!(!looks_binary(&late_nul));
        assert!(decode_bytes(&late_nul).is_some());
    }

    #[test]
    fn empty_file_decodes_to_empty_text() {
        let decoded = decode_bytes(b"").unwrap();
        assert_eq!(decoded.text, "");
    }

    #[test]
    fn missing_file_yields_none() {
        let temp = tempfile::tempdir().unwrap();
        assert!(decode_file(&temp.path().join("missing.txt")).is_none());
    }

    #[test]
    fn decode_file_reads_from_disk() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("a.txt");
        fs::write(&path, "hi").unwrap();
        assert_eq!(decode_file(&path).as_deref(), Some("hi"));
    }
}
