use std::path::Path;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{Result, SubtradError};

/// Encoding a document was read with, reused when writing its translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8 { bom: bool },
    Utf16Le,
    Utf16Be,
    /// Single- or multi-byte legacy encoding chosen by the fallback label
    Legacy(&'static Encoding),
}

impl TextEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 { bom: false } => "UTF-8",
            TextEncoding::Utf8 { bom: true } => "UTF-8 (BOM)",
            TextEncoding::Utf16Le => "UTF-16LE",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::Legacy(encoding) => encoding.name(),
        }
    }

    fn from_encoding(encoding: &'static Encoding, bom: bool) -> Self {
        if encoding == UTF_8 {
            TextEncoding::Utf8 { bom }
        } else if encoding == UTF_16LE {
            TextEncoding::Utf16Le
        } else if encoding == UTF_16BE {
            TextEncoding::Utf16Be
        } else {
            TextEncoding::Legacy(encoding)
        }
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        TextEncoding::Utf8 { bom: false }
    }
}

/// Decoded file content together with the encoding it was found in
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: TextEncoding,
}

/// Decode raw bytes: BOM first, then strict UTF-8, then the fallback label
pub fn decode(bytes: &[u8], fallback_label: &str) -> Result<DecodedText> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        if had_errors {
            warn!("Malformed {} sequences replaced while decoding", encoding.name());
        }
        return Ok(DecodedText {
            text: text.into_owned(),
            encoding: TextEncoding::from_encoding(encoding, true),
        });
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(DecodedText {
            text: text.to_string(),
            encoding: TextEncoding::Utf8 { bom: false },
        });
    }

    let encoding = Encoding::for_label(fallback_label.as_bytes())
        .ok_or_else(|| SubtradError::Encoding(format!("Unknown encoding label '{}'", fallback_label)))?;
    debug!("Input is not valid UTF-8, decoding as {}", encoding.name());

    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        warn!("Malformed {} sequences replaced while decoding", encoding.name());
    }

    Ok(DecodedText {
        text: text.into_owned(),
        encoding: TextEncoding::from_encoding(encoding, false),
    })
}

/// Encode text back into the given encoding, re-emitting any BOM
pub fn encode(text: &str, encoding: TextEncoding) -> Vec<u8> {
    match encoding {
        TextEncoding::Utf8 { bom } => {
            let mut out = Vec::with_capacity(text.len() + 3);
            if bom {
                out.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
            }
            out.extend_from_slice(text.as_bytes());
            out
        }
        TextEncoding::Utf16Le => {
            let mut out = vec![0xFF, 0xFE];
            for unit in text.encode_utf16() {
                out.extend_from_slice(&unit.to_le_bytes());
            }
            out
        }
        TextEncoding::Utf16Be => {
            let mut out = vec![0xFE, 0xFF];
            for unit in text.encode_utf16() {
                out.extend_from_slice(&unit.to_be_bytes());
            }
            out
        }
        TextEncoding::Legacy(encoding) => {
            let (bytes, _, had_errors) = encoding.encode(text);
            if had_errors {
                warn!(
                    "Some characters cannot be represented in {} and were replaced",
                    encoding.name()
                );
            }
            bytes.into_owned()
        }
    }
}

/// Read and decode a text file
pub async fn read_text<P: AsRef<Path>>(path: P, fallback_label: &str) -> Result<DecodedText> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SubtradError::FileNotFound(path.display().to_string()));
    }

    let bytes = fs::read(path).await?;
    let decoded = decode(&bytes, fallback_label)?;
    debug!("Read {} ({}, {} bytes)", path.display(), decoded.encoding.name(), bytes.len());
    Ok(decoded)
}

/// Encode and write a text file
pub async fn write_text<P: AsRef<Path>>(path: P, text: &str, encoding: TextEncoding) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, encode(text, encoding)).await?;
    debug!("Wrote {} ({})", path.display(), encoding.name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_utf8() {
        let decoded = decode("héllo\r\n".as_bytes(), "windows-1252").unwrap();
        assert_eq!(decoded.text, "héllo\r\n");
        assert_eq!(decoded.encoding, TextEncoding::Utf8 { bom: false });
        assert_eq!(encode(&decoded.text, decoded.encoding), "héllo\r\n".as_bytes());
    }

    #[test]
    fn test_utf8_bom_is_stripped_and_restored() {
        let bytes = b"\xEF\xBB\xBFhola";
        let decoded = decode(bytes, "windows-1252").unwrap();

        assert_eq!(decoded.text, "hola");
        assert_eq!(decoded.encoding, TextEncoding::Utf8 { bom: true });
        assert_eq!(encode("adiós", decoded.encoding), b"\xEF\xBB\xBFadi\xC3\xB3s".to_vec());
    }

    #[test]
    fn test_utf16_le_with_bom() {
        let bytes = [0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
        let decoded = decode(&bytes, "windows-1252").unwrap();

        assert_eq!(decoded.text, "hi");
        assert_eq!(decoded.encoding, TextEncoding::Utf16Le);
        assert_eq!(encode("hi", TextEncoding::Utf16Le), bytes.to_vec());
    }

    #[test]
    fn test_utf16_be_encoding() {
        assert_eq!(encode("A", TextEncoding::Utf16Be), vec![0xFE, 0xFF, 0x00, b'A']);
    }

    #[test]
    fn test_invalid_utf8_uses_fallback() {
        // "café" in windows-1252
        let bytes = b"caf\xE9";
        let decoded = decode(bytes, "windows-1252").unwrap();

        assert_eq!(decoded.text, "café");
        assert_eq!(decoded.encoding.name(), "windows-1252");
        assert_eq!(encode("café", decoded.encoding), bytes.to_vec());
    }

    #[test]
    fn test_unknown_fallback_label() {
        let result = decode(b"\xFF\xFF\x00", "not-an-encoding");
        assert!(matches!(result, Err(SubtradError::Encoding(_))));
    }

    #[tokio::test]
    async fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.txt");

        write_text(&path, "línea\n", TextEncoding::Utf16Le).await.unwrap();
        let decoded = read_text(&path, "windows-1252").await.unwrap();

        assert_eq!(decoded.text, "línea\n");
        assert_eq!(decoded.encoding, TextEncoding::Utf16Le);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = read_text("/definitely/not/here.txt", "utf-8").await;
        assert!(matches!(result, Err(SubtradError::FileNotFound(_))));
    }
}
