use std::fs;
use std::path::Path;

use tracing::debug;

use super::XmlNormalizer;
use crate::error::Result;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Strips a UTF-8 byte order mark, converts CRLF and lone CR to LF, and
/// terminates the document with a newline.
#[derive(Debug, Default, Clone)]
pub struct LineEndingNormalizer;

impl LineEndingNormalizer {
    pub fn normalize_bytes(bytes: &[u8]) -> Vec<u8> {
        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut out = Vec::with_capacity(body.len() + 1);
        let mut iter = body.iter().copied().peekable();

        while let Some(byte) = iter.next() {
            if byte == b'\r' {
                if iter.peek() == Some(&b'\n') {
                    iter.next();
                }
                out.push(b'\n');
            } else {
                out.push(byte);
            }
        }

        if out.last().is_some_and(|&last| last != b'\n') {
            out.push(b'\n');
        }
        out
    }
}

impl XmlNormalizer for LineEndingNormalizer {
    fn normalize(&self, xml_path: &Path) -> Result<()> {
        let original = fs::read(xml_path)?;
        let normalized = Self::normalize_bytes(&original);
        if normalized != original {
            debug!(file = %xml_path.display(), "rewriting normalized XML");
            fs::write(xml_path, normalized)?;
        }
        Ok(())
    }
}
