//! Text extraction per file kind.

use crate::format_file_size;
use log::{debug, warn};

/// Characters kept from a crude byte decode.
const CRUDE_TEXT_LIMIT: usize = 5000;
/// Decoded text shorter than this is replaced by a placeholder.
const CRUDE_TEXT_MIN: usize = 50;

/// Accepted upload kinds, keyed by MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Image,
    Text,
    Word,
}

impl FileKind {
    /// Kind for an allowed MIME type; `None` for anything else.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(FileKind::Pdf),
            "image/jpeg" | "image/jpg" | "image/png" | "image/gif" | "image/webp" => {
                Some(FileKind::Image)
            }
            "text/plain" => Some(FileKind::Text),
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(FileKind::Word)
            }
            _ => None,
        }
    }
}

/// Extract the text stored for an accepted upload. Never fails.
pub fn extract_text(kind: FileKind, name: &str, bytes: &[u8]) -> String {
    match kind {
        FileKind::Pdf => match pdf_text(bytes) {
            Some(text) => text,
            None => {
                debug!("no pdf text layer, using byte decode (name={})", name);
                crude_decode(bytes, "PDF")
            }
        },
        FileKind::Image => format!(
            "Image \"{name}\" uploaded successfully. OCR functionality would extract text from this image. File size: {:.2} MB",
            bytes.len() as f64 / 1024.0 / 1024.0
        ),
        FileKind::Text => String::from_utf8_lossy(bytes).into_owned(),
        FileKind::Word => crude_decode(bytes, "Document"),
    }
}

fn pdf_text(bytes: &[u8]) -> Option<String> {
    if !bytes.starts_with(b"%PDF-") {
        return None;
    }
    // pdf-extract can panic on malformed input.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Some(text).filter(|text| !text.trim().is_empty()),
        Ok(Err(err)) => {
            warn!("pdf extraction failed (err={})", err);
            None
        }
        Err(_) => {
            warn!("pdf extraction panicked");
            None
        }
    }
}

/// Lossy UTF-8 decode with control characters blanked and whitespace collapsed.
pub fn crude_decode(bytes: &[u8], label: &str) -> String {
    let decoded = String::from_utf8_lossy(bytes);
    let blanked: String = decoded
        .chars()
        .map(|ch| {
            if matches!(ch, '\u{0}'..='\u{1f}' | '\u{7f}'..='\u{9f}') {
                ' '
            } else {
                ch
            }
        })
        .collect();
    let collapsed = blanked.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() < CRUDE_TEXT_MIN {
        return format!(
            "{label} content extracted from {}. For better text extraction, consider using a dedicated parsing service.",
            format_file_size(bytes.len() as u64)
        );
    }
    collapsed.chars().take(CRUDE_TEXT_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::{FileKind, crude_decode, extract_text};
    use pretty_assertions::assert_eq;

    #[test]
    fn allowed_mime_types_map_to_kinds() {
        assert_eq!(FileKind::from_mime("application/pdf"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_mime("image/webp"), Some(FileKind::Image));
        assert_eq!(FileKind::from_mime("text/plain"), Some(FileKind::Text));
        assert_eq!(
            FileKind::from_mime(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            Some(FileKind::Word)
        );
        assert_eq!(FileKind::from_mime("application/zip"), None);
        assert_eq!(FileKind::from_mime("text/html"), None);
    }

    #[test]
    fn crude_decode_collapses_and_truncates() {
        let mut bytes = b"Hello\x00\x01  world\n\n".to_vec();
        bytes.extend(std::iter::repeat_n(b'a', 6000));
        let text = crude_decode(&bytes, "PDF");
        assert!(text.starts_with("Hello world aaa"));
        assert_eq!(text.chars().count(), 5000);
    }

    #[test]
    fn short_crude_text_becomes_placeholder() {
        let text = crude_decode(b"%PDF-1.4 tiny", "PDF");
        assert_eq!(
            text,
            "PDF content extracted from 13 Bytes. For better text extraction, consider using a dedicated parsing service."
        );
    }

    #[test]
    fn broken_pdf_falls_back_to_byte_decode() {
        let body = "This is not really a PDF but it carries plenty of readable words inside.";
        let text = extract_text(FileKind::Pdf, "notes.pdf", body.as_bytes());
        assert_eq!(text, body);
    }

    #[test]
    fn image_yields_placeholder_and_text_is_lossy() {
        let text = extract_text(FileKind::Image, "photo.png", &[0u8; 2048]);
        assert_eq!(
            text,
            "Image \"photo.png\" uploaded successfully. OCR functionality would extract text from this image. File size: 0.00 MB"
        );
        assert_eq!(extract_text(FileKind::Text, "a.txt", b"caf\xc3\xa9 \xff"), "café \u{fffd}");
    }
}
