//! Result types and output naming.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Text and rendered table of contents from one PDF conversion.
///
/// On failure `text` holds the error message and `toc` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfExtraction {
    pub text: String,
    pub toc: String,
}

impl PdfExtraction {
    pub fn new(text: impl Into<String>, toc: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            toc: toc.into(),
        }
    }
}

/// Supported upload kinds, decided by file-name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Epub,
    Pdf,
}

impl DocumentKind {
    /// Case-sensitive suffix match: `book.EPUB` is not recognised.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".epub") {
            Some(DocumentKind::Epub)
        } else if name.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else {
            None
        }
    }
}

/// Which conversion produced a primary output; selects the file-name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFlavor {
    Epub,
    Text,
    Ocr,
}

impl OutputFlavor {
    fn suffix(self) -> &'static str {
        match self {
            OutputFlavor::Epub => "epub",
            OutputFlavor::Text => "text",
            OutputFlavor::Ocr => "ocr",
        }
    }
}

/// `name` without its last extension (`a.b.pdf` → `a.b`, `README` → `README`).
pub fn file_stem(name: &str) -> &str {
    // Only the final path component may carry the extension.
    let base_start = name.rfind(['/', '\\']).map_or(0, |i| i + 1);
    match name[base_start..].rfind('.') {
        Some(dot) if dot > 0 => &name[..base_start + dot],
        _ => name,
    }
}

/// `<stem>_<flavor>.txt` for an uploaded file name.
pub fn primary_file_name(upload_name: &str, flavor: OutputFlavor) -> String {
    format!("{}_{}.txt", file_stem(upload_name), flavor.suffix())
}

/// `<primary stem>_extra_text.txt` for the secondary download.
pub fn secondary_file_name(primary_name: &str) -> String {
    format!("{}_extra_text.txt", file_stem(primary_name))
}

/// Final path component of an upload name, for logging.
pub fn display_name(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name)
}
