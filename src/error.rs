//! Error types for the file2txt library.
//!
//! Inside the library every failure is a typed [`ConvertError`] and travels
//! with `?`. The three public conversions in [`crate::convert`] are the only
//! place where an error is flattened into a display string: the UI shows that
//! string in place of the extracted text, exactly like a successful result.
//!
//! [`ErrorContext`] carries the prefix used for each conversion so the wording
//! stays in one place.

use std::path::PathBuf;
use thiserror::Error;

/// All failures a conversion can hit.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Could not create, write or remove the scratch copy of an upload.
    #[error("temporary file error in '{dir}': {source}")]
    TempFile {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The EPUB container could not be opened or its package parsed.
    #[error("cannot open EPUB: {0}")]
    EpubOpen(String),

    // ── PDF errors ────────────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH (or --pdfium-lib) to the directory holding libpdfium."
    )]
    PdfiumBindingFailed(String),

    /// The byte stream is not a readable PDF.
    #[error("cannot open PDF document: {0}")]
    CorruptPdf(String),

    /// pdfium failed to load or extract the text layer of a page.
    #[error("text extraction failed for page {page}: {detail}")]
    PageTextFailed { page: usize, detail: String },

    /// pdfium failed to rasterise a page.
    #[error("rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The OCR engine could not be started at all.
    #[error("OCR engine '{command}' is not available: {detail}")]
    OcrEngineUnavailable { command: String, detail: String },

    /// The OCR engine ran but failed on a page.
    #[error("OCR failed for page {page}: {detail}")]
    OcrFailed { page: usize, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Which conversion produced an error; selects the user-facing prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext {
    Epub,
    PdfText,
    PdfOcr,
}

impl ErrorContext {
    /// The prefix shown before the error description.
    pub fn prefix(self) -> &'static str {
        match self {
            ErrorContext::Epub => "处理EPUB文件时出错",
            ErrorContext::PdfText => "处理PDF文件时出错",
            ErrorContext::PdfOcr => "OCR处理PDF时出错",
        }
    }

    /// Render `err` the way it is shown to the user.
    pub fn message(self, err: &ConvertError) -> String {
        format!("{}: {}", self.prefix(), err)
    }
}
