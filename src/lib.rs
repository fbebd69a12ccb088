//! # file2txt
//!
//! Convert EPUB and PDF documents to plain text, behind a single-page web UI.
//!
//! ## Conversions
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | EPUB  | [`epub_to_text`] | text of every document item, joined with `\n` |
//! | PDF (text layer) | [`pdf_to_text`] | page texts + rendered outline |
//! | PDF (scanned) | [`pdf_ocr`] | Tesseract text per page (`--- Page N ---`) + outline |
//!
//! Each has a `try_*` twin returning [`ConvertError`]. The plain forms never
//! fail: the error message is returned in place of the text so the UI can
//! show it like any other output.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload ──▶ session::run_request ──▶ convert::* ──▶ SessionState ──▶ web page
//!                (by extension)      (blocking,        (all slots
//!                                     spawn_blocking)   swapped at once)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use file2txt::{pdf_ocr, ConversionConfig, NoopProgressCallback};
//!
//! let bytes = std::fs::read("scan.pdf").unwrap();
//! let config = ConversionConfig::default(); // 300 DPI, chi_sim+eng
//! let out = pdf_ocr(&bytes, &config, &NoopProgressCallback);
//! println!("{}{}", out.toc, out.text);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `file2txt` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Runtime requirements
//!
//! * the pdfium shared library (next to the binary, on the system path, or
//!   via `--pdfium-lib`)
//! * the `tesseract` binary with the `chi_sim` and `eng` language data for OCR

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod session;
pub mod web;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{
    epub_to_text, pdf_ocr, pdf_to_text, try_epub_to_text, try_pdf_ocr, try_pdf_to_text,
};
pub use error::{ConvertError, ErrorContext};
pub use output::{DocumentKind, PdfExtraction};
pub use pipeline::toc::{render_toc, TocEntry};
pub use progress::{
    ConversionProgressCallback, NoopProgressCallback, ProgressCallback, ProgressTracker,
};
pub use session::{ConversionRequest, Dispatch, PdfMode, SessionState};
