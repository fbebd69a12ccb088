//! Pipeline stages shared by the three conversions.
//!
//! ```text
//! EPUB bytes ──▶ epub (scratch file ▸ spine walk ▸ html2text)
//!
//! PDF bytes ──▶ source (pdfium) ──┬──▶ toc      (outline ▸ indented lines)
//!                                 ├──▶ text layer, page by page
//!                                 └──▶ render @ DPI ──▶ ocr (tesseract)
//! ```
//!
//! 1. [`epub`]: EPUB container → joined document text
//! 2. [`source`]: [`source::PageSource`] trait and the pdfium implementation
//! 3. [`toc`]: outline entries and their text rendering
//! 4. [`ocr`]: [`ocr::OcrEngine`] trait and the Tesseract CLI engine

pub mod epub;
pub mod ocr;
pub mod source;
pub mod toc;
