//! The three conversions.
//!
//! Each conversion comes in two forms:
//!
//! * `try_*`: returns `Result<_, ConvertError>` for library callers.
//! * the plain name: never fails; an error becomes the text itself,
//!   prefixed per [`ErrorContext`], with an empty TOC. The UI displays
//!   whatever comes back without inspecting it.
//!
//! All of them block. Run them on `spawn_blocking` from async code.

use crate::config::ConversionConfig;
use crate::error::{ConvertError, ErrorContext};
use crate::output::PdfExtraction;
use crate::pipeline::epub::extract_epub_text;
use crate::pipeline::ocr::{OcrEngine, TesseractEngine};
use crate::pipeline::source::{with_pdf_document, PageSource};
use crate::pipeline::toc::render_toc;
use crate::progress::{progress_fraction, ConversionProgressCallback};
use std::time::Instant;
use tracing::{info, warn};

// ── EPUB ─────────────────────────────────────────────────────────────────

/// EPUB bytes → plain text.
pub fn try_epub_to_text(bytes: &[u8], config: &ConversionConfig) -> Result<String, ConvertError> {
    let start = Instant::now();
    let text = extract_epub_text(bytes, config.scratch_dir.as_deref())?;
    info!(
        "EPUB converted: {} chars in {}ms",
        text.chars().count(),
        start.elapsed().as_millis()
    );
    Ok(text)
}

/// EPUB bytes → plain text, or the error message in its place.
pub fn epub_to_text(bytes: &[u8], config: &ConversionConfig) -> String {
    try_epub_to_text(bytes, config).unwrap_or_else(|e| report(ErrorContext::Epub, &e))
}

// ── PDF text layer ───────────────────────────────────────────────────────

/// PDF bytes → text layer + rendered TOC.
pub fn try_pdf_to_text(
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<PdfExtraction, ConvertError> {
    with_pdf_document(bytes, config, extract_text_layer)
}

/// PDF bytes → text layer + TOC, or `(error message, "")`.
pub fn pdf_to_text(bytes: &[u8], config: &ConversionConfig) -> PdfExtraction {
    try_pdf_to_text(bytes, config)
        .unwrap_or_else(|e| PdfExtraction::new(report(ErrorContext::PdfText, &e), ""))
}

/// Concatenate every page's text layer in page order.
pub fn extract_text_layer(source: &dyn PageSource) -> Result<PdfExtraction, ConvertError> {
    let toc = render_toc(&source.toc());

    let mut text = String::new();
    for idx in 0..source.page_count() {
        text.push_str(&source.page_text(idx)?);
    }

    info!(
        "Text layer extracted: {} pages, {} chars",
        source.page_count(),
        text.chars().count()
    );
    Ok(PdfExtraction { text, toc })
}

// ── PDF OCR ──────────────────────────────────────────────────────────────

/// PDF bytes → OCR text + rendered TOC, reporting progress after each page.
pub fn try_pdf_ocr(
    bytes: &[u8],
    config: &ConversionConfig,
    progress: &dyn ConversionProgressCallback,
) -> Result<PdfExtraction, ConvertError> {
    let engine = TesseractEngine::from_config(config);
    with_pdf_document(bytes, config, |source| {
        ocr_pages(source, &engine, config.ocr_dpi, progress)
    })
}

/// PDF bytes → OCR text + TOC, or `(error message, "")`.
pub fn pdf_ocr(
    bytes: &[u8],
    config: &ConversionConfig,
    progress: &dyn ConversionProgressCallback,
) -> PdfExtraction {
    try_pdf_ocr(bytes, config, progress)
        .unwrap_or_else(|e| PdfExtraction::new(report(ErrorContext::PdfOcr, &e), ""))
}

/// Rasterise and recognise every page in order.
///
/// Each page's text is preceded by `"\n--- Page N ---\n"`. After page `i` of
/// `n`, `progress.on_progress(i / n)` is called; page `i + 1` is not started
/// before that.
pub fn ocr_pages(
    source: &dyn PageSource,
    engine: &dyn OcrEngine,
    dpi: u32,
    progress: &dyn ConversionProgressCallback,
) -> Result<PdfExtraction, ConvertError> {
    let start = Instant::now();
    let toc = render_toc(&source.toc());
    let total = source.page_count();
    info!("OCR: {} pages at {} DPI", total, dpi);
    progress.on_conversion_start(total);

    let mut text = String::new();
    for idx in 0..total {
        let page_num = idx + 1;
        progress.on_page_start(page_num, total);

        let image = source.render_page(idx, dpi)?;
        let page_text = engine.recognize(&image, page_num)?;

        text.push_str(&format!("\n--- Page {page_num} ---\n"));
        text.push_str(&page_text);

        progress.on_page_complete(page_num, total, page_text.len());
        progress.on_progress(progress_fraction(page_num, total));
    }

    progress.on_conversion_complete(total);
    info!(
        "OCR finished: {} pages in {}ms",
        total,
        start.elapsed().as_millis()
    );
    Ok(PdfExtraction { text, toc })
}

fn report(context: ErrorContext, err: &ConvertError) -> String {
    warn!("{} failed: {}", context.prefix(), err);
    context.message(err)
}
