//! Page access: outline, text layer and rasterisation behind one trait.
//!
//! [`PageSource`] is what the conversions in [`crate::convert`] iterate over.
//! [`with_pdf_document`] opens a byte buffer with pdfium and lends a
//! [`PageSource`] to a closure; the pdfium document cannot outlive the
//! bindings it borrows, so the closure shape keeps both on the same stack
//! frame and releases them together.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::pipeline::toc::{TocEntry, UNKNOWN_PAGE};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Upper bound on outline entries; guards against cyclic bookmark trees.
const MAX_TOC_ENTRIES: usize = 10_000;

/// Read access to the pages of an opened document.
pub trait PageSource {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Flattened outline, depth-first, level 1 at the root.
    fn toc(&self) -> Vec<TocEntry>;

    /// Text layer of page `index` (0-based).
    fn page_text(&self, index: usize) -> Result<String, ConvertError>;

    /// Rasterise page `index` (0-based) at `dpi`.
    fn render_page(&self, index: usize, dpi: u32) -> Result<DynamicImage, ConvertError>;
}

/// Bind to pdfium: the configured directory, else `./` then the system path.
pub fn bind_pdfium(lib_dir: Option<&Path>) -> Result<Pdfium, ConvertError> {
    let bindings = match lib_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| ConvertError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Open `bytes` as a PDF and run `f` against it.
pub fn with_pdf_document<R>(
    bytes: &[u8],
    config: &ConversionConfig,
    f: impl FnOnce(&dyn PageSource) -> Result<R, ConvertError>,
) -> Result<R, ConvertError> {
    let pdfium = bind_pdfium(config.pdfium_lib_dir.as_deref())?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| ConvertError::CorruptPdf(format!("{:?}", e)))?;

    let source = PdfiumSource { document };
    info!("PDF loaded: {} pages", source.page_count());

    f(&source)
}

/// [`PageSource`] over a loaded pdfium document.
struct PdfiumSource<'a> {
    document: PdfDocument<'a>,
}

impl PdfiumSource<'_> {
    fn page(&self, index: usize) -> Result<PdfPage<'_>, PdfiumError> {
        self.document.pages().get(index as u16)
    }
}

impl PageSource for PdfiumSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn toc(&self) -> Vec<TocEntry> {
        let mut entries = Vec::new();
        collect_outline(self.document.bookmarks().root(), 1, &mut entries);
        debug!("Outline: {} entries", entries.len());
        entries
    }

    fn page_text(&self, index: usize) -> Result<String, ConvertError> {
        let failed = |e: PdfiumError| ConvertError::PageTextFailed {
            page: index + 1,
            detail: format!("{:?}", e),
        };

        let page = self.page(index).map_err(failed)?;
        let text = page.text().map_err(failed)?.all();
        Ok(normalize_page_text(&text))
    }

    fn render_page(&self, index: usize, dpi: u32) -> Result<DynamicImage, ConvertError> {
        let failed = |e: PdfiumError| ConvertError::RasterisationFailed {
            page: index + 1,
            detail: format!("{:?}", e),
        };

        let page = self.page(index).map_err(failed)?;
        let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);
        let bitmap = page.render_with_config(&render_config).map_err(failed)?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}

/// Walk `first` and its siblings, recursing into children one level deeper.
fn collect_outline(first: Option<PdfBookmark<'_>>, level: usize, out: &mut Vec<TocEntry>) {
    let mut current = first;
    while let Some(bookmark) = current {
        if out.len() >= MAX_TOC_ENTRIES {
            return;
        }

        let page = bookmark
            .destination()
            .and_then(|dest| dest.page_index().ok())
            .map(|idx| idx as i64 + 1)
            .unwrap_or(UNKNOWN_PAGE);
        out.push(TocEntry::new(level, bookmark.title().unwrap_or_default(), page));

        collect_outline(bookmark.first_child(), level + 1, out);
        current = bookmark.next_sibling();
    }
}

/// Unify line endings and end every page on a newline so pages never glue.
pub(crate) fn normalize_page_text(raw: &str) -> String {
    let mut text = raw.replace("\r\n", "\n").replace('\r', "\n");
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
