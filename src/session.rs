//! UI session state and request dispatch.
//!
//! [`SessionState`] holds what the page shows: the primary text, its download
//! name, the TOC and the optional secondary text. [`run_request`] picks the
//! conversion from the upload's extension and produces a complete
//! [`ConversionOutcome`]; [`SessionState::apply`] swaps all four result slots
//! at once, so a reader never sees a mix of two conversions.

use crate::config::ConversionConfig;
use crate::convert::{epub_to_text, pdf_ocr, pdf_to_text};
use crate::output::{
    display_name, primary_file_name, secondary_file_name, DocumentKind, OutputFlavor,
};
use crate::progress::ConversionProgressCallback;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Warning shown for uploads that are neither `.epub` nor `.pdf`.
pub const UNSUPPORTED_FILE_WARNING: &str = "上传的文件类型无法识别。请上传 .epub 或 .pdf 文件。";

/// How a PDF is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfMode {
    /// Text layer (text-based PDFs).
    #[default]
    Text,
    /// Rasterise and OCR (scanned PDFs).
    Ocr,
}

impl PdfMode {
    /// Parse the form value; anything but `ocr` means text extraction.
    pub fn from_form_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("ocr") {
            PdfMode::Ocr
        } else {
            PdfMode::Text
        }
    }
}

/// One upload plus the options chosen next to it.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub pdf_mode: PdfMode,
    /// With OCR, also run the text-layer extraction as a secondary result.
    pub extra_text: bool,
}

/// Everything one conversion writes into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub processed_text: String,
    pub file_name: String,
    pub toc: Option<String>,
    pub secondary_text: Option<String>,
}

/// Result of dispatching a request by file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Converted(ConversionOutcome),
    Unsupported,
}

/// Run the conversion matching `request.file_name`. Blocks.
pub fn run_request(
    request: &ConversionRequest,
    config: &ConversionConfig,
    progress: &dyn ConversionProgressCallback,
) -> Dispatch {
    let Some(kind) = DocumentKind::from_file_name(&request.file_name) else {
        warn!("Unsupported upload: {}", display_name(&request.file_name));
        return Dispatch::Unsupported;
    };
    info!(
        "Converting {} ({:?}, {} bytes)",
        display_name(&request.file_name),
        kind,
        request.bytes.len()
    );

    let outcome = match (kind, request.pdf_mode) {
        (DocumentKind::Epub, _) => ConversionOutcome {
            processed_text: epub_to_text(&request.bytes, config),
            file_name: primary_file_name(&request.file_name, OutputFlavor::Epub),
            toc: None,
            secondary_text: None,
        },
        (DocumentKind::Pdf, PdfMode::Text) => {
            let extraction = pdf_to_text(&request.bytes, config);
            ConversionOutcome {
                processed_text: extraction.text,
                file_name: primary_file_name(&request.file_name, OutputFlavor::Text),
                toc: non_empty(extraction.toc),
                secondary_text: None,
            }
        }
        (DocumentKind::Pdf, PdfMode::Ocr) => {
            let extraction = pdf_ocr(&request.bytes, config, progress);
            let secondary_text = if request.extra_text {
                non_empty(pdf_to_text(&request.bytes, config).text)
            } else {
                None
            };
            ConversionOutcome {
                processed_text: extraction.text,
                file_name: primary_file_name(&request.file_name, OutputFlavor::Ocr),
                toc: non_empty(extraction.toc),
                secondary_text,
            }
        }
    };
    Dispatch::Converted(outcome)
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// What one browser session currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub processed_text: Option<String>,
    pub file_name: Option<String>,
    pub toc: Option<String>,
    pub secondary_text: Option<String>,
    /// Last warning, cleared by the next successful dispatch.
    pub notice: Option<String>,
}

impl SessionState {
    /// Replace all four result slots with `outcome`.
    pub fn apply(&mut self, outcome: ConversionOutcome) {
        *self = SessionState {
            processed_text: Some(outcome.processed_text),
            file_name: Some(outcome.file_name),
            toc: outcome.toc,
            secondary_text: outcome.secondary_text,
            notice: None,
        };
    }

    /// Record a dispatch result. Unsupported uploads keep the old results.
    pub fn record(&mut self, dispatch: Dispatch) {
        match dispatch {
            Dispatch::Converted(outcome) => self.apply(outcome),
            Dispatch::Unsupported => self.notice = Some(UNSUPPORTED_FILE_WARNING.to_string()),
        }
    }

    /// Primary text is present and non-empty.
    pub fn has_result(&self) -> bool {
        self.processed_text.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// `(file name, text)` for the primary download.
    pub fn primary_download(&self) -> Option<(String, &str)> {
        if !self.has_result() {
            return None;
        }
        let name = self.file_name.clone()?;
        Some((name, self.processed_text.as_deref()?))
    }

    /// `(file name, text)` for the secondary download.
    pub fn secondary_download(&self) -> Option<(String, &str)> {
        let (primary, _) = self.primary_download()?;
        let text = self.secondary_text.as_deref().filter(|t| !t.is_empty())?;
        Some((secondary_file_name(&primary), text))
    }

    /// Serializable snapshot for the page.
    pub fn view(&self) -> SessionView {
        SessionView {
            has_result: self.has_result(),
            processed_text: self.processed_text.clone(),
            file_name: self.file_name.clone(),
            toc: self.toc.clone().filter(|t| !t.is_empty()),
            secondary_text: self.secondary_text.clone().filter(|t| !t.is_empty()),
            secondary_file_name: self.secondary_download().map(|(name, _)| name),
            notice: self.notice.clone(),
        }
    }
}

/// JSON shape consumed by the single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub has_result: bool,
    pub processed_text: Option<String>,
    pub file_name: Option<String>,
    pub toc: Option<String>,
    pub secondary_text: Option<String>,
    pub secondary_file_name: Option<String>,
    pub notice: Option<String>,
}
