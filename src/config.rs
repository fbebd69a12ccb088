//! Configuration types for document conversion.
//!
//! All knobs live in [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. The defaults reproduce the stock behaviour:
//! 300 DPI rasterisation, Tesseract with `chi_sim+eng`, pdfium looked up next
//! to the executable and then on the system library path.

use crate::error::ConvertError;
use std::path::PathBuf;

/// Default OCR rasterisation resolution.
pub const DEFAULT_OCR_DPI: u32 = 300;

/// Default Tesseract language set: simplified Chinese plus English.
pub const DEFAULT_OCR_LANGUAGES: &str = "chi_sim+eng";

/// Configuration shared by all three conversions.
///
/// # Example
/// ```rust
/// use file2txt::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .ocr_dpi(200)
///     .ocr_languages("eng")
///     .build()
///     .unwrap();
/// assert_eq!(config.ocr_dpi, 200);
/// ```
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Rasterisation DPI for OCR. Range: 72–600. Default: 300.
    pub ocr_dpi: u32,

    /// Tesseract `-l` argument. Default: `chi_sim+eng`.
    pub ocr_languages: String,

    /// Tesseract executable name or path. Default: `tesseract`.
    pub tesseract_cmd: PathBuf,

    /// Directory containing the pdfium shared library.
    ///
    /// When `None`, the working directory is tried first, then the system
    /// library search path.
    pub pdfium_lib_dir: Option<PathBuf>,

    /// Where the EPUB scratch file is created. `None` means the OS temp dir.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            ocr_dpi: DEFAULT_OCR_DPI,
            ocr_languages: DEFAULT_OCR_LANGUAGES.to_string(),
            tesseract_cmd: PathBuf::from("tesseract"),
            pdfium_lib_dir: None,
            scratch_dir: None,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn ocr_dpi(mut self, dpi: u32) -> Self {
        self.config.ocr_dpi = dpi;
        self
    }

    pub fn ocr_languages(mut self, langs: impl Into<String>) -> Self {
        self.config.ocr_languages = langs.into();
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn pdfium_lib_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_dir = Some(dir.into());
        self
    }

    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = Some(dir.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if c.ocr_dpi < 72 || c.ocr_dpi > 600 {
            return Err(ConvertError::InvalidConfig(format!(
                "OCR DPI must be 72–600, got {}",
                c.ocr_dpi
            )));
        }
        if c.ocr_languages.trim().is_empty() {
            return Err(ConvertError::InvalidConfig(
                "OCR language list must not be empty".into(),
            ));
        }
        if c.tesseract_cmd.as_os_str().is_empty() {
            return Err(ConvertError::InvalidConfig(
                "tesseract command must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
