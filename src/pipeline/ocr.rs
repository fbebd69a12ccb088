//! OCR engines: rasterised page → recognised text.
//!
//! The default engine shells out to the `tesseract` binary, feeding the page
//! as PNG on stdin and reading UTF-8 text from stdout, so no scratch files
//! are involved. PNG is lossless; JPEG artefacts around glyph edges hurt
//! recognition of dense CJK text.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use image::DynamicImage;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Anything that turns a page image into text.
pub trait OcrEngine {
    /// Recognise `image`, which is page `page_num` (1-indexed; for messages).
    fn recognize(&self, image: &DynamicImage, page_num: usize) -> Result<String, ConvertError>;
}

/// Tesseract CLI engine.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: PathBuf,
    languages: String,
    dpi: u32,
}

impl TesseractEngine {
    pub fn new(command: impl Into<PathBuf>, languages: impl Into<String>, dpi: u32) -> Self {
        Self {
            command: command.into(),
            languages: languages.into(),
            dpi,
        }
    }

    pub fn from_config(config: &ConversionConfig) -> Self {
        Self::new(
            config.tesseract_cmd.clone(),
            config.ocr_languages.clone(),
            config.ocr_dpi,
        )
    }

    /// `tesseract --version` succeeds.
    pub fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn command_name(&self) -> String {
        self.command.display().to_string()
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &DynamicImage, page_num: usize) -> Result<String, ConvertError> {
        let png = encode_png(image).map_err(|e| ConvertError::OcrFailed {
            page: page_num,
            detail: format!("PNG encoding failed: {e}"),
        })?;

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", self.languages.as_str(), "--dpi"])
            .arg(self.dpi.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ConvertError::OcrEngineUnavailable {
                command: self.command_name(),
                detail: e.to_string(),
            })?;

        // Tesseract reads all of stdin before writing anything, so writing
        // the whole image first cannot deadlock on the output pipes.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&png).map_err(|e| ConvertError::OcrFailed {
                page: page_num,
                detail: format!("writing image to {}: {e}", self.command_name()),
            })?;
        }

        let output = child.wait_with_output().map_err(|e| ConvertError::OcrFailed {
            page: page_num,
            detail: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConvertError::OcrFailed {
                page: page_num,
                detail: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("OCR page {} → {} bytes", page_num, text.len());
        Ok(text)
    }
}

/// Encode a rasterised page as RGB PNG bytes.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}
