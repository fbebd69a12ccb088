//! EPUB text extraction.
//!
//! The `epub` reader opens containers by path, so the uploaded bytes go to a
//! [`NamedTempFile`] first. The temp file is a drop guard: it is unlinked
//! when this module returns, on the success path, on every `?`, and during
//! unwinding. The reader is closed before the guard drops.

use crate::error::ConvertError;
use epub::doc::{EpubDoc, ResourceItem};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

const XHTML_MIME: &str = "application/xhtml+xml";

/// Wrap width handed to the HTML renderer; large enough to never wrap prose.
const RENDER_WIDTH: usize = 10_000;

/// Extract the text of every document item, joined with `"\n"`.
///
/// Spine items come first, in reading order; document items listed only in
/// the manifest follow, sorted by path.
pub fn extract_epub_text(bytes: &[u8], scratch_dir: Option<&Path>) -> Result<String, ConvertError> {
    let dir = scratch_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(std::env::temp_dir);

    let tmp = write_scratch_copy(bytes, &dir)?;
    debug!("EPUB scratch copy: {}", tmp.path().display());

    read_document_items(tmp.path())
}

fn write_scratch_copy(bytes: &[u8], dir: &Path) -> Result<NamedTempFile, ConvertError> {
    let temp_err = |source: std::io::Error| ConvertError::TempFile {
        dir: dir.to_path_buf(),
        source,
    };

    let mut tmp = tempfile::Builder::new()
        .prefix("file2txt-")
        .suffix(".epub")
        .tempfile_in(dir)
        .map_err(temp_err)?;
    tmp.write_all(bytes).map_err(temp_err)?;
    tmp.flush().map_err(temp_err)?;
    Ok(tmp)
}

fn read_document_items(path: &Path) -> Result<String, ConvertError> {
    let mut doc = EpubDoc::new(path).map_err(|e| ConvertError::EpubOpen(e.to_string()))?;

    let mut items = Vec::new();
    let mut visited = HashSet::new();
    loop {
        if let Some(id) = doc.get_current_id() {
            if visited.insert(id) {
                if let Some((content, _mime)) = doc.get_current_str() {
                    items.push(html_to_text(&content));
                }
            }
        }
        if !doc.go_next() {
            break;
        }
    }
    let spine_items = items.len();

    // Manifest documents outside the spine (notes, non-linear extras), by path.
    let mut extras: Vec<(PathBuf, String)> = doc
        .resources
        .iter()
        .filter(|(id, item)| {
            item.mime == XHTML_MIME && !visited.contains(*id) && !is_nav_document(item)
        })
        .map(|(id, item)| (item.path.clone(), id.clone()))
        .collect();
    extras.sort();
    for (_, id) in extras {
        if let Some((content, _mime)) = doc.get_resource_str(&id) {
            items.push(html_to_text(&content));
        }
    }

    info!(
        "EPUB: extracted {} document items ({} outside the spine)",
        items.len(),
        items.len() - spine_items
    );
    Ok(items.join("\n"))
}

/// EPUB 3 navigation documents are navigation, not content.
fn is_nav_document(item: &ResourceItem) -> bool {
    item.properties
        .as_deref()
        .is_some_and(|p| p.split_whitespace().any(|prop| prop == "nav"))
}

/// Strip markup, keeping only the text content.
pub fn html_to_text(html: &str) -> String {
    match html2text::config::plain().string_from_read(html.as_bytes(), RENDER_WIDTH) {
        Ok(text) => text,
        Err(err) => {
            warn!("HTML to text failed, keeping raw markup: {err}");
            html.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags() {
        let text = html_to_text("<html><body><p>Hello <b>World</b>!</p></body></html>");
        assert!(text.contains("Hello World!"), "got: {text:?}");
        assert!(!text.contains('<'));
    }

    #[test]
    fn keeps_cjk_text() {
        let text = html_to_text("<p>第一章 开始</p>");
        assert!(text.contains("第一章 开始"), "got: {text:?}");
    }

    #[test]
    fn garbage_fails_and_leaves_no_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract_epub_text(b"not a zip archive", Some(dir.path()));
        assert!(matches!(result, Err(ConvertError::EpubOpen(_))), "got: {result:?}");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn nav_property_marks_navigation_documents() {
        let item = |properties: Option<&str>| ResourceItem {
            path: PathBuf::from("OEBPS/nav.xhtml"),
            mime: XHTML_MIME.to_string(),
            properties: properties.map(str::to_string),
        };
        assert!(is_nav_document(&item(Some("nav"))));
        assert!(is_nav_document(&item(Some("scripted nav"))));
        assert!(!is_nav_document(&item(Some("navigation"))));
        assert!(!is_nav_document(&item(None)));
    }

    #[test]
    fn missing_scratch_dir_is_a_temp_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("does-not-exist");
        let result = extract_epub_text(b"PK", Some(&gone));
        assert!(matches!(result, Err(ConvertError::TempFile { .. })), "got: {result:?}");
    }
}
