//! Table-of-contents rendering.
//!
//! Outline entries are flattened depth-first into `(level, title, page)` and
//! rendered as one indented line each under a fixed header.

use serde::{Deserialize, Serialize};

/// Header line that starts every rendered TOC.
pub const TOC_HEADER: &str = "目录:\n";

/// Line rendered when the document has no outline.
pub const TOC_NOT_FOUND: &str = "未找到目录。\n";

/// Page number used for bookmarks without a resolvable destination.
pub const UNKNOWN_PAGE: i64 = -1;

/// One outline entry. `level` starts at 1, `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub level: usize,
    pub title: String,
    pub page: i64,
}

impl TocEntry {
    pub fn new(level: usize, title: impl Into<String>, page: i64) -> Self {
        Self {
            level,
            title: title.into(),
            page,
        }
    }

    /// `"<indent>- <title> (页码 <page>)\n"` with two spaces per level below 1.
    pub fn render_line(&self) -> String {
        format!(
            "{}- {} (页码 {})\n",
            "  ".repeat(self.level.saturating_sub(1)),
            self.title,
            self.page
        )
    }
}

/// Render a full TOC block, header included.
pub fn render_toc(entries: &[TocEntry]) -> String {
    let mut out = String::from(TOC_HEADER);
    if entries.is_empty() {
        out.push_str(TOC_NOT_FOUND);
    } else {
        for entry in entries {
            out.push_str(&entry.render_line());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_one_entry() {
        let e = TocEntry::new(1, "Chapter 1", 5);
        assert_eq!(e.render_line(), "- Chapter 1 (页码 5)\n");
    }

    #[test]
    fn level_two_adds_one_indent() {
        let e = TocEntry::new(2, "Section 1.1", 6);
        assert_eq!(e.render_line(), "  - Section 1.1 (页码 6)\n");
    }

    #[test]
    fn empty_toc_has_sentinel() {
        assert_eq!(render_toc(&[]), "目录:\n未找到目录。\n");
    }

    #[test]
    fn nested_block() {
        let toc = render_toc(&[
            TocEntry::new(1, "Intro", 1),
            TocEntry::new(2, "Scope", 2),
            TocEntry::new(3, "Terms", 2),
            TocEntry::new(1, "Appendix", UNKNOWN_PAGE),
        ]);
        assert_eq!(
            toc,
            "目录:\n- Intro (页码 1)\n  - Scope (页码 2)\n    - Terms (页码 2)\n- Appendix (页码 -1)\n"
        );
    }
}
