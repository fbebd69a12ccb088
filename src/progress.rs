//! Progress-callback trait for per-page OCR events.
//!
//! [`crate::convert::pdf_ocr`] takes a `&dyn ConversionProgressCallback` and
//! reports to it after every page. Pages are processed strictly in order, so
//! the fractions passed to [`ConversionProgressCallback::on_progress`] are
//! strictly increasing and the last one is exactly `1.0`.
//!
//! # Example
//!
//! ```rust
//! use file2txt::ConversionProgressCallback;
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct Recorder {
//!     seen: Mutex<Vec<f64>>,
//! }
//!
//! impl ConversionProgressCallback for Recorder {
//!     fn on_progress(&self, fraction: f64) {
//!         self.seen.lock().unwrap().push(fraction);
//!     }
//! }
//!
//! let r = Recorder::default();
//! r.on_progress(0.5);
//! assert_eq!(*r.seen.lock().unwrap(), vec![0.5]);
//! ```

use std::sync::{Arc, Mutex};

/// Called by the OCR loop as it processes each page.
///
/// All methods have no-op defaults so callers only override what they need.
/// The trait is `Send + Sync` because the web UI reads the same sink from a
/// different thread than the one running the conversion.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first page.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before page `page_num` (1-indexed) is rasterised.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page has been recognised.
    ///
    /// `text_len` is the byte length of the recognised text.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, text_len: usize) {
        let _ = (page_num, total_pages, text_len);
    }

    /// Completed pages divided by total pages, reported after every page.
    fn on_progress(&self, fraction: f64) {
        let _ = fraction;
    }

    /// Called once after the last page.
    fn on_conversion_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias for a shareable callback.
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

/// Fraction of work done after `completed` of `total` pages.
pub fn progress_fraction(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 1.0;
    }
    completed as f64 / total as f64
}

/// Snapshot of a [`ProgressTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct ProgressSnapshot {
    /// A conversion is running.
    pub active: bool,
    /// Last reported fraction, `0.0` when idle.
    pub fraction: f64,
}

/// Shared progress sink polled by the web UI.
///
/// The OCR loop writes through the callback methods, the HTTP handler reads
/// [`ProgressTracker::snapshot`]. Cloning shares the same state.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    inner: Arc<Mutex<ProgressSnapshot>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a conversion as started with zero progress.
    pub fn begin(&self) {
        self.update(|s| {
            s.active = true;
            s.fraction = 0.0;
        });
    }

    /// [`begin`](Self::begin) unless a conversion is already running.
    ///
    /// Returns `false`, leaving the running conversion's progress alone,
    /// when the tracker is active.
    pub fn try_begin(&self) -> bool {
        let mut started = false;
        self.update(|s| {
            if !s.active {
                s.active = true;
                s.fraction = 0.0;
                started = true;
            }
        });
        started
    }

    /// Mark the tracker idle again (the progress bar disappears).
    pub fn finish(&self) {
        self.update(|s| {
            s.active = false;
            s.fraction = 0.0;
        });
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        match self.inner.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn update(&self, f: impl FnOnce(&mut ProgressSnapshot)) {
        match self.inner.lock() {
            Ok(mut guard) => f(&mut *guard),
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                f(&mut *guard)
            }
        }
    }
}

impl ConversionProgressCallback for ProgressTracker {
    fn on_conversion_start(&self, _total_pages: usize) {
        self.begin();
    }

    fn on_progress(&self, fraction: f64) {
        self.update(|s| s.fraction = fraction);
    }
}
