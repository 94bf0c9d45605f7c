//! Progress-callback trait for per-document and per-crop events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as documents are extracted and their figures cropped.
//!
//! # Example
//!
//! ```rust
//! use grobid2md::{ExtractionConfig, ExtractionProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     written: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_crop_complete(&self, index: usize, total: usize, path: &Path) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("crop {}/{} -> {}", index, total, path.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { written: AtomicUsize::new(0) });
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline as it works through a document.
///
/// Implementations must be `Send + Sync`: batch processing runs several
/// documents at once and cropping happens on a blocking worker thread. All
/// methods have default no-op implementations so callers only override what
/// they care about.
pub trait ExtractionProgressCallback: Send + Sync {
    /// A document (PDF path, URL or TEI file) is about to be processed.
    fn on_document_start(&self, input: &str) {
        let _ = input;
    }

    /// TEI extraction finished for the current document.
    fn on_extraction_summary(&self, sections: usize, figures: usize, graphics: usize) {
        let _ = (sections, figures, graphics);
    }

    /// Cropping is about to start.
    ///
    /// # Arguments
    /// * `total` — number of regions that will be cropped
    fn on_crops_start(&self, total: usize) {
        let _ = total;
    }

    /// One region was cropped and written.
    ///
    /// # Arguments
    /// * `index` — 1-based count of crops handled so far (pages ascending)
    /// * `total` — number of crops for this document
    /// * `path`  — image written
    fn on_crop_complete(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// One region could not be cropped. The remaining crops continue.
    fn on_crop_error(&self, index: usize, total: usize, error: String) {
        let _ = (index, total, error);
    }

    /// A document finished without a fatal error.
    ///
    /// # Arguments
    /// * `crops_succeeded` — crops written
    /// * `crops_total`     — crops attempted
    fn on_document_complete(&self, input: &str, crops_succeeded: usize, crops_total: usize) {
        let _ = (input, crops_succeeded, crops_total);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        documents: AtomicUsize,
        crops_total: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        finished_ok: AtomicUsize,
    }

    impl ExtractionProgressCallback for TrackingCallback {
        fn on_document_start(&self, _input: &str) {
            self.documents.fetch_add(1, Ordering::SeqCst);
        }

        fn on_crops_start(&self, total: usize) {
            self.crops_total.store(total, Ordering::SeqCst);
        }

        fn on_crop_complete(&self, _index: usize, _total: usize, _path: &Path) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_crop_error(&self, _index: usize, _total: usize, _error: String) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_complete(&self, _input: &str, crops_succeeded: usize, _crops_total: usize) {
            self.finished_ok.store(crops_succeeded, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_document_start("paper.pdf");
        cb.on_extraction_summary(4, 2, 1);
        cb.on_crops_start(3);
        cb.on_crop_complete(1, 3, Path::new("figures/figure_1.png"));
        cb.on_crop_error(2, 3, "page 9 is out of range".to_string());
        cb.on_document_complete("paper.pdf", 2, 3);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_document_start("a.pdf");
        tracker.on_crops_start(3);
        tracker.on_crop_complete(1, 3, Path::new("figures/figure_1.png"));
        tracker.on_crop_complete(2, 3, Path::new("figures/table_1.png"));
        tracker.on_crop_error(3, 3, "empty region".to_string());
        tracker.on_document_complete("a.pdf", 2, 3);

        assert_eq!(tracker.documents.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.crops_total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.finished_ok.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_document_start("x.xml");
        cb.on_extraction_summary(1, 0, 0);
    }
}
