//! Error types for the grobid2md library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Grobid2MdError`] — **Fatal**: the document cannot be processed at all
//!   (missing input file, malformed TEI, GROBID unreachable, PDF unreadable).
//!   Returned as `Err(Grobid2MdError)` from the top-level `process_*` and
//!   `extract*` functions.
//!
//! * [`CropError`] — **Non-fatal**: a single figure, table or graphic could
//!   not be cropped (page out of range, degenerate rectangle, write failure)
//!   but every other element is fine. Stored inside
//!   [`crate::output::CropResult`] so a batch can report "N of M crops
//!   succeeded" instead of losing the whole document to one bad box.
//!
//! Elements with missing or unparseable coordinates and divisions without a
//! numbered heading are not errors at all: the extractors leave them out of
//! their result lists.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the grobid2md library.
///
/// Per-element crop failures use [`CropError`] and are stored in
/// [`crate::output::CropResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Grobid2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file (PDF or TEI) was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── TEI errors ────────────────────────────────────────────────────────
    /// The TEI document is not well-formed XML; nothing can be extracted.
    #[error("TEI document is not well-formed XML: {detail}")]
    MalformedXml { detail: String },

    // ── GROBID errors ─────────────────────────────────────────────────────
    /// The GROBID server could not be reached.
    #[error("GROBID server at '{url}' is unavailable: {reason}\nStart it with: docker run --rm -p 8070:8070 lfoppiano/grobid")]
    GrobidUnavailable { url: String, reason: String },

    /// GROBID answered, but with a non-success status.
    #[error("GROBID request failed with HTTP {status}: {body}")]
    GrobidRequestFailed { status: u16, body: String },

    /// GROBID did not answer within the configured timeout.
    #[error("GROBID request timed out after {secs}s\nIncrease --timeout for long papers.")]
    GrobidTimeout { secs: u64 },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be opened by pdfium.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file (Markdown, TEI, manifest).
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place libpdfium next to the grobid2md executable.\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single cropped element.
///
/// Stored alongside [`crate::output::CropResult`] when a crop fails.
/// The remaining crops of the document continue regardless.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum CropError {
    /// The element's page does not exist in the PDF.
    #[error("page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: u32, total: usize },

    /// The rectangle collapses to nothing once clamped to the rendered page.
    #[error("region on page {page} is empty after clamping to the page bounds")]
    EmptyRegion { page: u32 },

    /// pdfium failed to rasterise the page.
    #[error("rendering page {page} failed: {detail}")]
    RenderFailed { page: u32, detail: String },

    /// The cropped image could not be written to disk.
    #[error("writing '{path}' failed: {detail}")]
    WriteFailed { path: PathBuf, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_xml_display() {
        let e = Grobid2MdError::MalformedXml {
            detail: "unexpected end of stream".into(),
        };
        assert!(e.to_string().contains("unexpected end of stream"));
    }

    #[test]
    fn grobid_request_failed_display() {
        let e = Grobid2MdError::GrobidRequestFailed {
            status: 503,
            body: "busy".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("503"), "got: {msg}");
        assert!(msg.contains("busy"), "got: {msg}");
    }

    #[test]
    fn grobid_timeout_display() {
        let e = Grobid2MdError::GrobidTimeout { secs: 120 };
        assert!(e.to_string().contains("120s"));
    }

    #[test]
    fn crop_page_out_of_range_display() {
        let e = CropError::PageOutOfRange { page: 9, total: 4 };
        let msg = e.to_string();
        assert!(msg.contains("page 9"), "got: {msg}");
        assert!(msg.contains("4 pages"), "got: {msg}");
    }

    #[test]
    fn crop_error_serialises() {
        let e = CropError::EmptyRegion { page: 2 };
        let json = serde_json::to_string(&e).expect("serialise");
        assert!(json.contains("EmptyRegion"), "got: {json}");
    }
}
