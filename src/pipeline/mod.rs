//! Pipeline stages around the TEI extraction core.
//!
//! Each submodule implements exactly one step, so each can be tested without
//! the others (the GROBID client without pdfium, the cropper without GROBID).
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ grobid ──▶ crate::tei ──▶ markdown
//! (URL/path) (HTTP)    (extract)   └─▶ crop
//!                                     (pdfium)
//! ```
//!
//! 1. [`input`]    — canonicalise the user-supplied path or URL to a local PDF
//! 2. [`grobid`]   — send the PDF to GROBID, receive TEI XML with `coords`
//! 3. [`markdown`] — render sections as heading-levelled Markdown and write
//!    files atomically
//! 4. [`crop`]     — cut figure, table and graphic regions out of the PDF;
//!    runs in `spawn_blocking` because pdfium is not async-safe

pub mod crop;
pub mod grobid;
pub mod input;
pub mod markdown;
