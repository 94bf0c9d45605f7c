//! # grobid2md
//!
//! Turn academic PDFs into structured Markdown plus cropped figures, using
//! the TEI XML that a [GROBID](https://github.com/kermitt2/grobid) server
//! produces.
//!
//! GROBID already does the hard layout analysis: it finds numbered sections,
//! paragraphs, formulas, figures and tables, and annotates each visual block
//! with page coordinates. This crate reads that TEI, flattens it into an
//! ordered list of sections, reconciles the multi-box coordinate annotations
//! into one crop rectangle per figure, and cuts those rectangles out of the
//! original PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / URL
//!  │
//!  ├─ 1. Input     resolve local file or download from URL
//!  ├─ 2. GROBID    processFulltextDocument → TEI XML with coords
//!  ├─ 3. Extract   sections, figures/tables, graphics (crate::tei)
//!  ├─ 4. Markdown  <stem>-sections.md, headings from section numbers
//!  ├─ 5. Crop      figures/ and graphics/ PNGs via pdfium (spawn_blocking)
//!  └─ 6. Manifest  <stem>-manifest.json with everything above
//! ```
//!
//! Steps 3–6 also run on their own from an existing TEI file via
//! [`process_tei`], and step 3 alone is [`extract`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use grobid2md::{process_pdf, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder()
//!         .grobid_url("http://localhost:8070")
//!         .build()?;
//!     let output = process_pdf("paper.pdf", "out/paper", &config).await?;
//!     println!("{}", output.markdown_path.display());
//!     eprintln!(
//!         "{} sections, {}/{} crops",
//!         output.stats.sections, output.stats.crops_succeeded, output.stats.crops_attempted
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `grobid2md` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! grobid2md = { version = "0.1", default-features = false }
//! ```
//!
//! ## Runtime requirements
//!
//! * A GROBID server for PDF inputs (`docker run --rm -p 8070:8070 lfoppiano/grobid`).
//!   TEI inputs need no server.
//! * A pdfium shared library for cropping. Set `PDFIUM_LIB_PATH`, place it
//!   next to the executable, or install it system-wide.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod tei;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, GrobidOptions};
pub use convert::{extract, extract_file, is_tei_input, process_batch, process_pdf, process_tei};
pub use error::{CropError, Grobid2MdError};
pub use output::{BatchItem, CropResult, Extraction, ExtractionOutput, ExtractionStats};
pub use pipeline::grobid::GrobidClient;
pub use pipeline::markdown::render_markdown;
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use tei::{FigureTable, Graphic, Rectangle, Section, VisualKind};
