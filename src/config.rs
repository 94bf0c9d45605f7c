//! Configuration types for TEI extraction and figure cropping.
//!
//! All behaviour is controlled through [`ExtractionConfig`], built via its
//! [`ExtractionConfigBuilder`]. One struct carries every knob so it can be
//! shared across the documents of a batch and printed when debugging a run.

use crate::error::Grobid2MdError;
use crate::progress::ExtractionProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Elements GROBID is asked to annotate with `coords` by default.
pub const DEFAULT_TEI_COORDINATES: &[&str] =
    &["persName", "figure", "ref", "biblStruct", "formula", "s"];

/// Configuration for extracting one or more documents.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use grobid2md::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .grobid_url("http://grobid.internal:8070")
///     .crop_scale(3.0)
///     .extract_graphics(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.crop_scale, 3.0);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Base URL of the GROBID service. Default: `http://localhost:8070`.
    pub grobid_url: String,

    /// Timeout for one `processFulltextDocument` call, in seconds. Default: 120.
    ///
    /// Full-text processing of a long paper with citation consolidation can
    /// take well over a minute on a busy server.
    pub request_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Options forwarded to GROBID with every request.
    pub grobid: GrobidOptions,

    /// Crop figures and tables from the PDF. Default: true.
    pub extract_figures: bool,

    /// Crop nested graphics from the PDF. Default: true.
    pub extract_graphics: bool,

    /// Pixels per page-coordinate unit when rasterising a page for cropping.
    /// Range: 0.5–8.0. Default: 2.0.
    pub crop_scale: f32,

    /// Number of caption characters used in image file names. Default: 30.
    pub caption_prefix_len: usize,

    /// Documents processed at once by [`crate::process_batch`]. Default: 4.
    pub concurrency: usize,

    /// Write `<stem>-manifest.json` next to the Markdown. Default: true.
    pub write_manifest: bool,

    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ExtractionProgressCallback>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            grobid_url: "http://localhost:8070".to_string(),
            request_timeout_secs: 120,
            download_timeout_secs: 120,
            grobid: GrobidOptions::default(),
            extract_figures: true,
            extract_graphics: true,
            crop_scale: 2.0,
            caption_prefix_len: 30,
            concurrency: 4,
            write_manifest: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("grobid_url", &self.grobid_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("grobid", &self.grobid)
            .field("extract_figures", &self.extract_figures)
            .field("extract_graphics", &self.extract_graphics)
            .field("crop_scale", &self.crop_scale)
            .field("caption_prefix_len", &self.caption_prefix_len)
            .field("concurrency", &self.concurrency)
            .field("write_manifest", &self.write_manifest)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// `true` when any kind of crop is enabled.
    pub fn wants_crops(&self) -> bool {
        self.extract_figures || self.extract_graphics
    }
}

/// Builder for [`ExtractionConfig`].
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl fmt::Debug for ExtractionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ExtractionConfigBuilder {
    pub fn grobid_url(mut self, url: impl Into<String>) -> Self {
        self.config.grobid_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn grobid_options(mut self, options: GrobidOptions) -> Self {
        self.config.grobid = options;
        self
    }

    pub fn extract_figures(mut self, v: bool) -> Self {
        self.config.extract_figures = v;
        self
    }

    pub fn extract_graphics(mut self, v: bool) -> Self {
        self.config.extract_graphics = v;
        self
    }

    pub fn crop_scale(mut self, scale: f32) -> Self {
        self.config.crop_scale = scale.clamp(0.5, 8.0);
        self
    }

    pub fn caption_prefix_len(mut self, n: usize) -> Self {
        self.config.caption_prefix_len = n;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn write_manifest(mut self, v: bool) -> Self {
        self.config.write_manifest = v;
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn ExtractionProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, Grobid2MdError> {
        let c = &self.config;
        if c.grobid_url.is_empty() {
            return Err(Grobid2MdError::InvalidConfig(
                "GROBID URL must not be empty".into(),
            ));
        }
        if !(c.grobid_url.starts_with("http://") || c.grobid_url.starts_with("https://")) {
            return Err(Grobid2MdError::InvalidConfig(format!(
                "GROBID URL must start with http:// or https://, got '{}'",
                c.grobid_url
            )));
        }
        if c.concurrency == 0 {
            return Err(Grobid2MdError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.caption_prefix_len == 0 {
            return Err(Grobid2MdError::InvalidConfig(
                "Caption prefix length must be ≥ 1".into(),
            ));
        }
        if !c.crop_scale.is_finite() {
            return Err(Grobid2MdError::InvalidConfig(format!(
                "Crop scale must be finite, got {}",
                c.crop_scale
            )));
        }
        Ok(self.config)
    }
}

// ── GROBID request options ───────────────────────────────────────────────

/// Per-request flags sent to `processFulltextDocument`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrobidOptions {
    /// Element names GROBID should annotate with `coords`.
    pub tei_coordinates: Vec<String>,
    /// Resolve header metadata against external bibliographic services.
    pub consolidate_header: bool,
    /// Resolve each citation against external bibliographic services.
    pub consolidate_citations: bool,
    /// Add `xml:id` attributes to generated elements.
    pub generate_ids: bool,
    /// Wrap sentences in `<s>` elements.
    pub segment_sentences: bool,
}

impl Default for GrobidOptions {
    fn default() -> Self {
        Self {
            tei_coordinates: DEFAULT_TEI_COORDINATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            consolidate_header: false,
            consolidate_citations: false,
            generate_ids: false,
            segment_sentences: false,
        }
    }
}

impl GrobidOptions {
    /// Turn on both header and citation consolidation.
    pub fn consolidated(mut self) -> Self {
        self.consolidate_header = true;
        self.consolidate_citations = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ExtractionConfig::default();
        assert_eq!(c.grobid_url, "http://localhost:8070");
        assert_eq!(c.request_timeout_secs, 120);
        assert_eq!(c.crop_scale, 2.0);
        assert_eq!(c.caption_prefix_len, 30);
        assert_eq!(c.concurrency, 4);
        assert!(c.extract_figures && c.extract_graphics && c.write_manifest);
        assert_eq!(
            c.grobid.tei_coordinates,
            vec!["persName", "figure", "ref", "biblStruct", "formula", "s"]
        );
        assert!(!c.grobid.consolidate_header);
    }

    #[test]
    fn builder_trims_trailing_slash_and_clamps_scale() {
        let c = ExtractionConfig::builder()
            .grobid_url("https://grobid.example.org/")
            .crop_scale(100.0)
            .build()
            .unwrap();
        assert_eq!(c.grobid_url, "https://grobid.example.org");
        assert_eq!(c.crop_scale, 8.0);

        let low = ExtractionConfig::builder().crop_scale(0.01).build().unwrap();
        assert_eq!(low.crop_scale, 0.5);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for builder in [
            ExtractionConfig::builder().grobid_url(""),
            ExtractionConfig::builder().grobid_url("localhost:8070"),
            ExtractionConfig::builder().concurrency(0),
            ExtractionConfig::builder().caption_prefix_len(0),
        ] {
            let err = builder.build().unwrap_err();
            assert!(matches!(err, Grobid2MdError::InvalidConfig(_)), "got {err:?}");
        }
    }

    #[test]
    fn wants_crops_follows_flags() {
        let none = ExtractionConfig::builder()
            .extract_figures(false)
            .extract_graphics(false)
            .build()
            .unwrap();
        assert!(!none.wants_crops());
        assert!(ExtractionConfig::default().wants_crops());
    }

    #[test]
    fn consolidated_sets_both_flags() {
        let o = GrobidOptions::default().consolidated();
        assert!(o.consolidate_header && o.consolidate_citations);
        assert!(!o.generate_ids);
    }

    #[test]
    fn debug_hides_callback() {
        let c = ExtractionConfig::builder()
            .progress_callback(Arc::new(crate::progress::NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("<dyn ExtractionProgressCallback>"));
    }
}
