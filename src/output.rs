//! Result types returned by the extraction pipeline.
//!
//! Everything here except [`BatchItem`] is `Serialize`: the same structures
//! are written to `<stem>-manifest.json` and printed by `grobid2md --json`.

use crate::error::{CropError, Grobid2MdError};
use crate::tei::{FigureTable, Graphic, Section};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The three independent views extracted from one TEI document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub sections: Vec<Section>,
    /// Figures first, then tables.
    pub figures: Vec<FigureTable>,
    pub graphics: Vec<Graphic>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.figures.is_empty() && self.graphics.is_empty()
    }
}

/// Outcome of cropping a single figure, table or graphic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropResult {
    /// `figure`, `table` or `graphic`.
    pub kind: String,
    /// 1-based position in the figure/table list or the graphic list.
    pub index: usize,
    /// 1-based page the region sits on.
    pub page: u32,
    /// Where the image was (or would have been) written.
    pub output_path: PathBuf,
    /// `None` when the image was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CropError>,
}

impl CropResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Counters and timings for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub sections: usize,
    pub figures: usize,
    pub tables: usize,
    pub graphics: usize,
    pub crops_attempted: usize,
    pub crops_succeeded: usize,
    pub crops_failed: usize,
    /// Time spent waiting for GROBID; zero when starting from a TEI file.
    pub grobid_duration_ms: u64,
    pub extraction_duration_ms: u64,
    pub crop_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything produced for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// `<stem>-sections.md`.
    pub markdown_path: PathBuf,
    /// TEI the extraction ran on (the GROBID response when starting from a PDF).
    pub tei_path: PathBuf,
    /// Source PDF used for cropping, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<PathBuf>,
    /// `<stem>-manifest.json`, when written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_path: Option<PathBuf>,
    pub extraction: Extraction,
    pub crops: Vec<CropResult>,
    pub stats: ExtractionStats,
}

/// One entry of a batch run, in input order.
#[derive(Debug)]
pub struct BatchItem {
    pub input: String,
    pub result: Result<ExtractionOutput, Grobid2MdError>,
}

impl BatchItem {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Serialisable view with the error rendered as text.
    pub fn report(&self) -> BatchReport<'_> {
        match &self.result {
            Ok(output) => BatchReport {
                input: &self.input,
                output: Some(output),
                error: None,
            },
            Err(e) => BatchReport {
                input: &self.input,
                output: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// JSON-friendly form of a [`BatchItem`].
#[derive(Debug, Serialize)]
pub struct BatchReport<'a> {
    pub input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<&'a ExtractionOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tei::{Rectangle, VisualKind};

    fn sample_output() -> ExtractionOutput {
        ExtractionOutput {
            markdown_path: "out/paper-sections.md".into(),
            tei_path: "out/paper.grobid.tei.xml".into(),
            pdf_path: None,
            manifest_path: None,
            extraction: Extraction {
                sections: vec![Section::new("1", "Intro", "Hello world")],
                figures: vec![FigureTable {
                    kind: VisualKind::Figure,
                    caption: "Fig 1".into(),
                    rect: Rectangle::new(1, 0.0, 0.0, 50.0, 50.0),
                }],
                graphics: vec![],
            },
            crops: vec![CropResult {
                kind: "figure".into(),
                index: 1,
                page: 1,
                output_path: "out/figures/figure_1_Fig_1.png".into(),
                error: Some(CropError::PageOutOfRange { page: 1, total: 0 }),
            }],
            stats: ExtractionStats::default(),
        }
    }

    #[test]
    fn manifest_json_shape() {
        let json = serde_json::to_value(sample_output()).unwrap();
        assert_eq!(json["extraction"]["sections"][0]["title"], "Intro");
        assert_eq!(json["extraction"]["figures"][0]["kind"], "figure");
        assert_eq!(json["extraction"]["figures"][0]["rect"]["width"], 50.0);
        assert!(json["crops"][0]["error"]["PageOutOfRange"].is_object());
        assert!(json.get("pdf_path").is_none());
    }

    #[test]
    fn successful_crop_omits_error_field() {
        let crop = CropResult {
            kind: "graphic".into(),
            index: 2,
            page: 3,
            output_path: "g.png".into(),
            error: None,
        };
        assert!(crop.is_ok());
        let json = serde_json::to_value(&crop).unwrap();
        assert!(json.get("error").is_none());
    }

    #[test]
    fn batch_report_renders_errors_as_text() {
        let item = BatchItem {
            input: "missing.pdf".into(),
            result: Err(Grobid2MdError::FileNotFound {
                path: "missing.pdf".into(),
            }),
        };
        assert!(!item.is_ok());
        let json = serde_json::to_value(item.report()).unwrap();
        assert_eq!(json["input"], "missing.pdf");
        assert!(json["error"].as_str().unwrap().contains("missing.pdf"));
        assert!(json.get("output").is_none());
    }

    #[test]
    fn empty_extraction() {
        assert!(Extraction::default().is_empty());
        assert!(!sample_output().extraction.is_empty());
    }
}
