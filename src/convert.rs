//! Extraction entry points.
//!
//! * [`extract`] / [`extract_file`] — TEI in, [`Extraction`] out; no I/O
//!   beyond reading the file.
//! * [`process_tei`] — TEI file (plus optional PDF) to Markdown, crops and
//!   a JSON manifest on disk.
//! * [`process_pdf`] — PDF path or URL through GROBID, then as above.
//! * [`process_batch`] — many inputs, a few documents at a time.

use crate::config::ExtractionConfig;
use crate::error::Grobid2MdError;
use crate::output::{BatchItem, Extraction, ExtractionOutput, ExtractionStats};
use crate::pipeline::grobid::GrobidClient;
use crate::pipeline::{crop, input, markdown};
use crate::tei::{self, VisualKind};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extract sections, figures/tables and graphics from TEI XML.
///
/// The document is parsed once and the three passes run over the same
/// tree. Only a document that is not well-formed fails; incomplete sections
/// and elements without usable coordinates are simply left out.
///
/// # Example
/// ```rust
/// let xml = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><text><body>
///   <div><head n="1">Intro</head><p>Hello world</p></div>
///   <figure coords="1,0,0,50,50"><head>Fig 1</head></figure>
/// </body></text></TEI>"#;
///
/// let extraction = grobid2md::extract(xml).unwrap();
/// assert_eq!(extraction.sections[0].title, "Intro");
/// assert_eq!(extraction.figures[0].page(), 1);
/// ```
pub fn extract(xml: &str) -> Result<Extraction, Grobid2MdError> {
    let doc = tei::parse_tei(xml)?;
    let root = doc.root_element();
    Ok(Extraction {
        sections: tei::extract_sections(root),
        figures: tei::extract_figures_and_tables(root),
        graphics: tei::extract_graphics(root),
    })
}

/// Read a TEI file and [`extract`] it.
pub async fn extract_file(path: impl AsRef<Path>) -> Result<Extraction, Grobid2MdError> {
    let xml = read_tei(path.as_ref()).await?;
    extract(&xml)
}

/// Turn a TEI file into `<stem>-sections.md`, cropped images and
/// `<stem>-manifest.json` under `output_dir`.
///
/// Cropping happens only when `pdf_path` is given and at least one of
/// `extract_figures` / `extract_graphics` is on. A missing PDF is a fatal
/// [`Grobid2MdError::FileNotFound`], checked before anything is written.
/// Individual crop failures are recorded in [`ExtractionOutput::crops`].
pub async fn process_tei(
    tei_path: impl AsRef<Path>,
    pdf_path: Option<&Path>,
    output_dir: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Grobid2MdError> {
    let total_start = Instant::now();
    let tei_path = tei_path.as_ref();
    let label = tei_path.display().to_string();
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_start(&label);
    }

    let xml = read_tei(tei_path).await?;
    let stem = input::document_stem(&tei_path.to_string_lossy());
    let doc = TeiDocument {
        label: &label,
        xml: &xml,
        tei_path,
        pdf_path,
        stem: &stem,
        grobid_duration_ms: 0,
    };
    finish_document(doc, output_dir.as_ref(), config, total_start).await
}

/// Send a PDF (local path or URL) through GROBID and process the result.
///
/// The TEI response is kept as `<stem>.grobid.tei.xml` in `output_dir`.
pub async fn process_pdf(
    input_str: impl AsRef<str>,
    output_dir: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Grobid2MdError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    let output_dir = output_dir.as_ref();
    info!("Starting extraction: {}", input_str);
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_start(input_str);
    }

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let pdf_path = resolved.path().to_path_buf();
    let stem = input::document_stem(input_str);

    // ── Step 2: GROBID full-text ─────────────────────────────────────────
    let client = GrobidClient::new(config)?;
    let grobid_start = Instant::now();
    let xml = client.process_fulltext(&pdf_path, &config.grobid).await?;
    let grobid_duration_ms = grobid_start.elapsed().as_millis() as u64;
    info!("GROBID finished {} in {}ms", input_str, grobid_duration_ms);

    // ── Step 3: Keep the TEI ─────────────────────────────────────────────
    let tei_path = output_dir.join(format!("{stem}.grobid.tei.xml"));
    markdown::write_atomic(&tei_path, &xml).await?;
    debug!("TEI saved to {}", tei_path.display());

    // ── Step 4: Extract, render, crop ────────────────────────────────────
    let doc = TeiDocument {
        label: input_str,
        xml: &xml,
        tei_path: &tei_path,
        pdf_path: Some(&pdf_path),
        stem: &stem,
        grobid_duration_ms,
    };
    // `resolved` keeps a downloaded PDF alive until cropping is done
    let output = finish_document(doc, output_dir, config, total_start).await;
    drop(resolved);
    output
}

/// Process many inputs, each into `<output_base_dir>/<stem>/`.
///
/// Inputs sharing a stem get `<stem>-2/`, `<stem>-3/`, … in input order, so
/// no document overwrites another.
///
/// Inputs ending in `.xml` are treated as TEI files (no cropping); anything
/// else goes through [`process_pdf`]. Up to `config.concurrency` documents
/// run at once. One document failing does not stop the others; results come
/// back in input order.
pub async fn process_batch(
    inputs: &[String],
    output_base_dir: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Vec<BatchItem> {
    let base = output_base_dir.as_ref();
    info!(
        "Processing {} documents ({} at a time)",
        inputs.len(),
        config.concurrency
    );

    let dirs = batch_dir_names(inputs);
    let jobs = inputs.iter().zip(dirs).enumerate();
    let mut items: Vec<(usize, BatchItem)> = stream::iter(jobs.map(
        |(i, (input_str, dir_name))| {
            let dir = base.join(dir_name);
            async move {
                let result = if is_tei_input(input_str) {
                    process_tei(Path::new(input_str), None, &dir, config).await
                } else {
                    process_pdf(input_str, &dir, config).await
                };
                if let Err(ref e) = result {
                    warn!("{} failed: {}", input_str, e);
                }
                (
                    i,
                    BatchItem {
                        input: input_str.clone(),
                        result,
                    },
                )
            }
        },
    ))
    .buffer_unordered(config.concurrency.max(1))
    .collect()
    .await;

    items.sort_by_key(|(i, _)| *i);
    items.into_iter().map(|(_, item)| item).collect()
}

/// One output directory name per input: the document stem, or
/// `<stem>-<n>` with the smallest `n ≥ 2` not yet taken.
fn batch_dir_names(inputs: &[String]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    inputs
        .iter()
        .map(|input_str| {
            let stem = input::document_stem(input_str);
            let mut name = stem.clone();
            let mut n = 1;
            while !used.insert(name.clone()) {
                n += 1;
                name = format!("{stem}-{n}");
            }
            name
        })
        .collect()
}

/// `true` for inputs that name a TEI file rather than a PDF.
pub fn is_tei_input(input_str: &str) -> bool {
    !input::is_url(input_str) && input_str.to_ascii_lowercase().ends_with(".xml")
}

// ── Internal helpers ─────────────────────────────────────────────────────

struct TeiDocument<'a> {
    label: &'a str,
    xml: &'a str,
    tei_path: &'a Path,
    pdf_path: Option<&'a Path>,
    stem: &'a str,
    grobid_duration_ms: u64,
}

async fn read_tei(path: &Path) -> Result<String, Grobid2MdError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Grobid2MdError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Grobid2MdError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Grobid2MdError::Internal(format!("reading {}: {e}", path.display())),
        })
}

async fn finish_document(
    doc: TeiDocument<'_>,
    output_dir: &Path,
    config: &ExtractionConfig,
    total_start: Instant,
) -> Result<ExtractionOutput, Grobid2MdError> {
    let crop_pdf = doc.pdf_path.filter(|_| config.wants_crops());
    if let Some(pdf) = crop_pdf {
        if !pdf.exists() {
            return Err(Grobid2MdError::FileNotFound {
                path: pdf.to_path_buf(),
            });
        }
    }

    // ── Extract ──────────────────────────────────────────────────────────
    let extract_start = Instant::now();
    let extraction = extract(doc.xml)?;
    let extraction_duration_ms = extract_start.elapsed().as_millis() as u64;
    info!(
        "{}: {} sections, {} figures/tables, {} graphics",
        doc.label,
        extraction.sections.len(),
        extraction.figures.len(),
        extraction.graphics.len()
    );
    if extraction.is_empty() {
        warn!("{}: no sections, figures or graphics found", doc.label);
    }
    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_summary(
            extraction.sections.len(),
            extraction.figures.len(),
            extraction.graphics.len(),
        );
    }

    // ── Markdown ─────────────────────────────────────────────────────────
    let markdown_path = output_dir.join(format!("{}-sections.md", doc.stem));
    markdown::write_markdown(&markdown_path, &extraction.sections).await?;
    debug!("Markdown written to {}", markdown_path.display());

    // ── Crops ────────────────────────────────────────────────────────────
    let crop_start = Instant::now();
    let crops = match crop_pdf {
        Some(pdf) => {
            let jobs = crop::plan_crops(
                &extraction,
                output_dir,
                config.extract_figures,
                config.extract_graphics,
                config.caption_prefix_len,
            );
            crop::crop_regions(pdf, jobs, config.crop_scale, config.progress_callback.clone())
                .await?
        }
        None => Vec::new(),
    };
    let crop_duration_ms = crop_start.elapsed().as_millis() as u64;

    let crops_succeeded = crops.iter().filter(|c| c.is_ok()).count();
    let stats = ExtractionStats {
        sections: extraction.sections.len(),
        figures: count_kind(&extraction, VisualKind::Figure),
        tables: count_kind(&extraction, VisualKind::Table),
        graphics: extraction.graphics.len(),
        crops_attempted: crops.len(),
        crops_succeeded,
        crops_failed: crops.len() - crops_succeeded,
        grobid_duration_ms: doc.grobid_duration_ms,
        extraction_duration_ms,
        crop_duration_ms,
        total_duration_ms: 0,
    };

    let mut output = ExtractionOutput {
        markdown_path,
        tei_path: doc.tei_path.to_path_buf(),
        pdf_path: crop_pdf.map(Path::to_path_buf),
        manifest_path: None,
        extraction,
        crops,
        stats,
    };

    // ── Manifest ─────────────────────────────────────────────────────────
    if config.write_manifest {
        let manifest_path: PathBuf = output_dir.join(format!("{}-manifest.json", doc.stem));
        output.manifest_path = Some(manifest_path.clone());
        output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
        let json = serde_json::to_vec_pretty(&output)
            .map_err(|e| Grobid2MdError::Internal(format!("manifest: {e}")))?;
        markdown::write_atomic(&manifest_path, json).await?;
    }
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "{}: done, {}/{} crops, {}ms total",
        doc.label,
        output.stats.crops_succeeded,
        output.stats.crops_attempted,
        output.stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_complete(
            doc.label,
            output.stats.crops_succeeded,
            output.stats.crops_attempted,
        );
    }

    Ok(output)
}

fn count_kind(extraction: &Extraction, kind: VisualKind) -> usize {
    extraction.figures.iter().filter(|f| f.kind == kind).count()
}
