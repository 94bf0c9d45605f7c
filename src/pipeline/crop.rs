//! Region cropping: rasterise PDF pages via pdfium and cut out figure boxes.
//!
//! GROBID coordinates are in PDF points with a top-left origin, which is
//! also the orientation of a rendered bitmap. Rendering a page at `scale`
//! pixels per point therefore maps a box `(x, y, w, h)` onto the pixel
//! rectangle `(x·scale, y·scale, w·scale, h·scale)` with no flipping.
//!
//! pdfium is not async-safe, so [`crop_regions`] does all of its work inside
//! `tokio::task::spawn_blocking`. Regions are visited in page order and only
//! the current page's bitmap is kept, so each page is rendered once and
//! memory stays at one page whatever the document length.

use crate::error::{CropError, Grobid2MdError};
use crate::output::{CropResult, Extraction};
use crate::progress::ProgressCallback;
use crate::tei::Rectangle;
use image::{DynamicImage, ImageFormat};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Sub-directory for figure and table crops.
pub const FIGURES_DIR: &str = "figures";
/// Sub-directory for graphic crops.
pub const GRAPHICS_DIR: &str = "graphics";

/// One region to crop.
#[derive(Debug, Clone, PartialEq)]
pub struct CropJob {
    /// `figure`, `table` or `graphic`.
    pub kind: String,
    /// 1-based position within its list.
    pub index: usize,
    pub rect: Rectangle,
    pub output_path: PathBuf,
}

impl CropJob {
    fn result(&self, error: Option<CropError>) -> CropResult {
        CropResult {
            kind: self.kind.clone(),
            index: self.index,
            page: self.rect.page,
            output_path: self.output_path.clone(),
            error,
        }
    }
}

// ── Naming ───────────────────────────────────────────────────────────────

/// File-name-safe fragment of a caption.
///
/// Takes the first `max_len` characters, keeps alphanumerics, spaces and
/// hyphens, trims, then turns spaces into underscores.
pub fn safe_caption(caption: &str, max_len: usize) -> String {
    caption
        .chars()
        .take(max_len)
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-')
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

/// `<kind>_<index>_<safe caption>.png`, or `<kind>_<index>.png` when nothing
/// of the caption survives sanitising.
pub fn output_file_name(kind: &str, index: usize, caption: &str, max_len: usize) -> String {
    let safe = safe_caption(caption, max_len);
    if safe.is_empty() {
        format!("{kind}_{index}.png")
    } else {
        format!("{kind}_{index}_{safe}.png")
    }
}

/// Lay out crop jobs for an extraction under `output_dir`.
///
/// Figures and tables share one 1-based numbering and go to
/// [`FIGURES_DIR`]; graphics are numbered separately, named after their
/// parent figure's caption and go to [`GRAPHICS_DIR`].
pub fn plan_crops(
    extraction: &Extraction,
    output_dir: &Path,
    figures: bool,
    graphics: bool,
    caption_len: usize,
) -> Vec<CropJob> {
    let mut jobs = Vec::new();

    if figures {
        let dir = output_dir.join(FIGURES_DIR);
        for (i, fig) in extraction.figures.iter().enumerate() {
            let kind = fig.kind.as_str();
            jobs.push(CropJob {
                kind: kind.to_string(),
                index: i + 1,
                rect: fig.rect,
                output_path: dir.join(output_file_name(kind, i + 1, &fig.caption, caption_len)),
            });
        }
    }

    if graphics {
        let dir = output_dir.join(GRAPHICS_DIR);
        for (i, g) in extraction.graphics.iter().enumerate() {
            jobs.push(CropJob {
                kind: "graphic".to_string(),
                index: i + 1,
                rect: g.rect,
                output_path: dir.join(output_file_name(
                    "graphic",
                    i + 1,
                    &g.parent_caption,
                    caption_len,
                )),
            });
        }
    }

    jobs
}

// ── Geometry ─────────────────────────────────────────────────────────────

/// Pixel rectangle `(left, top, width, height)` for `rect` on a page rendered
/// at `scale` into a `img_width × img_height` bitmap.
///
/// The box is clamped to the bitmap. `None` when nothing is left.
pub fn pixel_region(
    rect: &Rectangle,
    scale: f32,
    img_width: u32,
    img_height: u32,
) -> Option<(u32, u32, u32, u32)> {
    let s = f64::from(scale);
    let clamp_x = |v: f64| v.clamp(0.0, f64::from(img_width));
    let clamp_y = |v: f64| v.clamp(0.0, f64::from(img_height));

    let left = clamp_x((rect.x * s).floor());
    let top = clamp_y((rect.y * s).floor());
    let right = clamp_x((rect.right() * s).ceil());
    let bottom = clamp_y((rect.bottom() * s).ceil());

    if right <= left || bottom <= top {
        return None;
    }
    Some((
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}

// ── Pdfium ───────────────────────────────────────────────────────────────

#[cfg(target_os = "windows")]
const PDFIUM_LIB_NAME: &str = "pdfium.dll";
#[cfg(target_os = "macos")]
const PDFIUM_LIB_NAME: &str = "libpdfium.dylib";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const PDFIUM_LIB_NAME: &str = "libpdfium.so";

/// Bind to pdfium: `PDFIUM_LIB_PATH`, then a library next to the executable
/// or in the working directory, then the system library.
pub fn bind_pdfium() -> Result<Pdfium, Grobid2MdError> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(p) = std::env::var("PDFIUM_LIB_PATH") {
        candidates.push(PathBuf::from(p));
    }
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(PDFIUM_LIB_NAME));
    }
    candidates.push(PathBuf::from(".").join(PDFIUM_LIB_NAME));

    let mut tried = Vec::new();
    for path in candidates.iter().filter(|p| p.exists()) {
        match Pdfium::bind_to_library(path) {
            Ok(bindings) => {
                debug!("Bound pdfium from {}", path.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => tried.push(format!("{}: {}", path.display(), e)),
        }
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| {
            tried.push(format!("system library: {}", e));
            Grobid2MdError::PdfiumBindingFailed(tried.join("; "))
        })
}

/// Crop every job out of `pdf_path`, writing one PNG per job.
///
/// Fails as a whole only when the PDF is missing, pdfium cannot be bound or
/// the document cannot be opened. Per-region failures are reported in the
/// matching [`CropResult`] and the remaining jobs continue.
pub async fn crop_regions(
    pdf_path: &Path,
    jobs: Vec<CropJob>,
    scale: f32,
    progress: Option<ProgressCallback>,
) -> Result<Vec<CropResult>, Grobid2MdError> {
    if !pdf_path.exists() {
        return Err(Grobid2MdError::FileNotFound {
            path: pdf_path.to_path_buf(),
        });
    }
    if jobs.is_empty() {
        return Ok(Vec::new());
    }

    let path = pdf_path.to_path_buf();
    tokio::task::spawn_blocking(move || crop_regions_blocking(&path, &jobs, scale, progress))
        .await
        .map_err(|e| Grobid2MdError::Internal(format!("Crop task panicked: {}", e)))?
}

fn crop_regions_blocking(
    pdf_path: &Path,
    jobs: &[CropJob],
    scale: f32,
    progress: Option<ProgressCallback>,
) -> Result<Vec<CropResult>, Grobid2MdError> {
    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| Grobid2MdError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!(
        "Cropping {} regions from {} ({} pages)",
        jobs.len(),
        pdf_path.display(),
        total_pages
    );

    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
    let total = jobs.len();
    if let Some(ref cb) = progress {
        cb.on_crops_start(total);
    }

    let order = page_order(jobs);
    let mut current: Option<(u32, DynamicImage)> = None;
    let mut results: Vec<Option<CropResult>> = vec![None; total];
    for (done, &i) in order.iter().enumerate() {
        let job = &jobs[i];
        match crop_one(&pages, total_pages, &render_config, &mut current, job, scale) {
            Ok(()) => {
                if let Some(ref cb) = progress {
                    cb.on_crop_complete(done + 1, total, &job.output_path);
                }
                results[i] = Some(job.result(None));
            }
            Err(e) => {
                warn!("{} {} not cropped: {}", job.kind, job.index, e);
                if let Some(ref cb) = progress {
                    cb.on_crop_error(done + 1, total, e.to_string());
                }
                results[i] = Some(job.result(Some(e)));
            }
        }
    }

    Ok(results.into_iter().flatten().collect())
}

/// Job indices sorted by page, keeping the original order within a page.
fn page_order(jobs: &[CropJob]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..jobs.len()).collect();
    order.sort_by_key(|&i| jobs[i].rect.page);
    order
}

/// Render `job`'s page unless it is the one already held in `current`, then
/// save the region. Rendering a new page drops the previous bitmap.
fn crop_one(
    pages: &PdfPages<'_>,
    total_pages: usize,
    render_config: &PdfRenderConfig,
    current: &mut Option<(u32, DynamicImage)>,
    job: &CropJob,
    scale: f32,
) -> Result<(), CropError> {
    let page_num = job.rect.page;
    if page_num == 0 || page_num as usize > total_pages {
        return Err(CropError::PageOutOfRange {
            page: page_num,
            total: total_pages,
        });
    }

    let render_failed = |detail: String| CropError::RenderFailed {
        page: page_num,
        detail,
    };

    let cached = matches!(current, Some((p, _)) if *p == page_num);
    if !cached {
        *current = None;
        let page = pages
            .get((page_num - 1) as u16)
            .map_err(|e| render_failed(format!("{:?}", e)))?;
        let bitmap = page
            .render_with_config(render_config)
            .map_err(|e| render_failed(format!("{:?}", e)))?;
        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            page_num,
            image.width(),
            image.height()
        );
        *current = Some((page_num, image));
    }

    match current {
        Some((_, image)) => save_region(image, job, scale),
        None => Err(render_failed("rendered page missing".into())),
    }
}

/// Cut `job.rect` out of a rendered page and write it as PNG.
fn save_region(page_image: &DynamicImage, job: &CropJob, scale: f32) -> Result<(), CropError> {
    let (left, top, width, height) =
        pixel_region(&job.rect, scale, page_image.width(), page_image.height())
            .ok_or(CropError::EmptyRegion { page: job.rect.page })?;

    let write_failed = |detail: String| CropError::WriteFailed {
        path: job.output_path.clone(),
        detail,
    };

    if let Some(parent) = job.output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| write_failed(e.to_string()))?;
    }

    page_image
        .crop_imm(left, top, width, height)
        .save_with_format(&job.output_path, ImageFormat::Png)
        .map_err(|e| write_failed(e.to_string()))?;

    debug!(
        "Wrote {} ({}x{} px)",
        job.output_path.display(),
        width,
        height
    );
    Ok(())
}
