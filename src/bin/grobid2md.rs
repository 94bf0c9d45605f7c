//! CLI binary for grobid2md.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use grobid2md::{
    extract_file, is_tei_input, process_batch, process_pdf, process_tei, BatchItem,
    ExtractionConfig, ExtractionOutput, ExtractionProgressCallback, GrobidClient, GrobidOptions,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one bar counting finished documents, with per-document
/// and per-crop log lines printed above it.
struct CliProgressCallback {
    bar: ProgressBar,
    crop_errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new(documents: usize) -> Arc<Self> {
        let bar = ProgressBar::new(documents as u64);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} docs  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        bar.set_style(style);
        bar.set_prefix("Extracting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            crop_errors: AtomicUsize::new(0),
        })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_document_start(&self, input: &str) {
        self.bar.set_message(input.to_string());
        self.bar
            .println(format!("{} {}", cyan("◆"), bold(&format!("Processing {input}…"))));
    }

    fn on_extraction_summary(&self, sections: usize, figures: usize, graphics: usize) {
        self.bar.println(format!(
            "  {} {} sections, {} figures/tables, {} graphics",
            dim("·"),
            sections,
            figures,
            graphics
        ));
    }

    fn on_crop_complete(&self, index: usize, total: usize, path: &Path) {
        self.bar.println(format!(
            "  {} crop {:>3}/{:<3}  {}",
            green("✓"),
            index,
            total,
            dim(&path.display().to_string())
        ));
    }

    fn on_crop_error(&self, index: usize, total: usize, error: String) {
        self.crop_errors.fetch_add(1, Ordering::SeqCst);
        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(['\u{2026}']).collect()
        } else {
            error
        };
        self.bar.println(format!(
            "  {} crop {:>3}/{:<3}  {}",
            red("✗"),
            index,
            total,
            red(&msg)
        ));
    }

    fn on_document_complete(&self, input: &str, crops_succeeded: usize, crops_total: usize) {
        self.bar.println(format!(
            "  {} {}  {}/{} crops",
            green("✔"),
            input,
            crops_succeeded,
            crops_total
        ));
        self.bar.inc(1);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # PDF through GROBID: Markdown, crops and manifest in ./out
  grobid2md paper.pdf -o out

  # Several papers, three at a time, one sub-directory each
  grobid2md a.pdf b.pdf https://arxiv.org/pdf/1706.03762 -o out --concurrency 3

  # Existing TEI plus the source PDF for cropping (no GROBID needed)
  grobid2md paper.grobid.tei.xml --pdf paper.pdf -o out

  # Look at what a TEI file contains without writing anything
  grobid2md --inspect-only paper.grobid.tei.xml

  # Is the GROBID server up?
  grobid2md --check-server --grobid-url http://grobid:8070

OUTPUT LAYOUT:
  out/<stem>.grobid.tei.xml   GROBID response (PDF inputs only)
  out/<stem>-sections.md      numbered sections as Markdown
  out/<stem>-manifest.json    sections, figures, graphics, crops, stats
  out/figures/                figure_<n>_<caption>.png, table_<n>_<caption>.png
  out/graphics/               graphic_<n>_<caption>.png

ENVIRONMENT VARIABLES:
  GROBID_URL              GROBID server (default http://localhost:8070)
  PDFIUM_LIB_PATH         Path to libpdfium used for cropping
  RUST_LOG                Override log filter (e.g. grobid2md=debug)

SETUP:
  1. Start GROBID:   docker run --rm -p 8070:8070 lfoppiano/grobid
  2. Extract:        grobid2md paper.pdf -o out
"#;

/// Extract sections and figures from academic PDFs via GROBID.
#[derive(Parser, Debug)]
#[command(
    name = "grobid2md",
    version,
    about = "Extract sections and figures from academic PDFs via GROBID",
    long_about = "Send PDF papers (local files or URLs) to a GROBID server, or read existing \
GROBID TEI files, and write the numbered sections as Markdown together with cropped \
images of every figure, table and graphic.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF files, HTTP/HTTPS URLs, or GROBID TEI files (*.xml).
    inputs: Vec<String>,

    /// Output directory. With several inputs each gets its own sub-directory.
    #[arg(short, long, env = "GROBID2MD_OUTPUT", default_value = "output")]
    output: PathBuf,

    /// Source PDF for cropping when a single TEI file is given.
    #[arg(long, env = "GROBID2MD_PDF")]
    pdf: Option<PathBuf>,

    /// GROBID server URL.
    #[arg(long, env = "GROBID_URL", default_value = "http://localhost:8070")]
    grobid_url: String,

    /// GROBID request timeout in seconds.
    #[arg(long, env = "GROBID2MD_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// HTTP download timeout for URL inputs in seconds.
    #[arg(long, env = "GROBID2MD_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Ask GROBID to consolidate header and citations.
    #[arg(long, env = "GROBID2MD_CONSOLIDATE")]
    consolidate: bool,

    /// Ask GROBID to wrap sentences in <s> elements.
    #[arg(long, env = "GROBID2MD_SEGMENT_SENTENCES")]
    segment_sentences: bool,

    /// Do not crop figures and tables.
    #[arg(long, env = "GROBID2MD_NO_FIGURES")]
    no_figures: bool,

    /// Do not crop graphics.
    #[arg(long, env = "GROBID2MD_NO_GRAPHICS")]
    no_graphics: bool,

    /// Render scale for crops, pixels per PDF point (0.5–8.0).
    #[arg(long, env = "GROBID2MD_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// Caption characters used in image file names.
    #[arg(long, env = "GROBID2MD_CAPTION_LEN", default_value_t = 30)]
    caption_len: usize,

    /// Documents processed at once.
    #[arg(short, long, env = "GROBID2MD_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Do not write <stem>-manifest.json.
    #[arg(long, env = "GROBID2MD_NO_MANIFEST")]
    no_manifest: bool,

    /// Print the structure extracted from TEI inputs; write nothing.
    #[arg(long)]
    inspect_only: bool,

    /// Check whether the GROBID server is alive and exit.
    #[arg(long)]
    check_server: bool,

    /// Print results as JSON on stdout.
    #[arg(long, env = "GROBID2MD_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "GROBID2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "GROBID2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "GROBID2MD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress =
        !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only && !cli.check_server;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Server check ─────────────────────────────────────────────────────
    if cli.check_server {
        let config = build_config(&cli, None)?;
        let client = GrobidClient::new(&config).context("Failed to create GROBID client")?;
        if client.is_alive().await {
            println!("{} GROBID is alive at {}", green("✔"), client.base_url());
            return Ok(());
        }
        anyhow::bail!("GROBID is not reachable at {}", client.base_url());
    }

    if cli.inputs.is_empty() {
        anyhow::bail!("No inputs given");
    }

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        return inspect(&cli).await;
    }

    if cli.pdf.is_some() && !(cli.inputs.len() == 1 && is_tei_input(&cli.inputs[0])) {
        anyhow::bail!("--pdf can only be used with a single TEI input");
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress = show_progress.then(|| CliProgressCallback::new(cli.inputs.len()));
    let config = build_config(
        &cli,
        progress
            .clone()
            .map(|cb| cb as Arc<dyn ExtractionProgressCallback>),
    )?;

    // ── Run ──────────────────────────────────────────────────────────────
    let items: Vec<BatchItem> = if cli.inputs.len() == 1 {
        let input = cli.inputs[0].clone();
        let result = if is_tei_input(&input) {
            process_tei(&input, cli.pdf.as_deref(), &cli.output, &config).await
        } else {
            process_pdf(&input, &cli.output, &config).await
        };
        vec![BatchItem { input, result }]
    } else {
        process_batch(&cli.inputs, &cli.output, &config).await
    };

    if let Some(ref cb) = progress {
        cb.finish();
    }

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let reports: Vec<_> = items.iter().map(BatchItem::report).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&reports).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        for item in &items {
            match &item.result {
                Ok(output) => print_summary(&item.input, output),
                Err(e) => eprintln!("{} {}  {}", red("✘"), bold(&item.input), red(&e.to_string())),
            }
        }
        if let Some(ref cb) = progress {
            let crop_errors = cb.crop_errors.load(Ordering::SeqCst);
            if crop_errors > 0 {
                eprintln!("{} {} crops failed", cyan("⚠"), crop_errors);
            }
        }
    }

    let failed = items.iter().filter(|i| !i.is_ok()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} documents failed", failed, items.len());
    }
    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut options = GrobidOptions {
        segment_sentences: cli.segment_sentences,
        ..GrobidOptions::default()
    };
    if cli.consolidate {
        options = options.consolidated();
    }

    let mut builder = ExtractionConfig::builder()
        .grobid_url(&cli.grobid_url)
        .request_timeout_secs(cli.timeout)
        .download_timeout_secs(cli.download_timeout)
        .grobid_options(options)
        .extract_figures(!cli.no_figures)
        .extract_graphics(!cli.no_graphics)
        .crop_scale(cli.scale)
        .caption_prefix_len(cli.caption_len)
        .concurrency(cli.concurrency)
        .write_manifest(!cli.no_manifest);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Print what each TEI input contains, without writing files.
async fn inspect(cli: &Cli) -> Result<()> {
    let mut all = Vec::new();
    for input in &cli.inputs {
        if !is_tei_input(input) {
            anyhow::bail!("--inspect-only needs TEI (*.xml) inputs, got '{input}'");
        }
        let extraction = extract_file(input)
            .await
            .with_context(|| format!("Failed to extract {input}"))?;
        all.push((input, extraction));
    }

    if cli.json {
        let value: Vec<_> = all
            .iter()
            .map(|(input, e)| serde_json::json!({ "input": input, "extraction": e }))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("Failed to serialise extraction")?
        );
        return Ok(());
    }

    for (input, e) in &all {
        println!("File:      {}", input);
        println!("Sections:  {}", e.sections.len());
        for s in &e.sections {
            let indent = "  ".repeat(s.heading_level() - 1);
            let size = dim(&format!("({} chars)", s.content.len()));
            println!("{indent}{} {}  {}", s.number, s.title, size);
        }
        println!("Figures:   {}", e.figures.len());
        for f in &e.figures {
            let (x, y, w, h) = f.coordinates();
            println!(
                "  {:<6} p{:<3} ({:.1}, {:.1}, {:.1}, {:.1})  {}",
                f.kind,
                f.page(),
                x,
                y,
                w,
                h,
                f.caption
            );
        }
        println!("Graphics:  {}", e.graphics.len());
        for g in &e.graphics {
            let (x, y, w, h) = g.coordinates();
            println!(
                "  {:<7} p{:<3} ({:.1}, {:.1}, {:.1}, {:.1})  {}",
                g.graphic_type,
                g.page(),
                x,
                y,
                w,
                h,
                g.parent_caption
            );
        }
        println!();
    }
    Ok(())
}

fn print_summary(input: &str, output: &ExtractionOutput) {
    let s = &output.stats;
    let mark = if s.crops_failed == 0 { green("✔") } else { cyan("⚠") };
    eprintln!(
        "{}  {}  {} sections, {} figures, {} tables, {} graphics  {}/{} crops  {}ms  →  {}",
        mark,
        input,
        s.sections,
        s.figures,
        s.tables,
        s.graphics,
        s.crops_succeeded,
        s.crops_attempted,
        s.total_duration_ms,
        bold(&output.markdown_path.display().to_string()),
    );
}
