//! Input resolution: normalise a user-supplied PDF path or URL to a local file.
//!
//! GROBID and pdfium both want a file on disk, so URL inputs are downloaded
//! into a `TempDir` that lives as long as the [`ResolvedInput`]. The `%PDF`
//! magic bytes are checked up front so a stray HTML error page fails here
//! instead of deep inside GROBID.

use crate::error::Grobid2MdError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// The resolved input, either a local path or a downloaded temp file.
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL; PDF downloaded to a temp directory which is removed
    /// when this value is dropped.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Path to the PDF file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// File stem used to name every artifact derived from `input`.
///
/// `https://arxiv.org/pdf/2401.00001.pdf` → `2401.00001`,
/// `/papers/attention.pdf` → `attention`, `paper.grobid.tei.xml` → `paper`.
pub fn document_stem(input: &str) -> String {
    let last = if is_url(input) {
        reqwest::Url::parse(input)
            .ok()
            .and_then(|u| {
                u.path_segments()
                    .and_then(|mut s| s.next_back().map(str::to_string))
            })
            .unwrap_or_default()
    } else {
        Path::new(input)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    let stem = [".grobid.tei.xml", ".tei.xml", ".xml", ".pdf", ".PDF"]
        .iter()
        .find_map(|ext| last.strip_suffix(ext))
        .unwrap_or(&last);

    if stem.is_empty() {
        "document".to_string()
    } else {
        stem.to_string()
    }
}

/// Resolve the input string to a local PDF file path.
///
/// URLs are downloaded to a temporary directory. Local files are checked for
/// existence, read permission and the `%PDF` header.
pub async fn resolve_input(
    input: &str,
    timeout_secs: u64,
) -> Result<ResolvedInput, Grobid2MdError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

fn resolve_local(path_str: &str) -> Result<ResolvedInput, Grobid2MdError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(Grobid2MdError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Grobid2MdError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Grobid2MdError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Grobid2MdError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, Grobid2MdError> {
    info!("Downloading PDF from: {}", url);

    let failed = |reason: String| Grobid2MdError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            Grobid2MdError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let file_name = format!("{}.pdf", document_stem(url));
    let temp_dir = TempDir::new().map_err(|e| Grobid2MdError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(file_name);

    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;

    if bytes.len() >= 4 && &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(Grobid2MdError::NotAPdf {
            path: file_path,
            magic,
        });
    }

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| Grobid2MdError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}
