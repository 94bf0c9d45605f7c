//! GROBID HTTP client.
//!
//! Only two endpoints are used:
//!
//! ```text
//! GET  {url}/api/isalive                  → 200 when the service is up
//! POST {url}/api/processFulltextDocument  → TEI XML (multipart upload)
//! ```
//!
//! The client never retries. A failed full-text call is fatal for that
//! document; a batch carries on with the next one.

use crate::config::{ExtractionConfig, GrobidOptions};
use crate::error::Grobid2MdError;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timeout for the liveness probe, independent of the request timeout.
const ISALIVE_TIMEOUT_SECS: u64 = 10;

/// Thin async client for one GROBID server.
#[derive(Debug, Clone)]
pub struct GrobidClient {
    base_url: String,
    timeout_secs: u64,
    http: reqwest::Client,
}

impl GrobidClient {
    pub fn new(config: &ExtractionConfig) -> Result<Self, Grobid2MdError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Grobid2MdError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            base_url: config.grobid_url.trim_end_matches('/').to_string(),
            timeout_secs: config.request_timeout_secs,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// `true` when the server answers `isalive` with HTTP 200.
    ///
    /// Connection failures and other statuses are reported as `false`, never
    /// as an error.
    pub async fn is_alive(&self) -> bool {
        let url = self.endpoint("isalive");
        match self
            .http
            .get(&url)
            .timeout(Duration::from_secs(ISALIVE_TIMEOUT_SECS))
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                info!("GROBID server is running at {}", self.base_url);
                true
            }
            Ok(resp) => {
                warn!("GROBID server responded with status {}", resp.status());
                false
            }
            Err(e) => {
                warn!("Cannot connect to GROBID server at {}: {}", self.base_url, e);
                false
            }
        }
    }

    /// Run full-text processing on one PDF and return the TEI XML.
    pub async fn process_fulltext(
        &self,
        pdf_path: &Path,
        options: &GrobidOptions,
    ) -> Result<String, Grobid2MdError> {
        let bytes = tokio::fs::read(pdf_path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Grobid2MdError::FileNotFound {
                path: pdf_path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Grobid2MdError::PermissionDenied {
                path: pdf_path.to_path_buf(),
            },
            _ => Grobid2MdError::Internal(format!("reading {}: {e}", pdf_path.display())),
        })?;

        let file_name = pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input.pdf".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(|e| Grobid2MdError::Internal(format!("multipart: {e}")))?;

        let form = form_fields(options)
            .into_iter()
            .fold(Form::new().part("input", part), |form, (k, v)| form.text(k, v));

        let url = self.endpoint("processFulltextDocument");
        info!("Sending {} to {}", pdf_path.display(), url);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        if !status.is_success() {
            return Err(Grobid2MdError::GrobidRequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        debug!("GROBID returned {} bytes of TEI", body.len());
        Ok(body)
    }

    fn map_send_error(&self, e: reqwest::Error) -> Grobid2MdError {
        if e.is_timeout() {
            Grobid2MdError::GrobidTimeout {
                secs: self.timeout_secs,
            }
        } else if e.is_connect() {
            Grobid2MdError::GrobidUnavailable {
                url: self.base_url.clone(),
                reason: e.to_string(),
            }
        } else {
            Grobid2MdError::GrobidRequestFailed {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                body: e.to_string(),
            }
        }
    }
}

/// Text fields of the `processFulltextDocument` form, in sending order.
///
/// `teiCoordinates` is omitted when the list is empty; boolean options are
/// sent as `1` only when set.
pub fn form_fields(options: &GrobidOptions) -> Vec<(&'static str, String)> {
    let mut fields = Vec::new();
    if !options.tei_coordinates.is_empty() {
        fields.push(("teiCoordinates", options.tei_coordinates.join(",")));
    }
    for (name, on) in [
        ("consolidateHeader", options.consolidate_header),
        ("consolidateCitations", options.consolidate_citations),
        ("generateIDs", options.generate_ids),
        ("segmentSentences", options.segment_sentences),
    ] {
        if on {
            fields.push((name, "1".to_string()));
        }
    }
    fields
}
