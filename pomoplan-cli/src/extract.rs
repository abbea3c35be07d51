//! Client for the syllabus upload/extraction service.
//!
//! The service owns parsing/OCR; we only ship the file and read back
//! `{"topics": [...]}`.

use anyhow::{Context, Result, bail};
use pomoplan_core::Topic;
use pomoplan_ingest::{TopicFormat, parse_topics};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::ExtractionSection;

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

pub async fn extract_topics(cfg: &ExtractionSection, file: &Path) -> Result<Vec<Topic>> {
    if !file.exists() {
        bail!("file not found: {}", file.display());
    }
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("read {}", file.display()))?;
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("syllabus");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .context("build http client")?;

    info!(
        url = %cfg.url,
        file = filename,
        bytes = bytes.len(),
        "uploading syllabus for extraction"
    );

    let resp = client
        .post(&cfg.url)
        .header(CONTENT_TYPE, HeaderValue::from_static(content_type_for(file)))
        .header("X-Filename", filename)
        .body(bytes)
        .send()
        .await
        .with_context(|| format!("POST {}", cfg.url))?;

    let status = resp.status();
    let body = resp.text().await.context("read extraction response")?;
    if !status.is_success() {
        bail!("extraction service returned {status}: {}", body.trim());
    }

    parse_topics(&body, TopicFormat::Json).context("extraction response")
}
