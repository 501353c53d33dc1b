//! PDF text extraction.
//!
//! Decoding runs on a blocking thread against a scoped temp file, so the
//! transient resource is released on every exit path. An upload whose blob
//! write fails still succeeds: the extracted text is the primary product and
//! the resume record is simply persisted without a storage path.

use std::io::Write as _;

use bytes::Bytes;
use chrono::Utc;
use tempfile::NamedTempFile;
use tokio::task;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::blob::BlobStore;
use crate::errors::AppError;
use crate::models::resume::{resume_key, ResumeRecord, DEFAULT_UPLOAD_FILE_NAME};
use crate::store::KvStore;

pub mod handlers;

/// Mirrors the blob bucket's provisioned object-size limit.
const MAX_PDF_BYTES: usize = 10 * 1024 * 1024;

const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug)]
pub struct ExtractionOutcome {
    pub text: String,
    pub resume: ResumeRecord,
}

/// Extracts text from `pdf_bytes`, uploads the binary, and persists a resume
/// record for `user_id` under a freshly generated resume id.
pub async fn extract_and_store(
    store: &dyn KvStore,
    blob: &dyn BlobStore,
    user_id: Uuid,
    pdf_bytes: Bytes,
    file_name: Option<String>,
) -> Result<ExtractionOutcome, AppError> {
    if pdf_bytes.len() > MAX_PDF_BYTES {
        return Err(AppError::Validation(format!(
            "PDF exceeds the {} MiB upload limit",
            MAX_PDF_BYTES / (1024 * 1024)
        )));
    }

    debug!(
        "Extracting text from {} PDF bytes for user {user_id}",
        pdf_bytes.len()
    );
    let text = extract_pdf_text(pdf_bytes.clone()).await?;

    let resume_id = Uuid::new_v4();
    let file_name = file_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_UPLOAD_FILE_NAME.to_string());
    let path = format!("{user_id}/{resume_id}/{file_name}");

    let storage_path = match blob.upload(&path, pdf_bytes, PDF_CONTENT_TYPE).await {
        Ok(()) => Some(path),
        // The text is still usable; record the resume without a binary.
        Err(e) => {
            warn!("Blob upload failed, keeping extracted text only: {e}");
            None
        }
    };

    let resume = ResumeRecord {
        id: resume_id,
        user_id,
        file_name,
        storage_path,
        uploaded_at: Utc::now(),
    };
    store
        .put(
            &resume_key(user_id, resume_id),
            serde_json::to_value(&resume).map_err(anyhow::Error::from)?,
        )
        .await?;

    info!(
        "Extracted {} characters, stored resume {resume_id}",
        text.len()
    );
    Ok(ExtractionOutcome { text, resume })
}

/// Full-document text extraction. Whitespace-only output is the distinct,
/// user-actionable `ExtractionEmpty`; parser errors and panics are
/// `ExtractionFailure`.
pub(crate) async fn extract_pdf_text(bytes: Bytes) -> Result<String, AppError> {
    let text = task::spawn_blocking(move || {
        // The decoder wants a path; the temp file is removed on drop, on
        // every exit path.
        let mut tmp = NamedTempFile::new()
            .map_err(|e| AppError::ExtractionFailure(format!("temp file: {e}")))?;
        tmp.write_all(&bytes)
            .map_err(|e| AppError::ExtractionFailure(format!("temp file: {e}")))?;
        pdf_extract::extract_text(tmp.path()).map_err(|e| AppError::ExtractionFailure(e.to_string()))
    })
    .await
    .map_err(|e| {
        if e.is_panic() {
            AppError::ExtractionFailure("PDF parser panicked".to_string())
        } else {
            AppError::Internal(anyhow::anyhow!("extraction task failed: {e}"))
        }
    })??;

    if text.trim().is_empty() {
        return Err(AppError::ExtractionEmpty);
    }
    Ok(text)
}
