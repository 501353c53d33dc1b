//! Per-user history reconstruction: join resumes to their feedback, enrich
//! with time-limited download URLs, newest first.

use std::time::Duration;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::blob::BlobStore;
use crate::errors::AppError;
use crate::models::feedback::{feedback_prefix, FeedbackRecord};
use crate::models::resume::{resume_prefix, ResumeRecord};
use crate::store::KvStore;

pub mod handlers;

/// Expiry of download URLs handed out with history entries.
const DOWNLOAD_URL_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub resume: ResumeRecord,
    /// Present only when a binary is stored and the blob store produced a
    /// URL; a signing failure degrades the entry instead of failing the call.
    pub download_url: Option<String>,
    pub feedback: Option<FeedbackRecord>,
}

/// Scans all resume and feedback records for `user_id` and assembles the
/// joined history, sorted by upload time descending.
///
/// Several feedback records may reference one resume; the most recently
/// created one wins, which keeps the selection stable across calls.
pub async fn build_history(
    store: &dyn KvStore,
    blob: &dyn BlobStore,
    user_id: Uuid,
) -> Result<Vec<HistoryEntry>, AppError> {
    let resumes = store.scan_by_prefix(&resume_prefix(user_id)).await?;
    let feedbacks: Vec<FeedbackRecord> = store
        .scan_by_prefix(&feedback_prefix(user_id))
        .await?
        .into_iter()
        .map(|(_, entry)| serde_json::from_value(entry.value))
        .collect::<Result<_, _>>()
        .map_err(anyhow::Error::from)?;

    let mut history = Vec::with_capacity(resumes.len());
    for (_, entry) in resumes {
        let resume: ResumeRecord =
            serde_json::from_value(entry.value).map_err(anyhow::Error::from)?;

        let feedback = feedbacks
            .iter()
            .filter(|f| f.resume_id == resume.id)
            .max_by_key(|f| f.created_at)
            .cloned();

        let download_url = match &resume.storage_path {
            Some(path) => match blob.signed_url(path, DOWNLOAD_URL_TTL).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("Signed URL for {path} failed, returning entry without one: {e}");
                    None
                }
            },
            None => None,
        };

        history.push(HistoryEntry {
            resume,
            download_url,
            feedback,
        });
    }

    history.sort_by(|a, b| b.resume.uploaded_at.cmp(&a.resume.uploaded_at));
    Ok(history)
}
