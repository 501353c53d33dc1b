use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// File name recorded for resumes submitted as pasted text rather than an
/// uploaded document.
pub const PASTED_RESUME_FILE_NAME: &str = "pasted-resume.txt";

/// Fallback file name when an upload arrives without one.
pub const DEFAULT_UPLOAD_FILE_NAME: &str = "resume.pdf";

/// Metadata for one submitted resume (uploaded PDF or pasted text).
/// Written once per submission and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    /// Key of the stored binary in the blob store. `None` for pasted text,
    /// and for uploads whose blob write failed (the extracted text is still
    /// usable in that case).
    pub storage_path: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl ResumeRecord {
    /// Record for a resume submitted directly as text, with no stored binary.
    pub fn pasted(user_id: Uuid, resume_id: Uuid) -> Self {
        Self {
            id: resume_id,
            user_id,
            file_name: PASTED_RESUME_FILE_NAME.to_string(),
            storage_path: None,
            uploaded_at: Utc::now(),
        }
    }
}

pub fn resume_key(user_id: Uuid, resume_id: Uuid) -> String {
    format!("resume:{user_id}:{resume_id}")
}

/// Prefix covering every resume record belonging to `user_id`.
pub fn resume_prefix(user_id: Uuid) -> String {
    format!("resume:{user_id}:")
}
