use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    #[default]
    Pending,
    Implemented,
    Ignored,
}

/// One actionable recommendation. Suggestions have no identity of their own;
/// they are addressed by position within the owning feedback record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    #[serde(default, deserialize_with = "status_or_pending")]
    pub status: SuggestionStatus,
}

/// The model occasionally emits `"status": null`; treat that the same as an
/// absent field.
fn status_or_pending<'de, D>(deserializer: D) -> Result<SuggestionStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<SuggestionStatus>::deserialize(deserializer)?.unwrap_or_default())
}

/// Result of one suggestion-generation call. `suggestions` is non-empty at
/// creation and its order is preserved; statuses are mutated in place later.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Reference, not ownership: several feedback records may point at the
    /// same resume.
    pub resume_id: Uuid,
    pub suggestions: Vec<Suggestion>,
    pub created_at: DateTime<Utc>,
}

/// Brief candidate summary returned alongside the suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    pub professional_title: String,
    pub overall_assessment: String,
}

impl Default for ResumeSummary {
    fn default() -> Self {
        Self {
            professional_title: "Professional".to_string(),
            overall_assessment: "Resume analysis completed.".to_string(),
        }
    }
}

pub fn feedback_key(user_id: Uuid, feedback_id: Uuid) -> String {
    format!("feedback:{user_id}:{feedback_id}")
}

/// Prefix covering every feedback record belonging to `user_id`.
pub fn feedback_prefix(user_id: Uuid) -> String {
    format!("feedback:{user_id}:")
}
