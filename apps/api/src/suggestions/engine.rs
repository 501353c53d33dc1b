//! Suggestion generation: one structured completion call, tolerant decode of
//! the result, and persistence of the feedback record.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{strip_json_fences, CompletionClient};
use crate::models::feedback::{feedback_key, FeedbackRecord, ResumeSummary, Suggestion};
use crate::models::resume::{resume_key, ResumeRecord};
use crate::store::KvStore;
use crate::suggestions::prompts::{SUGGESTION_PROMPT, SUGGESTION_SYSTEM};

/// Field names under which the model has been observed to return the
/// suggestion list. Checked in order; the first match wins.
const SUGGESTION_LIST_ALIASES: [&str; 3] = ["suggestions", "improvements", "items"];

#[derive(Debug)]
pub struct GeneratedFeedback {
    pub feedback: FeedbackRecord,
    pub summary: ResumeSummary,
}

/// Creates the resume record for directly submitted text if this submission
/// has not been seen before. First write wins; replays are no-ops, so a
/// resume created by the extraction path is never overwritten.
pub async fn ensure_resume_exists(
    store: &dyn KvStore,
    user_id: Uuid,
    resume_id: Uuid,
) -> Result<(), AppError> {
    let record = ResumeRecord::pasted(user_id, resume_id);
    let created = store
        .put_if_absent(
            &resume_key(user_id, resume_id),
            serde_json::to_value(&record).map_err(anyhow::Error::from)?,
        )
        .await?;
    if created {
        debug!("Created resume record {resume_id} for directly submitted text");
    }
    Ok(())
}

/// Runs the full generation pipeline for one resume text. Nothing is
/// persisted unless normalization yields at least one suggestion.
pub async fn generate_feedback(
    store: &dyn KvStore,
    llm: &dyn CompletionClient,
    user_id: Uuid,
    resume_id: Uuid,
    resume_text: &str,
) -> Result<GeneratedFeedback, AppError> {
    ensure_resume_exists(store, user_id, resume_id).await?;

    let prompt = SUGGESTION_PROMPT.replace("{resume_text}", resume_text);
    let raw = llm
        .complete(&prompt, SUGGESTION_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    let (suggestions, summary) = normalize_response(&raw)?;
    if suggestions.is_empty() {
        return Err(AppError::NoSuggestions);
    }

    let feedback = FeedbackRecord {
        id: Uuid::new_v4(),
        user_id,
        resume_id,
        suggestions,
        created_at: Utc::now(),
    };
    store
        .put(
            &feedback_key(user_id, feedback.id),
            serde_json::to_value(&feedback).map_err(anyhow::Error::from)?,
        )
        .await?;

    info!(
        "Stored feedback {} ({} suggestions) for resume {resume_id}",
        feedback.id,
        feedback.suggestions.len()
    );
    Ok(GeneratedFeedback { feedback, summary })
}

/// Decodes the model output. The suggestion list is accepted under a fixed
/// set of alias keys; anything else fails closed rather than being silently
/// treated as empty. Order within the list is preserved.
fn normalize_response(raw: &str) -> Result<(Vec<Suggestion>, ResumeSummary), AppError> {
    let parsed: Value = serde_json::from_str(strip_json_fences(raw))
        .map_err(|e| AppError::Llm(format!("model returned invalid JSON: {e}")))?;

    let list = SUGGESTION_LIST_ALIASES
        .iter()
        .find_map(|key| parsed.get(*key).and_then(Value::as_array).cloned())
        .ok_or_else(|| {
            AppError::Llm(format!(
                "model response carries no suggestion list (tried {})",
                SUGGESTION_LIST_ALIASES.join("/")
            ))
        })?;

    let suggestions: Vec<Suggestion> = serde_json::from_value(Value::Array(list))
        .map_err(|e| AppError::Llm(format!("malformed suggestion entry: {e}")))?;

    let summary = parsed
        .get("summary")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();

    Ok((suggestions, summary))
}
