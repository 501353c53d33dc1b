//! Shared fixtures: collaborator doubles and record seeding for unit and
//! integration tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::{AuthError, AuthProvider, AuthUser};
use crate::blob::{BlobError, BlobStore};
use crate::llm_client::{CompletionClient, LlmError};
use crate::models::feedback::{feedback_key, FeedbackRecord, Priority, Suggestion};
use crate::models::resume::{resume_key, ResumeRecord};
use crate::store::KvStore;

pub const TEST_TOKEN: &str = "test-token";

/// Auth double: accepts exactly [`TEST_TOKEN`] and vouches for a fixed user.
pub struct StaticAuth {
    pub user_id: Uuid,
}

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn create_user(
        &self,
        email: &str,
        _password: &str,
        name: &str,
    ) -> Result<AuthUser, AuthError> {
        if email.contains("taken") {
            return Err(AuthError::Rejected("email already registered".to_string()));
        }
        Ok(AuthUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: Some(name.to_string()),
        })
    }

    async fn validate(&self, token: &str) -> Result<AuthUser, AuthError> {
        if token == TEST_TOKEN {
            Ok(AuthUser {
                id: self.user_id,
                email: "user@example.com".to_string(),
                name: Some("Test User".to_string()),
            })
        } else {
            Err(AuthError::Unauthorized)
        }
    }
}

/// Blob double: records uploads, signs URLs deterministically, or fails
/// every call when constructed with [`StubBlobStore::failing`].
pub struct StubBlobStore {
    fail: bool,
    uploads: Mutex<Vec<String>>,
}

impl StubBlobStore {
    pub fn new() -> Self {
        Self {
            fail: false,
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for StubBlobStore {
    async fn upload(
        &self,
        path: &str,
        _bytes: Bytes,
        _content_type: &str,
    ) -> Result<(), BlobError> {
        if self.fail {
            return Err(BlobError::Request("stub upload failure".to_string()));
        }
        self.uploads.lock().unwrap().push(path.to_string());
        Ok(())
    }

    async fn signed_url(&self, path: &str, _ttl: Duration) -> Result<String, BlobError> {
        if self.fail {
            return Err(BlobError::Request("stub signing failure".to_string()));
        }
        Ok(format!("https://blobs.test/{path}?sig=stub"))
    }
}

/// Inference double returning a canned payload (or a canned failure).
pub struct ScriptedLlm {
    response: Option<String>,
}

impl ScriptedLlm {
    pub fn returning(response: String) -> Self {
        Self {
            response: Some(response),
        }
    }

    pub fn failing() -> Self {
        Self { response: None }
    }
}

#[async_trait]
impl CompletionClient for ScriptedLlm {
    async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
        match &self.response {
            Some(r) => Ok(r.clone()),
            None => Err(LlmError::Api {
                status: 500,
                message: "scripted inference failure".to_string(),
            }),
        }
    }
}

/// Canonical model payload: two suggestions, the first without a status.
pub fn suggestions_json() -> String {
    r#"{
        "summary": {
            "professionalTitle": "Backend Engineer",
            "overallAssessment": "Solid experience, but achievements lack numbers."
        },
        "suggestions": [
            {
                "category": "Impact",
                "title": "Quantify your impact",
                "description": "Add concrete metrics to the last two roles.",
                "priority": "high"
            },
            {
                "category": "Formatting",
                "title": "Tighten the summary",
                "description": "Cut the opening paragraph to two sentences.",
                "priority": "medium",
                "status": "pending"
            }
        ]
    }"#
    .to_string()
}

pub async fn seed_resume(
    store: &dyn KvStore,
    user_id: Uuid,
    uploaded_at: DateTime<Utc>,
    storage_path: Option<String>,
) -> ResumeRecord {
    let record = ResumeRecord {
        id: Uuid::new_v4(),
        user_id,
        file_name: "resume.pdf".to_string(),
        storage_path,
        uploaded_at,
    };
    store
        .put(
            &resume_key(user_id, record.id),
            serde_json::to_value(&record).unwrap(),
        )
        .await
        .unwrap();
    record
}

pub async fn seed_feedback(
    store: &dyn KvStore,
    user_id: Uuid,
    resume_id: Uuid,
    suggestion_count: usize,
) -> FeedbackRecord {
    seed_feedback_with(store, user_id, resume_id, suggestion_count, Utc::now()).await
}

pub async fn seed_feedback_at(
    store: &dyn KvStore,
    user_id: Uuid,
    resume_id: Uuid,
    created_at: DateTime<Utc>,
) -> FeedbackRecord {
    seed_feedback_with(store, user_id, resume_id, 2, created_at).await
}

async fn seed_feedback_with(
    store: &dyn KvStore,
    user_id: Uuid,
    resume_id: Uuid,
    suggestion_count: usize,
    created_at: DateTime<Utc>,
) -> FeedbackRecord {
    let suggestions = (0..suggestion_count)
        .map(|i| Suggestion {
            category: "General".to_string(),
            title: format!("Suggestion {i}"),
            description: format!("Description {i}"),
            priority: Priority::Medium,
            status: Default::default(),
        })
        .collect();
    let record = FeedbackRecord {
        id: Uuid::new_v4(),
        user_id,
        resume_id,
        suggestions,
        created_at,
    };
    store
        .put(
            &feedback_key(user_id, record.id),
            serde_json::to_value(&record).unwrap(),
        )
        .await
        .unwrap();
    record
}

/// Hand-assembled single-page PDF whose page shows `text` in Helvetica.
/// Offsets in the xref table are computed from the actual byte positions.
pub fn minimal_text_pdf(text: &str) -> Vec<u8> {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)");
    build_pdf(&format!("BT /F1 12 Tf 72 720 Td ({escaped}) Tj ET"))
}

/// Structurally valid PDF whose page draws no text at all.
pub fn empty_page_pdf() -> Vec<u8> {
    build_pdf("q Q")
}

fn build_pdf(content: &str) -> Vec<u8> {
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref_pos = pdf.len();
    let mut tail = String::from("xref\n0 6\n0000000000 65535 f \n");
    for offset in &offsets {
        tail.push_str(&format!("{offset:010} 00000 n \n"));
    }
    tail.push_str(&format!(
        "trailer\n<< /Size 6 /Root 1 0 R >>\nstartxref\n{xref_pos}\n%%EOF\n"
    ));
    pdf.extend_from_slice(tail.as_bytes());
    pdf
}
