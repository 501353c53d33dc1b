//! Per-suggestion status mutation.
//!
//! The write is a read-modify-write over the whole feedback record, guarded
//! by the store's optimistic version check so concurrent updates to different
//! indices of the same record cannot silently overwrite each other.

use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::feedback::{feedback_key, FeedbackRecord, SuggestionStatus};
use crate::store::{KvStore, StoreError};

const MAX_UPDATE_ATTEMPTS: u32 = 3;

/// Sets the status of the suggestion at `index` inside feedback
/// `feedback_id`, leaving every other field untouched. On a version conflict
/// the record is re-read and the update replayed, up to
/// `MAX_UPDATE_ATTEMPTS` times.
pub async fn update_suggestion_status(
    store: &dyn KvStore,
    user_id: Uuid,
    feedback_id: Uuid,
    index: usize,
    status: SuggestionStatus,
) -> Result<(), AppError> {
    let key = feedback_key(user_id, feedback_id);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let Some(entry) = store.get(&key).await? else {
            return Err(AppError::NotFound(format!("Feedback {feedback_id} not found")));
        };
        let mut record: FeedbackRecord =
            serde_json::from_value(entry.value).map_err(anyhow::Error::from)?;

        let Some(suggestion) = record.suggestions.get_mut(index) else {
            return Err(AppError::Validation(format!(
                "suggestion index {index} is out of range"
            )));
        };
        suggestion.status = status;

        let value = serde_json::to_value(&record).map_err(anyhow::Error::from)?;
        match store.put_if_version(&key, value, entry.version).await {
            Ok(()) => return Ok(()),
            Err(StoreError::VersionConflict { .. }) if attempt < MAX_UPDATE_ATTEMPTS => {
                debug!("Concurrent write on {key}, replaying update (attempt {attempt})");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::feedback::feedback_prefix;
    use crate::store::MemoryStore;
    use crate::test_support::seed_feedback;

    #[tokio::test]
    async fn updates_only_the_addressed_suggestion() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let seeded = seed_feedback(&store, user_id, Uuid::new_v4(), 3).await;

        update_suggestion_status(
            &store,
            user_id,
            seeded.id,
            1,
            SuggestionStatus::Implemented,
        )
        .await
        .unwrap();

        let entry = store
            .get(&feedback_key(user_id, seeded.id))
            .await
            .unwrap()
            .unwrap();
        let updated: FeedbackRecord = serde_json::from_value(entry.value).unwrap();

        assert_eq!(updated.suggestions[1].status, SuggestionStatus::Implemented);
        assert_eq!(updated.suggestions[0].status, SuggestionStatus::Pending);
        assert_eq!(updated.suggestions[2].status, SuggestionStatus::Pending);
        assert_eq!(updated.suggestions[1].title, seeded.suggestions[1].title);
        assert_eq!(updated.resume_id, seeded.resume_id);
        assert_eq!(updated.created_at, seeded.created_at);
    }

    #[tokio::test]
    async fn unknown_feedback_is_not_found_and_writes_nothing() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();

        let err = update_suggestion_status(
            &store,
            user_id,
            Uuid::new_v4(),
            0,
            SuggestionStatus::Ignored,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store
            .scan_by_prefix(&feedback_prefix(user_id))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn out_of_range_index_is_rejected_without_a_write() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let seeded = seed_feedback(&store, user_id, Uuid::new_v4(), 2).await;

        let err = update_suggestion_status(
            &store,
            user_id,
            seeded.id,
            5,
            SuggestionStatus::Implemented,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let entry = store
            .get(&feedback_key(user_id, seeded.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.version, 1, "record must not have been rewritten");
    }

    /// Delegates to a [`MemoryStore`] but, on the first `put_if_version`,
    /// first lets another writer sneak in a change to suggestion 0, so the
    /// caller's expected version is stale exactly once.
    struct RacingStore {
        inner: MemoryStore,
        raced: std::sync::atomic::AtomicBool,
    }

    #[async_trait::async_trait]
    impl KvStore for RacingStore {
        async fn put(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
            self.inner.put(key, value).await
        }

        async fn put_if_absent(
            &self,
            key: &str,
            value: serde_json::Value,
        ) -> Result<bool, StoreError> {
            self.inner.put_if_absent(key, value).await
        }

        async fn get(&self, key: &str) -> Result<Option<crate::store::Versioned>, StoreError> {
            self.inner.get(key).await
        }

        async fn put_if_version(
            &self,
            key: &str,
            value: serde_json::Value,
            expected: i64,
        ) -> Result<(), StoreError> {
            if !self.raced.swap(true, std::sync::atomic::Ordering::SeqCst) {
                let entry = self.inner.get(key).await?.unwrap();
                let mut record: FeedbackRecord = serde_json::from_value(entry.value).unwrap();
                record.suggestions[0].status = SuggestionStatus::Ignored;
                self.inner
                    .put(key, serde_json::to_value(&record).unwrap())
                    .await?;
            }
            self.inner.put_if_version(key, value, expected).await
        }

        async fn scan_by_prefix(
            &self,
            prefix: &str,
        ) -> Result<Vec<(String, crate::store::Versioned)>, StoreError> {
            self.inner.scan_by_prefix(prefix).await
        }
    }

    #[tokio::test]
    async fn conflicting_update_is_replayed_and_both_survive() {
        let store = RacingStore {
            inner: MemoryStore::new(),
            raced: std::sync::atomic::AtomicBool::new(false),
        };
        let user_id = Uuid::new_v4();
        let seeded = seed_feedback(&store.inner, user_id, Uuid::new_v4(), 2).await;
        let key = feedback_key(user_id, seeded.id);

        update_suggestion_status(&store, user_id, seeded.id, 1, SuggestionStatus::Implemented)
            .await
            .unwrap();

        let entry = store.inner.get(&key).await.unwrap().unwrap();
        let merged: FeedbackRecord = serde_json::from_value(entry.value).unwrap();
        // Neither writer clobbered the other.
        assert_eq!(merged.suggestions[0].status, SuggestionStatus::Ignored);
        assert_eq!(merged.suggestions[1].status, SuggestionStatus::Implemented);
        assert_eq!(entry.version, 3, "interfering write + replayed write");
    }
}
