// src/store/mod.rs

//! The remote store: quizzes, profiles and the append-only attempt history.

pub mod memory;
pub mod postgres;

use std::{fmt, sync::Arc};

use async_trait::async_trait;

use crate::{
    config::RetakePolicy,
    models::{
        attempt::ScoredAttempt,
        quiz::{NewQuiz, Quiz},
        user::{ProfileUpdate, UserProfile},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Failures reported by a store backend. Passed through to callers unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound(String),
    Unavailable(String),
    /// A stored record could not be decoded into a valid typed value.
    Malformed(String),
    /// A uniqueness rule was violated (duplicate email, retake refused).
    Conflict(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(what) => write!(f, "{} not found", what),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
            StoreError::Malformed(msg) => write!(f, "malformed record: {}", msg),
            StoreError::Conflict(msg) => write!(f, "conflict: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn create_user(&self, name: &str, email: &str) -> Result<UserProfile, StoreError>;

    async fn get_user(&self, user_id: i64) -> Result<UserProfile, StoreError>;

    async fn list_users(&self) -> Result<Vec<UserProfile>, StoreError>;

    async fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, StoreError>;

    /// Persists a validated quiz and returns it with its assigned id.
    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz, StoreError>;

    async fn get_quiz(&self, quiz_id: i64) -> Result<Quiz, StoreError>;

    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StoreError>;

    /// Quizzes owned by `creator_id`, newest first.
    async fn list_quizzes_by_creator(&self, creator_id: i64) -> Result<Vec<Quiz>, StoreError>;

    /// All scored attempts of a user. No ordering is promised.
    async fn list_scored_attempts(&self, user_id: i64) -> Result<Vec<ScoredAttempt>, StoreError>;

    /// Appends to the history. Never deduplicates.
    ///
    /// Fails with [`StoreError::NotFound`] when the user or the quiz does not exist.
    async fn append_scored_attempt(&self, attempt: &ScoredAttempt) -> Result<(), StoreError>;

    /// Appends only if the user has no attempt on this quiz yet, otherwise fails
    /// with [`StoreError::Conflict`]. The check and the insert are one atomic step.
    async fn append_first_attempt(&self, attempt: &ScoredAttempt) -> Result<(), StoreError>;
}

pub type SharedStore = Arc<dyn QuizStore>;

/// Appends a scored attempt, honouring the retake policy.
///
/// With [`RetakePolicy::FirstOnly`] a second attempt on the same quiz is refused
/// with [`StoreError::Conflict`], also when both arrive at the same time.
pub async fn record_attempt(
    store: &dyn QuizStore,
    policy: RetakePolicy,
    attempt: &ScoredAttempt,
) -> Result<(), StoreError> {
    match policy {
        RetakePolicy::Allow => store.append_scored_attempt(attempt).await,
        RetakePolicy::FirstOnly => store.append_first_attempt(attempt).await,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::quiz::Question;

    /// A store with one player (id 1) and two quizzes.
    async fn seeded() -> (MemoryStore, i64, i64) {
        let store = MemoryStore::new();
        let player = store.create_user("Player", "player@example.com").await.unwrap();
        assert_eq!(player.id, 1);

        let mut ids = Vec::new();
        for name in ["first", "second"] {
            let quiz = store
                .create_quiz(NewQuiz {
                    name: name.to_string(),
                    creator_id: player.id,
                    image_uri: None,
                    questions: vec![Question {
                        text: "2+2?".to_string(),
                        options: vec!["3".to_string(), "4".to_string()],
                        correct_option: "4".to_string(),
                    }],
                })
                .await
                .unwrap();
            ids.push(quiz.id);
        }
        (store, ids[0], ids[1])
    }

    fn attempt(quiz_id: i64) -> ScoredAttempt {
        ScoredAttempt {
            quiz_id,
            user_id: 1,
            taken_at: Utc::now(),
            per_question: vec![],
            correct_count: 0,
            total_answered: 0,
            total_questions: 0,
        }
    }

    #[tokio::test]
    async fn allow_policy_keeps_every_submission() {
        let (store, quiz, _) = seeded().await;
        record_attempt(&store, RetakePolicy::Allow, &attempt(quiz)).await.unwrap();
        record_attempt(&store, RetakePolicy::Allow, &attempt(quiz)).await.unwrap();
        assert_eq!(store.list_scored_attempts(1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn first_only_policy_refuses_retake() {
        let (store, quiz, other) = seeded().await;
        record_attempt(&store, RetakePolicy::FirstOnly, &attempt(quiz)).await.unwrap();

        let err = record_attempt(&store, RetakePolicy::FirstOnly, &attempt(quiz))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // A different quiz is still fine.
        record_attempt(&store, RetakePolicy::FirstOnly, &attempt(other)).await.unwrap();
        assert_eq!(store.list_scored_attempts(1).await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn first_only_holds_under_concurrent_submissions() {
        let (store, quiz, _) = seeded().await;
        let store: SharedStore = Arc::new(store);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    record_attempt(store.as_ref(), RetakePolicy::FirstOnly, &attempt(quiz)).await
                })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => accepted += 1,
                Err(e) => assert!(matches!(e, StoreError::Conflict(_)), "{:?}", e),
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(store.list_scored_attempts(1).await.unwrap().len(), 1);
    }
}
