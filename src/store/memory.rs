// src/store/memory.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{QuizStore, StoreError};
use crate::models::{
    attempt::ScoredAttempt,
    quiz::{NewQuiz, Quiz},
    user::{AgeGroup, ProfileUpdate, UserProfile},
};

#[derive(Default)]
struct Inner {
    users: BTreeMap<i64, UserProfile>,
    quizzes: BTreeMap<i64, Quiz>,
    attempts: Vec<ScoredAttempt>,
    next_user_id: i64,
    next_quiz_id: i64,
}

/// Process-local store. Used by the test-suite and when no database is configured.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    /// Mirrors the foreign keys of the relational schema.
    fn require_user(&self, user_id: i64) -> Result<(), StoreError> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("User {}", user_id)))
        }
    }

    fn require_quiz(&self, quiz_id: i64) -> Result<(), StoreError> {
        if self.quizzes.contains_key(&quiz_id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("Quiz {}", quiz_id)))
        }
    }

    fn push_attempt(&mut self, attempt: &ScoredAttempt) -> Result<(), StoreError> {
        self.require_user(attempt.user_id)?;
        self.require_quiz(attempt.quiz_id)?;
        self.attempts.push(attempt.clone());
        Ok(())
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn create_user(&self, name: &str, email: &str) -> Result<UserProfile, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        inner.next_user_id += 1;
        let user = UserProfile {
            id: inner.next_user_id,
            name: name.to_string(),
            email: email.to_string(),
            age_group: AgeGroup::Unspecified,
            desc: String::new(),
            profile_pic_uri: None,
            created_at: Some(Utc::now()),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: i64) -> Result<UserProfile, StoreError> {
        self.inner
            .read()
            .await
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("User {}", user_id)))
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, StoreError> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("User {}", user_id)))?;

        user.name = update.name.clone();
        user.age_group = update.age_group;
        user.desc = update.desc.clone();
        user.profile_pic_uri = update.profile_pic_uri.clone();
        Ok(user.clone())
    }

    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz, StoreError> {
        let mut inner = self.inner.write().await;
        inner.require_user(quiz.creator_id)?;
        inner.next_quiz_id += 1;

        let quiz = Quiz {
            id: inner.next_quiz_id,
            name: quiz.name,
            creator_id: quiz.creator_id,
            image_uri: quiz.image_uri,
            questions: quiz.questions,
            created_at: Some(Utc::now()),
        };
        inner.quizzes.insert(quiz.id, quiz.clone());
        Ok(quiz)
    }

    async fn get_quiz(&self, quiz_id: i64) -> Result<Quiz, StoreError> {
        self.inner
            .read()
            .await
            .quizzes
            .get(&quiz_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Quiz {}", quiz_id)))
    }

    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StoreError> {
        Ok(self.inner.read().await.quizzes.values().cloned().collect())
    }

    async fn list_quizzes_by_creator(&self, creator_id: i64) -> Result<Vec<Quiz>, StoreError> {
        // Ids grow with insertion, so reverse id order is newest first.
        Ok(self
            .inner
            .read()
            .await
            .quizzes
            .values()
            .rev()
            .filter(|q| q.creator_id == creator_id)
            .cloned()
            .collect())
    }

    async fn list_scored_attempts(&self, user_id: i64) -> Result<Vec<ScoredAttempt>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn append_scored_attempt(&self, attempt: &ScoredAttempt) -> Result<(), StoreError> {
        self.inner.write().await.push_attempt(attempt)
    }

    async fn append_first_attempt(&self, attempt: &ScoredAttempt) -> Result<(), StoreError> {
        // One write guard covers both the lookup and the push.
        let mut inner = self.inner.write().await;
        if inner
            .attempts
            .iter()
            .any(|a| a.user_id == attempt.user_id && a.quiz_id == attempt.quiz_id)
        {
            return Err(StoreError::Conflict(format!(
                "quiz {} was already taken",
                attempt.quiz_id
            )));
        }
        inner.push_attempt(attempt)
    }
}
