// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, prelude::FromRow, types::Json};

use super::{QuizStore, StoreError};
use crate::models::{
    attempt::{QuestionResult, ScoredAttempt},
    quiz::{NewQuiz, Question, Quiz, validate_quiz},
    user::{AgeGroup, ProfileUpdate, UserProfile},
};

/// Postgres-backed store. Every row is decoded into the typed model and
/// re-checked; rows that fail surface as [`StoreError::Malformed`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    age_group: String,
    description: String,
    profile_pic_uri: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserProfile {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let age_group = row
            .age_group
            .parse::<AgeGroup>()
            .map_err(|e| malformed("users", row.id, e))?;

        Ok(UserProfile {
            id: row.id,
            name: row.name,
            email: row.email,
            age_group,
            desc: row.description,
            profile_pic_uri: row.profile_pic_uri,
            created_at: Some(row.created_at),
        })
    }
}

/// `questions` is read as raw JSON so a bad document is reported per row.
#[derive(FromRow)]
struct QuizRow {
    id: i64,
    name: String,
    creator_id: i64,
    image_uri: Option<String>,
    questions: Json<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl TryFrom<QuizRow> for Quiz {
    type Error = StoreError;

    fn try_from(row: QuizRow) -> Result<Self, Self::Error> {
        let questions: Vec<Question> =
            serde_json::from_value(row.questions.0).map_err(|e| malformed("quizzes", row.id, e))?;

        validate_quiz(Quiz {
            id: row.id,
            name: row.name,
            creator_id: row.creator_id,
            image_uri: row.image_uri,
            questions,
            created_at: Some(row.created_at),
        })
        .map_err(|e| malformed("quizzes", row.id, e))
    }
}

#[derive(FromRow)]
struct AttemptRow {
    id: i64,
    quiz_id: i64,
    user_id: i64,
    taken_at: DateTime<Utc>,
    per_question: Json<serde_json::Value>,
    correct_count: i32,
    total_answered: i32,
    total_questions: i32,
}

impl TryFrom<AttemptRow> for ScoredAttempt {
    type Error = StoreError;

    fn try_from(row: AttemptRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let per_question: Vec<QuestionResult> = serde_json::from_value(row.per_question.0)
            .map_err(|e| malformed("scored_attempts", id, e))?;
        let count = |n: i32| usize::try_from(n).map_err(|e| malformed("scored_attempts", id, e));

        let attempt = ScoredAttempt {
            quiz_id: row.quiz_id,
            user_id: row.user_id,
            taken_at: row.taken_at,
            per_question,
            correct_count: count(row.correct_count)?,
            total_answered: count(row.total_answered)?,
            total_questions: count(row.total_questions)?,
        };
        attempt
            .check_consistency()
            .map_err(|e| malformed("scored_attempts", id, e))?;
        Ok(attempt)
    }
}

fn malformed(table: &str, id: i64, err: impl std::fmt::Display) -> StoreError {
    tracing::warn!("Rejecting malformed {} row {}: {}", table, id, err);
    StoreError::Malformed(format!("{} row {}: {}", table, id, err))
}

fn store_err(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound("Record".to_string()),
        e @ (sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_)) => {
            StoreError::Malformed(e.to_string())
        }
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            StoreError::NotFound(db.message().to_string())
        }
        other => {
            tracing::error!("Database error: {:?}", other);
            StoreError::Unavailable(other.to_string())
        }
    }
}

fn to_db_count(n: usize) -> Result<i32, StoreError> {
    i32::try_from(n).map_err(|_| StoreError::Malformed(format!("count {} out of range", n)))
}

fn from_db_count(n: i64) -> Result<usize, StoreError> {
    usize::try_from(n).map_err(|_| StoreError::Malformed(format!("count {} out of range", n)))
}

fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

const USER_COLUMNS: &str = "id, name, email, age_group, description, profile_pic_uri, created_at";
const QUIZ_COLUMNS: &str = "id, name, creator_id, image_uri, questions, created_at";

#[async_trait]
impl QuizStore for PgStore {
    async fn create_user(&self, name: &str, email: &str) -> Result<UserProfile, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match store_err(e) {
            StoreError::Conflict(_) => {
                StoreError::Conflict(format!("Email '{}' is already registered", email))
            }
            other => other,
        })?;

        row.try_into()
    }

    async fn get_user(&self, user_id: i64) -> Result<UserProfile, StoreError> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?
            .ok_or_else(|| StoreError::NotFound(format!("User {}", user_id)))?
            .try_into()
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        collect(rows)
    }

    async fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, StoreError> {
        sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET name = $1, age_group = $2, description = $3, profile_pic_uri = $4
            WHERE id = $5
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&update.name)
        .bind(update.age_group.as_str())
        .bind(&update.desc)
        .bind(&update.profile_pic_uri)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?
        .ok_or_else(|| StoreError::NotFound(format!("User {}", user_id)))?
        .try_into()
    }

    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz, StoreError> {
        sqlx::query_as::<_, QuizRow>(&format!(
            r#"
            INSERT INTO quizzes (name, creator_id, image_uri, questions)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            QUIZ_COLUMNS
        ))
        .bind(&quiz.name)
        .bind(quiz.creator_id)
        .bind(&quiz.image_uri)
        .bind(Json(&quiz.questions))
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?
        .try_into()
    }

    async fn get_quiz(&self, quiz_id: i64) -> Result<Quiz, StoreError> {
        sqlx::query_as::<_, QuizRow>(&format!("SELECT {} FROM quizzes WHERE id = $1", QUIZ_COLUMNS))
            .bind(quiz_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?
            .ok_or_else(|| StoreError::NotFound(format!("Quiz {}", quiz_id)))?
            .try_into()
    }

    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StoreError> {
        let rows = sqlx::query_as::<_, QuizRow>(&format!(
            "SELECT {} FROM quizzes ORDER BY id",
            QUIZ_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        collect(rows)
    }

    async fn list_quizzes_by_creator(&self, creator_id: i64) -> Result<Vec<Quiz>, StoreError> {
        let rows = sqlx::query_as::<_, QuizRow>(&format!(
            "SELECT {} FROM quizzes WHERE creator_id = $1 ORDER BY created_at DESC, id DESC",
            QUIZ_COLUMNS
        ))
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        collect(rows)
    }

    async fn list_scored_attempts(&self, user_id: i64) -> Result<Vec<ScoredAttempt>, StoreError> {
        let rows = sqlx::query_as::<_, AttemptRow>(
            r#"
            SELECT id, quiz_id, user_id, taken_at, per_question,
                   correct_count, total_answered, total_questions
            FROM scored_attempts
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        collect(rows)
    }

    async fn append_scored_attempt(&self, attempt: &ScoredAttempt) -> Result<(), StoreError> {
        insert_attempt(&self.pool, attempt).await
    }

    async fn append_first_attempt(&self, attempt: &ScoredAttempt) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        // Row lock on the user serializes their first-only submissions.
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR NO KEY UPDATE")
                .bind(attempt.user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(store_err)?;
        if locked.is_none() {
            return Err(StoreError::NotFound(format!("User {}", attempt.user_id)));
        }

        let taken: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM scored_attempts WHERE user_id = $1 AND quiz_id = $2",
        )
        .bind(attempt.user_id)
        .bind(attempt.quiz_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;

        if from_db_count(taken)? > 0 {
            return Err(StoreError::Conflict(format!(
                "quiz {} was already taken",
                attempt.quiz_id
            )));
        }

        insert_attempt(&mut *tx, attempt).await?;
        tx.commit().await.map_err(store_err)
    }
}

async fn insert_attempt<'e, E>(executor: E, attempt: &ScoredAttempt) -> Result<(), StoreError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO scored_attempts
            (quiz_id, user_id, taken_at, per_question, correct_count, total_answered, total_questions)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(attempt.quiz_id)
    .bind(attempt.user_id)
    .bind(attempt.taken_at)
    .bind(Json(&attempt.per_question))
    .bind(to_db_count(attempt.correct_count)?)
    .bind(to_db_count(attempt.total_answered)?)
    .bind(to_db_count(attempt.total_questions)?)
    .execute(executor)
    .await
    .map_err(store_err)?;

    Ok(())
}
