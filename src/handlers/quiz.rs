// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        attempt::{Attempt, SubmitAttemptRequest},
        quiz::{CreateQuizRequest, PublicQuiz, QuizListItem, validate_new_quiz},
    },
    scoring::score_attempt,
    store::{SharedStore, record_attempt},
    utils::jwt::Claims,
};

/// Creates a quiz owned by the caller.
///
/// * Shape checks via the DTO validator (lengths, URL, option count).
/// * Domain checks via `validate_new_quiz`; the first failing question is reported.
pub async fn create_quiz(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.user_id()?;
    let new_quiz = validate_new_quiz(payload.into_new_quiz(user_id))?;

    let quiz = store.create_quiz(new_quiz).await.map_err(|e| {
        tracing::error!("Failed to create quiz: {}", e);
        AppError::from(e)
    })?;

    tracing::info!(
        quiz_id = quiz.id,
        creator_id = user_id,
        questions = quiz.questions.len(),
        "Quiz created"
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"id": quiz.id})),
    ))
}

/// Lists the caller's own quizzes, newest first.
pub async fn list_my_quizzes(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let quizzes = store.list_quizzes_by_creator(user_id).await?;

    let items: Vec<QuizListItem> = quizzes.iter().map(QuizListItem::from).collect();
    Ok(Json(items))
}

/// Returns a quiz ready to be played. Correct options are not included.
pub async fn get_quiz(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = store.get_quiz(id).await?;
    Ok(Json(PublicQuiz::from(quiz)))
}

/// Scores the caller's answers for a quiz and appends the result to their history.
pub async fn submit_attempt(
    State(store): State<SharedStore>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let quiz = store.get_quiz(id).await?;

    let attempt = Attempt {
        quiz_id: quiz.id,
        user_id,
        taken_at: chrono::Utc::now(),
        answers: req.answers,
    };
    let scored = score_attempt(&quiz, &attempt);

    record_attempt(store.as_ref(), config.retake_policy, &scored)
        .await
        .map_err(|e| {
            tracing::warn!(quiz_id = id, user_id, "Attempt not recorded: {}", e);
            AppError::from(e)
        })?;

    tracing::info!(
        quiz_id = id,
        user_id,
        correct = scored.correct_count,
        answered = scored.total_answered,
        total = scored.total_questions,
        "Attempt recorded"
    );

    Ok((StatusCode::CREATED, Json(scored)))
}
