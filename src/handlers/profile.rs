use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        summary::PerformanceView,
        user::{MeResponse, ProfileUpdate, RegisterUserRequest, UpdateProfileRequest},
    },
    scoring::summarize,
    store::SharedStore,
    utils::{html::clean_html, jwt::Claims},
};

/// Registers a profile. Called once after sign-up with the identity provider.
pub async fn register_user(
    State(store): State<SharedStore>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = store
        .create_user(&clean_html(&payload.name), &payload.email)
        .await?;

    tracing::info!(user_id = user.id, "Profile registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get current user's profile and performance.
///
/// The summary is rebuilt from the full attempt history on every call.
pub async fn get_me(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let profile = store.get_user(user_id).await?;
    let history = store.list_scored_attempts(user_id).await.map_err(|e| {
        tracing::error!("Failed to fetch attempts for user {}: {}", user_id, e);
        AppError::from(e)
    })?;

    Ok(Json(MeResponse {
        profile,
        performance: PerformanceView::from(summarize(&history)),
    }))
}

/// Update the current user's editable profile fields.
pub async fn update_me(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.user_id()?;
    let profile = store
        .update_profile(user_id, &ProfileUpdate::from(payload))
        .await?;

    Ok(Json(profile))
}

/// List the current user's scored attempts, most recent first.
pub async fn list_my_attempts(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let mut history = store.list_scored_attempts(user_id).await?;
    history.sort_by(|a, b| b.taken_at.cmp(&a.taken_at));

    Ok(Json(history))
}
