// src/handlers/social.rs

use std::collections::HashMap;

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    models::{
        quiz::{Quiz, QuizListItem},
        user::{SocialProfile, UserProfile},
    },
    store::SharedStore,
    utils::jwt::Claims,
};

/// Everyone except the caller, each with the quizzes they created.
pub async fn get_feed(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let users = store.list_users().await?;
    let quizzes = store.list_quizzes().await?;

    Ok(Json(build_feed(user_id, users, &quizzes)))
}

fn build_feed(viewer_id: i64, users: Vec<UserProfile>, quizzes: &[Quiz]) -> Vec<SocialProfile> {
    let mut by_creator: HashMap<i64, Vec<QuizListItem>> = HashMap::new();
    for quiz in quizzes.iter().filter(|q| q.creator_id != viewer_id) {
        by_creator
            .entry(quiz.creator_id)
            .or_default()
            .push(QuizListItem::from(quiz));
    }

    users
        .into_iter()
        .filter(|u| u.id != viewer_id)
        .map(|u| SocialProfile {
            quizzes: by_creator.remove(&u.id).unwrap_or_default(),
            id: u.id,
            name: u.name,
            email: u.email,
            desc: u.desc,
            profile_pic_uri: u.profile_pic_uri,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{quiz::Question, user::AgeGroup};

    fn user(id: i64) -> UserProfile {
        UserProfile {
            id,
            name: format!("user{}", id),
            email: format!("user{}@example.com", id),
            age_group: AgeGroup::Unspecified,
            desc: String::new(),
            profile_pic_uri: None,
            created_at: None,
        }
    }

    fn quiz(id: i64, creator_id: i64) -> Quiz {
        Quiz {
            id,
            name: format!("quiz{}", id),
            creator_id,
            image_uri: None,
            questions: vec![Question {
                text: "?".to_string(),
                options: vec!["a".to_string(), "b".to_string()],
                correct_option: "a".to_string(),
            }],
            created_at: None,
        }
    }

    #[test]
    fn feed_excludes_viewer_and_groups_quizzes() {
        let users = vec![user(1), user(2), user(3)];
        let quizzes = vec![quiz(10, 1), quiz(11, 2), quiz(12, 2)];

        let feed = build_feed(1, users, &quizzes);

        assert_eq!(feed.len(), 2);
        assert!(feed.iter().all(|p| p.id != 1));

        let two = feed.iter().find(|p| p.id == 2).unwrap();
        let ids: Vec<i64> = two.quizzes.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![11, 12]);

        let three = feed.iter().find(|p| p.id == 3).unwrap();
        assert!(three.quizzes.is_empty());
    }
}
