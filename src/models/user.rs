// src/models/user.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    models::{quiz::QuizListItem, summary::PerformanceView},
    utils::{
        html::clean_html,
        validation::{validate_display_name, validate_url_string},
    },
};

/// Age bracket picked on the profile screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    #[default]
    #[serde(rename = "")]
    Unspecified,
    #[serde(rename = "1-4")]
    Toddler,
    #[serde(rename = "5-12")]
    Child,
    #[serde(rename = "13-18")]
    Teen,
}

impl AgeGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Unspecified => "",
            AgeGroup::Toddler => "1-4",
            AgeGroup::Child => "5-12",
            AgeGroup::Teen => "13-18",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(AgeGroup::Unspecified),
            "1-4" => Ok(AgeGroup::Toddler),
            "5-12" => Ok(AgeGroup::Child),
            "13-18" => Ok(AgeGroup::Teen),
            other => Err(format!("unknown age group '{}'", other)),
        }
    }
}

/// Represents the 'users' table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    /// Set at registration, read-only afterwards.
    pub email: String,
    pub age_group: AgeGroup,
    pub desc: String,
    pub profile_pic_uri: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Editable profile fields, already validated and sanitized.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub name: String,
    pub age_group: AgeGroup,
    pub desc: String,
    pub profile_pic_uri: Option<String>,
}

/// The current user's profile and performance.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub performance: PerformanceView,
}

/// Another user as seen on the social feed, with the quizzes they made.
#[derive(Debug, Serialize)]
pub struct SocialProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub desc: String,
    pub profile_pic_uri: Option<String>,
    pub quizzes: Vec<QuizListItem>,
}

/// DTO for registering a profile.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(
        length(min = 1, max = 50, message = "Name length must be between 1 and 50 characters."),
        custom(function = validate_display_name)
    )]
    pub name: String,
    #[validate(email, length(max = 254))]
    pub email: String,
}

/// DTO for updating the current user's profile. Email cannot be changed.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 1, max = 50, message = "Name length must be between 1 and 50 characters."),
        custom(function = validate_display_name)
    )]
    pub name: String,
    #[serde(default)]
    pub age_group: AgeGroup,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub desc: String,
    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub profile_pic_uri: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            name: clean_html(&req.name),
            age_group: req.age_group,
            desc: clean_html(&req.desc),
            profile_pic_uri: req.profile_pic_uri,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_group_round_trips_through_text() {
        for group in [
            AgeGroup::Unspecified,
            AgeGroup::Toddler,
            AgeGroup::Child,
            AgeGroup::Teen,
        ] {
            assert_eq!(group.as_str().parse::<AgeGroup>(), Ok(group));
        }
        assert!("19-99".parse::<AgeGroup>().is_err());
    }

    #[test]
    fn age_group_json_uses_labels() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"name": "Ada", "age_group": "5-12"}"#).unwrap();
        assert_eq!(req.age_group, AgeGroup::Child);
        assert_eq!(req.desc, "");

        let bad = serde_json::from_str::<UpdateProfileRequest>(r#"{"name": "Ada", "age_group": "99"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn update_sanitizes_desc() {
        let req = UpdateProfileRequest {
            name: "Ada".to_string(),
            age_group: AgeGroup::Teen,
            desc: "I like <b>maths</b><script>steal()</script>".to_string(),
            profile_pic_uri: None,
        };
        assert!(req.validate().is_ok());
        let update = ProfileUpdate::from(req);
        assert_eq!(update.desc, "I like <b>maths</b>");
    }

    #[test]
    fn markup_only_names_are_rejected() {
        let register = RegisterUserRequest {
            name: "<script>alert(1)</script>".to_string(),
            email: "ada@example.com".to_string(),
        };
        assert!(register.validate().is_err());

        let update = UpdateProfileRequest {
            name: "<img src=x onerror=alert(1)>".to_string(),
            age_group: AgeGroup::Unspecified,
            desc: String::new(),
            profile_pic_uri: None,
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn register_requires_email() {
        let req = RegisterUserRequest {
            name: "Ada".to_string(),
            email: "not-an-email".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
