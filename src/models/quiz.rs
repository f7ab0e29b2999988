// src/models/quiz.rs

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::{
    html::clean_html,
    validation::{validate_display_name, validate_options, validate_url_string},
};

/// A single multiple-choice question.
///
/// Stored as one element of the `quizzes.questions` JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The prompt shown to the player.
    pub text: String,

    /// Candidate answers in display order.
    pub options: Vec<String>,

    /// The one right answer. Must be a member of `options`.
    pub correct_option: String,
}

/// A quiz as persisted by the store. Read-only once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub name: String,
    pub creator_id: i64,
    pub image_uri: Option<String>,
    pub questions: Vec<Question>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A quiz that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuiz {
    pub name: String,
    pub creator_id: i64,
    pub image_uri: Option<String>,
    pub questions: Vec<Question>,
}

/// Reasons a quiz definition is rejected at authoring time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    EmptyQuestionList,
    /// The correct option of the question at this index is not one of its options.
    InvalidCorrectOption(usize),
    /// The question at this index has fewer than two distinct options.
    EmptyOptionSet(usize),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyQuestionList => write!(f, "A quiz needs at least one question"),
            ValidationError::InvalidCorrectOption(i) => write!(
                f,
                "Question {}: the correct answer must be one of the options",
                i + 1
            ),
            ValidationError::EmptyOptionSet(i) => write!(
                f,
                "Question {}: at least two distinct options are required",
                i + 1
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Checks a stored quiz definition.
///
/// Duplicate options are collapsed (first occurrence wins) before the checks run,
/// so a quiz that passes never carries duplicates.
pub fn validate_quiz(mut quiz: Quiz) -> Result<Quiz, ValidationError> {
    check_questions(&mut quiz.questions)?;
    Ok(quiz)
}

/// Same checks as [`validate_quiz`] for a quiz about to be created.
pub fn validate_new_quiz(mut quiz: NewQuiz) -> Result<NewQuiz, ValidationError> {
    check_questions(&mut quiz.questions)?;
    Ok(quiz)
}

fn check_questions(questions: &mut [Question]) -> Result<(), ValidationError> {
    if questions.is_empty() {
        return Err(ValidationError::EmptyQuestionList);
    }

    for (index, question) in questions.iter_mut().enumerate() {
        let mut seen = HashSet::new();
        question.options.retain(|opt| seen.insert(opt.clone()));

        if question.options.len() < 2 {
            return Err(ValidationError::EmptyOptionSet(index));
        }
        if !question.options.contains(&question.correct_option) {
            return Err(ValidationError::InvalidCorrectOption(index));
        }
    }

    Ok(())
}

/// DTO for sending a quiz to a player (correct options stripped).
#[derive(Debug, Serialize)]
pub struct PublicQuiz {
    pub id: i64,
    pub name: String,
    pub creator_id: i64,
    pub image_uri: Option<String>,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub text: String,
    pub options: Vec<String>,
}

impl From<Quiz> for PublicQuiz {
    fn from(quiz: Quiz) -> Self {
        Self {
            id: quiz.id,
            name: quiz.name,
            creator_id: quiz.creator_id,
            image_uri: quiz.image_uri,
            questions: quiz
                .questions
                .into_iter()
                .map(|q| PublicQuestion {
                    text: q.text,
                    options: q.options,
                })
                .collect(),
        }
    }
}

/// Compact listing entry used by "my quizzes" and the social feed.
#[derive(Debug, Serialize)]
pub struct QuizListItem {
    pub id: i64,
    pub name: String,
    pub image_uri: Option<String>,
    pub question_count: usize,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&Quiz> for QuizListItem {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id,
            name: quiz.name.clone(),
            image_uri: quiz.image_uri.clone(),
            question_count: quiz.questions.len(),
            created_at: quiz.created_at,
        }
    }
}

/// DTO for authoring a quiz.
///
/// Shape limits only. Domain rules (at least one question, correct option among
/// the options) are left to [`validate_new_quiz`] so the author gets a precise error.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(
        length(min = 1, max = 100, message = "Quiz name must be between 1 and 100 characters"),
        custom(function = validate_display_name)
    )]
    pub name: String,
    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub image_uri: Option<String>,
    #[validate(length(max = 50), nested)]
    pub questions: Vec<CreateQuestionRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000, message = "Question text must not be empty"))]
    pub text: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 500))]
    pub correct_option: String,
}

impl CreateQuizRequest {
    /// Options and the correct option are kept verbatim; scoring compares them exactly.
    pub fn into_new_quiz(self, creator_id: i64) -> NewQuiz {
        NewQuiz {
            name: clean_html(&self.name),
            creator_id,
            image_uri: self.image_uri,
            questions: self
                .questions
                .into_iter()
                .map(|q| Question {
                    text: q.text,
                    options: q.options,
                    correct_option: q.correct_option,
                })
                .collect(),
        }
    }
}
