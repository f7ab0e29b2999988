// src/models/attempt.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user's raw pass through one quiz, before scoring.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub quiz_id: i64,
    pub user_id: i64,
    pub taken_at: DateTime<Utc>,

    /// Key: question index. Value: the option the user picked.
    /// Unanswered questions are simply absent.
    pub answers: HashMap<usize, String>,
}

/// Outcome for a single question of a scored attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_index: usize,
    pub selected: Option<String>,
    pub is_correct: bool,
}

/// The persisted result of scoring an [`Attempt`]. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAttempt {
    pub quiz_id: i64,
    pub user_id: i64,
    pub taken_at: DateTime<Utc>,
    pub per_question: Vec<QuestionResult>,
    pub correct_count: usize,
    pub total_answered: usize,
    pub total_questions: usize,
}

impl ScoredAttempt {
    /// Checks that the stored counters agree with the per-question results.
    ///
    /// Used when records come back from the store.
    pub fn check_consistency(&self) -> Result<(), String> {
        if self.per_question.len() != self.total_questions {
            return Err(format!(
                "attempt has {} results for {} questions",
                self.per_question.len(),
                self.total_questions
            ));
        }

        let answered = self
            .per_question
            .iter()
            .filter(|r| r.selected.is_some())
            .count();
        let correct = self.per_question.iter().filter(|r| r.is_correct).count();

        if answered != self.total_answered || correct != self.correct_count {
            return Err(format!(
                "attempt counters ({}/{}) disagree with results ({}/{})",
                self.correct_count, self.total_answered, correct, answered
            ));
        }

        if self
            .per_question
            .iter()
            .any(|r| r.is_correct && r.selected.is_none())
        {
            return Err("unanswered question marked correct".to_string());
        }

        Ok(())
    }
}

/// DTO for submitting answers to a quiz.
#[derive(Debug, Deserialize)]
pub struct SubmitAttemptRequest {
    /// Key: question index (JSON object keys are strings, e.g. `"0"`).
    /// Value: the selected option text.
    #[serde(default)]
    pub answers: HashMap<usize, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(index: usize, selected: Option<&str>, is_correct: bool) -> QuestionResult {
        QuestionResult {
            question_index: index,
            selected: selected.map(str::to_string),
            is_correct,
        }
    }

    fn scored(per_question: Vec<QuestionResult>, correct: usize, answered: usize) -> ScoredAttempt {
        ScoredAttempt {
            quiz_id: 1,
            user_id: 2,
            taken_at: Utc::now(),
            total_questions: per_question.len(),
            per_question,
            correct_count: correct,
            total_answered: answered,
        }
    }

    #[test]
    fn consistent_record_passes() {
        let a = scored(
            vec![result(0, Some("4"), true), result(1, None, false)],
            1,
            1,
        );
        assert!(a.check_consistency().is_ok());
    }

    #[test]
    fn counter_mismatch_is_reported() {
        let a = scored(vec![result(0, Some("4"), true)], 0, 1);
        assert!(a.check_consistency().is_err());
    }

    #[test]
    fn unanswered_cannot_be_correct() {
        let a = scored(vec![result(0, None, true)], 1, 0);
        assert!(a.check_consistency().is_err());
    }

    #[test]
    fn submit_request_reads_string_keys() {
        let req: SubmitAttemptRequest =
            serde_json::from_str(r#"{"answers": {"0": "4", "2": "no"}}"#).unwrap();
        assert_eq!(req.answers.get(&0).map(String::as_str), Some("4"));
        assert_eq!(req.answers.get(&2).map(String::as_str), Some("no"));

        let empty: SubmitAttemptRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.answers.is_empty());
    }
}
