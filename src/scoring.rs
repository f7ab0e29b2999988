// src/scoring.rs

//! Turns raw answers into scored attempts, and scored history into a summary.
//!
//! Both functions are pure. Callers validate quizzes first and pass a matching
//! quiz/attempt pair.

use std::collections::HashSet;

use crate::models::{
    attempt::{Attempt, QuestionResult, ScoredAttempt},
    quiz::Quiz,
    summary::PerformanceSummary,
};

/// Scores one attempt against its quiz.
///
/// * Answers are compared to the correct option with exact string equality.
/// * A missing (or empty) answer is recorded as unanswered and not counted.
/// * Answers for indices past the end of the quiz are dropped.
pub fn score_attempt(quiz: &Quiz, attempt: &Attempt) -> ScoredAttempt {
    let per_question: Vec<QuestionResult> = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let selected = attempt
                .answers
                .get(&index)
                .filter(|ans| !ans.is_empty())
                .cloned();
            let is_correct = selected.as_deref() == Some(question.correct_option.as_str());

            QuestionResult {
                question_index: index,
                selected,
                is_correct,
            }
        })
        .collect();

    let correct_count = per_question.iter().filter(|r| r.is_correct).count();
    let total_answered = per_question.iter().filter(|r| r.selected.is_some()).count();

    ScoredAttempt {
        quiz_id: attempt.quiz_id,
        user_id: attempt.user_id,
        taken_at: attempt.taken_at,
        total_questions: per_question.len(),
        per_question,
        correct_count,
        total_answered,
    }
}

/// Folds a user's scored attempts into one summary. Input order does not matter.
pub fn summarize<'a, I>(scored_attempts: I) -> PerformanceSummary
where
    I: IntoIterator<Item = &'a ScoredAttempt>,
{
    let mut quizzes = HashSet::new();
    let mut summary = PerformanceSummary::default();

    for attempt in scored_attempts {
        summary.attempts_count += 1;
        summary.total_questions_answered += attempt.total_answered;
        summary.correct_count += attempt.correct_count;
        quizzes.insert(attempt.quiz_id);
    }

    summary.quizzes_attempted = quizzes.len();
    summary.incorrect_count = summary
        .total_questions_answered
        .saturating_sub(summary.correct_count);
    summary
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::quiz::Question;

    fn two_plus_two() -> Quiz {
        Quiz {
            id: 10,
            name: "Arithmetic".to_string(),
            creator_id: 1,
            image_uri: None,
            questions: vec![Question {
                text: "2+2?".to_string(),
                options: vec!["3".to_string(), "4".to_string(), "5".to_string()],
                correct_option: "4".to_string(),
            }],
            created_at: None,
        }
    }

    fn attempt(answers: &[(usize, &str)]) -> Attempt {
        Attempt {
            quiz_id: 10,
            user_id: 2,
            taken_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            answers: answers
                .iter()
                .map(|(i, a)| (*i, a.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn scored(quiz_id: i64, correct: usize, answered: usize) -> ScoredAttempt {
        let per_question = (0..answered)
            .map(|i| QuestionResult {
                question_index: i,
                selected: Some("x".to_string()),
                is_correct: i < correct,
            })
            .collect::<Vec<_>>();
        ScoredAttempt {
            quiz_id,
            user_id: 2,
            taken_at: Utc::now(),
            total_questions: per_question.len(),
            per_question,
            correct_count: correct,
            total_answered: answered,
        }
    }

    fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut out = Vec::new();
        for i in 0..items.len() {
            let mut rest = items.to_vec();
            let head = rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, head.clone());
                out.push(tail);
            }
        }
        out
    }

    #[test]
    fn correct_answer_is_counted() {
        let result = score_attempt(&two_plus_two(), &attempt(&[(0, "4")]));
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.total_answered, 1);
        assert_eq!(result.total_questions, 1);
        assert_eq!(
            result.per_question,
            vec![QuestionResult {
                question_index: 0,
                selected: Some("4".to_string()),
                is_correct: true,
            }]
        );
        assert!(result.check_consistency().is_ok());
    }

    #[test]
    fn wrong_answer_is_answered_but_not_correct() {
        let result = score_attempt(&two_plus_two(), &attempt(&[(0, "5")]));
        assert_eq!(result.correct_count, 0);
        assert_eq!(result.total_answered, 1);
    }

    #[test]
    fn unanswered_question_is_excluded() {
        let result = score_attempt(&two_plus_two(), &attempt(&[]));
        assert_eq!(result.correct_count, 0);
        assert_eq!(result.total_answered, 0);
        assert_eq!(result.total_questions, 1);
        assert_eq!(result.per_question[0].selected, None);
        assert!(!result.per_question[0].is_correct);
    }

    #[test]
    fn empty_string_counts_as_unanswered() {
        let result = score_attempt(&two_plus_two(), &attempt(&[(0, "")]));
        assert_eq!(result.total_answered, 0);
    }

    #[test]
    fn stale_indices_are_ignored() {
        let quiz = two_plus_two();
        let clean = score_attempt(&quiz, &attempt(&[(0, "4")]));
        let stale = score_attempt(&quiz, &attempt(&[(0, "4"), (7, "x")]));
        assert_eq!(clean, stale);
    }

    #[test]
    fn comparison_is_exact() {
        let quiz = two_plus_two();
        assert_eq!(score_attempt(&quiz, &attempt(&[(0, " 4")])).correct_count, 0);

        let mut cased = quiz.clone();
        cased.questions[0].options = vec!["Paris".to_string(), "Rome".to_string()];
        cased.questions[0].correct_option = "Paris".to_string();
        assert_eq!(score_attempt(&cased, &attempt(&[(0, "paris")])).correct_count, 0);
        assert_eq!(score_attempt(&cased, &attempt(&[(0, "Paris")])).correct_count, 1);
    }

    #[test]
    fn summary_arithmetic() {
        let history = vec![scored(1, 2, 3), scored(2, 1, 1)];
        let summary = summarize(&history);
        assert_eq!(summary.attempts_count, 2);
        assert_eq!(summary.total_questions_answered, 4);
        assert_eq!(summary.correct_count, 3);
        assert_eq!(summary.incorrect_count, 1);
        assert_eq!(summary.quizzes_attempted, 2);
    }

    #[test]
    fn summary_of_empty_history_is_zero() {
        let summary = summarize(&Vec::<ScoredAttempt>::new());
        assert_eq!(summary, PerformanceSummary::default());
        assert_eq!(summary.attempts_count, 0);
        assert_eq!(summary.incorrect_count, 0);
    }

    #[test]
    fn summary_ignores_order() {
        let history = vec![
            scored(1, 2, 3),
            scored(2, 1, 1),
            scored(1, 0, 2),
            scored(3, 4, 4),
        ];
        let expected = summarize(&history);

        // Every rotation and the reversal.
        for shift in 0..history.len() {
            let mut rotated = history.clone();
            rotated.rotate_left(shift);
            assert_eq!(summarize(&rotated), expected);
            rotated.reverse();
            assert_eq!(summarize(&rotated), expected);
        }
    }

    #[test]
    fn summary_is_the_same_for_every_permutation() {
        let history = vec![
            scored(1, 2, 3),
            scored(2, 1, 1),
            scored(1, 0, 2),
            scored(3, 4, 4),
            scored(2, 0, 0),
        ];
        let expected = summarize(&history);
        assert_eq!(expected.attempts_count, 5);
        assert_eq!(expected.quizzes_attempted, 3);
        assert_eq!(expected.total_questions_answered, 10);
        assert_eq!(expected.correct_count, 7);
        assert_eq!(expected.incorrect_count, 3);

        let all = permutations(&history);
        assert_eq!(all.len(), 120);
        for order in &all {
            assert_eq!(summarize(order), expected);
        }
    }

    #[test]
    fn retakes_count_as_separate_attempts() {
        let history = vec![scored(1, 1, 1), scored(1, 1, 1)];
        let summary = summarize(&history);
        assert_eq!(summary.attempts_count, 2);
        assert_eq!(summary.quizzes_attempted, 1);
        assert_eq!(summary.correct_count, 2);
    }
}
