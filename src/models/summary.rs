// src/models/summary.rs

use std::fmt;

use serde::Serialize;

/// Rollup of a user's scored history, shown on the profile screen.
///
/// Never stored; rebuilt from the full history on every read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerformanceSummary {
    pub attempts_count: usize,
    /// Distinct quizzes among the attempts.
    pub quizzes_attempted: usize,
    pub total_questions_answered: usize,
    pub correct_count: usize,
    pub incorrect_count: usize,
}

/// One labelled slice of the correct/incorrect chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartSlice {
    pub label: &'static str,
    pub value: usize,
}

impl PerformanceSummary {
    /// Share of answered questions that were right, or `None` before any answer.
    pub fn accuracy(&self) -> Option<f64> {
        if self.total_questions_answered == 0 {
            return None;
        }
        Some(self.correct_count as f64 / self.total_questions_answered as f64)
    }

    pub fn chart(&self) -> [ChartSlice; 2] {
        [
            ChartSlice {
                label: "Correct",
                value: self.correct_count,
            },
            ChartSlice {
                label: "Incorrect",
                value: self.incorrect_count,
            },
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.attempts_count == 0
    }
}

impl fmt::Display for PerformanceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.attempts_count == 1 { "attempt" } else { "attempts" };
        write!(
            f,
            "{}/{} correct over {} {}",
            self.correct_count, self.total_questions_answered, self.attempts_count, noun
        )
    }
}

/// Profile-screen payload: the raw counters plus the derived presentation bits.
#[derive(Debug, Serialize)]
pub struct PerformanceView {
    #[serde(flatten)]
    pub summary: PerformanceSummary,
    pub accuracy: Option<f64>,
    pub chart: [ChartSlice; 2],
    pub headline: String,
    /// No attempts yet; the client shows a prompt instead of the chart.
    pub empty: bool,
}

impl From<PerformanceSummary> for PerformanceView {
    fn from(summary: PerformanceSummary) -> Self {
        Self {
            accuracy: summary.accuracy(),
            chart: summary.chart(),
            headline: summary.to_string(),
            empty: summary.is_empty(),
            summary,
        }
    }
}
