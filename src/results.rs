//! Scoring a finished attempt into a `ResultRecord`, plus the summary cards the results view shows.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{DetailStatus, Question, ResponseRecord, ResultDetail, ResultRecord, SessionPreferences};
use crate::util::format_time;

/// Shown in place of the selected choice when a question was left unanswered.
pub const NO_ANSWER: &str = "—";

/// Classify every question/response pair and total the counts.
/// `questions` and `responses` must be index-aligned; the engine guarantees it.
pub fn compute_results(
  prefs: &SessionPreferences,
  questions: &[Question],
  responses: &[ResponseRecord],
  completed_at: DateTime<Utc>,
  attempt_id: Uuid,
) -> ResultRecord {
  debug_assert_eq!(questions.len(), responses.len());

  let (mut correct, mut incorrect, mut unanswered) = (0usize, 0usize, 0usize);
  let mut total_time = 0u32;

  let detail = questions
    .iter()
    .zip(responses)
    .map(|(q, r)| {
      total_time += r.time_spent_seconds;
      let status = match r.selected_choice_index {
        None => {
          unanswered += 1;
          DetailStatus::Unanswered
        }
        Some(i) if i == q.correct_choice_index => {
          correct += 1;
          DetailStatus::Correct
        }
        Some(_) => {
          incorrect += 1;
          DetailStatus::Wrong
        }
      };
      ResultDetail {
        question_text: q.prompt.clone(),
        choices: q.choices.clone(),
        selected_choice_text: r
          .selected_choice_index
          .map(|i| q.choices[i].clone())
          .unwrap_or_else(|| NO_ANSWER.to_string()),
        correct_choice_text: q.correct_choice().to_string(),
        time_spent_seconds: r.time_spent_seconds,
        status,
        timed_out: r.timed_out,
        explanation: q.explanation.clone(),
      }
    })
    .collect::<Vec<_>>();

  let total = questions.len();
  ResultRecord {
    attempt_id,
    category: prefs.category.clone(),
    difficulty: prefs.difficulty.clone(),
    time_limit_seconds: prefs.time_limit_seconds,
    total_questions: total,
    correct_count: correct,
    incorrect_count: incorrect,
    unanswered_count: unanswered,
    total_time_spent_seconds: total_time,
    percentage: percentage(correct, total),
    completed_at,
    detail,
  }
}

/// `round(100 * correct / total)`, halves rounding up.
fn percentage(correct: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  ((correct * 200 + total) / (total * 2)) as u32
}

/// One summary card: a value with its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryItem {
  pub label: &'static str,
  pub value: String,
}

pub fn summary_items(r: &ResultRecord) -> Vec<SummaryItem> {
  let item = |label, value: String| SummaryItem { label, value };
  vec![
    item("Correct", r.correct_count.to_string()),
    item("Incorrect", r.incorrect_count.to_string()),
    item("Unanswered", r.unanswered_count.to_string()),
    item("Total Time", format_time(r.total_time_spent_seconds)),
    item("Questions", r.total_questions.to_string()),
    item("Percentage", format!("{}%", r.percentage)),
  ]
}
