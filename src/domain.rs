//! Domain models: questions, session preferences, per-question responses and result records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_TIME_LIMIT: u32 = 30;

/// One multiple-choice question. Immutable once it is in the bank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  pub id: String,
  #[serde(alias = "question")]
  pub prompt: String,
  pub choices: Vec<String>,
  #[serde(rename = "correctAnswer", alias = "correct_choice_index")]
  pub correct_choice_index: usize,
  #[serde(default)]
  pub explanation: String,
}

impl Question {
  pub fn correct_choice(&self) -> &str {
    &self.choices[self.correct_choice_index]
  }
}

/// What the entry view stores under `quizPreferences`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPreferences {
  pub category: String,
  pub difficulty: String,
  #[serde(rename = "timeLimit", default = "default_time_limit")]
  pub time_limit_seconds: u32,
}

fn default_time_limit() -> u32 { DEFAULT_TIME_LIMIT }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
  Unanswered,
  Answered,
}

/// Per-question interaction record, index-aligned with the question set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
  pub question_id: String,
  pub selected_choice_index: Option<usize>,
  pub time_spent_seconds: u32,
  pub status: ResponseStatus,
  pub timed_out: bool,
}

impl ResponseRecord {
  pub fn new(question_id: impl Into<String>) -> Self {
    Self {
      question_id: question_id.into(),
      selected_choice_index: None,
      time_spent_seconds: 0,
      status: ResponseStatus::Unanswered,
      timed_out: false,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailStatus {
  Correct,
  Wrong,
  Unanswered,
}

impl std::fmt::Display for DetailStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      DetailStatus::Correct => "Correct",
      DetailStatus::Wrong => "Wrong",
      DetailStatus::Unanswered => "Unanswered",
    };
    f.write_str(s)
  }
}

/// One row of the results table / review panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultDetail {
  #[serde(rename = "question")]
  pub question_text: String,
  pub choices: Vec<String>,
  #[serde(rename = "selectedChoice")]
  pub selected_choice_text: String,
  #[serde(rename = "correctChoice")]
  pub correct_choice_text: String,
  #[serde(rename = "timeSpent")]
  pub time_spent_seconds: u32,
  pub status: DetailStatus,
  pub timed_out: bool,
  pub explanation: String,
}

/// Immutable summary of a submitted attempt, stored under `quizResults`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
  pub attempt_id: Uuid,
  pub category: String,
  pub difficulty: String,
  #[serde(rename = "timeLimit")]
  pub time_limit_seconds: u32,
  pub total_questions: usize,
  #[serde(rename = "correct")]
  pub correct_count: usize,
  #[serde(rename = "incorrect")]
  pub incorrect_count: usize,
  #[serde(rename = "unanswered")]
  pub unanswered_count: usize,
  #[serde(rename = "totalTimeSpent")]
  pub total_time_spent_seconds: u32,
  pub percentage: u32,
  pub completed_at: DateTime<Utc>,
  pub detail: Vec<ResultDetail>,
}
