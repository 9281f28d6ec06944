//! Error taxonomy. Setup errors turn into redirects, store errors into fallbacks,
//! chart errors into log lines. None of them is fatal to the terminal session.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
  #[error("quiz preferences are missing")]
  MissingPreferences,
  #[error("no questions available for {category} / {difficulty}")]
  NoQuestions { category: String, difficulty: String },
  #[error("time limit must be positive")]
  InvalidTimeLimit,
}

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("stored value under `{key}` is not valid JSON for the expected type: {source}")]
  Malformed {
    key: String,
    #[source]
    source: serde_json::Error,
  },
  #[error("failed to serialize value for `{key}`: {source}")]
  Serialize {
    key: String,
    #[source]
    source: serde_json::Error,
  },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BankError {
  #[error("question {id} needs at least two choices")]
  TooFewChoices { id: String },
  #[error("question {id} marks choice {index} correct but has only {len} choices")]
  CorrectIndexOutOfRange { id: String, index: usize, len: usize },
  #[error("question id {id} is already in the bank")]
  DuplicateId { id: String },
  #[error("question has an empty id")]
  EmptyId,
}

#[derive(Debug, Error)]
pub enum ChartError {
  #[error("charting component is unavailable")]
  Unavailable,
  #[error("charting component failed to load within {0:?}")]
  TimedOut(Duration),
  #[error("chart backend failed: {0}")]
  Backend(String),
}
