//! Built-in question bank, so the quiz is usable without any external config.

use tracing::error;

use crate::config::{parse_quiz_config, QuestionEntry};

const BUILTIN_BANK: &str = include_str!("../data/questions.toml");

/// Questions shipped with the binary, in file order.
pub fn seed_questions() -> Vec<QuestionEntry> {
  match parse_quiz_config(BUILTIN_BANK) {
    Ok(cfg) => cfg.questions,
    Err(e) => {
      error!(target: "bank", error = %e, "Built-in question bank failed to parse");
      Vec::new()
    }
  }
}
