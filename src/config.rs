//! Loading quiz configuration (defaults + optional extra questions) from TOML.
//!
//! See `QuizConfig` and `QuestionEntry` for the expected schema.

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Question, DEFAULT_TIME_LIMIT};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct QuizConfig {
  #[serde(default)]
  pub quiz: QuizSettings,
  #[serde(default)]
  pub questions: Vec<QuestionEntry>,
}

/// Tunables for the views. Every field has a default so a partial `[quiz]` table works.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct QuizSettings {
  /// Offered by the entry view when the user leaves the time limit blank.
  pub default_time_limit: u32,
  /// Upper bound on waiting for the charting component on the results view.
  pub chart_wait_ms: u64,
  /// Where chart specs are exported for an external renderer. No export when unset.
  pub chart_export_path: Option<String>,
}

impl Default for QuizSettings {
  fn default() -> Self {
    Self { default_time_limit: DEFAULT_TIME_LIMIT, chart_wait_ms: 7000, chart_export_path: None }
  }
}

impl QuizSettings {
  pub fn chart_wait(&self) -> Duration {
    Duration::from_millis(self.chart_wait_ms)
  }
}

/// Question entry accepted in TOML: a question plus where it is filed.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionEntry {
  pub category: String,
  pub difficulty: String,
  #[serde(flatten)]
  pub question: Question,
}

/// Attempt to load `QuizConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_quiz_config_from_env() -> Option<QuizConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_quiz_config(&s) {
      Ok(cfg) => {
        info!(target: "dynamic_quiz", %path, extra_questions = cfg.questions.len(), "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "dynamic_quiz", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "dynamic_quiz", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_quiz_config(s: &str) -> Result<QuizConfig, toml::de::Error> {
  toml::from_str::<QuizConfig>(s)
}
