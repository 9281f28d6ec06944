//! Application state: question bank, view settings and the session store.
//!
//! This module owns:
//!   - the question bank (built-in seeds plus config questions)
//!   - the `[quiz]` settings (from TOML or defaults)
//!   - the session store shared by the views
//!
//! Nothing here is shared across threads: the whole app runs on one
//! cooperative task, so the state is passed around as `&mut AppState`.

use tracing::{info, instrument};

use crate::bank::QuestionBank;
use crate::config::{load_quiz_config_from_env, QuizConfig, QuizSettings};
use crate::seeds::seed_questions;
use crate::store::{MemoryStore, SessionStorage};

pub struct AppState {
    pub bank: QuestionBank,
    pub settings: QuizSettings,
    pub storage: SessionStorage<MemoryStore>,
}

impl AppState {
    /// Build state from env: load config, merge seed and config questions.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        Self::from_config(load_quiz_config_from_env().unwrap_or_default())
    }

    /// Seeds go in first, so a config question cannot shadow a built-in id.
    pub fn from_config(cfg: QuizConfig) -> Self {
        let mut entries = seed_questions();
        entries.extend(cfg.questions);
        let bank = QuestionBank::from_entries(entries);
        info!(
            target: "dynamic_quiz",
            questions = bank.len(),
            categories = bank.categories().len(),
            default_time_limit = cfg.quiz.default_time_limit,
            chart_export = cfg.quiz.chart_export_path.as_deref().unwrap_or("disabled"),
            "Quiz state ready"
        );
        Self {
            bank,
            settings: cfg.quiz,
            storage: SessionStorage::default(),
        }
    }
}
