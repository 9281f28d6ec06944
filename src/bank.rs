//! Question bank: categories → difficulties → ordered questions.
//!
//! Built from the seed bank plus any `[[questions]]` from the TOML config.
//! Entries that break the question invariants are logged and skipped, so a
//! lookup can only ever hand out well-formed questions.

use std::collections::HashSet;

use tracing::{error, info, instrument};

use crate::config::QuestionEntry;
use crate::domain::Question;
use crate::error::BankError;

#[derive(Debug, Default)]
pub struct QuestionBank {
    categories: Vec<Category>,
    ids: HashSet<String>,
}

#[derive(Debug)]
struct Category {
    name: String,
    levels: Vec<(String, Vec<Question>)>,
}

impl QuestionBank {
    /// Build a bank from entries, keeping first-seen order of categories and difficulties.
    #[instrument(level = "info", skip_all, fields(entries = entries.len()))]
    pub fn from_entries(entries: Vec<QuestionEntry>) -> Self {
        let mut bank = Self::default();
        for entry in entries {
            let id = entry.question.id.clone();
            if let Err(e) = bank.insert(entry) {
                error!(target: "bank", %id, error = %e, "Skipping bank item");
            }
        }
        for cat in &bank.categories {
            for (diff, qs) in &cat.levels {
                info!(target: "bank", category = %cat.name, difficulty = %diff, questions = qs.len(), "Bank inventory");
            }
        }
        bank
    }

    pub fn insert(&mut self, entry: QuestionEntry) -> Result<(), BankError> {
        let QuestionEntry { category, difficulty, question } = entry;
        validate(&question)?;
        if self.ids.contains(&question.id) {
            return Err(BankError::DuplicateId { id: question.id });
        }
        self.ids.insert(question.id.clone());

        let idx = match self.categories.iter().position(|c| c.name == category) {
            Some(i) => i,
            None => {
                self.categories.push(Category { name: category, levels: Vec::new() });
                self.categories.len() - 1
            }
        };
        let cat = &mut self.categories[idx];
        match cat.levels.iter_mut().find(|(d, _)| *d == difficulty) {
            Some((_, qs)) => qs.push(question),
            None => cat.levels.push((difficulty, vec![question])),
        }
        Ok(())
    }

    /// The question set for a filter pair. Empty when nothing matches.
    pub fn lookup(&self, category: &str, difficulty: &str) -> &[Question] {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .and_then(|c| c.levels.iter().find(|(d, _)| d == difficulty))
            .map(|(_, qs)| qs.as_slice())
            .unwrap_or(&[])
    }

    pub fn categories(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn difficulties(&self, category: &str) -> Vec<&str> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.levels.iter().map(|(d, _)| d.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

fn validate(q: &Question) -> Result<(), BankError> {
    if q.id.trim().is_empty() {
        return Err(BankError::EmptyId);
    }
    if q.choices.len() < 2 {
        return Err(BankError::TooFewChoices { id: q.id.clone() });
    }
    if q.correct_choice_index >= q.choices.len() {
        return Err(BankError::CorrectIndexOutOfRange {
            id: q.id.clone(),
            index: q.correct_choice_index,
            len: q.choices.len(),
        });
    }
    Ok(())
}
