//! Entry view: pick category, difficulty and time limit, then store them as `quizPreferences`.

use tracing::{info, instrument, warn};

use super::{Terminal, View};
use crate::domain::SessionPreferences;
use crate::state::AppState;
use crate::store::PREFERENCES_KEY;

#[instrument(level = "info", skip_all)]
pub async fn run(state: &mut AppState, terminal: &mut Terminal) -> View {
  let categories: Vec<String> = state.bank.categories().into_iter().map(String::from).collect();
  if categories.is_empty() {
    warn!(target: "dynamic_quiz", "Question bank is empty");
    println!("No questions are available.");
    return View::Exit;
  }

  println!();
  println!("Dynamic Quiz");
  let Some(category) = pick(terminal, "Category", &categories).await else { return View::Exit };

  let difficulties: Vec<String> = state.bank.difficulties(&category).into_iter().map(String::from).collect();
  let Some(difficulty) = pick(terminal, "Difficulty", &difficulties).await else { return View::Exit };

  let default_limit = state.settings.default_time_limit;
  let Some(time_limit_seconds) = read_time_limit(terminal, default_limit).await else { return View::Exit };

  let prefs = SessionPreferences { category, difficulty, time_limit_seconds };
  info!(target: "dynamic_quiz", category = %prefs.category, difficulty = %prefs.difficulty, time_limit = prefs.time_limit_seconds, "Preferences chosen");
  state.storage.set(PREFERENCES_KEY, &prefs);
  View::Quiz
}

/// Numbered menu; accepts the number or the name. `None` on end of input.
async fn pick(terminal: &mut Terminal, title: &str, options: &[String]) -> Option<String> {
  println!("{}:", title);
  for (i, opt) in options.iter().enumerate() {
    println!("  {}. {}", i + 1, opt);
  }
  loop {
    let line = terminal.read_line().await?;
    let line = line.trim();
    let by_number = line.parse::<usize>().ok().filter(|n| (1..=options.len()).contains(n)).map(|n| options[n - 1].clone());
    let by_name = || options.iter().find(|o| o.eq_ignore_ascii_case(line)).cloned();
    match by_number.or_else(by_name) {
      Some(choice) => return Some(choice),
      None => println!("Pick 1-{} or type a name.", options.len()),
    }
  }
}

async fn read_time_limit(terminal: &mut Terminal, default: u32) -> Option<u32> {
  println!("Seconds per question [{}]:", default);
  loop {
    let line = terminal.read_line().await?;
    let line = line.trim();
    if line.is_empty() {
      return Some(default);
    }
    match line.parse::<u32>() {
      Ok(n) if n > 0 => return Some(n),
      _ => println!("Enter a positive number of seconds, or nothing for {}.", default),
    }
  }
}
