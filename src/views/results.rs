//! Results view: summary cards, per-question table, optional review, charts, retake.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use super::{Terminal, View};
use crate::charts::{render_charts, JsonChartExport};
use crate::domain::ResultRecord;
use crate::protocol::{parse_results_command, ResultsCommand};
use crate::results::summary_items;
use crate::state::AppState;
use crate::store::RESULTS_KEY;
use crate::util::format_time;

#[instrument(level = "info", skip_all)]
pub async fn run(state: &mut AppState, terminal: &mut Terminal) -> View {
  let mut to = View::Results;
  if !state.storage.ensure_keys(&[RESULTS_KEY], || to = View::Entry) {
    return to;
  }
  let Some(record) = state.storage.get::<Option<ResultRecord>>(RESULTS_KEY, None) else {
    warn!(target: "dynamic_quiz", "Stored results unreadable; returning to entry");
    return View::Entry;
  };

  println!();
  println!("{} • {} • Score {}%", record.category, record.difficulty.to_uppercase(), record.percentage);
  print_summary(&record);
  print_table(&record);

  let limit = state.settings.chart_wait();
  let charts = match state.settings.chart_export_path.clone() {
    Some(path) => {
      let loader = JsonChartExport::spawn_load(path);
      let record = record.clone();
      Some(tokio::spawn(async move { render_charts(loader, limit, &record).await }))
    }
    None => {
      info!(target: "charts", "No chart export configured");
      None
    }
  };

  println!("Commands: review, retake, quit");
  let mut reviewing = false;
  let next = loop {
    let Some(line) = terminal.read_line().await else { break View::Exit };
    match parse_results_command(&line) {
      Some(ResultsCommand::Review) => {
        reviewing = !reviewing;
        if reviewing { print_review(&record) } else { println!("Review hidden.") }
      }
      Some(ResultsCommand::Retake) => {
        state.storage.remove(RESULTS_KEY);
        info!(target: "dynamic_quiz", attempt = %record.attempt_id, "Retaking quiz");
        break View::Entry;
      }
      Some(ResultsCommand::Quit) => break View::Exit,
      None => println!("Commands: review, retake, quit"),
    }
  };

  if let Some(task) = charts {
    settle_charts(task, limit).await;
  }
  next
}

/// Give the chart task up to `limit` to finish before the view is left.
/// The task bounds its own wait for the backend by the same limit.
async fn settle_charts(mut task: JoinHandle<bool>, limit: Duration) -> Option<bool> {
  match tokio::time::timeout(limit, &mut task).await {
    Ok(Ok(drawn)) => Some(drawn),
    Ok(Err(e)) => {
      error!(target: "charts", error = %e, "Chart task failed");
      None
    }
    Err(_) => {
      task.abort();
      warn!(target: "charts", waited_ms = limit.as_millis() as u64, "Chart export abandoned on leaving results");
      None
    }
  }
}

fn print_summary(r: &ResultRecord) {
  let cards: Vec<String> = summary_items(r).into_iter().map(|i| format!("{}: {}", i.label, i.value)).collect();
  println!("{}", cards.join(" | "));
}

fn print_table(r: &ResultRecord) {
  println!("{:>3}  {:<40}  {:<20}  {:<20}  {:>5}  {}", "#", "Question", "Your answer", "Correct", "Time", "Status");
  for (i, row) in r.detail.iter().enumerate() {
    println!(
      "{:>3}  {:<40}  {:<20}  {:<20}  {:>5}  {}",
      i + 1,
      clip(&row.question_text, 40),
      clip(&row.selected_choice_text, 20),
      clip(&row.correct_choice_text, 20),
      format_time(row.time_spent_seconds),
      row.status
    );
  }
}

fn print_review(r: &ResultRecord) {
  for (i, row) in r.detail.iter().enumerate() {
    println!();
    println!("Question {}", i + 1);
    println!("{}", row.question_text);
    println!("Correct: {}", row.correct_choice_text);
    println!("Your answer: {}", row.selected_choice_text);
    println!("Time spent: {}{}", format_time(row.time_spent_seconds), if row.timed_out { " (timed out)" } else { "" });
    println!("Status: {}", row.status);
    println!("Explanation: {}", row.explanation);
  }
}

fn clip(s: &str, width: usize) -> String {
  if s.chars().count() <= width {
    s.to_string()
  } else {
    let mut out: String = s.chars().take(width - 1).collect();
    out.push('…');
    out
  }
}
