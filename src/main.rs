//! Dynamic Quiz · timed multiple-choice quiz in the terminal
//!
//! - Built-in question bank (Math / General / Science × easy / medium / hard)
//! - Per-question countdown; timeouts auto-advance, the last one submits
//! - Results summary, per-question table, review and chart export
//!
//! Important env variables:
//!   QUIZ_CONFIG_PATH : path to TOML config (`[quiz]` settings + extra `[[questions]]`)
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod seeds;
mod bank;
mod store;
mod engine;
mod results;
mod protocol;
mod runner;
mod charts;
mod state;
mod views;

use tracing::{info, instrument};

use crate::state::AppState;
use crate::views::{run_app, Terminal, View};

#[instrument(level = "info", skip_all)]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Bank, settings and an empty session store.
  let mut state = AppState::new();

  let mut terminal = Terminal::stdin();
  run_app(&mut state, &mut terminal, View::Entry).await;

  info!(target: "dynamic_quiz", "Bye");
  Ok(())
}
