//! Terminal views: entry (preferences), quiz and results, plus the navigation loop between them.
//!
//! Each view runs until it knows where to go next and returns that `View`.
//! Guards inside the views send the user back to `View::Entry` whenever the
//! session store lacks what the view needs.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use crate::state::AppState;

pub mod entry;
pub mod quiz;
pub mod results;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Entry,
    Quiz,
    Results,
    Exit,
}

/// Line-oriented input shared by all views.
pub struct Terminal {
    lines: mpsc::Receiver<String>,
}

impl Terminal {
    /// Read stdin on a background task, one line per message.
    pub fn stdin() -> Self {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if tx.send(line).await.is_err() {
                    break;
                }
            }
            debug!(target: "dynamic_quiz", "stdin closed");
        });
        Self { lines: rx }
    }

    #[cfg(test)]
    pub fn from_lines(lines: mpsc::Receiver<String>) -> Self {
        Self { lines }
    }

    /// `None` once input is exhausted.
    pub async fn read_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }
}

/// Run views until one of them asks to exit or input runs out.
#[instrument(level = "info", skip_all)]
pub async fn run_app(state: &mut AppState, terminal: &mut Terminal, start: View) {
    let mut view = start;
    loop {
        info!(target: "dynamic_quiz", ?view, "Entering view");
        view = match view {
            View::Entry => entry::run(state, terminal).await,
            View::Quiz => quiz::run(state, terminal).await,
            View::Results => results::run(state, terminal).await,
            View::Exit => break,
        };
    }
}
