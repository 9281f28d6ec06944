//! Quiz view: guards, session setup, terminal rendering and command translation.
//!
//! Two futures share one task: the runner driving the session, and a
//! translator turning typed lines into `InputEvent`s. The translator learns
//! which question is on screen from a `watch` channel the renderer updates,
//! so a choice is always addressed to the question the user was looking at.

use tokio::sync::{mpsc, watch};
use tracing::{error, instrument, warn};

use super::{Terminal, View};
use crate::domain::SessionPreferences;
use crate::engine::QuizSession;
use crate::error::SetupError;
use crate::protocol::{parse_quiz_command, InputEvent, QuizCommand};
use crate::runner::{drive, Change, QuizRenderer};
use crate::state::AppState;
use crate::store::{PREFERENCES_KEY, RESULTS_KEY};
use crate::util::format_time;

const HELP: &str = "Type a choice number, n / p to move, g N to jump, submit to finish.";

/// What is on screen, as far as the translator needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    question: usize,
    choices: usize,
    total: usize,
}

impl Position {
    fn of(session: &QuizSession) -> Self {
        Self {
            question: session.current_index(),
            choices: session.current_question().choices.len(),
            total: session.len(),
        }
    }
}

#[instrument(level = "info", skip_all)]
pub async fn run(state: &mut AppState, terminal: &mut Terminal) -> View {
    let mut to = View::Quiz;
    if !state.storage.ensure_keys(&[PREFERENCES_KEY], || to = View::Entry) {
        return to;
    }
    let mut session = match start_session(state) {
        Ok(s) => s,
        Err(e) => {
            warn!(target: "quiz", error = %e, "Quiz setup failed; returning to entry");
            println!("{}. Returning to home.", e);
            return View::Entry;
        }
    };

    println!();
    println!("{}", session.meta_line());
    println!("{}", HELP);

    let (position_tx, position_rx) = watch::channel(Position::of(&session));
    let (events_tx, mut events_rx) = mpsc::channel(16);
    let mut renderer = TerminalRenderer { position: position_tx };

    let record = {
        let driving = drive(&mut session, &mut events_rx, &mut renderer);
        let translating = translate(terminal, events_tx, position_rx);
        tokio::pin!(driving, translating);
        let mut translator_done = false;
        loop {
            tokio::select! {
                record = &mut driving => break record,
                _ = &mut translating, if !translator_done => translator_done = true,
            }
        }
    };

    match record {
        Some(record) => {
            state.storage.set(RESULTS_KEY, &record);
            View::Results
        }
        None => {
            error!(target: "quiz", "Quiz ended without a result");
            View::Entry
        }
    }
}

fn start_session(state: &AppState) -> Result<QuizSession, SetupError> {
    let prefs: SessionPreferences = state
        .storage
        .get::<Option<SessionPreferences>>(PREFERENCES_KEY, None)
        .ok_or(SetupError::MissingPreferences)?;
    let questions = state.bank.lookup(&prefs.category, &prefs.difficulty).to_vec();
    QuizSession::new(prefs, questions)
}

/// Read lines until the user submits or input ends.
async fn translate(terminal: &mut Terminal, events: mpsc::Sender<InputEvent>, position: watch::Receiver<Position>) {
    while let Some(line) = terminal.read_line().await {
        let here = *position.borrow();
        let event = match parse_quiz_command(&line) {
            Some(QuizCommand::Choose(n)) if n <= here.choices => InputEvent::ChoiceSelected { question: here.question, choice: n - 1 },
            Some(QuizCommand::Choose(_)) => {
                println!("There is no choice {}.", line.trim());
                continue;
            }
            Some(QuizCommand::GoTo(n)) if n <= here.total => InputEvent::NavigateRequested { target: n - 1 },
            Some(QuizCommand::GoTo(n)) => {
                println!("There is no question {}.", n);
                continue;
            }
            Some(QuizCommand::Previous) => InputEvent::Previous,
            Some(QuizCommand::Next) => InputEvent::Next,
            Some(QuizCommand::Submit) => {
                println!("Are you sure you want to submit the quiz? (y/n)");
                match terminal.read_line().await {
                    Some(answer) if answer.trim().eq_ignore_ascii_case("y") => InputEvent::SubmitRequested,
                    Some(_) => continue,
                    None => break,
                }
            }
            Some(QuizCommand::Help) => {
                println!("{}", HELP);
                continue;
            }
            Some(QuizCommand::Event(ev)) => ev,
            None => {
                println!("Unknown command. {}", HELP);
                continue;
            }
        };
        let submitting = event == InputEvent::SubmitRequested;
        if events.send(event).await.is_err() || submitting {
            break;
        }
    }
}

struct TerminalRenderer {
    position: watch::Sender<Position>,
}

impl QuizRenderer for TerminalRenderer {
    fn render(&mut self, session: &QuizSession, change: Change) {
        match change {
            Change::Shown => {
                self.position.send_replace(Position::of(session));
                print_question(session);
            }
            Change::ChoiceRecorded => {
                if let Some(i) = session.current_response().selected_choice_index {
                    println!("Selected: {}", session.current_question().choices[i]);
                }
            }
            Change::Tick => {
                if session.timer_active() && session.timer_warning() {
                    println!("⏱ {} !", format_time(session.remaining_seconds()));
                }
            }
            Change::TimedOut { question } => println!("Time is up on question {}.", question + 1),
        }
    }
}

fn print_question(session: &QuizSession) {
    let q = session.current_question();
    let selected = session.current_response().selected_choice_index;
    println!();
    println!("Question {} of {}   ⏱ {}", session.current_index() + 1, session.len(), format_time(session.remaining_seconds()));
    println!("{}", q.prompt);
    for (i, choice) in q.choices.iter().enumerate() {
        let mark = if selected == Some(i) { "(•)" } else { "( )" };
        println!("  {} {}. {}", mark, i + 1, choice);
    }
    let nav: Vec<String> = session
        .nav_markers()
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let flag = if m.answered { "✓" } else if m.timed_out { "!" } else { "" };
            if m.active { format!("[{}{}]", i + 1, flag) } else { format!(" {}{} ", i + 1, flag) }
        })
        .collect();
    println!("{}   answered {} of {}", nav.join(""), answered_count(session), session.len());
}

fn answered_count(session: &QuizSession) -> usize {
    session.responses().iter().filter(|r| r.selected_choice_index.is_some()).count()
}
