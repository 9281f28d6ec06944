//! Quiz runner: the cooperative event loop that drives a `QuizSession`.
//!
//! One task, one `tokio::select!`: timer ticks and input events are handled
//! strictly one after another, so the session never sees two transitions at
//! once. The runner owns the single live per-question interval. Arriving on a
//! question replaces it (dropping the old interval cancels its pending ticks)
//! and submission drops it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval};
use tracing::{debug, instrument, warn};

use crate::domain::ResultRecord;
use crate::engine::{QuizSession, Selection, TickOutcome};
use crate::protocol::InputEvent;

const TICK: Duration = Duration::from_secs(1);

/// What just changed, so a renderer can redraw only what it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A question was (re)displayed with a fresh countdown.
    Shown,
    ChoiceRecorded,
    Tick,
    TimedOut { question: usize },
}

/// Subscriber to session changes. Rendering never feeds back into the session.
pub trait QuizRenderer {
    fn render(&mut self, session: &QuizSession, change: Change);
}

struct QuestionTimer {
    interval: Option<Interval>,
}

impl QuestionTimer {
    fn started() -> Self {
        let mut timer = Self { interval: None };
        timer.restart();
        timer
    }

    /// First tick lands one full period after the restart.
    fn restart(&mut self) {
        self.interval = Some(interval_at(Instant::now() + TICK, TICK));
    }

    fn stop(&mut self) {
        self.interval = None;
    }

    async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

/// Run the attempt until it is submitted, by request or by the last timeout.
/// If the input side closes, the countdown carries on alone until the end.
#[instrument(level = "info", skip_all, fields(attempt = %session.attempt_id()))]
pub async fn drive<R: QuizRenderer>(
    session: &mut QuizSession,
    events: &mut mpsc::Receiver<InputEvent>,
    renderer: &mut R,
) -> Option<ResultRecord> {
    if session.is_submitted() {
        return None;
    }
    renderer.render(session, Change::Shown);
    let mut timer = QuestionTimer::started();
    let mut input_open = true;

    loop {
        let event = tokio::select! {
            _ = timer.tick() => InputEvent::Tick,
            ev = events.recv(), if input_open => match ev {
                Some(ev) => ev,
                None => {
                    debug!(target: "quiz", "Input closed; countdown continues");
                    input_open = false;
                    continue;
                }
            },
        };
        if let Some(record) = apply(session, event, renderer, &mut timer) {
            return Some(record);
        }
    }
}

fn apply<R: QuizRenderer>(
    session: &mut QuizSession,
    event: InputEvent,
    renderer: &mut R,
    timer: &mut QuestionTimer,
) -> Option<ResultRecord> {
    match event {
        InputEvent::Tick => match session.tick() {
            TickOutcome::Idle => None,
            TickOutcome::Counted { .. } => {
                renderer.render(session, Change::Tick);
                None
            }
            TickOutcome::Advanced { from, .. } => {
                renderer.render(session, Change::TimedOut { question: from });
                timer.restart();
                renderer.render(session, Change::Shown);
                None
            }
            TickOutcome::Completed(record) => {
                timer.stop();
                renderer.render(session, Change::TimedOut { question: session.current_index() });
                Some(*record)
            }
        },
        InputEvent::ChoiceSelected { question, choice } => {
            if question == session.current_index() && choice >= session.current_question().choices.len() {
                warn!(target: "quiz", question, choice, "Ignoring selection of a choice that does not exist");
                return None;
            }
            if session.select_choice(question, choice) == Selection::Recorded {
                renderer.render(session, Change::ChoiceRecorded);
            }
            None
        }
        InputEvent::NavigateRequested { target } => {
            if target >= session.len() {
                warn!(target: "quiz", question = target, "Ignoring navigation to a question that does not exist");
                return None;
            }
            shown_if(session.navigate(target), session, renderer, timer);
            None
        }
        InputEvent::Previous => {
            let moved = session.previous();
            shown_if(moved, session, renderer, timer);
            None
        }
        InputEvent::Next => {
            let moved = session.next();
            shown_if(moved, session, renderer, timer);
            None
        }
        InputEvent::SubmitRequested => {
            timer.stop();
            session.submit()
        }
    }
}

fn shown_if<R: QuizRenderer>(moved: bool, session: &QuizSession, renderer: &mut R, timer: &mut QuestionTimer) {
    if moved {
        timer.restart();
        renderer.render(session, Change::Shown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Question, SessionPreferences};
    use tokio::time::sleep;

    #[derive(Default)]
    struct Recorder {
        changes: Vec<(usize, Change)>,
    }

    impl QuizRenderer for Recorder {
        fn render(&mut self, session: &QuizSession, change: Change) {
            self.changes.push((session.current_index(), change));
        }
    }

    fn session(correct: &[usize], limit: u32) -> QuizSession {
        let qs = correct
            .iter()
            .enumerate()
            .map(|(i, c)| Question {
                id: format!("q{i}"),
                prompt: format!("Question {i}"),
                choices: vec!["a".into(), "b".into(), "c".into()],
                correct_choice_index: *c,
                explanation: String::new(),
            })
            .collect();
        let prefs = SessionPreferences { category: "Science".into(), difficulty: "medium".into(), time_limit_seconds: limit };
        QuizSession::new(prefs, qs).unwrap()
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[tokio::test(start_paused = true)]
    async fn scripted_attempt_scores_and_times() {
        let mut s = session(&[2, 1, 2, 0], 30);
        let (tx, mut rx) = mpsc::channel(16);
        tokio::spawn(async move {
            sleep(secs(3.5)).await;
            tx.send(InputEvent::ChoiceSelected { question: 0, choice: 2 }).await.unwrap();
            tx.send(InputEvent::Next).await.unwrap();
            sleep(secs(2.5)).await;
            tx.send(InputEvent::ChoiceSelected { question: 1, choice: 1 }).await.unwrap();
            tx.send(InputEvent::Next).await.unwrap();
            sleep(secs(5.5)).await;
            tx.send(InputEvent::ChoiceSelected { question: 2, choice: 1 }).await.unwrap();
            tx.send(InputEvent::Next).await.unwrap();
        });

        let mut rec = Recorder::default();
        let record = drive(&mut s, &mut rx, &mut rec).await.expect("completed");

        assert_eq!(record.correct_count, 2);
        assert_eq!(record.incorrect_count, 1);
        assert_eq!(record.unanswered_count, 1);
        assert_eq!(record.percentage, 50);
        let spent: Vec<u32> = record.detail.iter().map(|d| d.time_spent_seconds).collect();
        assert_eq!(spent, [3, 2, 5, 30]);
        assert_eq!(record.total_time_spent_seconds, 40);
        assert!(record.detail[3].timed_out);
        assert_eq!(rec.changes.last(), Some(&(3, Change::TimedOut { question: 3 })));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_advances_and_restarts_the_countdown() {
        let mut s = session(&[0, 0], 3);
        let (_tx, mut rx) = mpsc::channel::<InputEvent>(1);
        let mut rec = Recorder::default();
        let record = drive(&mut s, &mut rx, &mut rec).await.expect("completed");

        assert_eq!(record.unanswered_count, 2);
        assert_eq!(record.total_time_spent_seconds, 6);
        assert!(rec.changes.contains(&(1, Change::TimedOut { question: 0 })));
        assert!(rec.changes.contains(&(1, Change::Shown)));
        let ticks_on_second = rec.changes.iter().filter(|c| **c == (1, Change::Tick)).count();
        assert_eq!(ticks_on_second, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn selection_arriving_after_timeout_is_discarded() {
        let mut s = session(&[1, 1], 2);
        let (tx, mut rx) = mpsc::channel(4);
        tokio::spawn(async move {
            sleep(secs(2.5)).await;
            tx.send(InputEvent::ChoiceSelected { question: 0, choice: 1 }).await.unwrap();
        });
        let mut rec = Recorder::default();
        let record = drive(&mut s, &mut rx, &mut rec).await.expect("completed");

        assert_eq!(record.unanswered_count, 2);
        assert!(!rec.changes.iter().any(|(_, c)| *c == Change::ChoiceRecorded));
    }

    #[tokio::test(start_paused = true)]
    async fn revisits_accumulate_time_and_keep_answers() {
        let mut s = session(&[0, 0, 0], 30);
        let (tx, mut rx) = mpsc::channel(8);
        tokio::spawn(async move {
            tx.send(InputEvent::ChoiceSelected { question: 0, choice: 0 }).await.unwrap();
            sleep(secs(2.5)).await;
            tx.send(InputEvent::NavigateRequested { target: 2 }).await.unwrap();
            sleep(secs(1.5)).await;
            tx.send(InputEvent::NavigateRequested { target: 0 }).await.unwrap();
            sleep(secs(4.5)).await;
            tx.send(InputEvent::NavigateRequested { target: 0 }).await.unwrap();
            sleep(secs(1.0)).await;
            tx.send(InputEvent::SubmitRequested).await.unwrap();
        });
        let mut rec = Recorder::default();
        let record = drive(&mut s, &mut rx, &mut rec).await.expect("submitted");

        assert_eq!(record.detail[0].status, crate::domain::DetailStatus::Correct);
        assert_eq!(record.detail[0].time_spent_seconds, 2 + 5);
        assert_eq!(record.detail[2].time_spent_seconds, 1);
        assert_eq!(record.correct_count, 1);
        assert!(!record.detail[0].timed_out);
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_range_input_is_ignored() {
        let mut s = session(&[0], 30);
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(InputEvent::ChoiceSelected { question: 0, choice: 9 }).await.unwrap();
        tx.send(InputEvent::NavigateRequested { target: 5 }).await.unwrap();
        tx.send(InputEvent::SubmitRequested).await.unwrap();
        let mut rec = Recorder::default();
        let record = drive(&mut s, &mut rx, &mut rec).await.expect("submitted");
        assert_eq!(record.unanswered_count, 1);
        assert_eq!(record.total_time_spent_seconds, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn injected_ticks_count_like_timer_ticks() {
        let mut s = session(&[0, 0], 2);
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(InputEvent::Tick).await.unwrap();
        tx.send(InputEvent::Tick).await.unwrap();
        tx.send(InputEvent::SubmitRequested).await.unwrap();
        let mut rec = Recorder::default();
        let record = drive(&mut s, &mut rx, &mut rec).await.expect("submitted");
        assert!(record.detail[0].timed_out);
        assert_eq!(record.detail[0].time_spent_seconds, 2);
        assert_eq!(record.detail[1].time_spent_seconds, 0);
    }
}
