//! Quiz session engine: the state machine behind one quiz attempt.
//!
//! `QuizSession` owns the question set, one response per question, the
//! current position and the per-question countdown. It does no I/O and owns
//! no real timer; the runner feeds it one `tick()` per elapsed second.
//!
//! Rules enforced here:
//!   - leaving a question (navigation, timeout, submission) commits the
//!     seconds spent on it, accumulating across visits
//!   - every arrival on a question starts a fresh countdown of the full limit
//!   - once submitted, every mutation is ignored (late ticks included)

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{Question, ResponseRecord, ResponseStatus, ResultRecord, SessionPreferences};
use crate::error::SetupError;
use crate::results::compute_results;

/// Remaining seconds at or below which the countdown is shown as a warning.
pub const WARNING_THRESHOLD: u32 = 5;

/// Result of a `select_choice` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Recorded,
    /// Addressed to a question that is no longer current (e.g. it timed out first).
    Stale,
    /// The attempt is already submitted.
    Closed,
}

/// Result of a `tick` call.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Timer stopped or attempt submitted; nothing changed.
    Idle,
    Counted { remaining: u32 },
    /// Current question timed out and the session moved on.
    Advanced { from: usize, to: usize },
    /// Last question timed out and the attempt was submitted.
    Completed(Box<ResultRecord>),
}

/// Navigation marker state for one question slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavMarker {
    pub active: bool,
    pub answered: bool,
    /// Timed out without an answer.
    pub timed_out: bool,
}

#[derive(Debug)]
pub struct QuizSession {
    attempt_id: Uuid,
    prefs: SessionPreferences,
    questions: Vec<Question>,
    responses: Vec<ResponseRecord>,
    current: usize,
    remaining: u32,
    elapsed_on_current: u32,
    timer_active: bool,
    submitted: bool,
}

impl QuizSession {
    /// Start an attempt on the first question with the countdown running.
    pub fn new(prefs: SessionPreferences, questions: Vec<Question>) -> Result<Self, SetupError> {
        if questions.is_empty() {
            return Err(SetupError::NoQuestions {
                category: prefs.category,
                difficulty: prefs.difficulty,
            });
        }
        if prefs.time_limit_seconds == 0 {
            return Err(SetupError::InvalidTimeLimit);
        }
        let responses = questions.iter().map(|q| ResponseRecord::new(q.id.clone())).collect();
        let session = Self {
            attempt_id: Uuid::new_v4(),
            remaining: prefs.time_limit_seconds,
            prefs,
            questions,
            responses,
            current: 0,
            elapsed_on_current: 0,
            timer_active: true,
            submitted: false,
        };
        info!(
            target: "quiz",
            attempt = %session.attempt_id,
            category = %session.prefs.category,
            difficulty = %session.prefs.difficulty,
            questions = session.questions.len(),
            time_limit = session.prefs.time_limit_seconds,
            "Quiz session started"
        );
        Ok(session)
    }

    /// Record a choice for `question`. Only the current question accepts input.
    pub fn select_choice(&mut self, question: usize, choice: usize) -> Selection {
        if self.submitted {
            return Selection::Closed;
        }
        if question != self.current {
            warn!(target: "quiz", attempt = %self.attempt_id, question, current = self.current, "Discarding stale selection");
            return Selection::Stale;
        }
        let len = self.questions[self.current].choices.len();
        assert!(choice < len, "choice {choice} out of range for question with {len} choices");

        let r = &mut self.responses[self.current];
        r.selected_choice_index = Some(choice);
        r.status = ResponseStatus::Answered;
        debug!(target: "quiz", attempt = %self.attempt_id, question, choice, "Choice recorded");
        Selection::Recorded
    }

    /// Flag the current question as timed out. Status and selection are untouched.
    pub fn timeout(&mut self) {
        if self.submitted {
            return;
        }
        self.responses[self.current].timed_out = true;
        debug!(target: "quiz", attempt = %self.attempt_id, question = self.current, "Question timed out");
    }

    /// Move to `target`, committing time on the question being left.
    /// Returns false for self-navigation or after submission.
    pub fn navigate(&mut self, target: usize) -> bool {
        assert!(target < self.questions.len(), "navigation target {target} out of range");
        if self.submitted || target == self.current {
            return false;
        }
        self.commit_elapsed();
        let from = self.current;
        self.current = target;
        self.remaining = self.prefs.time_limit_seconds;
        self.timer_active = true;
        debug!(target: "quiz", attempt = %self.attempt_id, from, to = target, "Navigated");
        true
    }

    pub fn previous(&mut self) -> bool {
        self.can_go_back() && self.navigate(self.current - 1)
    }

    pub fn next(&mut self) -> bool {
        self.can_go_forward() && self.navigate(self.current + 1)
    }

    /// Finish the attempt. Returns `None` if it was already submitted.
    pub fn submit(&mut self) -> Option<ResultRecord> {
        if self.submitted {
            return None;
        }
        self.commit_elapsed();
        self.timer_active = false;
        self.submitted = true;
        let record = compute_results(&self.prefs, &self.questions, &self.responses, Utc::now(), self.attempt_id);
        info!(
            target: "quiz",
            attempt = %self.attempt_id,
            correct = record.correct_count,
            incorrect = record.incorrect_count,
            unanswered = record.unanswered_count,
            percentage = record.percentage,
            total_time = record.total_time_spent_seconds,
            "Quiz submitted"
        );
        Some(record)
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.submitted || !self.timer_active {
            return TickOutcome::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        self.elapsed_on_current += 1;
        if self.remaining > 0 {
            return TickOutcome::Counted { remaining: self.remaining };
        }

        self.timer_active = false;
        self.timeout();
        let from = self.current;
        if self.is_last() {
            match self.submit() {
                Some(record) => TickOutcome::Completed(Box::new(record)),
                None => TickOutcome::Idle,
            }
        } else {
            self.navigate(from + 1);
            TickOutcome::Advanced { from, to: from + 1 }
        }
    }

    fn commit_elapsed(&mut self) {
        self.responses[self.current].time_spent_seconds += self.elapsed_on_current;
        self.elapsed_on_current = 0;
    }

    fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    pub fn current_response(&self) -> &ResponseRecord {
        &self.responses[self.current]
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn responses(&self) -> &[ResponseRecord] {
        &self.responses
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining
    }

    pub fn timer_active(&self) -> bool {
        self.timer_active
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    pub fn can_go_forward(&self) -> bool {
        !self.is_last()
    }

    pub fn timer_warning(&self) -> bool {
        self.remaining <= WARNING_THRESHOLD
    }

    /// Header line, e.g. `Math • EASY • 30s per question`.
    pub fn meta_line(&self) -> String {
        format!(
            "{} • {} • {}s per question",
            self.prefs.category,
            self.prefs.difficulty.to_uppercase(),
            self.prefs.time_limit_seconds
        )
    }

    pub fn nav_markers(&self) -> Vec<NavMarker> {
        self.responses
            .iter()
            .enumerate()
            .map(|(i, r)| NavMarker {
                active: i == self.current,
                answered: r.selected_choice_index.is_some(),
                timed_out: r.timed_out && r.selected_choice_index.is_none(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DetailStatus;

    fn question(id: &str, correct: usize) -> Question {
        Question {
            id: id.into(),
            prompt: format!("Question {id}"),
            choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_choice_index: correct,
            explanation: String::new(),
        }
    }

    fn session(correct: &[usize], limit: u32) -> QuizSession {
        let qs = correct.iter().enumerate().map(|(i, c)| question(&format!("q{i}"), *c)).collect();
        let prefs = SessionPreferences { category: "Math".into(), difficulty: "easy".into(), time_limit_seconds: limit };
        QuizSession::new(prefs, qs).unwrap()
    }

    fn tick_n(s: &mut QuizSession, n: u32) -> TickOutcome {
        let mut last = TickOutcome::Idle;
        for _ in 0..n {
            last = s.tick();
        }
        last
    }

    #[test]
    fn starts_on_first_question_with_fresh_responses() {
        let s = session(&[0, 1, 2], 30);
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.remaining_seconds(), 30);
        assert!(s.timer_active());
        assert!(s.responses().iter().all(|r| {
            r.status == ResponseStatus::Unanswered && r.time_spent_seconds == 0 && !r.timed_out && r.selected_choice_index.is_none()
        }));
    }

    #[test]
    fn empty_question_set_is_a_setup_error() {
        let prefs = SessionPreferences { category: "Art".into(), difficulty: "easy".into(), time_limit_seconds: 30 };
        let err = QuizSession::new(prefs, Vec::new()).unwrap_err();
        assert_eq!(err, SetupError::NoQuestions { category: "Art".into(), difficulty: "easy".into() });
    }

    #[test]
    fn zero_time_limit_is_a_setup_error() {
        let prefs = SessionPreferences { category: "Math".into(), difficulty: "easy".into(), time_limit_seconds: 0 };
        assert_eq!(QuizSession::new(prefs, vec![question("a", 0)]).unwrap_err(), SetupError::InvalidTimeLimit);
    }

    #[test]
    fn reselection_overwrites() {
        let mut s = session(&[0, 1], 30);
        assert_eq!(s.select_choice(0, 2), Selection::Recorded);
        assert_eq!(s.select_choice(0, 1), Selection::Recorded);
        assert_eq!(s.select_choice(0, 1), Selection::Recorded);
        let r = s.current_response();
        assert_eq!(r.selected_choice_index, Some(1));
        assert_eq!(r.status, ResponseStatus::Answered);
    }

    #[test]
    fn selection_for_another_question_is_stale() {
        let mut s = session(&[0, 1], 30);
        assert_eq!(s.select_choice(1, 0), Selection::Stale);
        assert!(s.responses().iter().all(|r| r.selected_choice_index.is_none()));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_choice_panics() {
        let mut s = session(&[0], 30);
        s.select_choice(0, 4);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_navigation_panics() {
        let mut s = session(&[0, 1], 30);
        s.navigate(2);
    }

    #[test]
    fn revisiting_keeps_answer_and_accumulates_time() {
        let mut s = session(&[0, 1, 2], 30);
        s.select_choice(0, 3);
        tick_n(&mut s, 4);
        assert!(s.navigate(1));
        tick_n(&mut s, 2);
        assert!(s.navigate(0));
        assert_eq!(s.remaining_seconds(), 30);
        tick_n(&mut s, 3);
        assert!(s.navigate(2));

        assert_eq!(s.responses()[0].selected_choice_index, Some(3));
        assert_eq!(s.responses()[0].time_spent_seconds, 7);
        assert_eq!(s.responses()[1].time_spent_seconds, 2);
    }

    #[test]
    fn self_navigation_is_a_noop() {
        let mut s = session(&[0, 1], 30);
        tick_n(&mut s, 5);
        assert!(!s.navigate(0));
        assert_eq!(s.remaining_seconds(), 25);
        assert_eq!(s.responses()[0].time_spent_seconds, 0);
        s.navigate(1);
        assert_eq!(s.responses()[0].time_spent_seconds, 5);
    }

    #[test]
    fn previous_and_next_respect_bounds() {
        let mut s = session(&[0, 1], 30);
        assert!(!s.previous());
        assert!(s.next());
        assert!(!s.next());
        assert!(s.previous());
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn timeout_on_earlier_question_advances_with_full_budget() {
        let mut s = session(&[0, 1, 2], 10);
        s.select_choice(0, 1);
        assert_eq!(tick_n(&mut s, 9), TickOutcome::Counted { remaining: 1 });
        assert!(s.timer_warning());
        assert_eq!(s.tick(), TickOutcome::Advanced { from: 0, to: 1 });

        assert_eq!(s.current_index(), 1);
        assert_eq!(s.remaining_seconds(), 10);
        assert!(s.timer_active());
        let first = &s.responses()[0];
        assert!(first.timed_out);
        assert_eq!(first.status, ResponseStatus::Answered);
        assert_eq!(first.selected_choice_index, Some(1));
        assert_eq!(first.time_spent_seconds, 10);
    }

    #[test]
    fn timeout_on_last_question_submits() {
        let mut s = session(&[0], 3);
        match tick_n(&mut s, 3) {
            TickOutcome::Completed(record) => {
                assert_eq!(record.unanswered_count, 1);
                assert!(record.detail[0].timed_out);
                assert_eq!(record.total_time_spent_seconds, 3);
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert!(s.is_submitted());
        assert!(!s.timer_active());
    }

    #[test]
    fn nothing_mutates_after_submit() {
        let mut s = session(&[0, 1], 30);
        tick_n(&mut s, 2);
        assert!(s.submit().is_some());
        assert!(s.submit().is_none());
        assert_eq!(s.tick(), TickOutcome::Idle);
        assert_eq!(s.select_choice(0, 0), Selection::Closed);
        assert!(!s.navigate(1));
        assert_eq!(s.responses()[0].time_spent_seconds, 2);
        assert_eq!(s.responses()[0].selected_choice_index, None);
    }

    #[test]
    fn time_spent_matches_ticks_across_the_attempt() {
        let mut s = session(&[0, 1, 2], 5);
        let mut ticks = 0;
        tick_n(&mut s, 3);
        ticks += 3;
        s.navigate(2);
        tick_n(&mut s, 4);
        ticks += 4;
        s.navigate(1);
        loop {
            ticks += 1;
            if let TickOutcome::Completed(record) = s.tick() {
                assert_eq!(record.total_time_spent_seconds, ticks);
                break;
            }
        }
        let sum: u32 = s.responses().iter().map(|r| r.time_spent_seconds).sum();
        assert_eq!(sum, ticks);
    }

    #[test]
    fn four_question_scenario_scores_half() {
        let mut s = session(&[2, 1, 2, 0], 30);
        s.select_choice(0, 2);
        tick_n(&mut s, 6);
        s.next();
        s.select_choice(1, 1);
        tick_n(&mut s, 4);
        s.next();
        s.select_choice(2, 1);
        tick_n(&mut s, 8);
        s.next();
        tick_n(&mut s, 10);
        let record = match tick_n(&mut s, 20) {
            TickOutcome::Completed(r) => r,
            other => panic!("expected completion, got {other:?}"),
        };
        assert_eq!(record.correct_count, 2);
        assert_eq!(record.incorrect_count, 1);
        assert_eq!(record.unanswered_count, 1);
        assert_eq!(record.percentage, 50);
        assert!(record.total_time_spent_seconds >= 10);
        assert_eq!(record.detail[3].status, DetailStatus::Unanswered);
        assert!(record.detail[3].timed_out);
    }

    #[test]
    fn nav_markers_reflect_answers_and_unanswered_timeouts() {
        let mut s = session(&[0, 1, 2], 2);
        s.select_choice(0, 0);
        tick_n(&mut s, 2);
        tick_n(&mut s, 2);
        let m = s.nav_markers();
        assert_eq!(m[0], NavMarker { active: false, answered: true, timed_out: false });
        assert_eq!(m[1], NavMarker { active: false, answered: false, timed_out: true });
        assert_eq!(m[2], NavMarker { active: true, answered: false, timed_out: false });
        assert_eq!(s.meta_line(), "Math • EASY • 2s per question");
    }
}
