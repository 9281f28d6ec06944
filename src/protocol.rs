//! Input events consumed by the quiz runner, and the terminal command syntax that produces them.
//! Events are serde-tagged so a script can drive the quiz with JSON lines.

use serde::{Deserialize, Serialize};

/// Everything that can change a running quiz. Question and choice indices are zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    ChoiceSelected {
        question: usize,
        choice: usize,
    },
    NavigateRequested {
        target: usize,
    },
    Previous,
    Next,
    SubmitRequested,
    /// One second of countdown, processed exactly like a timer tick.
    Tick,
}

/// What a typed line means on the quiz view, before any range checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizCommand {
    /// 1-based choice number as typed.
    Choose(usize),
    /// 1-based question number as typed.
    GoTo(usize),
    Previous,
    Next,
    Submit,
    Help,
    Event(InputEvent),
}

/// Parse one line typed on the quiz view. `None` when it is not a command.
pub fn parse_quiz_command(line: &str) -> Option<QuizCommand> {
    let line = line.trim();
    if line.starts_with('{') {
        return serde_json::from_str::<InputEvent>(line).ok().map(QuizCommand::Event);
    }
    let mut parts = line.split_whitespace();
    let head = parts.next()?.to_ascii_lowercase();
    let arg = parts.next();
    if parts.next().is_some() {
        return None;
    }
    match (head.as_str(), arg) {
        ("n" | "next", None) => Some(QuizCommand::Next),
        ("p" | "prev" | "previous", None) => Some(QuizCommand::Previous),
        ("s" | "submit", None) => Some(QuizCommand::Submit),
        ("h" | "help" | "?", None) => Some(QuizCommand::Help),
        ("g" | "goto", Some(n)) => n.parse().ok().filter(|n| *n > 0).map(QuizCommand::GoTo),
        (n, None) => n.parse().ok().filter(|n| *n > 0).map(QuizCommand::Choose),
        _ => None,
    }
}

/// Commands on the results view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsCommand {
    Review,
    Retake,
    Quit,
}

pub fn parse_results_command(line: &str) -> Option<ResultsCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "r" | "review" => Some(ResultsCommand::Review),
        "retake" | "again" => Some(ResultsCommand::Retake),
        "q" | "quit" | "exit" => Some(ResultsCommand::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_commands() {
        assert_eq!(parse_quiz_command("3"), Some(QuizCommand::Choose(3)));
        assert_eq!(parse_quiz_command(" N "), Some(QuizCommand::Next));
        assert_eq!(parse_quiz_command("prev"), Some(QuizCommand::Previous));
        assert_eq!(parse_quiz_command("g 4"), Some(QuizCommand::GoTo(4)));
        assert_eq!(parse_quiz_command("submit"), Some(QuizCommand::Submit));
        assert_eq!(parse_quiz_command("0"), None);
        assert_eq!(parse_quiz_command("g"), None);
        assert_eq!(parse_quiz_command("next please"), None);
        assert_eq!(parse_quiz_command(""), None);
    }

    #[test]
    fn parses_json_events() {
        assert_eq!(
            parse_quiz_command(r#"{"type":"choice_selected","question":0,"choice":2}"#),
            Some(QuizCommand::Event(InputEvent::ChoiceSelected { question: 0, choice: 2 }))
        );
        assert_eq!(parse_quiz_command(r#"{"type":"tick"}"#), Some(QuizCommand::Event(InputEvent::Tick)));
        assert_eq!(parse_quiz_command(r#"{"type":"dance"}"#), None);
    }

    #[test]
    fn parses_results_commands() {
        assert_eq!(parse_results_command("Review"), Some(ResultsCommand::Review));
        assert_eq!(parse_results_command("retake"), Some(ResultsCommand::Retake));
        assert_eq!(parse_results_command("q"), Some(ResultsCommand::Quit));
        assert_eq!(parse_results_command("huh"), None);
    }
}
