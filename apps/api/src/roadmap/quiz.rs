//! Quiz extraction from free-text model output.
//!
//! The model is asked for a roadmap followed by a `QUIZ` section of MCQs in the form
//! `Q1. ...` / `A) ...` .. `D) ...` / `ANSWER: B`. Nothing guarantees it complies, so
//! parsing is best effort: blocks that don't fit are dropped, never reported as errors.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Marker that separates the roadmap from the quiz in the model's reply.
pub const QUIZ_MARKER: &str = "QUIZ";

const OPTIONS_PER_QUESTION: usize = 4;

/// Header lines the model sometimes repeats right after a question marker.
const HEADER_LINES: [&str; 3] = ["QUIZ", "PART 2", "SKILL ASSESSMENT"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    /// Option lines as written by the model, label included (`"A) ..."`).
    pub options: Vec<String>,
    /// Upper-cased answer letter; empty when the model omitted it.
    pub answer: String,
}

/// Splits a combined reply at the first `QUIZ` marker.
///
/// Returns `(roadmap, quiz)`. Without a marker the whole text is the roadmap and the
/// quiz is empty. With one, both halves are trimmed and the quiz keeps a `QUIZ` header.
pub fn split_sections(full_text: &str) -> (String, String) {
    match full_text.split_once(QUIZ_MARKER) {
        Some((roadmap, quiz)) => (
            roadmap.trim().to_string(),
            format!("{QUIZ_MARKER}\n{}", quiz.trim()),
        ),
        None => (full_text.to_string(), String::new()),
    }
}

fn question_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n?Q\d+[.:]\s*").expect("question marker regex"))
}

fn answer_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)answer\s*[:=\s]+").expect("answer prefix regex"))
}

/// Parses the quiz section into questions with exactly four options each.
pub fn parse_quiz(quiz_text: &str) -> Vec<QuizQuestion> {
    if quiz_text.is_empty() {
        return Vec::new();
    }

    question_blocks(quiz_text)
        .into_iter()
        .filter_map(parse_block)
        .collect()
}

/// Text following each question marker up to the next one. Anything before the first
/// marker (the `QUIZ` header) is not a question and is skipped.
fn question_blocks(text: &str) -> Vec<&str> {
    let markers: Vec<_> = question_marker().find_iter(text).collect();
    markers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let end = markers.get(i + 1).map_or(text.len(), |next| next.start());
            &text[m.end()..end]
        })
        .collect()
}

fn parse_block(block: &str) -> Option<QuizQuestion> {
    let lines: Vec<&str> = block
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let (first, rest) = lines.split_first()?;
    let (question, option_lines) = if is_header(first) {
        rest.split_first()?
    } else {
        (first, rest)
    };

    let question = question.replace('*', "").trim().to_string();

    let mut options = Vec::new();
    let mut answer_line = "";
    for line in option_lines {
        if is_option(line) {
            options.push(line.to_string());
        } else if line.to_uppercase().starts_with("ANSWER") {
            answer_line = line;
        }
    }

    if question.is_empty() || options.len() < OPTIONS_PER_QUESTION {
        return None;
    }
    options.truncate(OPTIONS_PER_QUESTION);

    let answer = answer_prefix()
        .replace_all(answer_line, "")
        .trim()
        .to_uppercase();

    Some(QuizQuestion {
        question,
        options,
        answer,
    })
}

fn is_header(line: &str) -> bool {
    let upper = line.to_uppercase();
    HEADER_LINES.contains(&upper.as_str())
}

/// `A)` through `D)`, either case.
fn is_option(line: &str) -> bool {
    let mut chars = line.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('A'..='D' | 'a'..='d'), Some(')'))
    )
}
