//! Chat assistant for the platform chat box.
//!
//! Roadmap requests are answered locally with intake instructions; everything else
//! is forwarded to the chat model.

pub mod handlers;

use serde::Serialize;

/// Phrases that mean the user wants a roadmap rather than a chat answer.
const ROADMAP_KEYWORDS: [&str; 4] = ["roadmap", "career plan", "6 week", "skill gap"];

/// Fixed reply asking the student for the inputs of a personalised roadmap.
pub const ROADMAP_INTAKE_REPLY: &str = "I can generate a personalised 6-week career roadmap for you! 🗺️\n\n\
Please provide:\n\
1️⃣ Your GitHub profile summary\n\
2️⃣ Your LinkedIn skills\n\
3️⃣ Your career goal\n\n\
Type them in this format:\n\
GitHub: <your summary>\nSkills: <your skills>\nGoal: <your career goal>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatCategory {
    Roadmap,
    General,
}

/// Case-insensitive keyword match on the raw message.
pub fn classify(message: &str) -> ChatCategory {
    let lower = message.to_lowercase();
    if ROADMAP_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        ChatCategory::Roadmap
    } else {
        ChatCategory::General
    }
}

pub fn build_chat_prompt(role: &str, name: &str, message: &str) -> String {
    format!("User ({role}, name: {name}) says: {message}\n\nReply helpfully and concisely.")
}
