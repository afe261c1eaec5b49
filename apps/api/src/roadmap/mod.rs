// Career roadmaps: personalised (GitHub + LinkedIn + goal) and per-domain with an MCQ quiz.
// All model calls go through llm_client; all writes go through store.

pub mod handlers;
pub mod prompts;
pub mod quiz;
