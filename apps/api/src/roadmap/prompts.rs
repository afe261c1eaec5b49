//! Per-request prompt builders for roadmap generation.
//! System instructions live in `llm_client::prompts`.

/// User prompt for the personalised roadmap.
pub fn build_personal_prompt(github_summary: &str, linkedin_skills: &str, career_goal: &str) -> String {
    format!(
        "\nStudent GitHub Summary:\n{github_summary}\n\n\
         Student LinkedIn Skills:\n{linkedin_skills}\n\n\
         Student Career Goal:\n{career_goal}\n\n\
         Generate the personalised 6-week career roadmap now.\n"
    )
}

/// User prompt for the domain roadmap + quiz.
pub fn build_domain_prompt(domain: &str, student_name: &str, mentor_name: &str) -> String {
    format!(
        "Domain: {domain}\n\
         Student: {student_name}\n\
         Mentor: {mentor_name}\n\n\
         Generate the 6-week roadmap for '{domain}' AND the 5-question MCQ quiz."
    )
}
