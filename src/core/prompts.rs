// src/core/prompts.rs
//! Instruction templates sent to the language model.

use crate::types::{Achievement, Profile};

pub const PROFILE_EXTRACTION: &str = r#"You are an expert resume parser. Read the resume below and pull out the candidate's profile.

Fields to extract when present:
- name: the person's full name
- email: email address
- phone: phone number
- location: city and region, or full address
- linkedin: LinkedIn URL or handle
- website: personal site or portfolio URL
- summary: a professional summary (write one from their experience if the resume has none)
- target_roles: job titles they appear to be aiming for, based on their experience

Reply with exactly this JSON shape and nothing else:
{
  "name": "extracted name or null",
  "email": "extracted email or null",
  "phone": "extracted phone or null",
  "location": "extracted location or null",
  "linkedin": "extracted linkedin or null",
  "website": "extracted website or null",
  "summary": "extracted or generated summary",
  "target_roles": ["role1", "role2"]
}

RESUME TEXT:
"#;

pub const INTERVIEWER: &str = r#"You are an experienced career coach interviewing a user to build their professional profile. Your job is to surface specific, measurable achievements from their work history.

How to run the interview:
1. Ask one focused question about their work at a time.
2. When they describe something they did, dig for numbers: percentages, counts, time saved, revenue, users affected.
3. If an answer has no metric, follow up ("How many?", "By what percentage?", "How much time or money did that save?").
4. Once an achievement has a concrete result, capture it as JSON.
5. Stay encouraging, but keep pushing for concrete figures.

When an achievement is complete, end your message with this exact block:
```json
{
  "achievement_extracted": {
    "core_task": "Short description of what they did",
    "impact_metric": "The measurable result, e.g. 'Reduced latency by 40%'",
    "skills_used": ["skill1", "skill2"],
    "tags": ["tag1", "tag2"],
    "company": "Company name if mentioned",
    "role": "Role if mentioned",
    "year": null
  }
}
```

If nothing is ready to capture yet, reply conversationally with no JSON block."#;

pub const INTERVIEWER_ACK: &str =
    "Understood. I'll interview the user and capture achievements with concrete metrics.";

pub const TAILOR: &str = r#"You are an expert resume tailor. Given a job description, the user's profile and their achievements:
1. Work out what the job actually requires.
2. Pick the achievements that best support an application.
3. Write a tailored professional summary.
4. Score the overall match from 0 to 100.

Reply with exactly this JSON shape:
{
  "tailored_summary": "A 2-3 sentence professional summary aimed at this job",
  "selected_achievements": [
    {"id": 12, "relevance_reason": "Why this achievement matters for the role"}
  ],
  "match_score": 75,
  "suggestions": ["Suggestion 1", "Suggestion 2"]
}
Only use achievement ids from the list below."#;

pub fn profile_extraction(resume_text: &str) -> String {
    format!("{}{}", PROFILE_EXTRACTION, resume_text)
}

pub fn tailor(job_description: &str, profile: Option<&Profile>, achievements: &[Achievement]) -> String {
    format!(
        "{}\n\nJOB DESCRIPTION:\n{}\n\nUSER PROFILE:\n{}\n\nUSER ACHIEVEMENTS:\n{}\n\nAnalyze and respond with the JSON format specified above.",
        TAILOR,
        job_description.trim(),
        render_profile(profile),
        render_achievements(achievements),
    )
}

fn render_profile(profile: Option<&Profile>) -> String {
    let not_set = "Not set";
    let (name, roles, summary) = match profile {
        Some(p) => (
            p.name.as_deref().filter(|s| !s.trim().is_empty()).unwrap_or(not_set),
            if p.target_roles.is_empty() {
                not_set.to_string()
            } else {
                p.target_roles.join(", ")
            },
            p.summary.as_deref().filter(|s| !s.trim().is_empty()).unwrap_or(not_set),
        ),
        None => (not_set, not_set.to_string(), not_set),
    };
    format!("Name: {}\nTarget Roles: {}\nSummary: {}", name, roles, summary)
}

fn render_achievements(achievements: &[Achievement]) -> String {
    if achievements.is_empty() {
        return "None recorded yet.".to_string();
    }
    achievements
        .iter()
        .map(|a| {
            format!(
                "ID {}: {} - {} (Skills: {})",
                a.id,
                a.core_task,
                a.impact_metric.as_deref().unwrap_or("No metric"),
                a.skills_used.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
