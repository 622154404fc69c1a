//! Prompt construction for job extraction and document generation.
//!
//! Each operation yields a system/user pair ready to hand to
//! [`StreamRequest::from_config`](crate::types::StreamRequest::from_config).

use jobdeck_core::{JobPosting, ResumeProfile};

/// Raw page text longer than this is cut before it enters the user prompt,
/// keeping extraction requests inside small local-model context windows.
const PAGE_TEXT_LIMIT: usize = 12_000;

/// A system/user prompt pair for one model call.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Which tailored document to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

/// Prompts that extract structured job fields from raw page text.
pub fn extraction_prompts(page_text: &str) -> PromptPair {
    let system = "You are a job posting parser.\n\
         Extract the posting's details from the page text the user provides.\n\
         Respond with a single JSON object and nothing else, using exactly these keys:\n\
         - title (string)\n\
         - company (string)\n\
         - location (string or null)\n\
         - url (string or null)\n\
         - description (string or null, a concise summary of the role)\n\
         - requirements (array of strings, empty when none are listed)\n\
         Use null when a value does not appear in the text. Never invent values.\n\
         Do not wrap the JSON in markdown fences or add commentary.";

    PromptPair {
        system: system.to_string(),
        user: format!(
            "Page text of the job posting:\n\n{}",
            truncate_page_text(page_text, PAGE_TEXT_LIMIT)
        ),
    }
}

/// Prompts that generate a tailored document for a specific job and profile.
pub fn document_prompts(kind: DocumentKind, job: &JobPosting, profile: &ResumeProfile) -> PromptPair {
    PromptPair {
        system: document_system_prompt(kind).to_string(),
        user: format!(
            "Job posting:\n{}\n\nCandidate profile:\n{}",
            format_job(job),
            format_profile(profile)
        ),
    }
}

fn document_system_prompt(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Resume => {
            "You are a professional resume writer.\n\
             Produce a resume in clean markdown, tailored to the job posting the user provides.\n\
             Requirements:\n\
             1) Reorder and rephrase the candidate's experience to foreground what the posting asks for.\n\
             2) Use only facts from the candidate profile. Never invent employers, dates, titles, or credentials.\n\
             3) Keep it to one page worth of content: summary, skills, experience, education.\n\
             4) Output the resume only, with no preamble or closing remarks."
        }
        DocumentKind::CoverLetter => {
            "You are a professional cover letter writer.\n\
             Write a cover letter in clean markdown for the job posting the user provides.\n\
             Requirements:\n\
             1) Address the company by name and speak to the posting's stated needs.\n\
             2) Draw every claim from the candidate profile. Never invent experience or credentials.\n\
             3) Three to four short paragraphs: opening, fit, evidence, closing.\n\
             4) Output the letter only, with no preamble or closing remarks."
        }
    }
}

fn format_job(job: &JobPosting) -> String {
    let mut lines = vec![
        format!("Title: {}", job.title),
        format!("Company: {}", job.company),
    ];
    if let Some(location) = &job.location {
        lines.push(format!("Location: {}", location));
    }
    if let Some(description) = &job.description {
        lines.push(format!("Description: {}", description));
    }
    if !job.requirements.is_empty() {
        lines.push("Requirements:".to_string());
        for requirement in &job.requirements {
            lines.push(format!("- {}", requirement));
        }
    }
    lines.join("\n")
}

fn format_profile(profile: &ResumeProfile) -> String {
    let mut lines = vec![format!("Name: {}", profile.name)];
    if !profile.email.is_empty() {
        lines.push(format!("Email: {}", profile.email));
    }
    if !profile.phone.is_empty() {
        lines.push(format!("Phone: {}", profile.phone));
    }
    if !profile.summary.is_empty() {
        lines.push(format!("Summary: {}", profile.summary));
    }
    if !profile.skills.is_empty() {
        lines.push(format!("Skills: {}", profile.skills.join(", ")));
    }
    if !profile.experience.is_empty() {
        lines.push("Experience:".to_string());
        for entry in &profile.experience {
            lines.push(format!("- {} at {} ({})", entry.role, entry.company, entry.period));
            for highlight in &entry.highlights {
                lines.push(format!("  - {}", highlight));
            }
        }
    }
    if !profile.education.is_empty() {
        lines.push(format!("Education: {}", profile.education.join("; ")));
    }
    lines.join("\n")
}

fn truncate_page_text(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut cut = 0usize;
    for (idx, _) in text.char_indices() {
        if idx > limit {
            break;
        }
        cut = idx;
    }
    format!("{}...", &text[..cut])
}
