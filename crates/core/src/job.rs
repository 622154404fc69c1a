//! Job and Resume Models
//!
//! Data structures for captured job postings and the user's resume profile.
//! These feed the prompt assembler; storage and form handling live outside
//! this workspace.

use serde::{Deserialize, Serialize};

/// A captured job posting.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JobPosting {
    /// Job title as listed
    pub title: String,
    /// Hiring company
    pub company: String,
    /// Location or remote designation
    #[serde(default)]
    pub location: Option<String>,
    /// URL of the posting page
    #[serde(default)]
    pub url: Option<String>,
    /// Full description text
    #[serde(default)]
    pub description: Option<String>,
    /// Listed requirements, one per entry
    #[serde(default)]
    pub requirements: Vec<String>,
}

impl JobPosting {
    /// Create a posting with the required fields.
    pub fn new(title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            ..Default::default()
        }
    }

    /// Short "title at company" label for display and logging.
    pub fn label(&self) -> String {
        format!("{} at {}", self.title, self.company)
    }
}

/// The user's resume profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResumeProfile {
    /// Full name
    pub name: String,
    /// Contact email
    #[serde(default)]
    pub email: String,
    /// Contact phone number
    #[serde(default)]
    pub phone: String,
    /// Professional summary paragraph
    #[serde(default)]
    pub summary: String,
    /// Skill keywords
    #[serde(default)]
    pub skills: Vec<String>,
    /// Work history, most recent first
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    /// Degrees and certifications
    #[serde(default)]
    pub education: Vec<String>,
}

/// One position in the work history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExperienceEntry {
    /// Role held
    pub role: String,
    /// Employer
    pub company: String,
    /// Employment period (e.g. "2021 - 2024")
    #[serde(default)]
    pub period: String,
    /// Notable accomplishments
    #[serde(default)]
    pub highlights: Vec<String>,
}
