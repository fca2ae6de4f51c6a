use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DAYS_PER_YEAR: f64 = 365.25;

/// Identifier wrapper for marketplace candidates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Structured resume snapshot as stored by the resume service.
///
/// This is the raw caller-owned shape. Scoring never reads it directly;
/// it is normalized into a [`CandidateProfile`] first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeData {
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub has_contact_info: bool,
    pub has_education_section: bool,
    /// Total resume length in words.
    pub word_count: u32,
    #[serde(default)]
    pub summary: Option<String>,
}

/// One role on the resume with an explicit start and end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub start: NaiveDate,
    pub end: ExperienceEnd,
}

/// Whether a role has finished or is still held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceEnd {
    On(NaiveDate),
    Ongoing,
}

/// Normalized candidate facts consumed by the scoring engine.
///
/// Skills are trimmed, lower-cased, and deduplicated; experience is the
/// merged span of all roles so concurrent positions never double-count.
/// Profiles are derived per evaluation and never persisted by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub skills: BTreeSet<String>,
    pub years_of_experience: f64,
    pub has_contact_info: bool,
    pub has_education_section: bool,
    /// Resume length in words, always positive.
    pub resume_length: u32,
    /// Flattened lower-case text keyword terms are searched against.
    pub search_text: String,
}

impl CandidateProfile {
    /// Normalizes a raw resume into the profile scoring consumes.
    ///
    /// `as_of` dates the evaluation: ongoing roles end there, so the same
    /// resume yields the same profile for the same date.
    pub fn from_resume(resume: &ResumeData, as_of: NaiveDate) -> Result<Self, ProfileError> {
        if resume.word_count == 0 {
            return Err(ProfileError::EmptyResume);
        }

        let mut skills = BTreeSet::new();
        for raw in &resume.skills {
            let skill = raw.trim().to_lowercase();
            if !skill.is_empty() {
                skills.insert(skill);
            }
        }

        let merged = merged_experience_days(&resume.experience, as_of)?;
        let years_of_experience = merged as f64 / DAYS_PER_YEAR;

        let mut fragments: Vec<String> = skills.iter().cloned().collect();
        for entry in &resume.experience {
            let title = entry.title.trim().to_lowercase();
            if !title.is_empty() {
                fragments.push(title);
            }
        }
        if let Some(summary) = &resume.summary {
            let summary = summary.trim().to_lowercase();
            if !summary.is_empty() {
                fragments.push(summary);
            }
        }

        Ok(Self {
            skills,
            years_of_experience,
            has_contact_info: resume.has_contact_info,
            has_education_section: resume.has_education_section,
            resume_length: resume.word_count,
            search_text: fragments.join(" "),
        })
    }

    /// Checks the invariants of a profile built outside [`from_resume`],
    /// as batch ranking accepts caller-constructed profiles.
    ///
    /// [`from_resume`]: CandidateProfile::from_resume
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.resume_length == 0 {
            return Err(ProfileError::EmptyResume);
        }
        if !self.years_of_experience.is_finite() || self.years_of_experience < 0.0 {
            return Err(ProfileError::InvalidExperienceYears);
        }
        if self.skills.iter().any(|skill| skill.trim().is_empty()) {
            return Err(ProfileError::EmptySkill);
        }
        Ok(())
    }
}

/// Sums experience as the union of all date ranges, in days.
///
/// Ranges are closed at `as_of` for ongoing roles, sorted, and merged so
/// overlapping or back-to-back roles count each day once. An ongoing role
/// that has not started yet contributes nothing.
fn merged_experience_days(
    entries: &[ExperienceEntry],
    as_of: NaiveDate,
) -> Result<i64, ProfileError> {
    let mut ranges: Vec<(NaiveDate, NaiveDate)> = Vec::with_capacity(entries.len());
    for entry in entries {
        let end = match entry.end {
            ExperienceEnd::On(date) => {
                if date < entry.start {
                    return Err(ProfileError::InvertedDateRange {
                        title: entry.title.clone(),
                    });
                }
                date
            }
            ExperienceEnd::Ongoing => {
                if entry.start > as_of {
                    continue;
                }
                as_of
            }
        };
        ranges.push((entry.start, end));
    }

    ranges.sort();

    let mut total = 0_i64;
    let mut current: Option<(NaiveDate, NaiveDate)> = None;
    for (start, end) in ranges {
        match current {
            Some((held_start, held_end)) if start <= held_end => {
                current = Some((held_start, held_end.max(end)));
            }
            Some((held_start, held_end)) => {
                total += (held_end - held_start).num_days();
                current = Some((start, end));
            }
            None => current = Some((start, end)),
        }
    }
    if let Some((held_start, held_end)) = current {
        total += (held_end - held_start).num_days();
    }

    Ok(total)
}

/// Validation failures for resumes and candidate profiles.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("experience entry '{title}' ends before it starts")]
    InvertedDateRange { title: String },
    #[error("resume word count must be positive")]
    EmptyResume,
    #[error("years of experience must be a finite, non-negative number")]
    InvalidExperienceYears,
    #[error("profile skills must not contain empty entries")]
    EmptySkill,
}
