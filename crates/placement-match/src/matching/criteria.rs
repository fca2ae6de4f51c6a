use serde::{Deserialize, Serialize};

/// Identifier wrapper for the scoring criteria attached to an opportunity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CriteriaId(pub String);

/// A skill the opportunity asks for, weighted by how much it matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub skill: String,
    pub weight: f64,
}

/// A free-text term searched for across the candidate's resume text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRequirement {
    pub term: String,
    pub weight: f64,
}

/// Structural expectations the format sub-score checks against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRequirements {
    /// Preferred resume length in words, when the opportunity cares.
    pub preferred_length: Option<u32>,
    pub requires_contact_info: bool,
    pub requires_education: bool,
}

/// The full matching profile published for one opportunity.
///
/// Models are supplied by the caller on every request; the engine holds no
/// criteria storage of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaModel {
    pub id: CriteriaId,
    pub required_skills: Vec<SkillRequirement>,
    pub keywords: Vec<KeywordRequirement>,
    /// Minimum years of relevant experience. Zero means no requirement.
    pub minimum_experience: f64,
    pub format: FormatRequirements,
    /// Inactive opportunities are excluded from rankings but remain scorable.
    pub active: bool,
}

impl CriteriaModel {
    /// Returns the canonical form of the model: every skill and keyword term
    /// trimmed and lower-cased, with the invariants checked along the way.
    ///
    /// Matching is exact-string over the canonical form, so both the profile
    /// side and the criteria side must pass through their normalizers before
    /// scoring. Synonyms are intentionally not resolved.
    pub fn canonicalized(&self) -> Result<CriteriaModel, CriteriaError> {
        if self.id.0.trim().is_empty() {
            return Err(CriteriaError::EmptyId);
        }

        if !self.minimum_experience.is_finite() || self.minimum_experience < 0.0 {
            return Err(CriteriaError::InvalidMinimumExperience);
        }

        if self.format.preferred_length == Some(0) {
            return Err(CriteriaError::InvalidPreferredLength);
        }

        let mut required_skills = Vec::with_capacity(self.required_skills.len());
        for (index, requirement) in self.required_skills.iter().enumerate() {
            let skill = requirement.skill.trim().to_lowercase();
            if skill.is_empty() {
                return Err(CriteriaError::EmptySkill { index });
            }
            if !requirement.weight.is_finite() || requirement.weight < 0.0 {
                return Err(CriteriaError::InvalidWeight { term: skill });
            }
            required_skills.push(SkillRequirement {
                skill,
                weight: requirement.weight,
            });
        }

        let mut keywords = Vec::with_capacity(self.keywords.len());
        for (index, keyword) in self.keywords.iter().enumerate() {
            let term = keyword.term.trim().to_lowercase();
            if term.is_empty() {
                return Err(CriteriaError::EmptyTerm { index });
            }
            if !keyword.weight.is_finite() || keyword.weight < 0.0 {
                return Err(CriteriaError::InvalidWeight { term });
            }
            keywords.push(KeywordRequirement {
                term,
                weight: keyword.weight,
            });
        }

        Ok(CriteriaModel {
            id: self.id.clone(),
            required_skills,
            keywords,
            minimum_experience: self.minimum_experience,
            format: self.format.clone(),
            active: self.active,
        })
    }
}

/// Validation failures for inbound criteria models.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CriteriaError {
    #[error("criteria id must not be empty")]
    EmptyId,
    #[error("required skill at position {index} is empty after trimming")]
    EmptySkill { index: usize },
    #[error("keyword at position {index} is empty after trimming")]
    EmptyTerm { index: usize },
    #[error("weight for '{term}' must be a finite, non-negative number")]
    InvalidWeight { term: String },
    #[error("minimum experience must be a finite, non-negative number of years")]
    InvalidMinimumExperience,
    #[error("preferred resume length must be positive when present")]
    InvalidPreferredLength,
}
