use std::collections::BTreeSet;

use crate::matching::criteria::CriteriaModel;
use crate::matching::profile::CandidateProfile;

/// Points deducted for each unmet boolean format requirement.
pub(crate) const FORMAT_FLAG_PENALTY: f64 = 25.0;

/// Length deviation tolerated before the format score starts dropping.
pub(crate) const LENGTH_TOLERANCE: f64 = 0.2;

/// Rounds half-up to an integer and clamps into the 0-100 band.
pub(crate) fn round_half_up(value: f64) -> u32 {
    (value + 0.5).floor().clamp(0.0, 100.0) as u32
}

/// Weighted ratio of required skills the candidate holds, with the matched
/// and missing sets recorded for explanations.
///
/// No required skills (or all weights zero) scores 100: nothing was asked
/// for, so nothing is missing.
pub(super) fn skill_score(
    profile: &CandidateProfile,
    criteria: &CriteriaModel,
) -> (u32, BTreeSet<String>, BTreeSet<String>) {
    let mut matched = BTreeSet::new();
    let mut missing = BTreeSet::new();
    let mut total = 0.0;
    let mut earned = 0.0;

    for requirement in &criteria.required_skills {
        total += requirement.weight;
        if profile.skills.contains(&requirement.skill) {
            earned += requirement.weight;
            matched.insert(requirement.skill.clone());
        } else {
            missing.insert(requirement.skill.clone());
        }
    }

    if total <= 0.0 {
        return (100, matched, missing);
    }
    (round_half_up(100.0 * earned / total), matched, missing)
}

/// Weighted ratio of keyword terms found in the flattened resume text.
pub(super) fn keyword_score(profile: &CandidateProfile, criteria: &CriteriaModel) -> u32 {
    let mut total = 0.0;
    let mut earned = 0.0;

    for keyword in &criteria.keywords {
        total += keyword.weight;
        if profile.search_text.contains(&keyword.term) {
            earned += keyword.weight;
        }
    }

    if total <= 0.0 {
        return 100;
    }
    round_half_up(100.0 * earned / total)
}

/// Full marks at or above the minimum, linear credit below it.
pub(super) fn experience_score(years: f64, minimum: f64) -> u32 {
    if minimum <= 0.0 || years >= minimum {
        return 100;
    }
    round_half_up(100.0 * years / minimum)
}

/// Starts at 100 and deducts for unmet boolean requirements and for length
/// deviation beyond the tolerated band, one point per percentage point.
pub(super) fn format_score(profile: &CandidateProfile, criteria: &CriteriaModel) -> u32 {
    let format = &criteria.format;
    let mut score = 100.0;

    if format.requires_contact_info && !profile.has_contact_info {
        score -= FORMAT_FLAG_PENALTY;
    }
    if format.requires_education && !profile.has_education_section {
        score -= FORMAT_FLAG_PENALTY;
    }

    if let Some(preferred) = format.preferred_length {
        let preferred = f64::from(preferred);
        let deviation = (f64::from(profile.resume_length) - preferred).abs() / preferred;
        if deviation > LENGTH_TOLERANCE {
            score -= (deviation - LENGTH_TOLERANCE) * 100.0;
        }
    }

    round_half_up(score.max(0.0))
}
