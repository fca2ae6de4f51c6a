use crate::infra::InMemoryApplicationRepository;
use chrono::{Local, NaiveDate, Utc};
use clap::Args;
use placement_match::applications::{ApplicationService, ApplicationStatus};
use placement_match::config::AppConfig;
use placement_match::error::AppError;
use placement_match::matching::{
    CandidateId, CandidateProfile, CriteriaId, CriteriaModel, ExperienceEnd, ExperienceEntry,
    FormatRequirements, KeywordRequirement, RankingOptions, RankingService, ResumeData,
    ScoreResult, ScoringEngine, SkillRequirement,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Display cutoff this demo applies when listing candidates. The engine
/// returns every score; hiding weak ones is the caller's call.
const DISPLAY_THRESHOLD: u32 = 60;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Path to a resume JSON file
    #[arg(long)]
    pub(crate) resume: PathBuf,
    /// Path to a criteria JSON file
    #[arg(long)]
    pub(crate) criteria: PathBuf,
    /// Evaluation date for ongoing experience (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date for the demo (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Skip the application lifecycle portion of the demo
    #[arg(long)]
    pub(crate) skip_applications: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        resume,
        criteria,
        as_of,
    } = args;

    let config = AppConfig::load()?;
    let engine = ScoringEngine::new(config.engine.weights);

    let resume: ResumeData = serde_json::from_str(&std::fs::read_to_string(&resume)?)?;
    let criteria: CriteriaModel = serde_json::from_str(&std::fs::read_to_string(&criteria)?)?;

    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let criteria = criteria.canonicalized()?;
    let profile = CandidateProfile::from_resume(&resume, as_of)?;

    print_score(&criteria.id, &engine.score(&profile, &criteria));
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        as_of,
        skip_applications,
    } = args;
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());

    println!("Placement match demo (evaluated {as_of})");

    let config = AppConfig::load()?;
    let engine = Arc::new(ScoringEngine::new(config.engine.weights));
    let mut options = RankingOptions::default();
    if let Some(max_workers) = config.engine.max_workers {
        options.max_workers = max_workers;
    }
    if config.engine.deadline.is_some() {
        options.deadline = config.engine.deadline;
    }
    let ranking = RankingService::with_options(Arc::clone(&engine), options);

    let resume = demo_resume();
    let slate = demo_slate();
    let target = demo_data_platform_criteria();

    println!("\nScoring cand-jordan against {}", target.id.0);
    let profile = CandidateProfile::from_resume(&resume, as_of)?;
    print_score(&target.id, &engine.score(&profile, &target.canonicalized()?));

    let cancel = CancellationToken::new();

    println!("\nOpportunities ranked for cand-jordan");
    let opportunities = ranking
        .rank_opportunities_for_candidate(&profile, slate, &cancel)
        .await?;
    for entry in &opportunities.ranked {
        println!("- {}: {}/100", entry.id.0, entry.score.overall);
    }
    for failure in &opportunities.failed {
        println!("- {} not scored: {}", failure.id.0, failure.reason);
    }
    if opportunities.skipped > 0 {
        println!("- {} postings left unscored", opportunities.skipped);
    }

    println!("\nCandidates ranked for {}", target.id.0);
    let candidates = ranking
        .rank_candidates_for_opportunity(&target, demo_pool(as_of)?, &cancel)
        .await?;
    for entry in &candidates.ranked {
        let note = if entry.score.overall < DISPLAY_THRESHOLD {
            " (below display threshold)"
        } else {
            ""
        };
        println!("- {}: {}/100{note}", entry.id.0, entry.score.overall);
    }

    if skip_applications {
        return Ok(());
    }

    println!("\nApplication lifecycle demo");
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let service = ApplicationService::new(repository, Arc::clone(&engine));

    let record = match service.submit_scored(
        CandidateId("cand-jordan".to_string()),
        &target,
        Some(&resume),
        as_of,
        Utc::now(),
    ) {
        Ok(record) => record,
        Err(err) => {
            println!("  Submission rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "- Opened {} for {} in status {} (version {})",
        record.id.0,
        record.criteria_id.0,
        record.status.label(),
        record.version
    );
    if let Some(score) = &record.score {
        println!("  Attached score: {}/100", score.overall);
    }

    let reviewed = match service.transition(
        &record.id,
        ApplicationStatus::UnderReview,
        "coordinator-demo",
        record.version,
        Utc::now(),
    ) {
        Ok(updated) => updated,
        Err(err) => {
            println!("  Transition failed: {err}");
            return Ok(());
        }
    };
    println!(
        "- Moved to {} (version {})",
        reviewed.status.label(),
        reviewed.version
    );

    // A second reviewer replays the version they read before the move above.
    match service.transition(
        &record.id,
        ApplicationStatus::Shortlisted,
        "second-reviewer",
        record.version,
        Utc::now(),
    ) {
        Err(err) => println!("- Concurrent move with a stale token refused: {err}"),
        Ok(_) => println!("- Unexpected: a stale token was accepted"),
    }

    let mut version = reviewed.version;
    for step in [ApplicationStatus::Interview, ApplicationStatus::Accepted] {
        match service.transition(&record.id, step, "coordinator-demo", version, Utc::now()) {
            Ok(updated) => {
                println!(
                    "- Moved to {} (version {})",
                    updated.status.label(),
                    updated.version
                );
                version = updated.version;
            }
            Err(err) => {
                println!("  Transition failed: {err}");
                return Ok(());
            }
        }
    }

    println!("\nApplications for {} (best first)", target.id.0);
    match service.ranked_for_opportunity(&target.id) {
        Ok(listing) => {
            for row in listing {
                let overall = row
                    .score
                    .as_ref()
                    .map(|score| format!("{}/100", score.overall))
                    .unwrap_or_else(|| "unscored".to_string());
                println!(
                    "- {} | {} | {} | {}",
                    row.id.0,
                    row.candidate_id.0,
                    row.status.label(),
                    overall
                );
            }
        }
        Err(err) => println!("  Listing unavailable: {err}"),
    }

    match service.get(&record.id) {
        Ok(closed) => match serde_json::to_string_pretty(&closed) {
            Ok(json) => println!("\nFinal record payload:\n{json}"),
            Err(err) => println!("  Final record payload unavailable: {err}"),
        },
        Err(err) => println!("  Record lookup failed: {err}"),
    }

    Ok(())
}

fn print_score(criteria_id: &CriteriaId, score: &ScoreResult) {
    println!("Score for {}: {}/100", criteria_id.0, score.overall);
    println!(
        "- components: skill {} | keyword {} | experience {} | format {}",
        score.breakdown.skill,
        score.breakdown.keyword,
        score.breakdown.experience,
        score.breakdown.format
    );
    if !score.matched_skills.is_empty() {
        println!("- matched skills: {}", join_skills(&score.matched_skills));
    }
    if !score.missing_skills.is_empty() {
        println!("- missing skills: {}", join_skills(&score.missing_skills));
    }
}

fn join_skills(skills: &BTreeSet<String>) -> String {
    skills
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn demo_resume() -> ResumeData {
    ResumeData {
        skills: vec!["Rust".to_string(), "Python".to_string(), "SQL".to_string()],
        experience: vec![ExperienceEntry {
            title: "Backend Intern".to_string(),
            start: NaiveDate::from_ymd_opt(2021, 6, 1).expect("valid date"),
            end: ExperienceEnd::On(NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")),
        }],
        has_contact_info: true,
        has_education_section: true,
        word_count: 650,
        summary: Some(
            "Built data pipelines and internal tooling in Rust and Python.".to_string(),
        ),
    }
}

fn demo_data_platform_criteria() -> CriteriaModel {
    CriteriaModel {
        id: CriteriaId("crit-data-platform".to_string()),
        required_skills: vec![
            SkillRequirement {
                skill: "rust".to_string(),
                weight: 2.0,
            },
            SkillRequirement {
                skill: "python".to_string(),
                weight: 1.0,
            },
            SkillRequirement {
                skill: "kubernetes".to_string(),
                weight: 1.0,
            },
        ],
        keywords: vec![
            KeywordRequirement {
                term: "pipelines".to_string(),
                weight: 1.0,
            },
            KeywordRequirement {
                term: "grpc".to_string(),
                weight: 1.0,
            },
        ],
        minimum_experience: 2.0,
        format: FormatRequirements {
            preferred_length: Some(600),
            requires_contact_info: true,
            requires_education: true,
        },
        active: true,
    }
}

fn demo_slate() -> Vec<CriteriaModel> {
    let generalist = CriteriaModel {
        id: CriteriaId("crit-generalist".to_string()),
        required_skills: vec![
            SkillRequirement {
                skill: "rust".to_string(),
                weight: 1.0,
            },
            SkillRequirement {
                skill: "sql".to_string(),
                weight: 1.0,
            },
        ],
        keywords: vec![KeywordRequirement {
            term: "tooling".to_string(),
            weight: 1.0,
        }],
        minimum_experience: 5.0,
        format: FormatRequirements {
            preferred_length: None,
            requires_contact_info: false,
            requires_education: false,
        },
        active: true,
    };
    let frontend = CriteriaModel {
        id: CriteriaId("crit-frontend".to_string()),
        required_skills: vec![
            SkillRequirement {
                skill: "typescript".to_string(),
                weight: 1.0,
            },
            SkillRequirement {
                skill: "react".to_string(),
                weight: 1.0,
            },
        ],
        keywords: Vec::new(),
        minimum_experience: 1.0,
        format: FormatRequirements {
            preferred_length: None,
            requires_contact_info: false,
            requires_education: false,
        },
        active: true,
    };

    vec![demo_data_platform_criteria(), generalist, frontend]
}

fn demo_pool(as_of: NaiveDate) -> Result<Vec<(CandidateId, CandidateProfile)>, AppError> {
    let junior = ResumeData {
        skills: vec!["Rust".to_string()],
        experience: vec![ExperienceEntry {
            title: "Junior Developer".to_string(),
            start: NaiveDate::from_ymd_opt(2023, 6, 1).expect("valid date"),
            end: ExperienceEnd::On(NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")),
        }],
        has_contact_info: true,
        has_education_section: true,
        word_count: 500,
        summary: None,
    };
    let analyst = ResumeData {
        skills: vec!["Excel".to_string()],
        experience: Vec::new(),
        has_contact_info: true,
        has_education_section: true,
        word_count: 300,
        summary: None,
    };

    Ok(vec![
        (
            CandidateId("cand-jordan".to_string()),
            CandidateProfile::from_resume(&demo_resume(), as_of)?,
        ),
        (
            CandidateId("cand-riley".to_string()),
            CandidateProfile::from_resume(&junior, as_of)?,
        ),
        (
            CandidateId("cand-casey".to_string()),
            CandidateProfile::from_resume(&analyst, as_of)?,
        ),
    ])
}
