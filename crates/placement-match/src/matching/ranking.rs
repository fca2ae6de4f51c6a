use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::criteria::{CriteriaError, CriteriaId, CriteriaModel};
use super::profile::{CandidateId, CandidateProfile, ProfileError};
use super::scoring::{ScoreResult, ScoringEngine};

/// Tuning knobs for batch ranking.
#[derive(Debug, Clone, Copy)]
pub struct RankingOptions {
    /// Upper bound on concurrent scoring workers. Batches never spawn more
    /// workers than they have items.
    pub max_workers: usize,
    /// Wall-clock budget for a batch. Items still unclaimed when it elapses
    /// are reported as skipped rather than blocking the caller.
    pub deadline: Option<Duration>,
}

impl Default for RankingOptions {
    fn default() -> Self {
        let max_workers = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(4);
        Self {
            max_workers,
            deadline: None,
        }
    }
}

/// One scored item in a ranked listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry<K> {
    pub id: K,
    pub score: ScoreResult,
}

/// An item the batch could not score, with the validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure<K> {
    pub id: K,
    pub reason: String,
}

/// Outcome of a batch: every input item lands in exactly one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranking<K> {
    pub ranked: Vec<RankedEntry<K>>,
    pub failed: Vec<BatchFailure<K>>,
    /// Count of items left unscored by cancellation or the deadline.
    pub skipped: usize,
}

/// Fans scoring out over a bounded worker pool and assembles ordered
/// listings.
///
/// Workers pull items from a shared cursor and check the cancellation token
/// and deadline between items, so an in-flight pair always finishes but no
/// new work starts once the batch is abandoned. The final ordering is
/// independent of worker scheduling.
pub struct RankingService {
    engine: Arc<ScoringEngine>,
    options: RankingOptions,
}

impl RankingService {
    pub fn new(engine: Arc<ScoringEngine>) -> Self {
        Self::with_options(engine, RankingOptions::default())
    }

    pub fn with_options(engine: Arc<ScoringEngine>, options: RankingOptions) -> Self {
        Self { engine, options }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Scores one candidate against a slate of opportunities.
    ///
    /// Inactive criteria are dropped before the batch starts. A criteria
    /// model that fails validation lands in `failed` without disturbing the
    /// rest of the batch; only an invalid candidate profile fails the call,
    /// since every pair shares it.
    pub async fn rank_opportunities_for_candidate(
        &self,
        profile: &CandidateProfile,
        criteria: Vec<CriteriaModel>,
        cancel: &CancellationToken,
    ) -> Result<Ranking<CriteriaId>, RankingError> {
        profile.validate()?;

        let profile = Arc::new(profile.clone());
        let engine = Arc::clone(&self.engine);
        let items: Vec<(CriteriaId, CriteriaModel)> = criteria
            .into_iter()
            .filter(|model| model.active)
            .map(|model| (model.id.clone(), model))
            .collect();

        self.execute(
            items,
            move |model: &CriteriaModel| {
                let canonical = model.canonicalized().map_err(|err| err.to_string())?;
                Ok(engine.score(&profile, &canonical))
            },
            cancel,
        )
        .await
    }

    /// Scores a slate of candidates against one opportunity.
    ///
    /// The shared criteria model is the caller's single input and fails the
    /// call when invalid. Individual profiles that fail validation land in
    /// `failed`.
    pub async fn rank_candidates_for_opportunity(
        &self,
        criteria: &CriteriaModel,
        candidates: Vec<(CandidateId, CandidateProfile)>,
        cancel: &CancellationToken,
    ) -> Result<Ranking<CandidateId>, RankingError> {
        let criteria = Arc::new(criteria.canonicalized()?);
        let engine = Arc::clone(&self.engine);

        self.execute(
            candidates,
            move |profile: &CandidateProfile| {
                profile.validate().map_err(|err| err.to_string())?;
                Ok(engine.score(profile, &criteria))
            },
            cancel,
        )
        .await
    }

    async fn execute<K, T, F>(
        &self,
        items: Vec<(K, T)>,
        score_item: F,
        cancel: &CancellationToken,
    ) -> Result<Ranking<K>, RankingError>
    where
        K: Ord + Clone + Send + Sync + 'static,
        T: Send + Sync + 'static,
        F: Fn(&T) -> Result<ScoreResult, String> + Send + Sync + 'static,
    {
        let total = items.len();
        if total == 0 {
            return Ok(Ranking {
                ranked: Vec::new(),
                failed: Vec::new(),
                skipped: 0,
            });
        }

        let items = Arc::new(items);
        let score_item = Arc::new(score_item);
        let cursor = Arc::new(AtomicUsize::new(0));
        let started = Instant::now();
        let deadline = self.options.deadline;
        let workers = self.options.max_workers.clamp(1, total);

        debug!(items = total, workers, "ranking batch started");

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let items = Arc::clone(&items);
            let score_item = Arc::clone(&score_item);
            let cursor = Arc::clone(&cursor);
            let cancel = cancel.clone();

            handles.push(tokio::task::spawn_blocking(move || {
                let mut outcomes = Vec::new();
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    if let Some(budget) = deadline {
                        if started.elapsed() >= budget {
                            break;
                        }
                    }
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some((id, item)) = items.get(index) else {
                        break;
                    };
                    outcomes.push((id.clone(), score_item(item)));
                }
                outcomes
            }));
        }

        let mut ranked = Vec::new();
        let mut failed: Vec<BatchFailure<K>> = Vec::new();
        let mut processed = 0;
        for handle in handles {
            let outcomes = handle
                .await
                .map_err(|err| RankingError::WorkerPanicked(err.to_string()))?;
            processed += outcomes.len();
            for (id, outcome) in outcomes {
                match outcome {
                    Ok(score) => ranked.push(RankedEntry { id, score }),
                    Err(reason) => failed.push(BatchFailure { id, reason }),
                }
            }
        }

        ranked.sort_by(|a, b| a.score.ranking_cmp(&b.score).then_with(|| a.id.cmp(&b.id)));
        failed.sort_by(|a, b| a.id.cmp(&b.id));

        let skipped = total - processed;
        if skipped > 0 {
            debug!(
                skipped,
                ranked = ranked.len(),
                failed = failed.len(),
                "ranking batch returned partial results"
            );
        }

        Ok(Ranking {
            ranked,
            failed,
            skipped,
        })
    }
}

/// Batch-level ranking failures. Per-item problems are reported in
/// [`Ranking::failed`] instead.
#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error(transparent)]
    Criteria(#[from] CriteriaError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error("ranking worker panicked: {0}")]
    WorkerPanicked(String),
}
