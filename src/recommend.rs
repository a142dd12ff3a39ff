//! # Recommendation Assembler
//! Produces the paginated, ranked, deduplicated feed for one user.
//! Read-only and side-effect-free: impressions are recorded only when
//! the caller explicitly signals a view (see `Engine::record_impressions`),
//! never by the query itself, so prefetching cannot poison engagement
//! rates.
//!
//! Candidate retrieval is bounded (last seen within the candidate
//! window, never a full-table scan) and pre-filtered by the user's
//! enabled sources and hard constraints before scoring.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::model::{
    CanonicalJob, FeedbackAction, JobId, PageRequest, RecommendationPage, UserProfile,
};
use crate::scoring::{score, ScoreWeights};
use crate::store::{CanonicalJobStore, FeedbackStore};

/// Quality used for sources that have no metrics yet: neither rewarded
/// nor punished.
const NEUTRAL_SOURCE_QUALITY: f32 = 0.5;

pub struct RecommendationAssembler {
    jobs: Arc<dyn CanonicalJobStore>,
    feedback: Arc<dyn FeedbackStore>,
    candidate_window: Duration,
    freshness_decay_days: i64,
}

impl RecommendationAssembler {
    pub fn new(
        jobs: Arc<dyn CanonicalJobStore>,
        feedback: Arc<dyn FeedbackStore>,
        candidate_window_days: i64,
        freshness_decay_days: i64,
    ) -> Self {
        Self {
            jobs,
            feedback,
            candidate_window: Duration::days(candidate_window_days),
            freshness_decay_days,
        }
    }

    pub async fn assemble(
        &self,
        profile: &UserProfile,
        weights: &ScoreWeights,
        quality_by_source: &HashMap<String, f32>,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<RecommendationPage> {
        let since = now - self.candidate_window;
        let candidates = self.jobs.active_since(since).await?;
        let acted = self.acted_job_ids(&profile.user_id).await?;

        let mut scored = Vec::with_capacity(candidates.len());
        for job in candidates {
            if acted.contains(&job.id) {
                continue;
            }
            // Jobs whose every contributing source is disabled are
            // excluded before scoring, not down-weighted.
            let Some(quality) = best_source_quality(&job, profile, quality_by_source) else {
                continue;
            };
            if hard_salary_filtered(&job, profile) {
                continue;
            }
            let rec = score(
                &job,
                profile,
                weights,
                quality,
                now,
                self.freshness_decay_days,
            );
            scored.push((rec, job.last_seen, job.id));
        }

        // Descending by score; ties go to the more recently seen job,
        // then to the lower id for a fully deterministic order.
        scored.sort_by(|(a, a_seen, a_id), (b, b_seen, b_id)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b_seen.cmp(a_seen))
                .then_with(|| a_id.cmp(b_id))
        });

        let total = scored.len();
        let items = scored
            .into_iter()
            .enumerate()
            .map(|(i, (mut rec, _, _))| {
                rec.rank = i + 1;
                rec
            })
            .skip(page.page * page.page_size)
            .take(page.page_size)
            .collect();

        Ok(RecommendationPage {
            items,
            page: page.page,
            page_size: page.page_size,
            total,
        })
    }

    /// Jobs the user has already applied to or dismissed.
    async fn acted_job_ids(&self, user_id: &str) -> Result<HashSet<JobId>> {
        let events = self.feedback.for_user(user_id).await?;
        Ok(events
            .into_iter()
            .filter(|e| {
                matches!(
                    e.action,
                    FeedbackAction::Applied | FeedbackAction::Dismissed
                )
            })
            .map(|e| e.job_id)
            .collect())
    }
}

/// Quality of the best-performing enabled contributing source, adjusted
/// by the user's per-source priority. `None` when every contributing
/// source is disabled.
fn best_source_quality(
    job: &CanonicalJob,
    profile: &UserProfile,
    quality_by_source: &HashMap<String, f32>,
) -> Option<f32> {
    let mut best: Option<f32> = None;
    for source in job.sources() {
        if !profile.source_enabled(source) {
            continue;
        }
        let q = quality_by_source
            .get(source)
            .copied()
            .unwrap_or(NEUTRAL_SOURCE_QUALITY)
            * profile.priority_for(source);
        best = Some(best.map_or(q, |b: f32| b.max(q)));
    }
    best
}

/// The salary floor is a hard pre-filter only when the user marks it
/// required; jobs with unknown salary always pass.
fn hard_salary_filtered(job: &CanonicalJob, profile: &UserProfile) -> bool {
    if !profile.salary_floor_required {
        return false;
    }
    let (Some(floor), Some(salary)) = (profile.salary_floor, &job.salary) else {
        return false;
    };
    matches!(salary.ceiling(), Some(max) if max < floor)
}
