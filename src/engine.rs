//! # Engine Facade
//! Explicit, dependency-injected wiring of the whole pipeline: every
//! component is constructed here and handed its collaborators; there
//! are no ambient singletons. The facade exposes the four external
//! entry points (ingest, query, feedback, source metrics) plus the
//! externally-triggered staleness sweep.
//!
//! Ingestion runs with per-posting error isolation: a malformed posting
//! or an unresolved merge conflict never aborts the batch, while a
//! storage failure fails the whole run so the external scheduler can
//! retry it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::{counter, gauge, histogram};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::dedup::DedupEngine;
use crate::error::{Error, Result};
use crate::feedback::FeedbackProcessor;
use crate::metrics::ensure_metrics_described;
use crate::model::{
    FeedbackAction, FeedbackEvent, IngestResult, JobId, PageRequest, RawPosting,
    RecommendationPage, SourceMetrics, UserProfile,
};
use crate::normalize::Normalizer;
use crate::recommend::RecommendationAssembler;
use crate::scoring::ScoreWeights;
use crate::source_quality::SourceQualityTracker;
use crate::store::memory::{
    MemoryCanonicalJobStore, MemoryFeedbackStore, MemoryRawPostingStore, MemorySourceMetricsStore,
    MemoryUserProfileStore,
};
use crate::store::{
    CanonicalJobStore, FeedbackStore, RawPostingStore, SourceMetricsStore, UserProfileStore,
};

pub struct Engine {
    normalizer: Normalizer,
    dedup: DedupEngine,
    tracker: SourceQualityTracker,
    feedback: FeedbackProcessor,
    assembler: RecommendationAssembler,
    jobs: Arc<dyn CanonicalJobStore>,
    profiles: Arc<dyn UserProfileStore>,
}

impl Engine {
    pub fn new(
        cfg: EngineConfig,
        raw: Arc<dyn RawPostingStore>,
        jobs: Arc<dyn CanonicalJobStore>,
        metrics_store: Arc<dyn SourceMetricsStore>,
        feedback_store: Arc<dyn FeedbackStore>,
        profiles: Arc<dyn UserProfileStore>,
    ) -> Self {
        ensure_metrics_described();

        let normalizer = Normalizer::with_seed_data(cfg.source_currencies.clone());
        let dedup = DedupEngine::new(jobs.clone(), raw, &cfg);
        let tracker = SourceQualityTracker::new(
            metrics_store,
            cfg.engagement_alpha,
            cfg.freshness_horizon_hours,
        );
        let feedback = FeedbackProcessor::new(
            feedback_store.clone(),
            jobs.clone(),
            cfg.weight_learning_rate,
            cfg.min_feedback_events,
            cfg.freshness_decay_days,
        );
        let assembler = RecommendationAssembler::new(
            jobs.clone(),
            feedback_store,
            cfg.candidate_window_days,
            cfg.freshness_decay_days,
        );

        Self {
            normalizer,
            dedup,
            tracker,
            feedback,
            assembler,
            jobs,
            profiles,
        }
    }

    /// All-in-memory wiring for tests and standalone embedding. Returns
    /// the profile store handle so callers can seed profiles.
    pub fn in_memory(cfg: EngineConfig) -> (Self, Arc<MemoryUserProfileStore>) {
        let profiles = Arc::new(MemoryUserProfileStore::new());
        let engine = Self::new(
            cfg,
            Arc::new(MemoryRawPostingStore::new()),
            Arc::new(MemoryCanonicalJobStore::new()),
            Arc::new(MemorySourceMetricsStore::new()),
            Arc::new(MemoryFeedbackStore::new()),
            profiles.clone(),
        );
        (engine, profiles)
    }

    /// Ingestion entry point, invoked by the external scraper scheduler.
    /// Partial success is the expected steady state: per-record failures
    /// land in `IngestResult.errors`, only storage failures abort.
    pub async fn ingest_batch(
        &self,
        source: &str,
        postings: Vec<RawPosting>,
    ) -> Result<IngestResult> {
        let started = Instant::now();
        let now = Utc::now();
        let mut result = IngestResult::default();

        for mut posting in postings {
            // the batch's source id is authoritative
            posting.source = source.to_string();

            let fields = match self.normalizer.normalize(&posting) {
                Ok(f) => f,
                Err(Error::MalformedPosting(reason)) => {
                    result.rejected += 1;
                    result
                        .errors
                        .push(format!("{source}: malformed posting ({reason})"));
                    counter!("jobfeed_rejected_total").increment(1);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let outcome = match self.dedup.resolve(&posting, &fields, now).await {
                Ok(o) => o,
                // A conflict that survives the retry drops only this
                // posting; the next scrape cycle re-submits it.
                Err(Error::DuplicateResolutionConflict { bucket }) => {
                    result.rejected += 1;
                    result.errors.push(format!(
                        "{source}: merge conflict in bucket '{bucket}' persisted after retry"
                    ));
                    counter!("jobfeed_rejected_total").increment(1);
                    warn!(%bucket, source, "merge conflict persisted after retry, posting dropped");
                    continue;
                }
                Err(e) => return Err(e),
            };
            if outcome.merged_into_existing {
                result.merged += 1;
                counter!("jobfeed_merged_total").increment(1);
            } else {
                result.accepted += 1;
            }
            counter!("jobfeed_ingested_total").increment(1);

            // Metric updates are eventually consistent and never block
            // or fail the ingestion path.
            if let Err(e) = self
                .tracker
                .note_ingested(source, posting.posted_at, posting.scraped_at, now)
                .await
            {
                warn!(error = ?e, source, "source metric update failed");
            }
            if let Err(e) = self
                .tracker
                .note_merge(source, outcome.merged_into_existing, now)
                .await
            {
                warn!(error = ?e, source, "duplicate-rate update failed");
            }
        }

        histogram!("jobfeed_ingest_batch_ms").record(started.elapsed().as_millis() as f64);
        gauge!("jobfeed_last_ingest_ts").set(now.timestamp() as f64);
        info!(
            source,
            accepted = result.accepted,
            merged = result.merged,
            rejected = result.rejected,
            "ingest batch finished"
        );
        Ok(result)
    }

    /// Query entry point: ranked, paginated, deduplicated feed for one
    /// user. Read-only; records nothing.
    pub async fn get_recommendations(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> Result<RecommendationPage> {
        let profile = self.profile(user_id).await?;
        let weights = self.feedback.weights_for(user_id);
        let quality = self.quality_by_source().await?;
        self.assembler
            .assemble(&profile, &weights, &quality, page, Utc::now())
            .await
    }

    /// Feedback entry point. The event is appended to history and the
    /// contributing sources' engagement rates are nudged.
    pub async fn record_feedback(
        &self,
        user_id: &str,
        job_id: JobId,
        action: FeedbackAction,
    ) -> Result<()> {
        let Some(job) = self.jobs.get(job_id).await? else {
            return Err(Error::UnknownJob(job_id));
        };
        let now = Utc::now();
        self.feedback
            .record(FeedbackEvent {
                user_id: user_id.to_string(),
                job_id,
                action,
                at: now,
            })
            .await?;

        let sample = engagement_sample(action);
        for source in job.sources() {
            if let Err(e) = self.tracker.note_engagement(source, sample, now).await {
                warn!(error = ?e, source, "engagement update failed");
            }
        }
        Ok(())
    }

    /// Explicit view signal: records shown-but-not-acted impressions for
    /// the given jobs. Never called implicitly by the query path.
    pub async fn record_impressions(&self, user_id: &str, job_ids: &[JobId]) -> Result<()> {
        for &job_id in job_ids {
            match self.jobs.get(job_id).await? {
                Some(_) => {
                    self.record_feedback(user_id, job_id, FeedbackAction::IgnoredShown)
                        .await?
                }
                None => warn!(%job_id, "impression for unknown job ignored"),
            }
        }
        Ok(())
    }

    /// Batch recalibration of one user's scoring weights from their
    /// feedback history. Returns the weights now in effect.
    pub async fn recompute_weights(&self, user_id: &str) -> Result<ScoreWeights> {
        let profile = self.profile(user_id).await?;
        self.feedback.recompute_weights(&profile).await
    }

    /// Staleness sweep, triggered by the external scheduler. Returns the
    /// number of jobs marked inactive.
    pub async fn sweep_stale(&self, now: DateTime<Utc>) -> Result<usize> {
        self.dedup.sweep_stale(now).await
    }

    /// Source management read API (admin/analytics surface).
    pub async fn list_source_metrics(&self) -> Result<Vec<SourceMetrics>> {
        self.tracker.list().await
    }

    pub async fn source_metrics(&self, source: &str) -> Result<Option<SourceMetrics>> {
        self.tracker.get(source).await
    }

    async fn profile(&self, user_id: &str) -> Result<UserProfile> {
        self.profiles
            .get(user_id)
            .await?
            .ok_or_else(|| Error::UnknownUser(user_id.to_string()))
    }

    async fn quality_by_source(&self) -> Result<HashMap<String, f32>> {
        Ok(self
            .tracker
            .list()
            .await?
            .into_iter()
            .map(|m| (m.source, m.quality_score))
            .collect())
    }
}

/// Engagement sample fed into the per-source EMA.
fn engagement_sample(action: FeedbackAction) -> f32 {
    match action {
        FeedbackAction::Applied => 1.0,
        FeedbackAction::Saved => 0.5,
        FeedbackAction::Dismissed | FeedbackAction::IgnoredShown => 0.0,
    }
}
