//! Repository interfaces. The storage technology is an external
//! collaborator: everything the engine persists goes through these
//! traits, so the backing store can be swapped without touching the
//! pipeline logic. Implementations map their own failures to
//! `Error::StorageUnavailable`.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::{
    CanonicalJob, FeedbackEvent, JobId, PostingKey, RawPosting, SourceMetrics, UserProfile,
};

/// Append-only archive of scraped postings. Re-scrapes supersede, never
/// mutate; old versions are retained for audit.
#[async_trait]
pub trait RawPostingStore: Send + Sync {
    async fn record(&self, key: &PostingKey, posting: &RawPosting) -> Result<()>;
    /// Latest stored version for the key, if any.
    async fn get(&self, key: &PostingKey) -> Result<Option<RawPosting>>;
}

#[async_trait]
pub trait CanonicalJobStore: Send + Sync {
    /// Issue the next stable job id (monotonic, never reused).
    async fn next_id(&self) -> Result<JobId>;
    async fn insert(&self, job: CanonicalJob) -> Result<()>;
    /// Replace the stored job with the same id.
    async fn update(&self, job: CanonicalJob) -> Result<()>;
    async fn get(&self, id: JobId) -> Result<Option<CanonicalJob>>;
    async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Option<CanonicalJob>>;
    /// Which job currently owns this posting, if any.
    async fn find_by_posting(&self, key: &PostingKey) -> Result<Option<JobId>>;
    /// Fuzzy-candidate pre-filter: jobs for one folded company last seen
    /// at or after `since`, regardless of active flag.
    async fn candidates_by_company(
        &self,
        company_key: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CanonicalJob>>;
    /// Active jobs last seen at or after `since` (recommendation window).
    async fn active_since(&self, since: DateTime<Utc>) -> Result<Vec<CanonicalJob>>;
    /// Active jobs whose last report is strictly before `cutoff`
    /// (staleness sweep input).
    async fn stale_active_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<CanonicalJob>>;
}

#[async_trait]
pub trait SourceMetricsStore: Send + Sync {
    async fn get(&self, source: &str) -> Result<Option<SourceMetrics>>;
    async fn upsert(&self, metrics: SourceMetrics) -> Result<()>;
    async fn get_batch(&self, sources: &[String]) -> Result<Vec<SourceMetrics>>;
    async fn list(&self) -> Result<Vec<SourceMetrics>>;
}

/// Append-only feedback history. Events are never mutated or deleted.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn append(&self, event: FeedbackEvent) -> Result<()>;
    async fn for_user(&self, user_id: &str) -> Result<Vec<FeedbackEvent>>;
}

/// Read-only view of user profiles; owned by an external collaborator.
#[async_trait]
pub trait UserProfileStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>>;
}
