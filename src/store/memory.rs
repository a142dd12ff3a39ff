//! In-memory store implementations. Default wiring for tests and for
//! embedding the engine without a database; the relational versions live
//! with the host application behind the same traits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::model::{
    CanonicalJob, FeedbackEvent, JobId, PostingKey, RawPosting, SourceMetrics, UserProfile,
};
use crate::store::{
    CanonicalJobStore, FeedbackStore, RawPostingStore, SourceMetricsStore, UserProfileStore,
};

#[derive(Debug, Default)]
pub struct MemoryRawPostingStore {
    /// Versions per key, oldest first. Append-only.
    inner: RwLock<HashMap<PostingKey, Vec<RawPosting>>>,
}

impl MemoryRawPostingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RawPostingStore for MemoryRawPostingStore {
    async fn record(&self, key: &PostingKey, posting: &RawPosting) -> Result<()> {
        let mut map = self.inner.write().await;
        map.entry(key.clone()).or_default().push(posting.clone());
        Ok(())
    }

    async fn get(&self, key: &PostingKey) -> Result<Option<RawPosting>> {
        let map = self.inner.read().await;
        Ok(map.get(key).and_then(|v| v.last().cloned()))
    }
}

#[derive(Debug, Default)]
struct JobsInner {
    jobs: HashMap<JobId, CanonicalJob>,
    by_fingerprint: HashMap<String, JobId>,
    by_posting: HashMap<PostingKey, JobId>,
}

#[derive(Debug, Default)]
pub struct MemoryCanonicalJobStore {
    inner: RwLock<JobsInner>,
    next: AtomicU64,
}

impl MemoryCanonicalJobStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::default(),
            next: AtomicU64::new(1),
        }
    }

    fn index(inner: &mut JobsInner, job: &CanonicalJob) {
        inner.by_fingerprint.insert(job.fingerprint.clone(), job.id);
        for key in &job.postings {
            inner.by_posting.insert(key.clone(), job.id);
        }
    }
}

#[async_trait]
impl CanonicalJobStore for MemoryCanonicalJobStore {
    async fn next_id(&self) -> Result<JobId> {
        Ok(JobId(self.next.fetch_add(1, Ordering::SeqCst)))
    }

    async fn insert(&self, job: CanonicalJob) -> Result<()> {
        let mut inner = self.inner.write().await;
        Self::index(&mut inner, &job);
        inner.jobs.insert(job.id, job);
        Ok(())
    }

    async fn update(&self, job: CanonicalJob) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.jobs.contains_key(&job.id) {
            return Err(Error::UnknownJob(job.id));
        }
        Self::index(&mut inner, &job);
        inner.jobs.insert(job.id, job);
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<CanonicalJob>> {
        Ok(self.inner.read().await.jobs.get(&id).cloned())
    }

    async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Option<CanonicalJob>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_fingerprint
            .get(fingerprint)
            .and_then(|id| inner.jobs.get(id))
            .cloned())
    }

    async fn find_by_posting(&self, key: &PostingKey) -> Result<Option<JobId>> {
        Ok(self.inner.read().await.by_posting.get(key).copied())
    }

    async fn candidates_by_company(
        &self,
        company_key: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CanonicalJob>> {
        let inner = self.inner.read().await;
        Ok(inner
            .jobs
            .values()
            .filter(|j| j.company_key == company_key && j.last_seen >= since)
            .cloned()
            .collect())
    }

    async fn active_since(&self, since: DateTime<Utc>) -> Result<Vec<CanonicalJob>> {
        let inner = self.inner.read().await;
        Ok(inner
            .jobs
            .values()
            .filter(|j| j.active && j.last_seen >= since)
            .cloned()
            .collect())
    }

    async fn stale_active_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<CanonicalJob>> {
        let inner = self.inner.read().await;
        Ok(inner
            .jobs
            .values()
            .filter(|j| j.active && j.last_seen < cutoff)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct MemorySourceMetricsStore {
    inner: RwLock<HashMap<String, SourceMetrics>>,
}

impl MemorySourceMetricsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SourceMetricsStore for MemorySourceMetricsStore {
    async fn get(&self, source: &str) -> Result<Option<SourceMetrics>> {
        Ok(self.inner.read().await.get(source).cloned())
    }

    async fn upsert(&self, metrics: SourceMetrics) -> Result<()> {
        self.inner
            .write()
            .await
            .insert(metrics.source.clone(), metrics);
        Ok(())
    }

    async fn get_batch(&self, sources: &[String]) -> Result<Vec<SourceMetrics>> {
        let map = self.inner.read().await;
        Ok(sources.iter().filter_map(|s| map.get(s).cloned()).collect())
    }

    async fn list(&self) -> Result<Vec<SourceMetrics>> {
        let map = self.inner.read().await;
        let mut all: Vec<SourceMetrics> = map.values().cloned().collect();
        all.sort_by(|a, b| a.source.cmp(&b.source));
        Ok(all)
    }
}

#[derive(Debug, Default)]
pub struct MemoryFeedbackStore {
    inner: RwLock<Vec<FeedbackEvent>>,
}

impl MemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedbackStore for MemoryFeedbackStore {
    async fn append(&self, event: FeedbackEvent) -> Result<()> {
        self.inner.write().await.push(event);
        Ok(())
    }

    async fn for_user(&self, user_id: &str) -> Result<Vec<FeedbackEvent>> {
        let all = self.inner.read().await;
        Ok(all
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Profile provider for tests and standalone embedding. Production
/// profiles come from the host application's user service.
#[derive(Debug, Default)]
pub struct MemoryUserProfileStore {
    inner: RwLock<HashMap<String, UserProfile>>,
}

impl MemoryUserProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, profile: UserProfile) {
        self.inner
            .write()
            .await
            .insert(profile.user_id.clone(), profile);
    }
}

#[async_trait]
impl UserProfileStore for MemoryUserProfileStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(self.inner.read().await.get(user_id).cloned())
    }
}
