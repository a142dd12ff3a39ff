//! # Deduplication Engine
//! Decides, for each normalized posting, whether it extends an existing
//! canonical job or creates a new one, and keeps the mapping consistent
//! over repeated ingestion cycles.
//!
//! Resolution order:
//! 1. posting identity — the key already belongs to a job (idempotent
//!    re-merge),
//! 2. exact fingerprint over (company, title, location),
//! 3. fuzzy similarity against candidates sharing the folded company and
//!    last seen inside the lookback window:
//!    `0.5*title_jaccard + 0.2*location + 0.3*trigram_jaccard`,
//!    accepted above the configured threshold, ties broken toward the
//!    more recently seen job,
//! 4. otherwise a new canonical job.
//!
//! Merge decisions are serialized per company+title bucket; cross-bucket
//! resolution runs fully in parallel. A raced bucket is retried once
//! with a fresh candidate read, then logged as a warning.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::model::{CanonicalFields, CanonicalJob, JobId, Location, PostingKey, RawPosting};
use crate::normalize::{fold, fold_company};
use crate::store::{CanonicalJobStore, RawPostingStore};

/// Outcome of one merge decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    pub job_id: JobId,
    /// True when the posting merged into an existing job (including an
    /// idempotent re-ingest); false when a new job was created.
    pub merged_into_existing: bool,
}

/// Serializes merge decisions within one coarse company+title bucket.
/// Entries are evicted once no task holds them, so the registry stays
/// bounded by the number of in-flight buckets rather than growing with
/// the company universe.
#[derive(Default)]
struct BucketLocks {
    inner: StdMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl BucketLocks {
    fn for_bucket(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut map = self.inner.lock().expect("bucket lock registry poisoned");
        map.entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Drop the registry entry if the registry holds the last reference.
    /// Callers must release their own `Arc` first.
    fn evict_idle(&self, key: &str) {
        let mut map = self.inner.lock().expect("bucket lock registry poisoned");
        if map.get(key).is_some_and(|l| Arc::strong_count(l) == 1) {
            map.remove(key);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().expect("bucket lock registry poisoned").len()
    }
}

pub struct DedupEngine {
    jobs: Arc<dyn CanonicalJobStore>,
    raw: Arc<dyn RawPostingStore>,
    threshold: f32,
    lookback: Duration,
    staleness: Duration,
    buckets: BucketLocks,
}

impl DedupEngine {
    pub fn new(
        jobs: Arc<dyn CanonicalJobStore>,
        raw: Arc<dyn RawPostingStore>,
        cfg: &EngineConfig,
    ) -> Self {
        Self {
            jobs,
            raw,
            threshold: cfg.dedup_threshold,
            lookback: Duration::days(cfg.lookback_days),
            staleness: Duration::days(cfg.staleness_days),
            buckets: BucketLocks::default(),
        }
    }

    /// Resolve one normalized posting against the canonical set. The
    /// posting is archived regardless of the merge decision.
    pub async fn resolve(
        &self,
        posting: &RawPosting,
        fields: &CanonicalFields,
        now: DateTime<Utc>,
    ) -> Result<MergeOutcome> {
        let bucket = bucket_key(fields);
        let outcome = {
            let lock = self.buckets.for_bucket(&bucket);
            let _guard = lock.lock().await;

            match self.attempt(posting, fields, now).await {
                Err(Error::DuplicateResolutionConflict { bucket: b }) => {
                    warn!(bucket = %b, "merge decision raced, retrying with fresh candidates");
                    counter!("jobfeed_dedup_conflicts_total").increment(1);
                    self.attempt(posting, fields, now).await
                }
                other => other,
            }
        };
        self.buckets.evict_idle(&bucket);
        outcome
    }

    async fn attempt(
        &self,
        posting: &RawPosting,
        fields: &CanonicalFields,
        now: DateTime<Utc>,
    ) -> Result<MergeOutcome> {
        let key = PostingKey::of(posting);
        self.raw.record(&key, posting).await?;

        // 1) Already owned: idempotent re-merge.
        if let Some(owner) = self.jobs.find_by_posting(&key).await? {
            if let Some(job) = self.jobs.get(owner).await? {
                return self.merge_into(job, key, fields, posting).await;
            }
        }

        // 2) Exact fingerprint.
        let fp = fingerprint(fields);
        if let Some(job) = self.jobs.find_by_fingerprint(&fp).await? {
            return self.merge_into(job, key, fields, posting).await;
        }

        // 3) Fuzzy candidates, bounded by company + lookback window.
        let company_key = fold_company(&fields.company);
        let since = now - self.lookback;
        let candidates = self.jobs.candidates_by_company(&company_key, since).await?;

        let mut best: Option<(f32, CanonicalJob)> = None;
        for cand in candidates {
            let score = composite_similarity(&cand, fields);
            let better = match &best {
                None => score > self.threshold,
                Some((bs, bj)) => {
                    score > self.threshold
                        && (score > *bs || (score == *bs && cand.last_seen > bj.last_seen))
                }
            };
            if better {
                best = Some((score, cand));
            }
        }

        if let Some((score, job)) = best {
            debug!(job = %job.id, score, "fuzzy merge accepted");
            return self.merge_into(job, key, fields, posting).await;
        }

        // 4) New canonical job.
        let id = self.jobs.next_id().await?;
        let job = CanonicalJob {
            id,
            title: fields.title.clone(),
            company: fields.company.clone(),
            company_key,
            location: fields.location.clone(),
            tech_stack: fields.tech_stack.clone(),
            salary: fields.salary.clone(),
            description: fields.description.clone(),
            fingerprint: fp,
            postings: [key].into_iter().collect(),
            first_seen: posting.scraped_at,
            last_seen: posting.scraped_at,
            active: true,
        };
        self.jobs.insert(job).await?;
        counter!("jobfeed_created_total").increment(1);
        Ok(MergeOutcome {
            job_id: id,
            merged_into_existing: false,
        })
    }

    /// Append the posting to the job, advance last_seen, backfill
    /// previously-empty fields. First-writer-wins on conflicts: a
    /// populated salary or tech stack is never overwritten, to avoid
    /// churn from inconsistent source data.
    async fn merge_into(
        &self,
        mut job: CanonicalJob,
        key: PostingKey,
        fields: &CanonicalFields,
        posting: &RawPosting,
    ) -> Result<MergeOutcome> {
        job.postings.insert(key);
        if posting.scraped_at > job.last_seen {
            job.last_seen = posting.scraped_at;
        }
        if !job.active {
            job.active = true;
            counter!("jobfeed_reactivated_total").increment(1);
        }
        if job.salary.is_none() {
            job.salary = fields.salary.clone();
        }
        if job.tech_stack.is_empty() {
            job.tech_stack = fields.tech_stack.clone();
        }
        if job.description.is_empty() {
            job.description = fields.description.clone();
        }
        let id = job.id;
        self.jobs.update(job).await?;
        Ok(MergeOutcome {
            job_id: id,
            merged_into_existing: true,
        })
    }

    /// Staleness sweep, triggered externally. Marks jobs inactive when
    /// no source has reported them within the staleness window; returns
    /// how many were swept. Inactive jobs stay stored and reactivate on
    /// a fresh report.
    pub async fn sweep_stale(&self, now: DateTime<Utc>) -> Result<usize> {
        let cutoff = now - self.staleness;
        let stale = self.jobs.stale_active_before(cutoff).await?;
        let count = stale.len();
        for mut job in stale {
            job.active = false;
            self.jobs.update(job).await?;
        }
        if count > 0 {
            counter!("jobfeed_swept_inactive_total").increment(count as u64);
            debug!(count, "staleness sweep marked jobs inactive");
        }
        Ok(count)
    }
}

/// Coarse sharding key for merge serialization: folded company plus the
/// leading title token.
fn bucket_key(fields: &CanonicalFields) -> String {
    let title_head = fold(&fields.title)
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string();
    format!("{}|{}", fold_company(&fields.company), title_head)
}

/// Exact-match fingerprint over (company, title, structured location).
pub fn fingerprint(fields: &CanonicalFields) -> String {
    let l = &fields.location;
    format!(
        "{}|{}|{}|{}|{}|{}",
        fold_company(&fields.company),
        fold(&fields.title),
        l.city.as_deref().unwrap_or("-"),
        l.region.as_deref().unwrap_or("-"),
        l.country.as_deref().unwrap_or("-"),
        if l.remote { "r" } else { "o" },
    )
}

fn token_set(s: &str) -> BTreeSet<String> {
    s.split_whitespace().map(str::to_string).collect()
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count() as f32;
    let union = a.union(b).count() as f32;
    inter / union
}

/// Character trigram set over the folded text.
fn trigrams(s: &str) -> BTreeSet<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < 3 {
        return if chars.is_empty() {
            BTreeSet::new()
        } else {
            [chars.iter().collect::<String>()].into_iter().collect()
        };
    }
    chars.windows(3).map(|w| w.iter().collect()).collect()
}

/// Structured location comparison: exact match (or both remote) = 1.0,
/// same region different city = 0.5, else 0.
fn location_similarity(a: &Location, b: &Location) -> f32 {
    if a == b {
        return 1.0;
    }
    if a.remote && b.remote {
        return 1.0;
    }
    match (&a.city, &b.city) {
        (Some(ca), Some(cb)) if ca == cb => return 1.0,
        _ => {}
    }
    match (&a.region, &b.region) {
        (Some(ra), Some(rb)) if ra == rb => 0.5,
        _ => 0.0,
    }
}

/// Weighted blend: title token-set Jaccard 0.5, location 0.2, trigram
/// Jaccard over descriptions 0.3. When neither side carries a
/// description the remaining components are renormalized instead of
/// silently penalizing both.
pub fn composite_similarity(job: &CanonicalJob, fields: &CanonicalFields) -> f32 {
    let title = jaccard(
        &token_set(&fold(&job.title)),
        &token_set(&fold(&fields.title)),
    );
    let location = location_similarity(&job.location, &fields.location);

    let ta = trigrams(&fold(&job.description));
    let tb = trigrams(&fold(&fields.description));
    let (desc_part, denom) = if ta.is_empty() && tb.is_empty() {
        (0.0, 0.7)
    } else {
        (0.3 * jaccard(&ta, &tb), 1.0)
    };

    ((0.5 * title + 0.2 * location) + desc_part) / denom
}
