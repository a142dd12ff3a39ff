//! # Domain Model
//! Core types shared across the pipeline: raw scraped postings, the
//! deduplicated canonical job, per-source quality metrics, user profiles,
//! feedback events and the ephemeral scored recommendation.
//!
//! `RawPosting` is immutable once stored; re-scrapes supersede, never
//! mutate. A `CanonicalJob` owns the postings merged into it: every
//! `PostingKey` maps to exactly one job at any time.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier for a canonical job, assigned on first dedup
/// resolution by the job store (monotonic, never reused).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// One scraped record from one source, unmodified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawPosting {
    pub source: String, // e.g. "linkedin", "weworkremotely"
    /// Source-native identifier. May be absent or unstable; identity
    /// falls back to a content hash (see [`PostingKey`]).
    pub native_id: Option<String>,
    pub title: String,
    pub company: String,
    pub location_text: String,
    pub description: String,
    pub url: Option<String>,
    pub posted_at: DateTime<Utc>,
    pub scraped_at: DateTime<Utc>,
}

/// Identity of a posting: `(source, native id)` or, when the source has
/// no stable id, `(source, content hash)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostingKey {
    pub source: String,
    pub key: String,
}

impl PostingKey {
    pub fn of(posting: &RawPosting) -> Self {
        let key = match &posting.native_id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => format!("sha:{}", content_hash(posting)),
        };
        Self {
            source: posting.source.clone(),
            key,
        }
    }
}

/// Short hex digest over the fields that define a posting's content.
fn content_hash(p: &RawPosting) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(p.title.as_bytes());
    hasher.update(b"|");
    hasher.update(p.company.as_bytes());
    hasher.update(b"|");
    hasher.update(p.description.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(32);
    for b in digest.iter().take(16) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Structured location parsed from free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub remote: bool,
}

/// Parsed salary range with explicit currency ("unknown" when the text
/// carried no currency signal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<u64>,
    pub max: Option<u64>,
    pub currency: String,
}

impl SalaryRange {
    /// Lower bound, falling back to the upper one for single-value ranges.
    pub fn floor(&self) -> Option<u64> {
        self.min.or(self.max)
    }

    /// Upper bound, falling back to the lower one.
    pub fn ceiling(&self) -> Option<u64> {
        self.max.or(self.min)
    }
}

/// Normalizer output: the canonical-schema fields extracted from one
/// raw posting, before dedup resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalFields {
    pub title: String,
    pub company: String,
    pub location: Location,
    pub tech_stack: BTreeSet<String>,
    pub salary: Option<SalaryRange>,
    pub description: String,
}

/// The deduplicated, merged representation of a real-world job opening.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalJob {
    pub id: JobId,
    pub title: String,
    pub company: String,
    /// Folded company name; bucketing key and candidate pre-filter.
    pub company_key: String,
    pub location: Location,
    pub tech_stack: BTreeSet<String>,
    pub salary: Option<SalaryRange>,
    pub description: String,
    /// Exact-match key over (company, title, location); used to
    /// short-circuit fuzzy comparison on lookup.
    pub fingerprint: String,
    /// Contributing postings. Membership is idempotent: re-ingesting an
    /// identical posting never adds a second entry.
    pub postings: BTreeSet<PostingKey>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// False once no source has reported the job within the staleness
    /// window. Inactive jobs are retained for audit and may reactivate.
    pub active: bool,
}

impl CanonicalJob {
    /// Distinct sources currently contributing to this job.
    pub fn sources(&self) -> BTreeSet<&str> {
        self.postings.iter().map(|k| k.source.as_str()).collect()
    }
}

/// Rolling reliability/freshness metrics for one source. Mutated only by
/// the Source Quality Tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetrics {
    pub source: String,
    /// Postings ingested from this source, all time.
    pub ingested: u64,
    /// Ingested postings that merged into an existing canonical job.
    pub merged: u64,
    pub duplicate_rate: f32,
    /// Running mean of (scraped_at - posted_at), in hours.
    pub avg_freshness_hours: f32,
    /// Exponential moving average of engagement samples (applied = 1.0,
    /// shown-but-ignored = 0.0).
    pub engagement_rate: f32,
    /// Derived blend in [0, 1]; see Source Quality Tracker.
    pub quality_score: f32,
    pub updated_at: DateTime<Utc>,
}

impl SourceMetrics {
    pub fn new(source: &str, now: DateTime<Utc>) -> Self {
        Self {
            source: source.to_string(),
            ingested: 0,
            merged: 0,
            duplicate_rate: 0.0,
            avg_freshness_hours: 0.0,
            engagement_rate: 0.0,
            quality_score: 0.0,
            updated_at: now,
        }
    }
}

/// External user profile, read-only from this subsystem's perspective.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub skills: BTreeSet<String>,
    pub desired_cities: Vec<String>,
    pub desired_regions: Vec<String>,
    pub salary_floor: Option<u64>,
    /// When true the floor is a hard constraint (pre-filter), not a
    /// scoring preference.
    pub salary_floor_required: bool,
    pub remote_ok: bool,
    pub disabled_sources: BTreeSet<String>,
    /// Optional per-source priority multipliers in [0, 1]; missing
    /// sources default to 1.0.
    #[serde(default)]
    pub source_priority: BTreeMap<String, f32>,
}

impl UserProfile {
    pub fn source_enabled(&self, source: &str) -> bool {
        !self.disabled_sources.contains(source)
    }

    pub fn priority_for(&self, source: &str) -> f32 {
        self.source_priority
            .get(source)
            .copied()
            .unwrap_or(1.0)
            .clamp(0.0, 1.0)
    }
}

/// User action on a recommended job. Append-only history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAction {
    Applied,
    Dismissed,
    Saved,
    /// Shown to the user who then took no action. Recorded only on an
    /// explicit view signal, never by the query itself.
    IgnoredShown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub user_id: String,
    pub job_id: JobId,
    pub action: FeedbackAction,
    pub at: DateTime<Utc>,
}

/// Per-component score contributions, each already normalized to [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skill: f32,
    pub location: f32,
    pub salary: f32,
    pub source_quality: f32,
    pub freshness: f32,
}

/// Ephemeral, computed per query; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecommendation {
    pub job_id: JobId,
    pub score: f32,
    pub breakdown: ScoreBreakdown,
    /// 1-based position in the full ranked set (before pagination).
    pub rank: usize,
}

/// Outcome of one `ingest_batch` call. Partial success is the expected
/// steady state given noisy upstream data.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestResult {
    /// Postings that created a new canonical job.
    pub accepted: usize,
    /// Postings merged into an existing canonical job.
    pub merged: usize,
    /// Postings rejected per-record (malformed, or a merge conflict
    /// that survived the retry).
    pub rejected: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// 0-based page index.
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationPage {
    pub items: Vec<ScoredRecommendation>,
    pub page: usize,
    pub page_size: usize,
    /// Total ranked candidates across all pages.
    pub total: usize,
}
