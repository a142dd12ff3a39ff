//! # Source Quality Tracker
//! Rolling per-source reliability metrics, updated incrementally: never
//! recomputed from full history. Three update paths:
//!
//! - a new posting is ingested → count + freshness running mean,
//! - a merge decision is finalized → duplicate rate,
//! - a feedback event arrives → engagement EMA (smoothing 0.2 by
//!   default, so bursts don't whiplash the metric).
//!
//! Quality blend: `0.4*(1-dup_rate) + 0.3*norm_freshness +
//! 0.3*engagement`, clamped to [0,1]. Updates are eventually consistent;
//! ingestion workers never block on them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::Result;
use crate::model::SourceMetrics;
use crate::store::SourceMetricsStore;

#[derive(Clone)]
pub struct SourceQualityTracker {
    store: Arc<dyn SourceMetricsStore>,
    /// EMA smoothing factor for engagement samples.
    alpha: f32,
    /// Scrape lag mapping to zero normalized freshness.
    freshness_horizon_hours: f32,
}

impl SourceQualityTracker {
    pub fn new(store: Arc<dyn SourceMetricsStore>, alpha: f32, freshness_horizon_hours: f32) -> Self {
        Self {
            store,
            alpha: alpha.clamp(0.0, 1.0),
            freshness_horizon_hours: freshness_horizon_hours.max(1.0),
        }
    }

    /// Update count + freshness for one ingested posting.
    pub async fn note_ingested(
        &self,
        source: &str,
        posted_at: DateTime<Utc>,
        scraped_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut m = self.load(source, now).await?;
        m.ingested += 1;
        let lag_hours = ((scraped_at - posted_at).num_minutes().max(0) as f32) / 60.0;
        // running mean, incremental form
        m.avg_freshness_hours += (lag_hours - m.avg_freshness_hours) / m.ingested as f32;
        self.finish(m, now).await
    }

    /// Update duplicate rate after a finalized merge decision.
    pub async fn note_merge(&self, source: &str, merged_into_existing: bool, now: DateTime<Utc>) -> Result<()> {
        let mut m = self.load(source, now).await?;
        if merged_into_existing {
            m.merged += 1;
        }
        m.duplicate_rate = if m.ingested > 0 {
            (m.merged as f32 / m.ingested as f32).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.finish(m, now).await
    }

    /// Fold one engagement sample (applied = 1.0, shown-but-ignored =
    /// 0.0) into the EMA.
    pub async fn note_engagement(&self, source: &str, sample: f32, now: DateTime<Utc>) -> Result<()> {
        let mut m = self.load(source, now).await?;
        let sample = sample.clamp(0.0, 1.0);
        m.engagement_rate = self.alpha * sample + (1.0 - self.alpha) * m.engagement_rate;
        self.finish(m, now).await
    }

    pub async fn get(&self, source: &str) -> Result<Option<SourceMetrics>> {
        self.store.get(source).await
    }

    /// Batch read for the scoring path.
    pub async fn get_batch(&self, sources: &[String]) -> Result<Vec<SourceMetrics>> {
        self.store.get_batch(sources).await
    }

    pub async fn list(&self) -> Result<Vec<SourceMetrics>> {
        self.store.list().await
    }

    async fn load(&self, source: &str, now: DateTime<Utc>) -> Result<SourceMetrics> {
        Ok(self
            .store
            .get(source)
            .await?
            .unwrap_or_else(|| SourceMetrics::new(source, now)))
    }

    async fn finish(&self, mut m: SourceMetrics, now: DateTime<Utc>) -> Result<()> {
        m.quality_score = self.quality(&m);
        m.updated_at = now;
        debug!(
            source = %m.source,
            quality = m.quality_score,
            dup_rate = m.duplicate_rate,
            engagement = m.engagement_rate,
            "source metrics updated"
        );
        self.store.upsert(m).await
    }

    fn quality(&self, m: &SourceMetrics) -> f32 {
        let norm_freshness =
            (1.0 - m.avg_freshness_hours / self.freshness_horizon_hours).clamp(0.0, 1.0);
        (0.4 * (1.0 - m.duplicate_rate) + 0.3 * norm_freshness + 0.3 * m.engagement_rate)
            .clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemorySourceMetricsStore;
    use chrono::Duration;

    fn tracker() -> SourceQualityTracker {
        SourceQualityTracker::new(Arc::new(MemorySourceMetricsStore::new()), 0.2, 48.0)
    }

    #[tokio::test]
    async fn freshness_running_mean_is_incremental() {
        let t = tracker();
        let now = Utc::now();
        // two postings: 12h lag and 36h lag → mean 24h
        t.note_ingested("a", now - Duration::hours(12), now, now)
            .await
            .unwrap();
        t.note_ingested("a", now - Duration::hours(36), now, now)
            .await
            .unwrap();
        let m = t.get("a").await.unwrap().unwrap();
        assert_eq!(m.ingested, 2);
        assert!((m.avg_freshness_hours - 24.0).abs() < 0.1);
        // norm freshness (1 - 24/48) = 0.5 feeds the blend
        assert!((m.quality_score - (0.4 + 0.3 * 0.5)).abs() < 0.01);
    }

    #[tokio::test]
    async fn duplicate_rate_tracks_merges_over_ingested() {
        let t = tracker();
        let now = Utc::now();
        for _ in 0..4 {
            t.note_ingested("a", now, now, now).await.unwrap();
        }
        t.note_merge("a", true, now).await.unwrap();
        t.note_merge("a", false, now).await.unwrap();
        let m = t.get("a").await.unwrap().unwrap();
        assert!((m.duplicate_rate - 0.25).abs() < 1e-6);
    }

    #[tokio::test]
    async fn engagement_uses_ema_not_raw_average() {
        let t = tracker();
        let now = Utc::now();
        t.note_engagement("a", 1.0, now).await.unwrap();
        let after_one = t.get("a").await.unwrap().unwrap().engagement_rate;
        assert!((after_one - 0.2).abs() < 1e-6); // 0.2*1 + 0.8*0

        // a burst of applies moves the rate smoothly, not to 1.0
        for _ in 0..3 {
            t.note_engagement("a", 1.0, now).await.unwrap();
        }
        let after_burst = t.get("a").await.unwrap().unwrap().engagement_rate;
        assert!(after_burst > after_one && after_burst < 0.7);
    }

    #[tokio::test]
    async fn quality_stays_in_unit_interval() {
        let t = tracker();
        let now = Utc::now();
        // pathological source: huge lag, all duplicates
        t.note_ingested("bad", now - Duration::hours(500), now, now)
            .await
            .unwrap();
        t.note_merge("bad", true, now).await.unwrap();
        let m = t.get("bad").await.unwrap().unwrap();
        assert!((0.0..=1.0).contains(&m.quality_score));
    }

    #[tokio::test]
    async fn batch_read_returns_known_sources_only() {
        let t = tracker();
        let now = Utc::now();
        t.note_ingested("a", now, now, now).await.unwrap();
        let got = t
            .get_batch(&["a".to_string(), "ghost".to_string()])
            .await
            .unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].source, "a");
    }
}
