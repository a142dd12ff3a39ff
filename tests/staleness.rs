// tests/staleness.rs
// Staleness sweep, recommendation exclusion, and reactivation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jobfeed::store::memory::{
    MemoryCanonicalJobStore, MemoryFeedbackStore, MemoryRawPostingStore, MemorySourceMetricsStore,
    MemoryUserProfileStore,
};
use jobfeed::{Engine, EngineConfig, PageRequest, RawPosting, UserProfile};

fn stale_posting(days_ago: i64) -> RawPosting {
    let seen = Utc::now() - Duration::days(days_ago);
    RawPosting {
        source: String::new(),
        native_id: Some("p1".into()),
        title: "Backend Engineer".into(),
        company: "Acme".into(),
        location_text: "Remote".into(),
        description: "Go services".into(),
        url: None,
        posted_at: seen - Duration::hours(2),
        scraped_at: seen,
    }
}

async fn engine_and_user() -> (Engine, Arc<MemoryUserProfileStore>) {
    let profiles = Arc::new(MemoryUserProfileStore::new());
    profiles
        .upsert(UserProfile {
            user_id: "u1".into(),
            remote_ok: true,
            ..Default::default()
        })
        .await;
    let engine = Engine::new(
        EngineConfig::default(),
        Arc::new(MemoryRawPostingStore::new()),
        Arc::new(MemoryCanonicalJobStore::new()),
        Arc::new(MemorySourceMetricsStore::new()),
        Arc::new(MemoryFeedbackStore::new()),
        profiles.clone(),
    );
    (engine, profiles)
}

#[tokio::test]
async fn swept_job_disappears_from_recommendations() {
    let (engine, _) = engine_and_user().await;

    // last seen 25 days ago: inside the 30-day candidate window but
    // beyond the 21-day staleness window
    engine
        .ingest_batch("source-a", vec![stale_posting(25)])
        .await
        .unwrap();

    let before = engine
        .get_recommendations("u1", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(before.total, 1);

    let swept = engine.sweep_stale(Utc::now()).await.unwrap();
    assert_eq!(swept, 1);

    let after = engine
        .get_recommendations("u1", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(after.total, 0);
}

#[tokio::test]
async fn fresh_report_reactivates_without_new_job() {
    let (engine, _) = engine_and_user().await;

    engine
        .ingest_batch("source-a", vec![stale_posting(25)])
        .await
        .unwrap();
    engine.sweep_stale(Utc::now()).await.unwrap();

    // same source-native id reported again today
    let r = engine
        .ingest_batch("source-a", vec![stale_posting(0)])
        .await
        .unwrap();
    assert_eq!(r.merged, 1);
    assert_eq!(r.accepted, 0); // no duplicate canonical job

    let page = engine
        .get_recommendations("u1", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn recently_seen_jobs_survive_the_sweep() {
    let (engine, _) = engine_and_user().await;

    engine
        .ingest_batch("source-a", vec![stale_posting(3)])
        .await
        .unwrap();
    assert_eq!(engine.sweep_stale(Utc::now()).await.unwrap(), 0);

    let page = engine
        .get_recommendations("u1", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}
