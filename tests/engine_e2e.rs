// tests/engine_e2e.rs
// End-to-end flow through the facade: ingest → query → feedback →
// source metrics.

use chrono::{Duration, Utc};
use jobfeed::{
    Engine, EngineConfig, Error, FeedbackAction, JobId, PageRequest, RawPosting, UserProfile,
};

fn posting(native_id: &str, title: &str, company: &str, desc: &str) -> RawPosting {
    let now = Utc::now();
    RawPosting {
        source: String::new(),
        native_id: Some(native_id.into()),
        title: title.into(),
        company: company.into(),
        location_text: "Remote".into(),
        description: desc.into(),
        url: Some(format!("https://example.com/{native_id}")),
        posted_at: now - Duration::hours(4),
        scraped_at: now,
    }
}

fn go_profile(user_id: &str) -> UserProfile {
    UserProfile {
        user_id: user_id.into(),
        skills: ["go"].iter().map(|s| s.to_string()).collect(),
        salary_floor: Some(100_000),
        remote_ok: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn full_pipeline_ranks_and_reacts_to_feedback() {
    let (engine, profiles) = Engine::in_memory(EngineConfig::default());
    profiles.upsert(go_profile("u1")).await;

    let r = engine
        .ingest_batch(
            "source-a",
            vec![
                posting("1", "Backend Engineer", "Acme", "Go, Kubernetes. $120k-$150k"),
                posting("2", "Frontend Engineer", "Globex", "React and TypeScript."),
            ],
        )
        .await
        .unwrap();
    assert_eq!(r.accepted, 2);

    let page = engine
        .get_recommendations("u1", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    // the Go job matches skills and clears the salary floor: it ranks first
    let top = &page.items[0];
    assert_eq!(top.rank, 1);
    assert!(top.breakdown.skill > page.items[1].breakdown.skill);
    assert!(top.score > page.items[1].score);

    // applying removes the job from the next feed
    engine
        .record_feedback("u1", top.job_id, FeedbackAction::Applied)
        .await
        .unwrap();
    let next = engine
        .get_recommendations("u1", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(next.total, 1);
    assert_ne!(next.items[0].job_id, top.job_id);
}

#[tokio::test]
async fn source_metrics_reflect_ingest_and_engagement() {
    let (engine, profiles) = Engine::in_memory(EngineConfig::default());
    profiles.upsert(go_profile("u1")).await;

    engine
        .ingest_batch(
            "source-a",
            vec![posting("1", "Backend Engineer", "Acme", "Go work")],
        )
        .await
        .unwrap();
    engine
        .ingest_batch(
            "source-b",
            vec![posting("9", "Backend Engineer, Remote", "Acme", "Go work")],
        )
        .await
        .unwrap();

    let all = engine.list_source_metrics().await.unwrap();
    assert_eq!(all.len(), 2);

    let a = engine.source_metrics("source-a").await.unwrap().unwrap();
    assert_eq!(a.ingested, 1);
    assert_eq!(a.merged, 0);

    // source-b only ever produced a duplicate
    let b = engine.source_metrics("source-b").await.unwrap().unwrap();
    assert_eq!(b.merged, 1);
    assert!((b.duplicate_rate - 1.0).abs() < 1e-6);
    assert!(b.quality_score < a.quality_score);

    // an application lifts engagement for both contributing sources
    engine
        .record_feedback("u1", JobId(1), FeedbackAction::Applied)
        .await
        .unwrap();
    let a_after = engine.source_metrics("source-a").await.unwrap().unwrap();
    assert!(a_after.engagement_rate > a.engagement_rate);
}

#[tokio::test]
async fn impressions_are_explicit_and_lower_engagement() {
    let (engine, profiles) = Engine::in_memory(EngineConfig::default());
    profiles.upsert(go_profile("u1")).await;

    engine
        .ingest_batch(
            "source-a",
            vec![posting("1", "Backend Engineer", "Acme", "Go work")],
        )
        .await
        .unwrap();
    engine
        .record_feedback("u1", JobId(1), FeedbackAction::Applied)
        .await
        .unwrap();
    let engaged = engine
        .source_metrics("source-a")
        .await
        .unwrap()
        .unwrap()
        .engagement_rate;

    // querying alone records nothing
    engine
        .get_recommendations("u1", PageRequest::default())
        .await
        .unwrap();
    let after_query = engine
        .source_metrics("source-a")
        .await
        .unwrap()
        .unwrap()
        .engagement_rate;
    assert_eq!(after_query, engaged);

    // an explicit view signal does
    engine.record_impressions("u1", &[JobId(1)]).await.unwrap();
    let after_view = engine
        .source_metrics("source-a")
        .await
        .unwrap()
        .unwrap()
        .engagement_rate;
    assert!(after_view < engaged);
}

#[tokio::test]
async fn disabled_sources_are_excluded_from_the_feed() {
    let (engine, profiles) = Engine::in_memory(EngineConfig::default());
    let mut p = go_profile("u1");
    p.disabled_sources.insert("spammy".into());
    profiles.upsert(p).await;

    engine
        .ingest_batch(
            "spammy",
            vec![posting("1", "Backend Engineer", "Acme", "Go work")],
        )
        .await
        .unwrap();
    engine
        .ingest_batch(
            "good",
            vec![posting("2", "Platform Engineer", "Globex", "Go work")],
        )
        .await
        .unwrap();

    let page = engine
        .get_recommendations("u1", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].job_id, JobId(2));
}

#[tokio::test]
async fn unknown_user_and_unknown_job_are_typed_errors() {
    let (engine, _profiles) = Engine::in_memory(EngineConfig::default());

    let err = engine
        .get_recommendations("ghost", PageRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownUser(u) if u == "ghost"));

    let err = engine
        .record_feedback("ghost", JobId(404), FeedbackAction::Saved)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownJob(JobId(404))));
}

#[tokio::test]
async fn salary_parsed_during_ingest_feeds_the_hard_filter() {
    let (engine, profiles) = Engine::in_memory(EngineConfig::default());
    let mut p = go_profile("u1");
    p.salary_floor_required = true;
    profiles.upsert(p).await;

    engine
        .ingest_batch(
            "source-a",
            vec![
                posting("1", "Junior Engineer", "Acme", "Pays $40k-$60k"),
                posting("2", "Senior Engineer", "Globex", "Pays $120k-$160k"),
                posting("3", "Mystery Engineer", "Initech", "Competitive pay"),
            ],
        )
        .await
        .unwrap();

    let page = engine
        .get_recommendations("u1", PageRequest::default())
        .await
        .unwrap();
    // below-floor job filtered out; unknown salary passes through
    assert_eq!(page.total, 2);
    assert!(page.items.iter().all(|r| r.job_id != JobId(1)));
}
