// src/lib.rs
// Public library surface for integration tests (and embedding hosts).

pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod recommend;
pub mod scoring;
pub mod source_quality;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::config::EngineConfig;
pub use crate::engine::Engine;
pub use crate::error::{Error, Result};
pub use crate::model::{
    CanonicalJob, FeedbackAction, FeedbackEvent, IngestResult, JobId, Location, PageRequest,
    PostingKey, RawPosting, RecommendationPage, SalaryRange, ScoreBreakdown,
    ScoredRecommendation, SourceMetrics, UserProfile,
};
pub use crate::scoring::ScoreWeights;
