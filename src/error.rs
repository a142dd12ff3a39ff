//! Error taxonomy for the ingestion and recommendation pipeline.
//!
//! Per-record problems (`MalformedPosting`) are collected into
//! `IngestResult.errors` and never abort a batch. `StorageUnavailable`
//! aborts the current batch so the external scheduler can retry the run.
//! `DuplicateResolutionConflict` is retried once with a fresh candidate
//! read and then logged as a warning, never surfaced as fatal.

use thiserror::Error;

use crate::model::JobId;

#[derive(Debug, Error)]
pub enum Error {
    /// The posting is unusable: title or company empty after trimming.
    #[error("malformed posting: {0}")]
    MalformedPosting(String),

    /// Two concurrent writers raced on the same company/title bucket.
    #[error("duplicate resolution conflict in bucket '{bucket}'")]
    DuplicateResolutionConflict { bucket: String },

    /// The underlying store failed; the whole batch fails for this run.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Feedback referenced a job id the store has never issued.
    #[error("unknown job id {0}")]
    UnknownJob(JobId),

    /// No profile exists for the requested user.
    #[error("unknown user '{0}'")]
    UnknownUser(String),
}

pub type Result<T> = std::result::Result<T, Error>;
