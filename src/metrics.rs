//! One-time registration of the pipeline's metric series, so they show
//! up on whatever exporter the embedding application installs. The
//! `metrics` facade is a no-op until a recorder exists; exposition is
//! the host's concern, not this crate's.

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// Register series descriptions exactly once.
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "jobfeed_ingested_total",
            "Raw postings accepted into the pipeline."
        );
        describe_counter!(
            "jobfeed_merged_total",
            "Postings merged into an existing canonical job."
        );
        describe_counter!(
            "jobfeed_created_total",
            "Canonical jobs created from unmatched postings."
        );
        describe_counter!(
            "jobfeed_rejected_total",
            "Postings rejected per-record (malformed)."
        );
        describe_counter!(
            "jobfeed_dedup_conflicts_total",
            "Bucket races retried during merge resolution."
        );
        describe_counter!(
            "jobfeed_feedback_events_total",
            "Feedback events recorded."
        );
        describe_counter!(
            "jobfeed_swept_inactive_total",
            "Canonical jobs marked inactive by the staleness sweep."
        );
        describe_counter!(
            "jobfeed_reactivated_total",
            "Inactive canonical jobs reactivated by a fresh report."
        );
        describe_histogram!(
            "jobfeed_ingest_batch_ms",
            "Wall time of one ingest batch in milliseconds."
        );
        describe_gauge!(
            "jobfeed_last_ingest_ts",
            "Unix ts when an ingest batch last completed."
        );
    });
}
