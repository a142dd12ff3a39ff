//! # Feedback Processor
//! Ingests user actions and turns them into per-user scoring weights.
//! Recording is append-only and safe for unlimited concurrent writers;
//! recomputation is an explicit batch step, never inline with a query,
//! and a pure function of the stored history: replaying an unchanged
//! history yields unchanged weights.
//!
//! Calibration rule: on an Applied event, components the user evidently
//! ignored (score ≤ 0.3 on a job they still applied to) lose weight and
//! components that were strongly present (≥ 0.7) gain weight, one
//! bounded nudge per event. Dismissed applies the inverse at half
//! strength, Saved counts as a weak Applied. Weights are clamped to
//! [0.05, 0.6] and renormalized to sum 1.0, so no single dimension can
//! collapse the blend. With fewer than the configured minimum of events
//! the processor silently keeps defaults; insufficient history is not
//! an error and never blocks scoring.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use metrics::counter;
use tracing::debug;

use crate::error::Result;
use crate::model::{FeedbackAction, FeedbackEvent, UserProfile};
use crate::scoring::{score, ScoreWeights};
use crate::store::{CanonicalJobStore, FeedbackStore};

pub const WEIGHT_MIN: f32 = 0.05;
pub const WEIGHT_MAX: f32 = 0.6;

pub struct FeedbackProcessor {
    store: Arc<dyn FeedbackStore>,
    jobs: Arc<dyn CanonicalJobStore>,
    /// Tuned weights per user; absent users fall back to defaults.
    tuned: RwLock<HashMap<String, ScoreWeights>>,
    learning_rate: f32,
    min_events: usize,
    freshness_decay_days: i64,
}

impl FeedbackProcessor {
    pub fn new(
        store: Arc<dyn FeedbackStore>,
        jobs: Arc<dyn CanonicalJobStore>,
        learning_rate: f32,
        min_events: usize,
        freshness_decay_days: i64,
    ) -> Self {
        Self {
            store,
            jobs,
            tuned: RwLock::new(HashMap::new()),
            learning_rate,
            min_events,
            freshness_decay_days,
        }
    }

    /// Append one event to the history. Never mutates prior events.
    pub async fn record(&self, event: FeedbackEvent) -> Result<()> {
        counter!("jobfeed_feedback_events_total").increment(1);
        self.store.append(event).await
    }

    /// Current weights for a user: tuned if a recompute has produced
    /// them, defaults otherwise. Cheap synchronous read on the query
    /// path.
    pub fn weights_for(&self, user_id: &str) -> ScoreWeights {
        self.tuned
            .read()
            .expect("tuned weights lock poisoned")
            .get(user_id)
            .copied()
            .unwrap_or_default()
    }

    /// Batch recompute of one user's weights from their full feedback
    /// history. Falls back to defaults below the event minimum.
    pub async fn recompute_weights(&self, profile: &UserProfile) -> Result<ScoreWeights> {
        let events = self.store.for_user(&profile.user_id).await?;
        let actionable: Vec<&FeedbackEvent> = events
            .iter()
            .filter(|e| {
                matches!(
                    e.action,
                    FeedbackAction::Applied | FeedbackAction::Dismissed | FeedbackAction::Saved
                )
            })
            .collect();

        if actionable.len() < self.min_events {
            debug!(
                user = %profile.user_id,
                events = actionable.len(),
                min = self.min_events,
                "insufficient feedback history, keeping default weights"
            );
            return Ok(ScoreWeights::default());
        }

        // The walk always starts from the defaults so that recomputing
        // over the same history is idempotent; history growth, not call
        // count, is what moves the weights.
        let mut w = ScoreWeights::default().as_array();
        for event in actionable {
            let Some(job) = self.jobs.get(event.job_id).await? else {
                continue;
            };
            // Component values as they looked at action time. Source
            // quality is fed neutral: source preference is expressed
            // through profile priorities, not learned weights.
            let snapshot = score(
                &job,
                profile,
                &ScoreWeights::default(),
                0.5,
                event.at,
                self.freshness_decay_days,
            );
            let components = [
                snapshot.breakdown.skill,
                snapshot.breakdown.location,
                snapshot.breakdown.salary,
                snapshot.breakdown.source_quality,
                snapshot.breakdown.freshness,
            ];
            let (direction, strength) = match event.action {
                FeedbackAction::Applied => (1.0, 1.0),
                FeedbackAction::Saved => (1.0, 0.5),
                FeedbackAction::Dismissed => (-1.0, 0.5),
                FeedbackAction::IgnoredShown => continue,
            };
            let step = self.learning_rate * strength;
            for (wi, comp) in w.iter_mut().zip(components) {
                if comp >= 0.7 {
                    *wi += direction * step;
                } else if comp <= 0.3 {
                    *wi -= direction * step;
                }
            }
        }

        let tuned = ScoreWeights::from_array(normalize_bounded(w));
        self.tuned
            .write()
            .expect("tuned weights lock poisoned")
            .insert(profile.user_id.clone(), tuned);
        debug!(user = %profile.user_id, ?tuned, "recomputed scoring weights");
        Ok(tuned)
    }
}

/// Project onto the bounded simplex: every weight within
/// [WEIGHT_MIN, WEIGHT_MAX], sum 1.0. Iterative clamp-and-redistribute;
/// the feasible region is non-empty for five weights with these bounds.
fn normalize_bounded(mut w: [f32; 5]) -> [f32; 5] {
    for _ in 0..32 {
        for x in w.iter_mut() {
            *x = x.clamp(WEIGHT_MIN, WEIGHT_MAX);
        }
        let sum: f32 = w.iter().sum();
        let diff = 1.0 - sum;
        if diff.abs() < 1e-5 {
            break;
        }
        let movable: Vec<usize> = (0..w.len())
            .filter(|&i| {
                if diff > 0.0 {
                    w[i] < WEIGHT_MAX - 1e-6
                } else {
                    w[i] > WEIGHT_MIN + 1e-6
                }
            })
            .collect();
        if movable.is_empty() {
            break;
        }
        let share = diff / movable.len() as f32;
        for i in movable {
            w[i] += share;
        }
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_bounded_repairs_sum() {
        let w = normalize_bounded([0.5, 0.5, 0.5, 0.5, 0.5]);
        let sum: f32 = w.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);
        for x in w {
            assert!((WEIGHT_MIN..=WEIGHT_MAX).contains(&x));
        }
    }

    #[test]
    fn normalize_bounded_respects_floor() {
        let w = normalize_bounded([0.0, 0.0, 0.0, 0.0, 1.0]);
        let sum: f32 = w.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);
        assert!(w[..4].iter().all(|&x| x >= WEIGHT_MIN - 1e-6));
        assert!(w[4] <= WEIGHT_MAX + 1e-6);
    }

    #[test]
    fn normalize_bounded_keeps_valid_input_unchanged() {
        let input = ScoreWeights::default().as_array();
        let out = normalize_bounded(input);
        for (a, b) in input.iter().zip(out.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn repeated_projection_stays_in_bounds() {
        let mut w = ScoreWeights::default().as_array();
        for i in 0..200 {
            // adversarial nudges
            w[i % 5] += 0.05;
            w[(i + 2) % 5] -= 0.07;
            w = normalize_bounded(w);
            let sum: f32 = w.iter().sum();
            assert!((sum - 1.0).abs() < 1e-3);
            for x in w {
                assert!((WEIGHT_MIN - 1e-6..=WEIGHT_MAX + 1e-6).contains(&x));
            }
        }
    }
}
