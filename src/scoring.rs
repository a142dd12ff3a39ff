//! # Matching & Scoring Engine
//! Pure, deterministic scoring of one canonical job against one user
//! profile. No hidden state, no I/O: the same inputs always produce the
//! same output, so the function is independently testable and the read
//! path parallelizes freely.
//!
//! Each component is normalized to [0,1] before weighting. Missing
//! optional data never throws; it substitutes the neutral defaults
//! given below. There is exactly one scoring path: behavior is extended
//! via the `weights` parameter, never via parallel specialized scorers.

use serde::{Deserialize, Serialize};

use chrono::{DateTime, Utc};

use crate::model::{CanonicalJob, ScoreBreakdown, ScoredRecommendation, UserProfile};
use crate::normalize::fold;

/// Relative importance of the score components. Always kept normalized
/// to sum 1.0; per-user tuned values come from the Feedback Processor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub skill: f32,
    pub location: f32,
    pub salary: f32,
    pub source_quality: f32,
    pub freshness: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            skill: 0.35,
            location: 0.25,
            salary: 0.15,
            source_quality: 0.10,
            freshness: 0.15,
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f32 {
        self.skill + self.location + self.salary + self.source_quality + self.freshness
    }

    pub fn as_array(&self) -> [f32; 5] {
        [
            self.skill,
            self.location,
            self.salary,
            self.source_quality,
            self.freshness,
        ]
    }

    pub fn from_array(a: [f32; 5]) -> Self {
        Self {
            skill: a[0],
            location: a[1],
            salary: a[2],
            source_quality: a[3],
            freshness: a[4],
        }
    }
}

/// Skill match: matched tags over the job's tag count. Jobs with no
/// listed stack get a neutral 0.5 rather than 0, so sparse postings are
/// not unfairly buried.
fn skill_component(job: &CanonicalJob, profile: &UserProfile) -> f32 {
    if job.tech_stack.is_empty() {
        return 0.5;
    }
    let user: std::collections::BTreeSet<String> = profile.skills.iter().map(|s| fold(s)).collect();
    let matched = job
        .tech_stack
        .iter()
        .filter(|t| user.contains(&fold(t)))
        .count() as f32;
    matched / job.tech_stack.len().max(1) as f32
}

/// Location: 1.0 for remote-accepted or exact city, 0.6 same region,
/// else 0.
fn location_component(job: &CanonicalJob, profile: &UserProfile) -> f32 {
    if job.location.remote && profile.remote_ok {
        return 1.0;
    }
    if let Some(city) = &job.location.city {
        if profile.desired_cities.iter().any(|c| fold(c) == *city) {
            return 1.0;
        }
    }
    if let Some(region) = &job.location.region {
        if profile.desired_regions.iter().any(|r| fold(r) == *region) {
            return 0.6;
        }
    }
    0.0
}

/// Salary: 1.0 when the range covers or exceeds the floor, linear
/// partial credit on overlap, neutral 0.5 when the job is silent,
/// 0 when the job's ceiling sits strictly below the floor.
fn salary_component(job: &CanonicalJob, profile: &UserProfile) -> f32 {
    let Some(range) = &job.salary else {
        return 0.5;
    };
    let Some(floor) = profile.salary_floor else {
        return 1.0;
    };
    let (Some(lo), Some(hi)) = (range.floor(), range.ceiling()) else {
        return 0.5;
    };
    if lo >= floor {
        return 1.0;
    }
    if hi < floor {
        return 0.0;
    }
    // floor sits inside [lo, hi]: credit the covered fraction
    if hi == lo {
        return 1.0;
    }
    ((hi - floor) as f32 / (hi - lo) as f32).clamp(0.0, 1.0)
}

/// Linear decay from 1.0 (reported today) to 0.0 at the decay horizon.
fn freshness_component(job: &CanonicalJob, now: DateTime<Utc>, decay_days: i64) -> f32 {
    let age_secs = (now - job.last_seen).num_seconds().max(0) as f32;
    let horizon_secs = (decay_days.max(1) as f32) * 86_400.0;
    (1.0 - age_secs / horizon_secs).clamp(0.0, 1.0)
}

/// Score one job. `source_quality` is the quality score of the
/// best-performing contributing source, already adjusted for the user's
/// source priority; the caller resolves it from SourceMetrics.
pub fn score(
    job: &CanonicalJob,
    profile: &UserProfile,
    weights: &ScoreWeights,
    source_quality: f32,
    now: DateTime<Utc>,
    freshness_decay_days: i64,
) -> ScoredRecommendation {
    let breakdown = ScoreBreakdown {
        skill: skill_component(job, profile),
        location: location_component(job, profile),
        salary: salary_component(job, profile),
        source_quality: source_quality.clamp(0.0, 1.0),
        freshness: freshness_component(job, now, freshness_decay_days),
    };

    let raw = breakdown.skill * weights.skill
        + breakdown.location * weights.location
        + breakdown.salary * weights.salary
        + breakdown.source_quality * weights.source_quality
        + breakdown.freshness * weights.freshness;
    // weights are maintained at sum 1.0; normalize defensively anyway
    let denom = weights.sum().max(1e-6);

    ScoredRecommendation {
        job_id: job.id,
        score: (raw / denom).clamp(0.0, 1.0),
        breakdown,
        rank: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JobId, Location, SalaryRange};
    use std::collections::BTreeSet;

    fn job(stack: &[&str], salary: Option<(u64, u64)>, remote: bool) -> CanonicalJob {
        CanonicalJob {
            id: JobId(1),
            title: "Backend Engineer".into(),
            company: "Acme".into(),
            company_key: "acme".into(),
            location: Location {
                remote,
                ..Default::default()
            },
            tech_stack: stack.iter().map(|s| s.to_string()).collect(),
            salary: salary.map(|(lo, hi)| SalaryRange {
                min: Some(lo),
                max: Some(hi),
                currency: "USD".into(),
            }),
            description: String::new(),
            fingerprint: String::new(),
            postings: BTreeSet::new(),
            first_seen: Utc::now(),
            last_seen: Utc::now(),
            active: true,
        }
    }

    fn profile(skills: &[&str], floor: Option<u64>, remote_ok: bool) -> UserProfile {
        UserProfile {
            user_id: "u1".into(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            salary_floor: floor,
            remote_ok,
            ..Default::default()
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let j = job(&["go", "kubernetes"], Some((90_000, 130_000)), true);
        let p = profile(&["go"], Some(100_000), true);
        let now = Utc::now();
        let w = ScoreWeights::default();
        let a = score(&j, &p, &w, 0.8, now, 21);
        let b = score(&j, &p, &w, 0.8, now, 21);
        assert_eq!(a.score, b.score);
        assert_eq!(a.breakdown, b.breakdown);
    }

    #[test]
    fn scenario_b_components() {
        // skills=["Go"], floor=100k vs stack=["Go","Kubernetes"], 90k-130k
        let j = job(&["go", "kubernetes"], Some((90_000, 130_000)), true);
        let p = profile(&["Go"], Some(100_000), true);
        let s = score(&j, &p, &ScoreWeights::default(), 0.5, Utc::now(), 21);
        assert!((s.breakdown.skill - 0.5).abs() < 1e-6); // 1 of 2 tags
        assert!(s.breakdown.salary > 0.0 && s.breakdown.salary < 1.0); // overlap
        assert!((s.breakdown.salary - 0.75).abs() < 1e-6); // (130-100)/(130-90)
    }

    #[test]
    fn empty_tech_stack_scores_neutral() {
        let j = job(&[], None, true);
        let p = profile(&["go"], None, true);
        let s = score(&j, &p, &ScoreWeights::default(), 0.5, Utc::now(), 21);
        assert!((s.breakdown.skill - 0.5).abs() < 1e-6);
        assert!((s.breakdown.salary - 0.5).abs() < 1e-6); // unknown salary neutral
    }

    #[test]
    fn salary_below_floor_scores_zero() {
        let j = job(&[], Some((50_000, 80_000)), true);
        let p = profile(&[], Some(100_000), true);
        let s = score(&j, &p, &ScoreWeights::default(), 0.5, Utc::now(), 21);
        assert_eq!(s.breakdown.salary, 0.0);
    }

    #[test]
    fn salary_covering_floor_scores_full() {
        let j = job(&[], Some((110_000, 150_000)), true);
        let p = profile(&[], Some(100_000), true);
        let s = score(&j, &p, &ScoreWeights::default(), 0.5, Utc::now(), 21);
        assert_eq!(s.breakdown.salary, 1.0);
    }

    #[test]
    fn location_tiers() {
        let mut j = job(&[], None, false);
        j.location.city = Some("berlin".into());
        j.location.region = Some("berlin".into());

        let mut p = profile(&[], None, false);
        p.desired_cities = vec!["Berlin".into()];
        let s = score(&j, &p, &ScoreWeights::default(), 0.5, Utc::now(), 21);
        assert_eq!(s.breakdown.location, 1.0);

        let mut p2 = profile(&[], None, false);
        p2.desired_regions = vec!["berlin".into()];
        let s2 = score(&j, &p2, &ScoreWeights::default(), 0.5, Utc::now(), 21);
        assert!((s2.breakdown.location - 0.6).abs() < 1e-6);

        let p3 = profile(&[], None, false);
        let s3 = score(&j, &p3, &ScoreWeights::default(), 0.5, Utc::now(), 21);
        assert_eq!(s3.breakdown.location, 0.0);
    }

    #[test]
    fn remote_requires_user_acceptance() {
        let j = job(&[], None, true);
        let yes = profile(&[], None, true);
        let no = profile(&[], None, false);
        let w = ScoreWeights::default();
        assert_eq!(score(&j, &yes, &w, 0.5, Utc::now(), 21).breakdown.location, 1.0);
        assert_eq!(score(&j, &no, &w, 0.5, Utc::now(), 21).breakdown.location, 0.0);
    }

    #[test]
    fn freshness_decays_linearly_to_zero() {
        let now = Utc::now();
        let mut j = job(&[], None, true);
        let p = profile(&[], None, true);
        let w = ScoreWeights::default();

        j.last_seen = now;
        assert!((score(&j, &p, &w, 0.5, now, 21).breakdown.freshness - 1.0).abs() < 1e-3);

        j.last_seen = now - chrono::Duration::days(21);
        assert!(score(&j, &p, &w, 0.5, now, 21).breakdown.freshness < 1e-3);

        j.last_seen = now - chrono::Duration::days(40);
        assert_eq!(score(&j, &p, &w, 0.5, now, 21).breakdown.freshness, 0.0);
    }

    #[test]
    fn final_score_is_unit_bounded_weighted_sum() {
        let j = job(&["go"], Some((120_000, 160_000)), true);
        let p = profile(&["go"], Some(100_000), true);
        let now = Utc::now();
        let s = score(&j, &p, &ScoreWeights::default(), 1.0, now, 21);
        assert!(s.score > 0.9 && s.score <= 1.0);
    }
}
