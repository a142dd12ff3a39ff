//! Engine tunables loaded from TOML or JSON.
//!
//! Fuzzy-match thresholds and windows are configuration, not literals:
//! `dedup_threshold` (similarity cutoff for merge), `staleness_days`
//! (inactivity window), `freshness_decay_days` (score decay horizon),
//! plus lookback/candidate windows and feedback calibration knobs.
//!
//! Resolution order mirrors the whitelist loader:
//! 1) $JOBFEED_CONFIG_PATH
//! 2) config/jobfeed.toml
//! 3) config/jobfeed.json
//! 4) built-in defaults

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

const ENV_PATH: &str = "JOBFEED_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Composite similarity a candidate must exceed to merge.
    #[serde(default = "default_dedup_threshold")]
    pub dedup_threshold: f32,
    /// Fuzzy-candidate window: only jobs last seen within this many days
    /// are compared.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    /// A job unreported for this long is marked inactive by the sweep.
    #[serde(default = "default_staleness_days")]
    pub staleness_days: i64,
    /// Freshness score decays linearly to zero over this horizon.
    #[serde(default = "default_freshness_decay_days")]
    pub freshness_decay_days: i64,
    /// Recommendation candidate window (last-seen bound for queries).
    #[serde(default = "default_candidate_window_days")]
    pub candidate_window_days: i64,
    /// EMA smoothing factor for per-source engagement.
    #[serde(default = "default_engagement_alpha")]
    pub engagement_alpha: f32,
    /// Scrape lag at or beyond this many hours scores zero freshness
    /// in SourceMetrics.
    #[serde(default = "default_freshness_horizon_hours")]
    pub freshness_horizon_hours: f32,
    /// Per-event weight nudge applied by RecomputeWeights.
    #[serde(default = "default_weight_learning_rate")]
    pub weight_learning_rate: f32,
    /// Below this many feedback events, RecomputeWeights keeps defaults.
    #[serde(default = "default_min_feedback_events")]
    pub min_feedback_events: usize,
    /// Declared locale currency per source, used when a salary range
    /// carries no currency signal of its own.
    #[serde(default)]
    pub source_currencies: HashMap<String, String>,
}

fn default_dedup_threshold() -> f32 {
    0.78
}
fn default_lookback_days() -> i64 {
    14
}
fn default_staleness_days() -> i64 {
    21
}
fn default_freshness_decay_days() -> i64 {
    21
}
fn default_candidate_window_days() -> i64 {
    30
}
fn default_engagement_alpha() -> f32 {
    0.2
}
fn default_freshness_horizon_hours() -> f32 {
    48.0
}
fn default_weight_learning_rate() -> f32 {
    0.01
}
fn default_min_feedback_events() -> usize {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dedup_threshold: default_dedup_threshold(),
            lookback_days: default_lookback_days(),
            staleness_days: default_staleness_days(),
            freshness_decay_days: default_freshness_decay_days(),
            candidate_window_days: default_candidate_window_days(),
            engagement_alpha: default_engagement_alpha(),
            freshness_horizon_hours: default_freshness_horizon_hours(),
            weight_learning_rate: default_weight_learning_rate(),
            min_feedback_events: default_min_feedback_events(),
            source_currencies: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Load from an explicit path. Supports TOML or JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, &ext)
            .with_context(|| format!("parsing engine config {}", path.display()))?;
        cfg.validated()
    }

    /// Load using env var + fallbacks, defaulting when nothing is found.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("JOBFEED_CONFIG_PATH points to non-existent path"));
        }
        let toml_p = PathBuf::from("config/jobfeed.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/jobfeed.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }

    /// Clamp ratios into sane ranges and reject nonsensical windows.
    fn validated(mut self) -> Result<Self> {
        self.dedup_threshold = self.dedup_threshold.clamp(0.0, 1.0);
        self.engagement_alpha = self.engagement_alpha.clamp(0.0, 1.0);
        self.weight_learning_rate = self.weight_learning_rate.clamp(0.0, 0.1);
        for d in [
            self.lookback_days,
            self.staleness_days,
            self.freshness_decay_days,
            self.candidate_window_days,
        ] {
            if d <= 0 {
                return Err(anyhow!("window days must be positive, got {d}"));
            }
        }
        if self.freshness_horizon_hours <= 0.0 {
            return Err(anyhow!("freshness_horizon_hours must be positive"));
        }
        Ok(self)
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<EngineConfig> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains('=');
    if try_toml {
        if let Ok(cfg) = toml::from_str::<EngineConfig>(s) {
            return Ok(cfg);
        }
    }
    if let Ok(cfg) = serde_json::from_str::<EngineConfig>(s) {
        return Ok(cfg);
    }
    if !try_toml {
        if let Ok(cfg) = toml::from_str::<EngineConfig>(s) {
            return Ok(cfg);
        }
    }
    Err(anyhow!("config is neither valid TOML nor JSON"))
}
