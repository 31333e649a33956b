use std::env;

use serde::{Deserialize, Serialize};

use crate::error::AuditError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

pub const DEFAULT_MAX_FEATURES: usize = 500;
pub const DEFAULT_CONTAMINATION: f64 = 0.05;
pub const DEFAULT_N_ESTIMATORS: usize = 100;
pub const DEFAULT_RANDOM_SEED: u64 = 42;
pub const DEFAULT_MATCH_CUTOFF: f64 = 0.6;
pub const DEFAULT_DISPLAY_LIMIT: usize = 10;

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled key: tries `{PROFILE}_{KEY}` first, falls back to `{KEY}`.
fn profiled_opt<F>(lookup: &F, profile: &str, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = lookup(&prefixed) {
            return Some(v);
        }
    }
    lookup(key)
}

fn profiled_parse<F, T>(lookup: &F, profile: &str, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    profiled_opt(lookup, profile, key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Tunables for one review run.
///
/// Defaults reproduce the fixed constants of the batch pipeline; every
/// value can be overridden from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    /// Maximum number of term columns in the feature matrix.
    pub max_features: usize,
    /// Expected anomalous fraction; sets the decision threshold.
    pub contamination: f64,
    /// Number of isolation trees.
    pub n_estimators: usize,
    /// Seed for tree subsampling and splits.
    pub random_seed: u64,
    /// Minimum similarity ratio for a column to match a canonical field.
    pub match_cutoff: f64,
    /// Rows kept in the anomaly display table and export list.
    pub display_limit: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            profile: String::new(),
            max_features: DEFAULT_MAX_FEATURES,
            contamination: DEFAULT_CONTAMINATION,
            n_estimators: DEFAULT_N_ESTIMATORS,
            random_seed: DEFAULT_RANDOM_SEED,
            match_cutoff: DEFAULT_MATCH_CUTOFF,
            display_limit: DEFAULT_DISPLAY_LIMIT,
        }
    }
}

impl ReviewConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `AUDITLENS_PROFILE`. When set (e.g. `STRICT`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_opt("AUDITLENS_PROFILE").unwrap_or_default();
        Self::from_lookup(&profile, env_opt)
    }

    /// Build config from an arbitrary key lookup. Unparseable values fall
    /// back to their defaults.
    pub fn from_lookup<F>(profile: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let d = Self::default();
        Self {
            profile: p.to_string(),
            max_features: profiled_parse(&lookup, p, "AUDITLENS_MAX_FEATURES", d.max_features),
            contamination: profiled_parse(&lookup, p, "AUDITLENS_CONTAMINATION", d.contamination),
            n_estimators: profiled_parse(&lookup, p, "AUDITLENS_N_ESTIMATORS", d.n_estimators),
            random_seed: profiled_parse(&lookup, p, "AUDITLENS_RANDOM_SEED", d.random_seed),
            match_cutoff: profiled_parse(&lookup, p, "AUDITLENS_MATCH_CUTOFF", d.match_cutoff),
            display_limit: profiled_parse(&lookup, p, "AUDITLENS_DISPLAY_LIMIT", d.display_limit),
        }
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), AuditError> {
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(AuditError::Config(format!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            )));
        }
        if self.n_estimators == 0 {
            return Err(AuditError::Config("n_estimators must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.match_cutoff) {
            return Err(AuditError::Config(format!(
                "match_cutoff must be in [0, 1], got {}",
                self.match_cutoff
            )));
        }
        Ok(())
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  features:    max={}", self.max_features);
        tracing::info!(
            "  forest:      estimators={}, contamination={}, seed={}",
            self.n_estimators,
            self.contamination,
            self.random_seed
        );
        tracing::info!("  reconcile:   cutoff={}", self.match_cutoff);
        tracing::info!("  display:     limit={}", self.display_limit);
    }
}
