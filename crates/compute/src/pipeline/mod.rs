//! Review pipeline orchestrator.
//!
//! Runs the six stages over one loaded table, strictly in order:
//!
//! - **reconcile**: column names → canonical fields
//! - **compose**: one text blob and optional hour per record
//! - **features**: TF-IDF matrix over the blobs
//! - **anomaly**: isolation forest labels
//! - **explain**: reason tags for flagged records
//! - **report**: compliance summary, display table, export rows
//!
//! Each stage is pure in its inputs and returns a new value.

pub mod anomaly;
pub mod compose;
pub mod explain;
pub mod features;
pub mod metrics;
pub mod reconcile;
pub mod report;

#[cfg(test)]
mod tests;

use std::time::Instant;

use auditlens_core::{AuditError, FieldMapping, RawTable, ReviewConfig};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use self::anomaly::{ScoredRecord, ScoringParams};
use self::explain::ExplainedAnomaly;
use self::metrics::{Stage, StageTimings};
use self::reconcile::FieldTarget;
use self::report::{AnomalyTable, ComplianceSummary, TopAnomaly};

/// Everything one run produces.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewReport {
    /// Label for this run in logs and serialized output.
    pub run_id: Uuid,
    pub mapping: FieldMapping,
    /// Every record with its label, in table order.
    pub records: Vec<ScoredRecord>,
    /// Flagged records with reasons, in table order.
    pub anomalies: Vec<ExplainedAnomaly>,
    pub anomaly_table: AnomalyTable,
    pub summary: ComplianceSummary,
    pub top_anomalies: Vec<TopAnomaly>,
    pub vocabulary_size: usize,
    /// Decision threshold on the outlier score.
    pub threshold: f64,
    pub timings: StageTimings,
}

impl ReviewReport {
    pub fn anomaly_count(&self) -> usize {
        self.anomalies.len()
    }

    pub fn status_line(&self) -> String {
        self.summary.status_line()
    }
}

/// Batch review pipeline. Holds configuration only; runs share no state.
#[derive(Debug, Clone)]
pub struct ReviewPipeline {
    config: ReviewConfig,
    targets: Vec<FieldTarget>,
}

impl ReviewPipeline {
    /// Build a pipeline with the default canonical targets.
    pub fn new(config: ReviewConfig) -> Result<Self, AuditError> {
        config.validate()?;
        Ok(Self {
            config,
            targets: reconcile::default_targets(),
        })
    }

    /// Replace the reconciliation targets.
    pub fn with_targets(mut self, targets: Vec<FieldTarget>) -> Self {
        self.targets = targets;
        self
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    pub fn run(&self, table: &RawTable) -> ReviewReport {
        let run_id = Uuid::new_v4();
        let start = Instant::now();
        let mut timings = StageTimings::default();
        debug!(%run_id, rows = table.len(), columns = table.columns().len(), "review started");

        let t = Instant::now();
        let mapping = reconcile::reconcile(table.columns(), &self.targets, self.config.match_cutoff);
        timings.record(Stage::Reconcile, t.elapsed());
        debug!(%run_id, resolved = mapping.resolved_count(), "fields reconciled");

        let t = Instant::now();
        let composed = compose::compose(table, &mapping);
        timings.record(Stage::Compose, t.elapsed());

        let t = Instant::now();
        let features = features::extract(&composed.texts(), self.config.max_features);
        timings.record(Stage::Extract, t.elapsed());

        let t = Instant::now();
        let scored = anomaly::score(
            &composed.records,
            &features.matrix,
            &ScoringParams::from(&self.config),
        );
        timings.record(Stage::Score, t.elapsed());

        let t = Instant::now();
        let anomalies = explain::explain_anomalies(&scored.records);
        timings.record(Stage::Explain, t.elapsed());

        let t = Instant::now();
        let summary = report::assemble(&mapping, table.len(), &anomalies);
        let anomaly_table = report::anomaly_table(&mapping, &anomalies, self.config.display_limit);
        let top_anomalies = report::top_anomalies(&anomalies, self.config.display_limit);
        timings.record(Stage::Assemble, t.elapsed());

        info!(
            "Review {} complete: {} anomalies out of {} records ({} terms) in {:?}",
            run_id,
            anomalies.len(),
            table.len(),
            features.vocabulary.len(),
            start.elapsed()
        );

        ReviewReport {
            run_id,
            mapping,
            records: scored.records,
            anomalies,
            anomaly_table,
            summary,
            top_anomalies,
            vocabulary_size: features.vocabulary.len(),
            threshold: scored.threshold,
            timings,
        }
    }
}
