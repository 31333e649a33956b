//! Anomaly scoring: isolation forest over the batch's feature matrix.
//!
//! The forest is fit and evaluated on the same batch. The decision
//! threshold is the `100 * contamination` percentile of the batch's scores
//! and a record is anomalous only when its score is strictly below it, so
//! a batch of identical records never produces an anomaly.

use auditlens_core::ReviewConfig;
use serde::Serialize;
use tracing::debug;

use super::compose::EnrichedRecord;
use super::features::FeatureMatrix;
use crate::algorithms::IsolationForest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Normal,
    Anomalous,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringParams {
    /// Expected anomalous fraction of the batch.
    pub contamination: f64,
    pub n_estimators: usize,
    pub seed: u64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self::from(&ReviewConfig::default())
    }
}

impl From<&ReviewConfig> for ScoringParams {
    fn from(config: &ReviewConfig) -> Self {
        Self {
            contamination: config.contamination,
            n_estimators: config.n_estimators,
            seed: config.random_seed,
        }
    }
}

/// An enriched record with its label and outlier score (lower = more anomalous).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    pub record: EnrichedRecord,
    pub label: Label,
    pub score: f64,
}

impl ScoredRecord {
    pub fn is_anomalous(&self) -> bool {
        self.label == Label::Anomalous
    }
}

/// Scored records aligned 1:1 with the input rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoredBatch {
    pub records: Vec<ScoredRecord>,
    /// Scores strictly below this value are anomalous.
    pub threshold: f64,
}

impl ScoredBatch {
    pub fn anomaly_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_anomalous()).count()
    }

    pub fn labels(&self) -> Vec<Label> {
        self.records.iter().map(|r| r.label).collect()
    }
}

/// Fit the forest on `matrix` and label every row.
///
/// `records` and `matrix` must describe the same rows in the same order.
pub fn score(records: &[EnrichedRecord], matrix: &FeatureMatrix, params: &ScoringParams) -> ScoredBatch {
    debug_assert_eq!(records.len(), matrix.n_rows());
    if records.is_empty() {
        return ScoredBatch::default();
    }

    let forest = IsolationForest::fit(matrix, params.n_estimators, params.seed);
    let scores = forest.score_samples(matrix);
    let threshold = percentile(&scores, 100.0 * params.contamination);

    let records: Vec<ScoredRecord> = records
        .iter()
        .zip(scores)
        .map(|(record, score)| ScoredRecord {
            record: record.clone(),
            label: if score < threshold { Label::Anomalous } else { Label::Normal },
            score,
        })
        .collect();

    let batch = ScoredBatch { records, threshold };
    debug!(
        rows = batch.records.len(),
        anomalies = batch.anomaly_count(),
        threshold,
        "isolation forest scored batch"
    );
    batch
}

/// Percentile `q` (0-100) of `values` with linear interpolation between
/// the closest ranks. Returns 0 for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::features::extract;
    use std::collections::BTreeMap;

    fn records(texts: &[String]) -> Vec<EnrichedRecord> {
        texts
            .iter()
            .enumerate()
            .map(|(index, t)| EnrichedRecord {
                index,
                canonical: BTreeMap::new(),
                combined_text: t.clone(),
                hour: None,
            })
            .collect()
    }

    fn run(texts: &[String], params: &ScoringParams) -> ScoredBatch {
        let matrix = extract(texts, 500).matrix;
        score(&records(texts), &matrix, params)
    }

    #[test]
    fn percentile_interpolates() {
        let vals = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&vals, 0.0), 1.0);
        assert_eq!(percentile(&vals, 100.0), 4.0);
        assert_eq!(percentile(&vals, 50.0), 2.5);
        assert!((percentile(&vals, 5.0) - 1.15).abs() < 1e-12);
        assert_eq!(percentile(&[7.0], 5.0), 7.0);
        assert_eq!(percentile(&[], 5.0), 0.0);
    }

    #[test]
    fn flags_the_single_outlier() {
        let mut texts = vec!["valve fault emergency shutdown".to_string()];
        texts.extend((0..19).map(|_| "routine inspection complete".to_string()));
        let batch = run(&texts, &ScoringParams::default());
        assert_eq!(batch.records.len(), 20);
        assert_eq!(batch.anomaly_count(), 1);
        assert!(batch.records[0].is_anomalous());
        assert_eq!(batch.records[0].record.index, 0);
    }

    #[test]
    fn identical_rows_are_all_normal() {
        let texts: Vec<String> = (0..25).map(|_| "same entry".to_string()).collect();
        let batch = run(&texts, &ScoringParams::default());
        assert_eq!(batch.records.len(), 25);
        assert_eq!(batch.anomaly_count(), 0);
    }

    #[test]
    fn degenerate_batches_label_every_row() {
        let batch = run(&[], &ScoringParams::default());
        assert!(batch.records.is_empty());

        let batch = run(&["only one".to_string()], &ScoringParams::default());
        assert_eq!(batch.labels(), vec![Label::Normal]);

        // Nothing tokenizes: zero-column matrix.
        let texts: Vec<String> = vec!["-".into(), "a".into(), "".into()];
        let batch = run(&texts, &ScoringParams::default());
        assert_eq!(batch.labels(), vec![Label::Normal; 3]);
    }

    #[test]
    fn labels_are_reproducible_for_a_seed() {
        let texts: Vec<String> = (0..60)
            .map(|i| format!("op{} event{} zone{}", i % 5, i % 11, i % 4))
            .collect();
        let params = ScoringParams { contamination: 0.1, n_estimators: 40, seed: 9 };
        let a = run(&texts, &params);
        let b = run(&texts, &params);
        assert_eq!(a.labels(), b.labels());
        assert_eq!(a.threshold, b.threshold);
        assert_eq!(a.records.len(), texts.len());
    }

    #[test]
    fn params_follow_config() {
        let config = ReviewConfig {
            contamination: 0.2,
            n_estimators: 7,
            random_seed: 3,
            ..ReviewConfig::default()
        };
        let params = ScoringParams::from(&config);
        assert_eq!(params, ScoringParams { contamination: 0.2, n_estimators: 7, seed: 3 });
        assert_eq!(ScoringParams::default().n_estimators, 100);
    }
}
