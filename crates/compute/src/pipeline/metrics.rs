use std::time::Duration;

use serde::Serialize;

/// Wall-clock time spent in each stage of one review run, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageTimings {
    pub reconcile_ms: f64,
    pub compose_ms: f64,
    pub extract_ms: f64,
    pub score_ms: f64,
    pub explain_ms: f64,
    pub assemble_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reconcile,
    Compose,
    Extract,
    Score,
    Explain,
    Assemble,
}

impl StageTimings {
    pub fn record(&mut self, stage: Stage, elapsed: Duration) {
        let ms = elapsed.as_nanos() as f64 / 1_000_000.0;
        let slot = match stage {
            Stage::Reconcile => &mut self.reconcile_ms,
            Stage::Compose => &mut self.compose_ms,
            Stage::Extract => &mut self.extract_ms,
            Stage::Score => &mut self.score_ms,
            Stage::Explain => &mut self.explain_ms,
            Stage::Assemble => &mut self.assemble_ms,
        };
        *slot += ms;
    }

    pub fn total_ms(&self) -> f64 {
        self.reconcile_ms
            + self.compose_ms
            + self.extract_ms
            + self.score_ms
            + self.explain_ms
            + self.assemble_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_per_stage() {
        let mut timings = StageTimings::default();
        timings.record(Stage::Score, Duration::from_millis(40));
        timings.record(Stage::Score, Duration::from_millis(10));
        timings.record(Stage::Compose, Duration::from_micros(500));
        assert_eq!(timings.score_ms, 50.0);
        assert_eq!(timings.compose_ms, 0.5);
        assert_eq!(timings.total_ms(), 50.5);
    }
}
