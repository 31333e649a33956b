//! TF-IDF feature extraction.
//!
//! The vocabulary is learned from the batch itself. Each row holds raw
//! term counts weighted by smoothed inverse document frequency
//! `ln((1 + n) / (1 + df)) + 1` and is then L2-normalized.

mod matrix;
mod tokenize;

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

pub use matrix::FeatureMatrix;
pub use tokenize::tokenize;

/// The extracted matrix together with its column labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureSet {
    pub matrix: FeatureMatrix,
    /// Term for each matrix column, in column order (lexicographic).
    pub vocabulary: Vec<String>,
}

#[derive(Default)]
struct TermStats {
    doc_freq: usize,
    total: usize,
}

/// Build a TF-IDF matrix with at most `max_features` columns.
///
/// When the batch has more distinct terms than that, terms are ranked by
/// document frequency, then total count (both descending), then the term
/// itself, and only the top `max_features` are kept.
pub fn extract<S: AsRef<str>>(texts: &[S], max_features: usize) -> FeatureSet {
    let n_docs = texts.len();
    let doc_counts: Vec<HashMap<String, usize>> = texts
        .iter()
        .map(|t| {
            let mut counts = HashMap::new();
            for term in tokenize(t.as_ref()) {
                *counts.entry(term).or_insert(0) += 1;
            }
            counts
        })
        .collect();

    let mut stats: HashMap<&str, TermStats> = HashMap::new();
    for counts in &doc_counts {
        for (term, count) in counts {
            let entry = stats.entry(term.as_str()).or_default();
            entry.doc_freq += 1;
            entry.total += count;
        }
    }

    let distinct = stats.len();
    let mut ranked: Vec<(&str, TermStats)> = stats.into_iter().collect();
    if ranked.len() > max_features {
        ranked.sort_by(|(a, sa), (b, sb)| {
            (Reverse(sa.doc_freq), Reverse(sa.total), *a).cmp(&(Reverse(sb.doc_freq), Reverse(sb.total), *b))
        });
        ranked.truncate(max_features);
    }
    ranked.sort_by(|(a, _), (b, _)| a.cmp(b));

    let columns: HashMap<&str, usize> = ranked
        .iter()
        .enumerate()
        .map(|(col, (term, _))| (*term, col))
        .collect();
    let idf: Vec<f64> = ranked
        .iter()
        .map(|(_, s)| ((1.0 + n_docs as f64) / (1.0 + s.doc_freq as f64)).ln() + 1.0)
        .collect();

    let rows: Vec<Vec<(usize, f64)>> = doc_counts
        .iter()
        .map(|counts| {
            let mut row: Vec<(usize, f64)> = counts
                .iter()
                .filter_map(|(term, count)| {
                    columns
                        .get(term.as_str())
                        .map(|&col| (col, *count as f64 * idf[col]))
                })
                .collect();
            row.sort_by_key(|(col, _)| *col);
            let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.iter_mut().for_each(|(_, v)| *v /= norm);
            }
            row
        })
        .collect();

    let vocabulary: Vec<String> = ranked.iter().map(|(term, _)| term.to_string()).collect();
    debug!(
        documents = n_docs,
        distinct_terms = distinct,
        kept_terms = vocabulary.len(),
        "tf-idf vocabulary built"
    );

    FeatureSet {
        matrix: FeatureMatrix::from_rows(rows, vocabulary.len()),
        vocabulary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn vocabulary_is_lexicographic() {
        let set = extract(&["zeta alpha", "mid alpha"], 500);
        assert_eq!(set.vocabulary, vec!["alpha", "mid", "zeta"]);
        assert_eq!(set.matrix.n_cols(), 3);
        assert_eq!(set.matrix.n_rows(), 2);
    }

    #[test]
    fn idf_weights_and_normalization() {
        let set = extract(&["aa bb", "aa"], 500);
        // n = 2; idf(aa) = ln(3/3) + 1 = 1, idf(bb) = ln(3/2) + 1.
        let idf_bb = (3.0f64 / 2.0).ln() + 1.0;
        let norm = (1.0 + idf_bb * idf_bb).sqrt();
        assert!(close(set.matrix.get(0, 0), 1.0 / norm));
        assert!(close(set.matrix.get(0, 1), idf_bb / norm));
        assert!(close(set.matrix.get(1, 0), 1.0));
        assert_eq!(set.matrix.get(1, 1), 0.0);
    }

    #[test]
    fn raw_counts_feed_the_weight() {
        let set = extract(&["aa aa bb"], 500);
        // Single record: every idf is 1, so weights are counts / norm.
        let norm = 5.0f64.sqrt();
        assert!(close(set.matrix.get(0, 0), 2.0 / norm));
        assert!(close(set.matrix.get(0, 1), 1.0 / norm));
    }

    #[test]
    fn rows_are_unit_length_or_zero() {
        let set = extract(&["valve open pump", "", "a", "pump pump pump"], 500);
        for i in 0..set.matrix.n_rows() {
            let norm = set.matrix.row_norm(i);
            assert!(close(norm, 1.0) || norm == 0.0, "row {i} norm {norm}");
        }
        assert_eq!(set.matrix.row_norm(1), 0.0);
        assert_eq!(set.matrix.row_norm(2), 0.0);
    }

    #[test]
    fn cap_keeps_most_frequent_terms() {
        let set = extract(&["aa bb cc dd", "aa bb cc", "aa bb", "aa"], 2);
        assert_eq!(set.vocabulary, vec!["aa", "bb"]);
    }

    #[test]
    fn cap_ties_break_on_total_count_then_term() {
        // All df = 1. "zz" has the highest total; "bb" beats "cc" alphabetically.
        let set = extract(&["zz zz cc bb"], 2);
        assert_eq!(set.vocabulary, vec!["bb", "zz"]);
    }

    #[test]
    fn more_than_five_hundred_terms_are_capped() {
        let texts: Vec<String> = (0..60)
            .map(|d| (0..10).map(|t| format!("term{}", d * 10 + t)).collect::<Vec<_>>().join(" "))
            .collect();
        let set = extract(&texts, 500);
        assert_eq!(set.vocabulary.len(), 500);
        assert_eq!(set.matrix.n_cols(), 500);
        assert_eq!(set.matrix.n_rows(), 60);
    }

    #[test]
    fn degenerate_batches_still_produce_a_matrix() {
        let empty: [&str; 0] = [];
        let set = extract(&empty, 500);
        assert_eq!(set.matrix.n_rows(), 0);
        assert_eq!(set.matrix.n_cols(), 0);

        let set = extract(&["", "- a -"], 500);
        assert_eq!(set.matrix.n_rows(), 2);
        assert_eq!(set.matrix.n_cols(), 0);
        assert!(set.vocabulary.is_empty());

        let set = extract(&["single record"], 500);
        assert_eq!(set.matrix.n_rows(), 1);
        assert_eq!(set.matrix.n_cols(), 2);
    }

    #[test]
    fn zero_cap_yields_zero_columns() {
        let set = extract(&["aa bb"], 0);
        assert_eq!(set.matrix.n_cols(), 0);
        assert_eq!(set.matrix.n_rows(), 1);
    }
}
