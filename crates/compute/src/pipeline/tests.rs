use auditlens_core::{CanonicalField, RawTable, ReviewConfig, Value};

use super::anomaly::Label;
use super::reconcile::FieldTarget;
use super::report::NO_ANOMALIES;
use super::ReviewPipeline;

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn audit_table<S: AsRef<str>>(rows: &[[S; 4]]) -> RawTable {
    RawTable::new(
        vec!["Time".into(), "Operator".into(), "Action".into(), "Details".into()],
        rows.iter()
            .map(|r| r.iter().map(|c| text(c.as_ref())).collect())
            .collect(),
    )
    .unwrap()
}

fn pipeline() -> ReviewPipeline {
    ReviewPipeline::new(ReviewConfig::default()).unwrap()
}

fn mixed_rows() -> Vec<[&'static str; 4]> {
    let mut rows = Vec::new();
    for i in 0..40 {
        rows.push(match i % 4 {
            0 => ["09:00", "alice", "login", "session opened"],
            1 => ["10:30", "bob", "read", "viewed batch record"],
            2 => ["13:15", "carol", "update", "setpoint adjusted"],
            _ => ["16:45", "dave", "logout", "session closed"],
        });
    }
    rows.push(["03:10", "mallory", "override", "interlock override during fault"]);
    rows
}

#[test]
fn rejects_invalid_config() {
    let config = ReviewConfig { contamination: 0.0, ..ReviewConfig::default() };
    assert!(ReviewPipeline::new(config).is_err());
    let config = ReviewConfig { n_estimators: 0, ..ReviewConfig::default() };
    assert!(ReviewPipeline::new(config).is_err());
}

#[test]
fn every_record_gets_a_label() {
    let table = audit_table(&mixed_rows());
    let report = pipeline().run(&table);
    assert_eq!(report.records.len(), table.len());
    assert!(report
        .records
        .iter()
        .all(|r| matches!(r.label, Label::Normal | Label::Anomalous)));
    assert_eq!(report.summary.total_records, table.len());
    assert_eq!(report.summary.anomaly_count, report.anomaly_count());
}

#[test]
fn same_input_same_labels() {
    let table = audit_table(&mixed_rows());
    let a = pipeline().run(&table);
    let b = pipeline().run(&table);
    let labels = |r: &super::ReviewReport| r.records.iter().map(|s| s.label).collect::<Vec<_>>();
    assert_eq!(labels(&a), labels(&b));
    assert_eq!(a.summary.text, b.summary.text);
    assert_ne!(a.run_id, b.run_id);
}

#[test]
fn flagged_records_are_explained() {
    let report = pipeline().run(&audit_table(&mixed_rows()));
    assert!(report.anomaly_count() > 0);
    for anomaly in &report.anomalies {
        assert!(anomaly.scored.is_anomalous());
        assert!(!anomaly.tags.is_empty());
        assert!(!anomaly.reason.is_empty());
    }
    // "Time" matches by name; the other three only through aliases.
    assert_eq!(report.mapping.resolved(CanonicalField::Timestamp), Some("Time"));
    assert_eq!(report.mapping.resolved(CanonicalField::User), Some("Operator"));
    assert_eq!(report.mapping.resolved(CanonicalField::EventType), Some("Action"));
    assert_eq!(report.mapping.resolved(CanonicalField::Message), Some("Details"));
}

#[test]
fn identical_records_have_no_anomalies() {
    let rows = vec![["09:00", "alice", "login", "session opened"]; 30];
    let report = pipeline().run(&audit_table(&rows));
    assert_eq!(report.anomaly_count(), 0);
    assert_eq!(report.summary.text, NO_ANOMALIES);
    assert!(report.anomaly_table.is_empty());
    assert!(report.top_anomalies.is_empty());
    assert_eq!(report.status_line(), "0 anomalies detected out of 30 entries.");
}

#[test]
fn empty_and_single_row_tables() {
    let report = pipeline().run(&audit_table::<&str>(&[]));
    assert!(report.records.is_empty());
    assert_eq!(report.summary.text, NO_ANOMALIES);

    let report = pipeline().run(&audit_table(&[["09:00", "alice", "login", "ok"]]));
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.anomaly_count(), 0);
}

#[test]
fn unmapped_schema_falls_back_to_all_columns() {
    let table = RawTable::new(
        vec!["a".into(), "b".into()],
        vec![vec![text("x1"), text("override")], vec![text("x2"), Value::Null]],
    )
    .unwrap();
    let report = pipeline()
        .with_targets(CanonicalField::ALL.iter().map(|f| FieldTarget::name_only(*f)).collect())
        .run(&table);
    assert!(!report.mapping.has_resolved());
    assert_eq!(report.records[0].record.combined_text, "x1 override");
    assert_eq!(report.records[1].record.combined_text, "x2 ");
    assert_eq!(report.records.len(), 2);
}

#[test]
fn display_outputs_are_capped() {
    // Thirty one-off rows and a block of identical ones: at a 0.5 rate many
    // of the one-off rows fall below the threshold.
    let mut rows: Vec<[String; 4]> = (0..30)
        .map(|i| {
            [
                format!("{:02}:{:02}", i % 24, i),
                format!("user{i}"),
                format!("action{i}"),
                format!("note{i} text{i}"),
            ]
        })
        .collect();
    rows.extend((0..11).map(|_| ["12:00", "alice", "login", "ok"].map(String::from)));
    let config = ReviewConfig { display_limit: 1, contamination: 0.5, ..ReviewConfig::default() };
    let report = ReviewPipeline::new(config).unwrap().run(&audit_table(&rows));
    assert!(report.anomaly_count() > 1);
    assert_eq!(report.anomaly_table.rows.len(), 1);
    assert_eq!(report.top_anomalies.len(), 1);
    assert_eq!(report.summary.entries.len(), report.anomaly_count());
}

#[test]
fn report_serializes() {
    let report = pipeline().run(&audit_table(&mixed_rows()));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["mapping"]["User"], "Operator");
    assert_eq!(json["records"].as_array().unwrap().len(), 41);
    assert!(json["timings"]["score_ms"].is_number());
}
