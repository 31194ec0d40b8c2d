//! End-to-end scenarios: raw catalog listings in, drift reports out.

use schema_drift_core::{
    Attribute, AttributeValue, FieldDescriptor, ObjectSnapshot, SnapshotBuilder, detect_drift,
};

// =============================================================================
// Catalog listings, as tuples in catalog order
// =============================================================================

type Row = (String, String, i64, Option<i64>, Option<i64>, Option<bool>);

fn row(
    name: &str,
    data_type: &str,
    length: i64,
    precision: Option<i64>,
    scale: Option<i64>,
    nullable: Option<bool>,
) -> Row {
    (
        name.to_string(),
        data_type.to_string(),
        length,
        precision,
        scale,
        nullable,
    )
}

fn snapshot(rows: Vec<Row>) -> ObjectSnapshot {
    ObjectSnapshot::build(rows.into_iter().map(FieldDescriptor::from))
}

fn id_row(length: i64) -> Row {
    row("ID", "NUMBER", length, Some(0), Some(-127), Some(false))
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn added_and_removed_columns() {
    let source = snapshot(vec![
        id_row(22),
        row("NAME", "VARCHAR2", 50, None, None, Some(true)),
    ]);
    let target = snapshot(vec![
        id_row(22),
        row("EMAIL", "VARCHAR2", 100, None, None, Some(true)),
    ]);

    let report = detect_drift(&source, &target);

    assert_eq!(report.new_count(), 1);
    assert_eq!(report.new[0].name, "NAME");
    assert_eq!(report.new[0].length, 50);

    assert_eq!(report.deleted_count(), 1);
    assert_eq!(report.deleted[0].name, "EMAIL");
    assert_eq!(report.deleted[0].length, 100);

    assert_eq!(report.changed_count(), 0);
}

#[test]
fn length_shrunk_on_target() {
    let report = detect_drift(&snapshot(vec![id_row(22)]), &snapshot(vec![id_row(10)]));

    assert!(report.new.is_empty());
    assert!(report.deleted.is_empty());

    let changed = report.changed_field("ID").expect("ID should be changed");
    assert_eq!(changed.diffs.len(), 1);
    assert_eq!(changed.diffs[0].attribute, Attribute::Length);
    assert_eq!(changed.diffs[0].target, AttributeValue::Integer(10));
    assert_eq!(changed.diffs[0].source, AttributeValue::Integer(22));
}

#[test]
fn objects_without_fields() {
    let report = detect_drift(&snapshot(vec![]), &snapshot(vec![]));
    assert!(report.is_empty());
}

#[test]
fn object_emptied_on_target_reports_everything_new() {
    let source = snapshot(vec![
        id_row(22),
        row("NAME", "VARCHAR2", 50, None, None, Some(true)),
    ]);
    let report = detect_drift(&source, &snapshot(vec![]));
    assert_eq!(report.new_count(), 2);
    assert!(report.deleted.is_empty());
}

#[test]
fn precision_lost_on_target() {
    let source = snapshot(vec![row("PRICE", "NUMBER", 22, Some(10), Some(2), Some(true))]);
    let target = snapshot(vec![row("PRICE", "NUMBER", 22, None, Some(2), Some(true))]);

    let report = detect_drift(&source, &target);
    let changed = report.changed_field("PRICE").unwrap();
    assert_eq!(changed.diffs.len(), 1);

    let diff = changed.diff(Attribute::Precision).unwrap();
    assert!(diff.target.is_absent());
    assert_eq!(diff.source, AttributeValue::Integer(10));
}

#[test]
fn nullable_flag_unknown_vs_known() {
    let source = snapshot(vec![row("NOTE", "CLOB", 4000, None, None, None)]);
    let target = snapshot(vec![row("NOTE", "CLOB", 4000, None, None, Some(true))]);

    let report = detect_drift(&source, &target);
    let diff = report.changed[0].diff(Attribute::Nullable).unwrap();
    assert_eq!(diff.target, AttributeValue::Flag(true));
    assert_eq!(diff.source, AttributeValue::Absent);
}

#[test]
fn duplicate_listing_rows_resolve_to_last() {
    let mut builder = SnapshotBuilder::new();
    builder.extend(
        vec![
            row("F", "NUMBER", 1, None, None, None),
            row("F", "NUMBER", 2, None, None, None),
        ]
        .into_iter()
        .map(FieldDescriptor::from),
    );
    assert_eq!(builder.rejected(), 0);

    let snapshot = builder.build();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get("F").unwrap().length, 2);
}

#[test]
fn mixed_drift_in_one_object() {
    let source = snapshot(vec![
        id_row(22),
        row("NAME", "VARCHAR2", 80, None, None, Some(false)),
        row("STATUS", "CHAR", 1, None, None, Some(true)),
    ]);
    let target = snapshot(vec![
        id_row(22),
        row("NAME", "VARCHAR2", 50, None, None, Some(true)),
        row("LEGACY_CODE", "VARCHAR2", 10, None, None, Some(true)),
    ]);

    let report = detect_drift(&source, &target);

    assert_eq!(report.new.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), ["STATUS"]);
    assert_eq!(
        report.deleted.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
        ["LEGACY_CODE"]
    );

    let name = report.changed_field("NAME").unwrap();
    let attrs: Vec<Attribute> = name.diffs.iter().map(|d| d.attribute).collect();
    assert_eq!(attrs, vec![Attribute::Length, Attribute::Nullable]);
}
