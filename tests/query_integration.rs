//! Integration tests for filter trees: persistence, editing, compilation and rendering.

use chrono::{DateTime, TimeZone, Utc};
use dashfilter::prelude::*;
use dashfilter::query::{CollectingNotifier, ErrorCode, SequenceGenerator};
use pretty_assertions::assert_eq;
use serde_json::json;

fn dataset() -> Dataset {
    Dataset::from_json_str(
        r#"{
            "name": "orders",
            "columns": [
                {"name": "customer", "type": "string", "alias": "Customer"},
                {"name": "total", "type": "decimal"},
                {"name": "quantity", "type": "int"},
                {"name": "createdAt", "type": "datetime", "alias": "Created"},
                {"name": "shippedOn", "type": "date"}
            ]
        }"#,
    )
    .expect("dataset parses")
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 31, 12, 0, 0).unwrap()
}

fn stored_tree() -> QueryBlock {
    serde_json::from_value(json!({
        "id": "root",
        "logicalOp": "AND",
        "filters": [
            {"id": "f1", "columnName": "customer", "op": "$containsi", "value": "acme"},
            {"id": "f2", "columnName": "createdAt", "op": "$between",
             "extra": {"period": "LAST", "unit": "MONTH", "value": 3}},
            {"id": "f3", "columnName": "total", "op": "$gt", "value": "100 * 2",
             "extra": {"isManual": true}}
        ],
        "blocks": [
            {"id": "b1", "logicalOp": "OR", "filters": [
                {"id": "f4", "columnName": "quantity", "op": "$in", "value": [1, 2, 3]},
                {"id": "f5", "columnName": "shippedOn", "op": "$null", "show": false}
            ]}
        ]
    }))
    .expect("stored tree parses")
}

#[test]
fn test_compile_stored_tree() {
    let evaluator = |expr: &str| -> Result<FilterValue, dashfilter::query::EvaluatorError> {
        match expr {
            "100 * 2" => Ok(FilterValue::Int(200)),
            other => Err(dashfilter::query::EvaluatorError::new(format!("cannot evaluate {}", other))),
        }
    };
    let tz: Timezone = "+03:00".parse().unwrap();
    let ctx = FilterContext::new(tz, now(), &evaluator);

    let wire = compile(&dataset(), &stored_tree(), &ctx).unwrap();

    assert_eq!(
        wire.to_json(),
        json!({
            "$and": [
                {"$or": [{"$and": [], "quantity": {"$in": [1, 2, 3]}, "shippedOn": {"$null": true}}]}
            ],
            "customer": {"$containsi": "acme"},
            "createdAt": {"$between": ["2024-02-29T15:00:00+03:00", "2024-05-31T15:00:00+03:00"]},
            "total": {"$gt": 200}
        })
    );
    assert!(wire.withheld_columns().is_empty());
}

#[test]
fn test_compile_withholds_failed_manual_values() {
    let notifier = CollectingNotifier::new();
    let ctx = FilterContext::new(Timezone::utc(), now(), &JsonLiteralEvaluator)
        .with_notifier(&notifier);

    let wire = compile(&dataset(), &stored_tree(), &ctx).unwrap();

    assert_eq!(wire.withheld_columns(), vec!["total".to_string()]);
    assert_eq!(wire.to_json()["total"], json!({}));
    assert_eq!(notifier.len(), 1);
    assert!(notifier.messages()[0].contains("D2001"));
}

#[test]
fn test_compile_unknown_column() {
    let block = QueryBlock::with_id("root")
        .filter(QueryFilter::new("f1", "missing", Predicate::IsNotNull));
    let ctx = FilterContext::new(Timezone::utc(), now(), &JsonLiteralEvaluator);

    let err = compile(&dataset(), &block, &ctx).unwrap_err();
    assert!(err.is_column_not_found());
}

#[test]
fn test_render_stored_tree() {
    let summary = render(&dataset(), &stored_tree(), &RenderOptions::default()).unwrap();
    assert_eq!(
        summary.as_deref(),
        Some("Customer contains (case-insensitive) acme and Created for last 3 months and total > 100 * 2 and (quantity in 1, 2, 3)")
    );
}

#[test]
fn test_editing_then_compiling() {
    let mut ids = SequenceGenerator::new("id");
    let root = QueryBlock::empty(&mut ids);
    let child = QueryBlock::empty(&mut ids).or();
    let root_id = root.id.clone();
    let child_id = child.id.clone();

    let tree = root
        .with_block_added(&root_id, child)
        .with_filter_added(
            &child_id,
            QueryFilter::new("a", "quantity", Predicate::compare(CompareOp::Gte, 5)),
        )
        .with_filter_added(
            &child_id,
            QueryFilter::new("b", "quantity", Predicate::compare(CompareOp::Lte, 1)),
        )
        .with_filter_added(
            &root_id,
            QueryFilter::new("c", "customer", Predicate::compare(CompareOp::Eq, "x")),
        )
        .with_filter_replaced(QueryFilter::new(
            "c",
            "customer",
            Predicate::compare(CompareOp::Eq, "y"),
        ))
        .with_logical_op(&child_id, LogicalOp::And);

    assert_eq!(root_id, "id-1");
    assert_eq!(tree.find_filter("c").unwrap().op(), Operator::Eq);

    let ctx = FilterContext::new(Timezone::utc(), now(), &JsonLiteralEvaluator);
    let wire = compile(&dataset(), &tree, &ctx).unwrap();
    assert_eq!(
        wire.to_json(),
        json!({
            "$and": [{"$and": [], "quantity": {"$gte": 5, "$lte": 1}}],
            "customer": {"$eq": "y"}
        })
    );

    let pruned = tree.with_block_removed(&child_id).with_filter_removed("c");
    assert!(pruned.is_empty());
}

#[test]
fn test_form_round_trip() {
    let tz: Timezone = "+02:00".parse().unwrap();
    let block = QueryBlock::with_id("root")
        .filter(QueryFilter::new(
            "f1",
            "createdAt",
            Predicate::between("2024-01-01T10:00:00Z", "2024-01-02T10:00:00Z"),
        ))
        .filter(QueryFilter::new(
            "f2",
            "shippedOn",
            Predicate::compare(CompareOp::Lt, "2024-03-01"),
        ))
        .filter(QueryFilter::new("f3", "total", Predicate::compare(CompareOp::Gt, 10)));

    let form: FormBlock = to_form(&dataset(), tz, &block).unwrap();
    let restored = from_form(&dataset(), tz, &form).unwrap();

    let stored = serde_json::to_value(&restored).unwrap();
    assert_eq!(
        stored["filters"][0]["extra"]["left"],
        json!("2024-01-01T12:00:00+02:00")
    );
    assert_eq!(
        stored["filters"][0]["extra"]["right"],
        json!("2024-01-02T12:00:00+02:00")
    );
    assert_eq!(stored["filters"][1]["value"], json!("2024-03-01"));
    assert_eq!(stored["filters"][2]["value"], json!(10));
}

#[test]
fn test_form_round_trip_is_exact_in_display_timezone() {
    let tz: Timezone = "+02:00".parse().unwrap();
    let stored: QueryBlock = serde_json::from_value(json!({
        "id": "root",
        "logicalOp": "OR",
        "filters": [
            {"id": "f1", "columnName": "createdAt", "op": "$between",
             "extra": {"left": "2024-01-01T12:00:00+02:00", "right": "2024-01-02T12:00:00+02:00"}},
            {"id": "f2", "columnName": "shippedOn", "op": "$gte", "value": "2024-03-01"},
            {"id": "f3", "columnName": "createdAt", "op": "$lt", "value": "now()",
             "extra": {"isManual": true}},
            {"id": "f4", "columnName": "createdAt", "op": "$between",
             "extra": {"period": "NEXT", "unit": "WEEK", "value": 2}},
            {"id": "f5", "columnName": "quantity", "op": "$notIn", "value": "4,5"},
            {"id": "f6", "columnName": "customer", "op": "$notNull", "show": false}
        ],
        "blocks": [
            {"id": "b1", "filters": [
                {"id": "f7", "columnName": "shippedOn", "op": "$between",
                 "extra": {"isManualLeft": true, "left": "startOfMonth()", "right": "2024-03-31"}}
            ]}
        ]
    }))
    .unwrap();

    let form = to_form(&dataset(), tz, &stored).unwrap();
    let restored = from_form(&dataset(), tz, &form).unwrap();

    assert_eq!(restored, stored);
    assert_eq!(
        serde_json::to_value(&restored).unwrap(),
        serde_json::to_value(&stored).unwrap()
    );
}

#[test]
fn test_form_rejects_malformed_dates() {
    let block = QueryBlock::with_id("root").filter(QueryFilter::new(
        "f1",
        "shippedOn",
        Predicate::compare(CompareOp::Eq, "first of may"),
    ));

    let err = to_form(&dataset(), Timezone::utc(), &block).unwrap_err();
    assert_eq!(err.code, ErrorCode::IllegalArgument);
}

#[test]
fn test_operator_catalog() {
    let temporal = operators_for(&ColumnType::DateTime).unwrap();
    assert!(temporal.contains(&Operator::Between));
    assert!(!temporal.contains(&Operator::Contains));

    let text = operators_for(&ColumnType::String).unwrap();
    assert!(text.contains(&Operator::ContainsCi));

    let err = operators_for(&ColumnType::parse("geometry")).unwrap_err();
    assert_eq!(err.code, ErrorCode::IllegalType);
}
