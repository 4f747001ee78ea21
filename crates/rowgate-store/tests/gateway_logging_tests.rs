// Integration tests for gateway boundary logging

mod common;

use common::{context, BeatlesMembersTable, UNKNOWN_ID};
use rowgate_core::fields;
use rowgate_core::gateway::TableGateway;
use rowgate_core::logging_facility::test_capture::init_test_capture;
use rowgate_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_DURATION_MS, FIELD_ERR_CODE, FIELD_PHASE,
    FIELD_SEED_LEN,
};

#[test]
fn test_operations_emit_start_and_end() {
    let capture = init_test_capture();
    let gateway =
        TableGateway::<BeatlesMembersTable>::with_suffix(context(), "logging-ops").unwrap();
    let table = gateway.table_name().to_string();

    gateway.create(fields! { "name" => "Pete Best" }).unwrap();
    gateway.count().unwrap();

    let events = capture.events_for_table(&table);
    for op in ["initialize", "create", "count"] {
        let starts = events
            .iter()
            .filter(|e| e.op.as_deref() == Some(op) && e.event.as_deref() == Some(EVENT_START))
            .count();
        let ends = events
            .iter()
            .filter(|e| e.op.as_deref() == Some(op) && e.event.as_deref() == Some(EVENT_END))
            .count();
        assert_eq!((starts, ends), (1, 1), "op {op} should log one start and one end");
    }

    // Seeding creates four rows inside "initialize" without logging them as creates
    assert_eq!(
        events
            .iter()
            .filter(|e| e.op.as_deref() == Some("create"))
            .count(),
        2
    );
}

#[test]
fn test_failed_lookup_logs_end_error_with_code() {
    let capture = init_test_capture();
    let gateway =
        TableGateway::<BeatlesMembersTable>::with_suffix(context(), "logging-errors").unwrap();
    let table = gateway.table_name().to_string();

    assert!(gateway.find(UNKNOWN_ID).is_err());

    let error_event = capture
        .events_for_table(&table)
        .into_iter()
        .find(|e| e.op.as_deref() == Some("find") && e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event");

    assert_eq!(error_event.field(FIELD_ERR_CODE), Some("ERR_NOT_FOUND"));
    assert!(error_event.field(FIELD_DURATION_MS).is_some());
}

#[test]
fn test_initialization_logs_each_phase() {
    let capture = init_test_capture();
    let gateway =
        TableGateway::<BeatlesMembersTable>::with_suffix(context(), "logging-phases").unwrap();

    let phases: Vec<_> = capture
        .events_for_table(gateway.table_name())
        .into_iter()
        .filter_map(|e| e.field(FIELD_PHASE).map(str::to_string).map(|p| (p, e)))
        .collect();

    let names: Vec<&str> = phases.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(names, vec!["creation", "seeding"]);
    assert_eq!(phases[1].1.field(FIELD_SEED_LEN), Some("4"));
}
