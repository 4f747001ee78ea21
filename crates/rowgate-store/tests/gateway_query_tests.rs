// Integration tests for lazy iteration and composite predicates

mod common;

use common::{context, context_with_page_size, Beatle, BeatlesMembersTable};
use rowgate_core::errors::GatewayError;
use rowgate_core::fields;
use rowgate_core::gateway::TableGateway;
use rowgate_core::row::Record;

fn names(rows: impl Iterator<Item = Result<Beatle, GatewayError>>) -> Vec<String> {
    rows.map(|r| r.unwrap().name).collect()
}

#[test]
fn test_all_pages_across_boundaries() {
    let gateway = TableGateway::<BeatlesMembersTable>::new(context_with_page_size(2)).unwrap();
    gateway.create(fields! { "name" => "Pete Best" }).unwrap();

    let all = names(gateway.all());

    assert_eq!(
        all,
        vec![
            "John Lennon",
            "Paul McCartney",
            "George Harrison",
            "Ringo Starr",
            "Pete Best"
        ]
    );
}

#[test]
fn test_all_is_restartable() {
    let gateway = TableGateway::<BeatlesMembersTable>::new(context_with_page_size(3)).unwrap();

    assert_eq!(names(gateway.all()), names(gateway.all()));
    assert_eq!(gateway.all().count(), 4);
}

#[test]
fn test_writes_during_partial_iteration() {
    let gateway = TableGateway::<BeatlesMembersTable>::new(context_with_page_size(2)).unwrap();
    let mut rows = gateway.all();

    let first = rows.next().unwrap().unwrap();
    assert_eq!(first.name, "John Lennon");

    gateway.delete(3_i64).unwrap();
    gateway
        .update(4_i64, fields! { "name" => "Richard Starkey" })
        .unwrap();
    gateway.create(fields! { "name" => "Pete Best" }).unwrap();

    let rest = names(rows);
    assert_eq!(rest, vec!["Paul McCartney", "Richard Starkey", "Pete Best"]);
}

#[test]
fn test_abandoned_iteration_leaves_gateway_usable() {
    let gateway = TableGateway::<BeatlesMembersTable>::new(context_with_page_size(2)).unwrap();

    {
        let mut rows = gateway.all();
        rows.next().unwrap().unwrap();
    }

    gateway.clear().unwrap();
    assert_eq!(gateway.count().unwrap(), 0);
}

#[test]
fn test_where_expression_binds_values() {
    let gateway = TableGateway::<BeatlesMembersTable>::new(context()).unwrap();

    let matches = gateway
        .where_expression(|qb| {
            qb.or([
                qb.eq("is_best_beatle", true),
                qb.like("name", "%Starr"),
            ])
        })
        .unwrap();

    assert_eq!(names(matches), vec!["John Lennon", "Ringo Starr"]);
}

#[test]
fn test_where_expression_cannot_inject_sql() {
    let gateway = TableGateway::<BeatlesMembersTable>::new(context()).unwrap();

    let matches = gateway
        .where_eq("name", "x' OR '1'='1")
        .unwrap()
        .count();

    assert_eq!(matches, 0);
    assert_eq!(gateway.count().unwrap(), 4);
}

#[test]
fn test_where_expression_rejects_unknown_columns() {
    let gateway = TableGateway::<BeatlesMembersTable>::new(context()).unwrap();

    let err = gateway
        .where_expression(|qb| qb.and([qb.eq("name", "John Lennon"), qb.is_null("\"id\" OR 1=1 --")]))
        .unwrap_err();

    assert!(matches!(err, GatewayError::UnknownColumn { .. }));
}

#[test]
fn test_where_expression_with_in_list_and_not() {
    let gateway = TableGateway::<BeatlesMembersTable>::new(context_with_page_size(1)).unwrap();

    let rows: Vec<Beatle> = gateway
        .where_expression(|qb| {
            qb.and([
                qb.in_list("name", ["Paul McCartney", "George Harrison", "Ringo Starr"]),
                qb.not(qb.eq("name", "George Harrison")),
            ])
        })
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    let ids: Vec<i64> = rows.iter().map(|b| b.id().unwrap()).collect();
    assert_eq!(ids, vec![2, 4]);
}

#[test]
fn test_where_results_are_fully_hydrated() {
    let gateway = TableGateway::<BeatlesMembersTable>::new(context()).unwrap();

    let john = gateway
        .where_eq("is_best_beatle", true)
        .unwrap()
        .next()
        .unwrap()
        .unwrap();

    assert!(john.best);
    assert_eq!(john.name, "John Lennon");
    assert_eq!(john.to_fields(), gateway.find(1).unwrap().to_fields());
}
