// Integration tests for table bootstrap: creation, seeding, idempotence

mod common;

use std::sync::Arc;

use common::{context, AwesomeDataTable, BeatlesMembersTable, BrokenSeedTable};
use rowgate_core::collaborators::SchemaManager;
use rowgate_core::errors::{GatewayError, InitPhase};
use rowgate_core::gateway::{TableDefinition, TableGateway};
use rowgate_core::row::{Record, Row};
use rowgate_core::schema::Column;
use rowgate_core::value::ColumnType;
use rowgate_core::GatewayContext;
use rowgate_store::SqliteConnection;

#[test]
fn test_creates_table_automagically() {
    let conn = Arc::new(SqliteConnection::open_in_memory().unwrap());
    let gateway = TableGateway::<BeatlesMembersTable>::new(GatewayContext::new(conn.clone())).unwrap();

    assert_eq!(gateway.table_name(), "beatles_members");
    assert!(conn.table_exists("beatles_members").unwrap());
}

#[test]
fn test_can_fetch_pre_seeded_data() {
    let gateway = TableGateway::<BeatlesMembersTable>::new(context()).unwrap();

    assert_eq!(gateway.count().unwrap(), 4);

    let members: Vec<_> = gateway.all().collect::<Result<_, _>>().unwrap();
    let names: Vec<&str> = members.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["John Lennon", "Paul McCartney", "George Harrison", "Ringo Starr"]
    );
    assert!(members[0].best);
    assert!(members[1..].iter().all(|b| !b.best));

    let ids: Vec<i64> = members.iter().map(|b| b.id().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn test_reopening_existing_table_does_not_reseed() {
    let ctx = context();

    TableGateway::<BeatlesMembersTable>::new(ctx.clone()).unwrap();
    let reopened = TableGateway::<BeatlesMembersTable>::new(ctx).unwrap();

    assert_eq!(reopened.count().unwrap(), 4);
}

#[test]
fn test_file_backed_table_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beatles.db");

    {
        let ctx = GatewayContext::new(Arc::new(SqliteConnection::open(&path).unwrap()));
        let gateway = TableGateway::<BeatlesMembersTable>::new(ctx).unwrap();
        gateway
            .create(rowgate_core::fields! { "name" => "Pete Best" })
            .unwrap();
    }

    let ctx = GatewayContext::new(Arc::new(SqliteConnection::open(&path).unwrap()));
    let gateway = TableGateway::<BeatlesMembersTable>::new(ctx).unwrap();

    assert_eq!(gateway.count().unwrap(), 5);
    assert_eq!(gateway.find(5).unwrap().name, "Pete Best");
}

#[test]
fn test_seeding_failure_rolls_back_every_seed_row() {
    let ctx = context();

    let err = TableGateway::<BrokenSeedTable>::new(ctx.clone()).unwrap_err();
    assert_eq!(err.init_phase(), Some(InitPhase::Seeding));
    match &err {
        GatewayError::TableInitialization { table, source, .. } => {
            assert_eq!(table, "broken_seed");
            assert!(matches!(**source, GatewayError::Persistence { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // The table itself was created outside the seeding transaction, so the
    // next construction sees it and does not seed again.
    let reopened = TableGateway::<BrokenSeedTable>::new(ctx).unwrap();
    assert_eq!(reopened.count().unwrap(), 0);
    assert_eq!(reopened.all().count(), 0);
}

struct NonFiniteDefaultTable;

impl TableDefinition for NonFiniteDefaultTable {
    type Record = Row;

    fn columns() -> Vec<Column> {
        vec![Column::new("ratio", ColumnType::Float).default_value(f64::INFINITY)]
    }
}

#[test]
fn test_creation_failure_reports_creation_phase() {
    let conn = Arc::new(SqliteConnection::open_in_memory().unwrap());

    let err = TableGateway::<NonFiniteDefaultTable>::new(GatewayContext::new(conn.clone()))
        .unwrap_err();

    assert_eq!(err.init_phase(), Some(InitPhase::Creation));
    assert!(!conn.table_exists("non_finite_default").unwrap());
}

#[test]
fn test_redeclared_id_is_invalid_configuration() {
    struct ShadowIdTable;

    impl TableDefinition for ShadowIdTable {
        type Record = Row;

        fn columns() -> Vec<Column> {
            vec![Column::new("id", ColumnType::Text)]
        }
    }

    let err = TableGateway::<ShadowIdTable>::new(context()).unwrap_err();
    assert!(matches!(err, GatewayError::InvalidConfiguration { .. }));
}

#[test]
fn test_suffixed_and_explicit_names() {
    let ctx = context();

    let suffixed = TableGateway::<AwesomeDataTable>::with_suffix(ctx.clone(), "twitch-1234").unwrap();
    let explicit = TableGateway::<AwesomeDataTable>::with_table_name(ctx, "legacy_data").unwrap();

    assert_eq!(suffixed.to_string(), "awesome_data_twitch_1234");
    assert_eq!(explicit.to_string(), "legacy_data");
}

#[test]
fn test_delimiter_only_suffix_is_rejected() {
    let err = TableGateway::<AwesomeDataTable>::with_suffix(context(), "-_-").unwrap_err();
    assert!(matches!(err, GatewayError::InvalidConfiguration { .. }));
}
