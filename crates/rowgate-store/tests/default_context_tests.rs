// Integration tests for the process-wide default gateway context

mod common;

use common::{context, BeatlesMembersTable};
use rowgate_core::context::{self, DEFAULT_CONTEXT};
use rowgate_core::errors::GatewayError;
use rowgate_core::gateway::TableGateway;

// Every step touches the shared registry, so the whole lifecycle runs in a
// single test to stay independent of test ordering.
#[test]
fn test_default_context_lifecycle() {
    context::clear_default();
    let err = TableGateway::<BeatlesMembersTable>::open_default().unwrap_err();
    assert_eq!(
        err,
        GatewayError::NotConfigured {
            name: DEFAULT_CONTEXT.to_string()
        }
    );

    context::set_default(context());
    let gateway = TableGateway::<BeatlesMembersTable>::open_default().unwrap();
    assert_eq!(gateway.count().unwrap(), 4);

    context::set_named("reporting", context());
    let reporting = TableGateway::<BeatlesMembersTable>::new(
        context::named_context("reporting").unwrap(),
    )
    .unwrap();
    reporting.clear().unwrap();
    assert_eq!(reporting.count().unwrap(), 0);
    assert_eq!(gateway.count().unwrap(), 4);

    context::clear_named("reporting");
    assert!(context::named_context("reporting").is_err());

    context::clear_default();
    assert!(context::default_context().is_err());
}
