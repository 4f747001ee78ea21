//! In-memory event capture for tests
//!
//! Installs a `tracing` layer that keeps every event as a [`CapturedEvent`].
//! All tests in a binary share one buffer, so assertions should narrow by
//! table or by a unique op name.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use rowgate_core_types::schema::{FIELD_COMPONENT, FIELD_EVENT, FIELD_OP, FIELD_TABLE};

/// One recorded event; every field value is kept in its rendered form
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub component: Option<String>,
    pub op: Option<String>,
    pub event: Option<String>,
    pub table: Option<String>,
    pub message: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn from_fields(level: Level, fields: HashMap<String, String>) -> Self {
        Self {
            level,
            component: fields.get(FIELD_COMPONENT).cloned(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            table: fields.get(FIELD_TABLE).cloned(),
            message: fields.get("message").cloned(),
            fields,
        }
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Boundary event `event` of operation `op`
    pub fn is(&self, op: &str, event: &str) -> bool {
        self.op.as_deref() == Some(op) && self.event.as_deref() == Some(event)
    }
}

#[derive(Default)]
struct Rendered(HashMap<String, String>);

impl Rendered {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for Rendered {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }
}

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

/// Layer appending every event to a shared buffer
pub struct TestCaptureLayer {
    buffer: Buffer,
}

impl TestCaptureLayer {
    pub fn new() -> (Self, TestCapture) {
        let buffer = Buffer::default();
        (
            Self {
                buffer: Arc::clone(&buffer),
            },
            TestCapture { buffer },
        )
    }
}

impl<S> Layer<S> for TestCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut rendered = Rendered::default();
        event.record(&mut rendered);

        let captured = CapturedEvent::from_fields(*event.metadata().level(), rendered.0);
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(captured);
    }
}

/// Read handle on the captured events
#[derive(Clone)]
pub struct TestCapture {
    buffer: Buffer,
}

impl TestCapture {
    /// Snapshot of everything captured so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events emitted for one table, in emission order
    pub fn events_for_table(&self, table: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.table.as_deref() == Some(table))
            .collect()
    }

    /// First boundary event `event` of operation `op`
    pub fn find(&self, op: &str, event: &str) -> Option<CapturedEvent> {
        self.events().into_iter().find(|e| e.is(op, event))
    }

    /// # Panics
    ///
    /// Panics if no event matches `op` and `event`
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "Expected event op={} event={} not found in {} captured events",
            op,
            event,
            events.len()
        );
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    pub fn clear(&self) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber and return its handle
///
/// The first call installs; later calls return the same handle.
///
/// ```
/// use rowgate_core::logging_facility::test_capture::init_test_capture;
/// use rowgate_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_op", table = "doc_table");
/// capture.assert_event_exists("doc_capture_op", "start");
/// assert_eq!(capture.events_for_table("doc_table").len(), 1);
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCaptureLayer::new();
            tracing_subscriber::registry().with(layer).init();
            capture
        })
        .clone()
}
