//! Field keys and event names emitted by rowgate's structured logging
//!
//! `tracing` macros take field names as identifiers, so emitters spell them
//! out literally; these constants are the names consumers (log pipelines,
//! test assertions) match against.

/// Module path of the emitting code
pub const FIELD_COMPONENT: &str = "component";
/// Gateway operation: `initialize`, `create`, `find`, `update`, `delete`, `count`, `clear`
pub const FIELD_OP: &str = "op";
/// One of the `EVENT_*` names below
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

/// Physical table the event concerns
pub const FIELD_TABLE: &str = "table";
/// Initialization phase: `creation` or `seeding`
pub const FIELD_PHASE: &str = "phase";
/// Number of seed rows written during initialization
pub const FIELD_SEED_LEN: &str = "seed_len";
/// Keyset position a cursor page was fetched after
pub const FIELD_AFTER_ID: &str = "after_id";
/// Rows returned by one cursor page
pub const FIELD_ROW_COUNT: &str = "row_count";

pub const FIELD_ERR_KIND: &str = "err_kind";
/// Stable `ERR_*` code of the failure
pub const FIELD_ERR_CODE: &str = "err_code";

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

/// Every boundary event an operation can emit
pub const BOUNDARY_EVENTS: [&str; 3] = [EVENT_START, EVENT_END, EVENT_END_ERROR];
