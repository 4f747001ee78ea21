//! Types shared by every rowgate crate
//!
//! Holds the logging vocabulary (field keys, event names) so log emitters
//! and log consumers agree on spelling without depending on each other.

pub mod schema;
