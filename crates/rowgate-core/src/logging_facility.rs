//! Structured logging for gateway operations
//!
//! - `init(profile)` installs the process subscriber once
//! - `log_op_start!`/`log_op_end!`/`log_op_error!` emit boundary events
//!   carrying the operation, table and timing
//! - `test_capture` records events in memory for assertions
//!
//! Gateways own boundary logging; storage backends only emit
//! `tracing::debug!` detail.
//!
//! ```rust
//! use rowgate_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, init_from_env, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
