//! Boundary logging macros
//!
//! An operation logs one `start` event, then exactly one `end` or
//! `end_error` event. Field keys follow `rowgate_core_types::schema`; any
//! extra `key = value` pairs are forwarded to `tracing` unchanged. The
//! macros reach `tracing` through this crate, so callers need no direct
//! dependency on it.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_boundary {
    ($level:ident, $op:expr, $event:ident $(, $($field:tt)+)?) => {
        $crate::__private::tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $crate::__private::schema::$event,
            $($($field)+)?
        )
    };
}

/// Log the start of an operation
///
/// ```
/// # use rowgate_core::log_op_start;
/// log_op_start!("create");
/// log_op_start!("create", table = "beatles_members");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        $crate::__log_boundary!(info, $op, EVENT_START $(, $($field)+)?)
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use rowgate_core::log_op_end;
/// log_op_end!("create", duration_ms = 3);
/// log_op_end!("create", duration_ms = 3, table = "beatles_members");
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {
        $crate::__log_boundary!(
            info,
            $op,
            EVENT_END,
            duration_ms = $duration
            $(, $($field)+)?
        )
    };
}

/// Log the failed end of an operation
///
/// `$err` is anything convertible into [`ExError`](crate::errors::ExError),
/// `&GatewayError` included; its kind, stable code and rendered message are
/// attached to the event.
///
/// ```
/// # use rowgate_core::log_op_error;
/// # use rowgate_core::errors::GatewayError;
/// let err = GatewayError::ExpiredRow;
/// log_op_error!("delete", &err, duration_ms = 1);
/// log_op_error!("delete", &err, duration_ms = 1, table = "beatles_members");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_boundary!(
            error,
            $op,
            EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_message = %ex_err
            $(, $($field)+)?
        )
    }};
}
