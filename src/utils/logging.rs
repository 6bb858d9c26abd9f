//! Module-gated logging macros.
//!
//! Every module that logs through these macros declares its own switch:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_info};
//!
//! log_info!("loaded {} readings", count);
//! ```
//! Flipping the switch to `false` silences that module without touching the
//! global `RUST_LOG` filter.

/// Forwards to a `log` macro when the calling module's `ENABLE_LOGS` is set.
#[doc(hidden)]
#[macro_export]
macro_rules! gated_log {
    ($level:ident, $($arg:tt)*) => {
        if ENABLE_LOGS {
            log::$level!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::gated_log!(debug, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::gated_log!(info, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::gated_log!(warn, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::gated_log!(error, $($arg)*)
    };
}
