#![deny(missing_docs)]
//! Logging front end for the makler admin crates.
//!
//! Core, client and binary log through these macros so the whole workspace
//! can be routed by one `simplelog` setup in the binary.

/// Backend calls, generated URLs and other per-request detail.
#[macro_export]
macro_rules! admin_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Completed operations: mutations, exports, searches.
#[macro_export]
macro_rules! admin_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Rejected operator input and per-item failures inside a batch.
#[macro_export]
macro_rules! admin_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// A backend request that failed as a whole.
#[macro_export]
macro_rules! admin_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Installs a debug-level stderr logger once per test binary.
///
/// Later calls, and calls after another logger was installed, do nothing.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
    use std::sync::Once;

    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = TermLogger::init(
            log::LevelFilter::Debug,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Never,
        );
    });
}
