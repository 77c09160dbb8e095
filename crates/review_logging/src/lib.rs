#![deny(missing_docs)]
//! Shared logging utilities for the review workspace.
//!
//! This crate provides the `review_*` logging macros used by the engine and
//! the app, and a minimal test initializer for the global logger.
//!
//! Messages that belong to one review session are prefixed with the session
//! epoch via [`review_session!`], so interleaved poll loops from superseded
//! sessions stay distinguishable in the log.

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! review_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! review_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! review_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! review_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! review_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Logs a message at `level`, prefixed with the review session epoch.
///
/// ```ignore
/// review_session!(log::Level::Warn, epoch, "poll failed: {}", err);
/// ```
#[macro_export]
macro_rules! review_session {
    ($level:expr, $epoch:expr, $($arg:tt)*) => {{
        log::log!($level, "[session {}] {}", $epoch, format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
