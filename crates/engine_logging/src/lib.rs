#![deny(missing_docs)]
//! Shared logging utilities for the harvester workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every message is
//! prefixed with the profile currently being harvested on this thread, so a
//! single log file reads as the history of one profile.

use std::cell::RefCell;

thread_local! {
    /// Thread-local storage for the profile being harvested.
    static LOG_PROFILE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Sets the profile tag for the current thread.
/// This should be called once by the process entry before any harvesting.
pub fn set_log_profile(profile: impl Into<String>) {
    let profile = profile.into();
    LOG_PROFILE.with(|v| *v.borrow_mut() = Some(profile));
}

/// Clears the profile tag for the current thread.
pub fn clear_log_profile() {
    LOG_PROFILE.with(|v| *v.borrow_mut() = None);
}

/// Returns the `[profile] ` prefix for the current thread, or an empty string
/// when no profile has been set.
#[doc(hidden)]
pub fn profile_prefix() -> String {
    LOG_PROFILE.with(|v| match v.borrow().as_deref() {
        Some(profile) => format!("[{profile}] "),
        None => String::new(),
    })
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::profile_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::profile_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::profile_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::profile_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::profile_prefix(), format_args!($($arg)*));
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
