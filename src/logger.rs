//! Centralized logging configuration for quadric-factors consumers
//!
//! This module provides a consistent logging setup with custom formatting
//! and default INFO level. The library itself only emits `tracing` events;
//! installing a subscriber is the host application's choice.

use tracing::Level;

/// Initialize the tracing subscriber with quadric-factors' standard configuration
///
/// Default log level: INFO (overrideable via RUST_LOG environment variable)
///
/// # Example
/// ```no_run
/// use quadric_factors::init_logger;
///
/// fn main() {
///     init_logger();
///     tracing::info!("factor graph assembly started");
/// }
/// ```
///
/// # Environment Variables
/// Override the default log level using `RUST_LOG`:
/// ```bash
/// RUST_LOG=quadric_factors=debug cargo test
/// ```
pub fn init_logger() {
    init_logger_with_level(Level::INFO)
}

/// Initialize the tracing subscriber with a custom default level
///
/// # Arguments
/// * `default_level` - The default log level (overrideable via RUST_LOG)
pub fn init_logger_with_level(default_level: Level) {
    use tracing_subscriber::fmt::time::SystemTime;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_timer(SystemTime)
        .with_target(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();
}
