//! Logging configuration for edudash.
//!
//! This module provides initialization and configuration for the tracing-based
//! logging system used throughout edudash.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Target of the one-line-per-request access log.
pub const ACCESS_LOG_TARGET: &str = "edudash::access";

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Suppress all output except errors.
    Quiet,
    /// Normal output level (info and above).
    #[default]
    Normal,
    /// Verbose output (debug and above).
    Verbose,
    /// Very verbose output (trace level).
    Trace,
}

impl Verbosity {
    /// Convert verbosity to tracing level filter.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// The default `EnvFilter` directive for this verbosity.
    ///
    /// The access log rides on the crate's own level. Body and path
    /// rejections from axum only show up from `-v` on, and hyper's
    /// connection chatter only at `-vv`.
    #[must_use]
    pub fn default_directive(&self) -> String {
        let level = self.to_level_filter();
        match self {
            Self::Quiet | Self::Normal => format!("edudash={level},axum=warn"),
            Self::Verbose => format!("edudash={level},axum::rejection=trace"),
            Self::Trace => format!("edudash={level},axum=trace,hyper=debug"),
        }
    }
}

/// Initialize the logging system.
///
/// This should be called once at application startup. The logging level can be
/// controlled via:
/// 1. The `verbosity` parameter
/// 2. The `RUST_LOG` environment variable (takes precedence)
///
/// # Examples
///
/// ```no_run
/// use edudash::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let default_filter = verbosity.default_directive();

    // Allow RUST_LOG to override
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    );

    // Install the subscriber (ignore error if already set)
    let _ = subscriber.try_init();
}
