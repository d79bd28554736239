//! Logging handle.
//!
//! The process installs one `tracing` subscriber through [`LogHandle::init`]
//! and hands the returned handle to every component constructor. Components
//! derive their own span with [`LogHandle::component`] and emit events with
//! that span as explicit parent.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing::Span;
use tracing_subscriber::EnvFilter;

use crate::errors::ConfigError;

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
#[derive(Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Explicit logging context passed to components.
#[derive(Debug, Clone)]
pub struct LogHandle {
    root: Span,
}

impl LogHandle {
    /// Install the stderr subscriber. May only succeed once per process.
    ///
    /// `RUST_LOG` directives are honoured; `level` is added as the default.
    pub fn init(level: LogLevel) -> Result<Self, ConfigError> {
        if INSTALLED.swap(true, Ordering::SeqCst) {
            return Err(ConfigError::ValidationError(
                "logging has already been initialised".into(),
            ));
        }

        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive(level.filter().into()))
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| {
                ConfigError::ValidationError(format!("unable to install log subscriber: {e}"))
            })?;

        let root = tracing::info_span!("gen", version = env!("CARGO_PKG_VERSION"));
        tracing::debug!(parent: &root, ?level, "logging initialised");

        Ok(Self { root })
    }

    /// A handle that installs nothing. Events still reach whatever
    /// subscriber is current.
    pub fn disabled() -> Self {
        Self { root: Span::none() }
    }

    /// Span for a named component, parented to the root span.
    pub fn component(&self, name: &'static str) -> Span {
        tracing::info_span!(parent: &self.root, "component", name)
    }

    /// End the root span. Call once before the process exits.
    pub fn shutdown(self) {
        tracing::debug!(parent: &self.root, "logging shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_rejected() {
        // Either this test or another installed first; the second call must fail.
        let _ = LogHandle::init(LogLevel::Error);
        let err = LogHandle::init(LogLevel::Error).unwrap_err();
        assert!(err.to_string().contains("already been initialised"));
    }

    #[test]
    fn disabled_handle_yields_spans() {
        let handle = LogHandle::disabled();
        let span = handle.component("uploader");
        drop(span);
        handle.shutdown();
    }

    #[test]
    fn log_level_parses_uppercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            level: LogLevel,
        }
        let parsed: Wrapper = serde_json::from_str(r#"{"level":"DEBUG"}"#).unwrap();
        assert_eq!(parsed.level, LogLevel::Debug);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }
}
