//! Tracing setup and caret snapshots for debug logging
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=textarea_core::undo=trace` - module-level filtering
//!
//! # Log Files
//!
//! Logs are written to `~/.config/textarea-core/logs/textarea.log` with daily
//! rotation. File logging uses debug level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config_paths::{ensure_logs_dir, LOG_FILE_PREFIX};
use crate::error::Result;
use crate::text_area::TextArea;

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG and defaults to `warn`. If the logs
/// directory can't be created only the console layer is installed.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let file_layer = match ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Caret state captured before and after a message for diffing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretSnapshot {
    pub dot: usize,
    pub mark: usize,
    pub line: usize,
}

impl CaretSnapshot {
    pub fn from_text_area(area: &TextArea) -> Result<Self> {
        Ok(Self {
            dot: area.dot()?,
            mark: area.mark()?,
            line: area.caret_line()?,
        })
    }

    pub fn has_selection(&self) -> bool {
        self.dot != self.mark
    }

    /// Describe what changed, or `None` if nothing did
    pub fn diff(&self, other: &CaretSnapshot) -> Option<String> {
        let mut changes = Vec::new();
        if self.dot != other.dot {
            changes.push(format!(
                "dot {} (line {}) → {} (line {})",
                self.dot, self.line, other.dot, other.line
            ));
        }
        if self.has_selection() != other.has_selection() {
            let status = if other.has_selection() {
                "active"
            } else {
                "cleared"
            };
            changes.push(format!("selection {}", status));
        } else if self.mark != other.mark {
            changes.push(format!("mark {} → {}", self.mark, other.mark));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}
