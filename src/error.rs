//! Error and feedback types for the text area core
//!
//! Two kinds of failure exist here and they are kept apart on purpose:
//!
//! - [`EditError`]: structural misuse (an offset past the end, a line that
//!   doesn't exist, a released marker). Returned as `Err` before any state
//!   is touched.
//! - [`Feedback`]: interactive "nothing to do" outcomes such as undo with an
//!   empty history. These are never errors; callers surface them as a beep
//!   or a status message and carry on.

use thiserror::Error;

/// Structural errors. Every operation that returns one has left all state
/// unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("offset {offset} is outside the document (length {length})")]
    InvalidOffset { offset: usize, length: usize },

    #[error("line {line} is outside the document ({line_count} lines)")]
    InvalidLine { line: usize, line_count: usize },

    #[error("range {offset}..{offset}+{len} is outside the document (length {length})")]
    InvalidRange {
        offset: usize,
        len: usize,
        length: usize,
    },

    #[error("marker has been released")]
    StaleMarker,

    #[error("handle does not refer to a live entry")]
    StaleHandle,
}

pub type Result<T> = std::result::Result<T, EditError>;

/// Interactive no-op signals, the equivalent of a UI beep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Feedback {
    /// Undo requested with nothing left to undo
    CannotUndo,
    /// Redo requested at the head of history
    CannotRedo,
    /// Bookmark navigation with no bookmarks set
    NoBookmarks,
    /// Caret move rejected: no visible line in the requested direction
    CaretBlockedByFold,
    /// `end_atomic_edit` without a matching `begin_atomic_edit`
    UnbalancedAtomicEnd,
}

impl Feedback {
    /// Short user-facing description, suitable for a status bar
    pub fn message(&self) -> &'static str {
        match self {
            Feedback::CannotUndo => "Nothing to undo",
            Feedback::CannotRedo => "Nothing to redo",
            Feedback::NoBookmarks => "No bookmarks",
            Feedback::CaretBlockedByFold => "No visible line in that direction",
            Feedback::UnbalancedAtomicEnd => "No atomic edit in progress",
        }
    }
}
