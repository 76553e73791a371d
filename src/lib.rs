//! Textarea Core - synchronization core of a rich text area
//!
//! Keeps a document, its sticky markers, grouped undo history, layered
//! highlights, a fold-aware caret and the gutter lanes consistent through
//! every edit. Rendering is left to the host: the core answers "what to
//! paint where" and reports damage.

pub mod caret;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod document;
pub mod error;
pub mod fold;
pub mod gutter;
pub mod highlight;
pub mod layout;
pub mod messages;
pub mod text_area;
pub mod theme;
pub mod tracing;
pub mod undo;
pub mod update;

// Re-export commonly used types
pub use caret::CaretMove;
pub use commands::Damage;
pub use config::EditorConfig;
pub use document::Document;
pub use error::{EditError, Feedback};
pub use fold::{FoldModel, FoldSet, NoFolds};
pub use messages::Msg;
pub use text_area::TextArea;
pub use theme::Color;
