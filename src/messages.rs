//! Message types for scripted playback
//!
//! Every state change a script can request is one of these messages. They
//! deserialize from YAML, one message per list item:
//!
//! ```yaml
//! - edit: { type_text: "hello" }
//! - caret: { set_dot: 3 }
//! - fold: { toggle: 4 }
//! - history: undo
//! ```

use serde::{Deserialize, Serialize};

use crate::highlight::{Layer, Painter};
use crate::theme::Color;

/// Document edits. All of them are recorded for undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMsg {
    /// Type at the caret, replacing any selection
    TypeText(String),
    Insert { offset: usize, text: String },
    Remove { offset: usize, len: usize },
    Backspace,
    /// Replace a range as one undo step
    ReplaceRange {
        start: usize,
        end: usize,
        text: String,
    },
    MoveLineUp,
    MoveLineDown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaretMsg {
    /// Move the caret, collapsing the selection
    SetDot(usize),
    /// Move the active end, extending the selection
    MoveDot(usize),
    SetMark(usize),
    Select { start: usize, end: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMsg {
    Undo,
    Redo,
    BeginAtomic(String),
    EndAtomic,
    DiscardAll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoldMsg {
    /// Replace the fold snapshot with `(start_line, end_line)` ranges
    SetFolds(Vec<(usize, usize)>),
    Toggle(usize),
    Collapse(usize),
    Expand(usize),
}

/// Highlights, icons and bookmarks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkMsg {
    AddHighlight {
        start: usize,
        end: usize,
        painter: Painter,
        #[serde(default = "default_layer")]
        layer: Layer,
    },
    /// Replace the mark-all layer
    MarkAll(Vec<(usize, usize)>),
    ClearLayer(Layer),
    AddLineHighlight { line: usize, color: Color },
    RemoveAllLineHighlights,
    AddIcon {
        line: usize,
        icon: String,
        #[serde(default)]
        tooltip: Option<String>,
    },
    RemoveAllIcons,
    ToggleBookmark(usize),
    NextBookmark,
    PrevBookmark,
}

fn default_layer() -> Layer {
    Layer::Custom
}

/// Top-level message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Msg {
    Edit(EditMsg),
    Caret(CaretMsg),
    History(HistoryMsg),
    Fold(FoldMsg),
    Mark(MarkMsg),
}

impl Msg {
    /// Short name for log spans
    pub fn name(&self) -> &'static str {
        match self {
            Msg::Edit(m) => match m {
                EditMsg::TypeText(_) => "edit.type_text",
                EditMsg::Insert { .. } => "edit.insert",
                EditMsg::Remove { .. } => "edit.remove",
                EditMsg::Backspace => "edit.backspace",
                EditMsg::ReplaceRange { .. } => "edit.replace_range",
                EditMsg::MoveLineUp => "edit.move_line_up",
                EditMsg::MoveLineDown => "edit.move_line_down",
            },
            Msg::Caret(_) => "caret",
            Msg::History(m) => match m {
                HistoryMsg::Undo => "history.undo",
                HistoryMsg::Redo => "history.redo",
                _ => "history",
            },
            Msg::Fold(_) => "fold",
            Msg::Mark(_) => "mark",
        }
    }
}

/// Parse a YAML list of messages
pub fn parse_script(yaml: &str) -> Result<Vec<Msg>, String> {
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str(yaml).map_err(|e| e.to_string())
}
