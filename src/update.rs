//! Message dispatch for scripted playback
//!
//! All state changes a script requests flow through [`update`].

#[cfg(debug_assertions)]
use tracing::{debug, span, Level};

use crate::commands::Damage;
use crate::error::Result;
use crate::messages::{CaretMsg, EditMsg, FoldMsg, HistoryMsg, MarkMsg, Msg};
use crate::text_area::TextArea;

/// Apply one message and return the damage it caused.
///
/// In debug builds the call is wrapped in a span and the caret change is
/// logged.
#[inline]
pub fn update(area: &mut TextArea, msg: Msg) -> Result<Damage> {
    #[cfg(debug_assertions)]
    {
        update_traced(area, msg)
    }
    #[cfg(not(debug_assertions))]
    {
        update_inner(area, msg)
    }
}

fn update_inner(area: &mut TextArea, msg: Msg) -> Result<Damage> {
    match msg {
        Msg::Edit(m) => update_edit(area, m)?,
        Msg::Caret(m) => update_caret(area, m)?,
        Msg::History(m) => update_history(area, m)?,
        Msg::Fold(m) => update_fold(area, m)?,
        Msg::Mark(m) => update_mark(area, m)?,
    }
    Ok(area.take_damage())
}

#[cfg(debug_assertions)]
fn update_traced(area: &mut TextArea, msg: Msg) -> Result<Damage> {
    use crate::tracing::CaretSnapshot;

    let msg_name = msg.name();
    let _span = span!(Level::DEBUG, "update", msg = %msg_name).entered();
    let before = CaretSnapshot::from_text_area(area)?;
    debug!(target: "message", msg = %msg_name, "processing");

    let damage = update_inner(area, msg)?;

    let after = CaretSnapshot::from_text_area(area)?;
    if let Some(diff) = before.diff(&after) {
        debug!(target: "caret", %diff, "state changed");
    }
    Ok(damage)
}

pub fn update_edit(area: &mut TextArea, msg: EditMsg) -> Result<()> {
    match msg {
        EditMsg::TypeText(text) => area.type_text(&text),
        EditMsg::Insert { offset, text } => area.insert(offset, &text),
        EditMsg::Remove { offset, len } => area.remove(offset, len).map(|_| ()),
        EditMsg::Backspace => area.backspace(),
        EditMsg::ReplaceRange { start, end, text } => area.replace_range(start, end, &text),
        EditMsg::MoveLineUp => area.move_line_up().map(|_| ()),
        EditMsg::MoveLineDown => area.move_line_down().map(|_| ()),
    }
}

pub fn update_caret(area: &mut TextArea, msg: CaretMsg) -> Result<()> {
    match msg {
        CaretMsg::SetDot(offset) => area.set_dot(offset).map(|_| ()),
        CaretMsg::MoveDot(offset) => area.move_dot(offset).map(|_| ()),
        CaretMsg::SetMark(offset) => area.set_mark(offset).map(|_| ()),
        CaretMsg::Select { start, end } => area.select_range(start, end).map(|_| ()),
    }
}

pub fn update_history(area: &mut TextArea, msg: HistoryMsg) -> Result<()> {
    match msg {
        HistoryMsg::Undo => area.undo().map(|_| ()),
        HistoryMsg::Redo => area.redo().map(|_| ()),
        HistoryMsg::BeginAtomic(name) => {
            area.begin_atomic_edit(&name);
            Ok(())
        }
        HistoryMsg::EndAtomic => {
            area.end_atomic_edit();
            Ok(())
        }
        HistoryMsg::DiscardAll => {
            area.discard_all_edits();
            Ok(())
        }
    }
}

pub fn update_fold(area: &mut TextArea, msg: FoldMsg) -> Result<()> {
    match msg {
        FoldMsg::SetFolds(ranges) => area.set_folds(&ranges),
        FoldMsg::Toggle(line) => area.toggle_fold(line).map(|_| ()),
        FoldMsg::Collapse(line) => area.set_fold_collapsed(line, true).map(|_| ()),
        FoldMsg::Expand(line) => area.set_fold_collapsed(line, false).map(|_| ()),
    }
}

pub fn update_mark(area: &mut TextArea, msg: MarkMsg) -> Result<()> {
    match msg {
        MarkMsg::AddHighlight {
            start,
            end,
            painter,
            layer,
        } => area.add_highlight(start, end, painter, layer).map(|_| ()),
        MarkMsg::MarkAll(ranges) => area.mark_all(&ranges).map(|_| ()),
        MarkMsg::ClearLayer(layer) => area.clear_highlight_layer(layer).map(|_| ()),
        MarkMsg::AddLineHighlight { line, color } => {
            area.add_line_highlight(line, color).map(|_| ())
        }
        MarkMsg::RemoveAllLineHighlights => area.remove_all_line_highlights(),
        MarkMsg::AddIcon {
            line,
            icon,
            tooltip,
        } => area
            .add_icon_at_line(line, &icon, tooltip.as_deref())
            .map(|_| ()),
        MarkMsg::RemoveAllIcons => area.remove_all_icons(),
        MarkMsg::ToggleBookmark(line) => area.toggle_bookmark(line).map(|_| ()),
        MarkMsg::NextBookmark => area.next_bookmark().map(|_| ()),
        MarkMsg::PrevBookmark => area.prev_bookmark().map(|_| ()),
    }
}
