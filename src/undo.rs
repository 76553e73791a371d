//! Undo/redo history with compound-edit grouping.
//!
//! Edits are recorded into compound edits, which undo and redo as one unit.
//! Grouping follows one rule: an edit joins the open compound edit when the
//! caret has moved by at most one char since the previous edit. Typing and
//! backspacing therefore collapse into a single step, while a caret jump
//! starts a new one. Inside an atomic scope the rule is bypassed and every
//! edit lands in the same compound edit.
//!
//! The grouping state (`last_caret`, `atomic_depth`) lives on the manager and
//! is fed explicitly by the caller, so none of this needs a live caret.

use tracing::{debug, trace, warn};

use crate::document::Document;
use crate::error::{Feedback, Result};

/// Default number of compound edits kept in history
pub const DEFAULT_MAX_COMPOUND_EDITS: usize = 1000;

/// A single reversible mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoableEdit {
    Insert { offset: usize, text: String },
    Remove { offset: usize, text: String },
}

impl UndoableEdit {
    /// Re-apply the edit to a document in its pre-edit state
    pub fn apply(&self, doc: &mut Document) -> Result<()> {
        match self {
            UndoableEdit::Insert { offset, text } => doc.insert(*offset, text),
            UndoableEdit::Remove { offset, text } => {
                doc.remove(*offset, text.chars().count()).map(|_| ())
            }
        }
    }

    /// Reverse the edit on a document in its post-edit state
    pub fn revert(&self, doc: &mut Document) -> Result<()> {
        match self {
            UndoableEdit::Insert { offset, text } => {
                doc.remove(*offset, text.chars().count()).map(|_| ())
            }
            UndoableEdit::Remove { offset, text } => doc.insert(*offset, text),
        }
    }

    pub fn presentation_name(&self) -> &'static str {
        match self {
            UndoableEdit::Insert { .. } => "Typing",
            UndoableEdit::Remove { .. } => "Deletion",
        }
    }
}

/// An ordered group of edits undone and redone as one unit
#[derive(Debug, Clone)]
pub struct CompoundEdit {
    edits: Vec<UndoableEdit>,
    name: Option<String>,
    caret_before: Option<usize>,
    caret_after: Option<usize>,
    closed: bool,
}

impl CompoundEdit {
    fn new(name: Option<String>) -> Self {
        Self {
            edits: Vec::new(),
            name,
            caret_before: None,
            caret_after: None,
            closed: false,
        }
    }

    /// Append an edit. Returns false once the compound edit is closed.
    pub fn add(&mut self, edit: UndoableEdit) -> bool {
        if self.closed {
            return false;
        }
        self.edits.push(edit);
        true
    }

    /// Close the compound edit; no further edits may be appended
    pub fn end(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn edits(&self) -> &[UndoableEdit] {
        &self.edits
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Explicit name from the atomic scope, else derived from the first edit
    pub fn presentation_name(&self) -> &str {
        match (&self.name, self.edits.first()) {
            (Some(name), _) => name,
            (None, Some(edit)) => edit.presentation_name(),
            (None, None) => "Edit",
        }
    }

    pub fn caret_before(&self) -> Option<usize> {
        self.caret_before
    }

    pub fn caret_after(&self) -> Option<usize> {
        self.caret_after
    }

    /// Revert every edit, last first. On failure the edits already
    /// reverted are applied again so the document is left as it was.
    fn undo(&self, doc: &mut Document) -> Result<()> {
        for (idx, edit) in self.edits.iter().enumerate().rev() {
            if let Err(err) = edit.revert(doc) {
                for done in &self.edits[idx + 1..] {
                    if let Err(restore) = done.apply(doc) {
                        warn!(error = %restore, "could not restore edit after failed undo");
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn redo(&self, doc: &mut Document) -> Result<()> {
        for (idx, edit) in self.edits.iter().enumerate() {
            if let Err(err) = edit.apply(doc) {
                for done in self.edits[..idx].iter().rev() {
                    if let Err(restore) = done.revert(doc) {
                        warn!(error = %restore, "could not restore edit after failed redo");
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

/// Enabled state and label for a bound undo/redo command
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CommandState {
    pub enabled: bool,
    pub label: String,
}

/// History list with a cursor. `history[..cursor]` can be undone,
/// `history[cursor..]` can be redone.
#[derive(Debug, Clone)]
pub struct UndoManager {
    history: Vec<CompoundEdit>,
    cursor: usize,
    atomic_depth: usize,
    atomic_name: Option<String>,
    last_caret: Option<usize>,
    max_compound_edits: usize,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoManager {
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_COMPOUND_EDITS)
    }

    pub fn with_max_size(max_compound_edits: usize) -> Self {
        Self {
            history: Vec::new(),
            cursor: 0,
            atomic_depth: 0,
            atomic_name: None,
            last_caret: None,
            max_compound_edits: max_compound_edits.max(1),
        }
    }

    /// Record an edit that has already been applied to the document.
    ///
    /// `caret_before` / `caret_after` are the caret offsets around the edit;
    /// `caret_after` drives the adjacency rule.
    pub fn record(&mut self, edit: UndoableEdit, caret_before: usize, caret_after: usize) {
        self.discard_redo();

        let joins_open = if self.atomic_depth > 0 {
            true
        } else {
            self.last_caret
                .is_some_and(|last| last.abs_diff(caret_after) <= 1)
        };

        if !joins_open || self.open_compound().is_none() {
            self.close_open_compound();
            let name = if self.atomic_depth > 0 {
                self.atomic_name.clone()
            } else {
                None
            };
            self.push_compound(CompoundEdit::new(name));
        }

        if let Some(compound) = self.open_compound_mut() {
            if compound.caret_before.is_none() {
                compound.caret_before = Some(caret_before);
            }
            compound.caret_after = Some(caret_after);
            compound.add(edit);
        }
        trace!(caret_after, depth = self.atomic_depth, "recorded undoable edit");
        self.last_caret = Some(caret_after);
    }

    /// Start (or nest) an atomic scope. All edits until the matching
    /// [`end_atomic_edit`](Self::end_atomic_edit) form one compound edit.
    pub fn begin_atomic_edit(&mut self, name: &str) {
        if self.atomic_depth == 0 {
            self.close_open_compound();
            self.discard_redo();
            self.atomic_name = Some(name.to_string());
            self.push_compound(CompoundEdit::new(Some(name.to_string())));
            debug!(name, "begin atomic edit");
        }
        self.atomic_depth += 1;
    }

    pub fn end_atomic_edit(&mut self) -> std::result::Result<(), Feedback> {
        if self.atomic_depth == 0 {
            return Err(Feedback::UnbalancedAtomicEnd);
        }
        self.atomic_depth -= 1;
        if self.atomic_depth == 0 {
            self.close_open_compound();
            self.atomic_name = None;
            debug!("end atomic edit");
        }
        Ok(())
    }

    pub fn atomic_depth(&self) -> usize {
        self.atomic_depth
    }

    /// Undo one compound edit. Returns the caret offset to restore, or `None`
    /// when there is nothing to undo.
    pub fn undo(&mut self, doc: &mut Document) -> Result<Option<usize>> {
        self.close_open_compound();
        self.last_caret = None;
        if self.cursor == 0 {
            return Ok(None);
        }
        let compound = &self.history[self.cursor - 1];
        compound.undo(doc)?;
        self.cursor -= 1;
        debug!(name = compound.presentation_name(), "undo");
        Ok(Some(compound.caret_before().unwrap_or(0).min(doc.len())))
    }

    /// Redo one compound edit. Returns the caret offset to restore, or `None`
    /// when there is nothing to redo.
    pub fn redo(&mut self, doc: &mut Document) -> Result<Option<usize>> {
        self.close_open_compound();
        self.last_caret = None;
        if self.cursor == self.history.len() {
            return Ok(None);
        }
        let compound = &self.history[self.cursor];
        compound.redo(doc)?;
        self.cursor += 1;
        debug!(name = compound.presentation_name(), "redo");
        Ok(Some(compound.caret_after().unwrap_or(0).min(doc.len())))
    }

    pub fn can_undo(&self) -> bool {
        self.undoable_index().is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.history.len()
    }

    /// Drop all history. Atomic scope bookkeeping is reset as well.
    pub fn discard_all_edits(&mut self) {
        self.history.clear();
        self.cursor = 0;
        self.atomic_depth = 0;
        self.atomic_name = None;
        self.last_caret = None;
    }

    pub fn undo_command(&self) -> CommandState {
        match self.undoable_index().map(|i| &self.history[i]) {
            Some(compound) => CommandState {
                enabled: true,
                label: format!("Undo {}", compound.presentation_name()),
            },
            None => CommandState {
                enabled: false,
                label: "Can't Undo".to_string(),
            },
        }
    }

    pub fn redo_command(&self) -> CommandState {
        match self.history.get(self.cursor) {
            Some(compound) => CommandState {
                enabled: true,
                label: format!("Redo {}", compound.presentation_name()),
            },
            None => CommandState {
                enabled: false,
                label: "Can't Redo".to_string(),
            },
        }
    }

    /// Number of compound edits currently undoable
    pub fn compound_edit_count(&self) -> usize {
        self.undoable_index().map_or(0, |idx| idx + 1)
    }

    pub fn history(&self) -> &[CompoundEdit] {
        &self.history
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Index of the compound edit the next undo reverts. An open compound
    /// with no edits yet is skipped, since undo drops it on close.
    fn undoable_index(&self) -> Option<usize> {
        let idx = self.cursor.checked_sub(1)?;
        if self.history[idx].is_empty() {
            idx.checked_sub(1)
        } else {
            Some(idx)
        }
    }

    fn open_compound(&self) -> Option<&CompoundEdit> {
        self.history
            .get(self.cursor.checked_sub(1)?)
            .filter(|c| !c.is_closed())
    }

    fn open_compound_mut(&mut self) -> Option<&mut CompoundEdit> {
        let idx = self.cursor.checked_sub(1)?;
        self.history.get_mut(idx).filter(|c| !c.is_closed())
    }

    fn close_open_compound(&mut self) {
        let Some(compound) = self.open_compound_mut() else {
            return;
        };
        compound.end();
        let empty = compound.is_empty();
        trace!(empty, "closed compound edit");
        if empty {
            self.history.pop();
            self.cursor -= 1;
        }
    }

    fn discard_redo(&mut self) {
        if self.cursor < self.history.len() {
            self.history.truncate(self.cursor);
        }
    }

    fn push_compound(&mut self, compound: CompoundEdit) {
        self.history.push(compound);
        self.cursor = self.history.len();
        while self.history.len() > self.max_compound_edits {
            self.history.remove(0);
            self.cursor -= 1;
        }
    }
}
