//! Text area: keeps document, caret, undo history, highlights, folds and
//! gutter consistent with each other.
//!
//! Each edit runs the same sequence: mutate the document (markers shift in
//! the same call), carry pending damage and fold bounds across the edit,
//! move the caret to the edit point, record the edit for undo with the caret
//! offsets around it, then accumulate damage for the affected lines and let
//! the gutter react to a changed line count.
//!
//! Every edit operation leaves the caret at its edit point, so an edit away
//! from the previous one counts as a caret jump for undo grouping.

use tracing::{debug, warn};

use crate::caret::{Caret, CaretMove};
use crate::commands::Damage;
use crate::config::EditorConfig;
use crate::document::{Document, Marker};
use crate::error::{EditError, Feedback, Result};
use crate::fold::{FoldModel, FoldSet};
use crate::gutter::{
    visible_lines, FoldIndicatorLane, Gutter, GutterPaint, IconHandle, IconRowHeader, LayoutMode,
    LineNumberLane,
};
use crate::highlight::{
    HighlightHandle, HighlightStore, Layer, LineHighlightHandle, LineHighlightManager, PaintOp,
    Painter, VisibleLineHighlight,
};
use crate::layout::{FixedLayout, RowMetrics, TextLayout, Viewport};
use crate::theme::Color;
use crate::undo::{CommandState, UndoManager, UndoableEdit};

/// Fold bounds held as markers at the start of the fold's first and last
/// line, with the line range they resolved to at the last sync
#[derive(Debug, Clone, Copy)]
struct FoldAnchor {
    start: Marker,
    end: Marker,
    start_line: usize,
    end_line: usize,
}

impl FoldAnchor {
    fn new(doc: &mut Document, start_line: usize, end_line: usize) -> Result<Self> {
        let start_offset = doc.line_start_offset(start_line)?;
        let end_offset = doc.line_start_offset(end_line)?;
        Ok(Self {
            start: doc.create_marker(start_offset)?,
            end: doc.create_marker(end_offset)?,
            start_line,
            end_line,
        })
    }

    fn release(self, doc: &mut Document) {
        doc.release_marker(self.start);
        doc.release_marker(self.end);
    }
}

pub struct TextArea {
    doc: Document,
    caret: Caret,
    undo: UndoManager,
    folds: FoldSet,
    fold_anchors: Vec<FoldAnchor>,
    highlights: HighlightStore,
    line_highlights: LineHighlightManager,
    gutter: Gutter,
    config: EditorConfig,
    selection_highlight: Option<HighlightHandle>,
    current_line_highlight: Option<LineHighlightHandle>,
    damage: Damage,
    feedback: Vec<Feedback>,
}

impl TextArea {
    pub fn new(text: &str, config: EditorConfig) -> Result<Self> {
        let mut doc = Document::with_text(text);
        let caret = Caret::new(&mut doc)?;
        let g = &config.gutter;
        let mut gutter = Gutter::new(
            IconRowHeader::new(&config.bookmark_icon, g.icon_width),
            LineNumberLane::new(g.line_number_start, g.char_width, g.line_number_padding),
            FoldIndicatorLane::new(g.fold_glyph_width, g.fold_tooltip_max_lines),
        );
        gutter.on_line_count_changed(doc.line_count());
        gutter.take_damage();

        let mut area = Self {
            doc,
            caret,
            undo: UndoManager::with_max_size(config.max_compound_edits),
            folds: FoldSet::default(),
            fold_anchors: Vec::new(),
            highlights: HighlightStore::new(),
            line_highlights: LineHighlightManager::new(),
            gutter,
            config,
            selection_highlight: None,
            current_line_highlight: None,
            damage: Damage::None,
            feedback: Vec::new(),
        };
        area.sync_current_line_highlight()?;
        Ok(area)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn text(&self) -> String {
        self.doc.text()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn folds(&self) -> &FoldSet {
        &self.folds
    }

    pub fn gutter(&self) -> &Gutter {
        &self.gutter
    }

    pub fn highlights(&self) -> &HighlightStore {
        &self.highlights
    }

    pub fn line_highlights(&self) -> &LineHighlightManager {
        &self.line_highlights
    }

    pub fn undo_manager(&self) -> &UndoManager {
        &self.undo
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Insert `text` at `offset`; the caret ends after the inserted text
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
        if text.is_empty() {
            return self.doc.line_of_offset(offset).map(|_| ());
        }
        let caret_before = self.caret.dot(&self.doc)?;
        let first_line = self.doc.line_of_offset(offset)?;
        self.doc.insert(offset, text)?;
        let len = text.chars().count();
        self.after_mutation(|damage| damage.shift_for_insert(offset, len))?;

        let end = offset + len;
        self.place_caret(end)?;
        let caret_after = self.caret.dot(&self.doc)?;
        self.undo.record(
            UndoableEdit::Insert {
                offset,
                text: text.to_string(),
            },
            caret_before,
            caret_after,
        );
        debug!(offset, len = end - offset, "insert");
        self.after_edit(first_line, offset, end, text.contains('\n'));
        Ok(())
    }

    /// Remove `len` chars at `offset`; the caret ends at `offset`
    pub fn remove(&mut self, offset: usize, len: usize) -> Result<String> {
        if len == 0 {
            self.doc.line_of_offset(offset)?;
            return Ok(String::new());
        }
        let caret_before = self.caret.dot(&self.doc)?;
        let first_line = self.doc.line_of_offset(offset)?;
        let removed = self.doc.remove(offset, len)?;
        self.after_mutation(|damage| damage.shift_for_remove(offset, offset + len))?;

        self.place_caret(offset)?;
        let caret_after = self.caret.dot(&self.doc)?;
        self.undo.record(
            UndoableEdit::Remove {
                offset,
                text: removed.clone(),
            },
            caret_before,
            caret_after,
        );
        debug!(offset, len, "remove");
        self.after_edit(first_line, offset, offset, removed.contains('\n'));
        Ok(removed)
    }

    /// Type at the caret, replacing the selection if there is one
    pub fn type_text(&mut self, text: &str) -> Result<()> {
        let selection = self.caret.selection_range(&self.doc)?;
        if selection.is_empty() {
            return self.insert(selection.start, text);
        }
        self.undo.begin_atomic_edit("Typing");
        let result = self
            .remove(selection.start, selection.len())
            .and_then(|_| self.insert(selection.start, text));
        self.end_atomic_scope();
        result
    }

    /// Delete the selection, or the char before the caret
    pub fn backspace(&mut self) -> Result<()> {
        let selection = self.caret.selection_range(&self.doc)?;
        if !selection.is_empty() {
            return self.remove(selection.start, selection.len()).map(|_| ());
        }
        if selection.start == 0 {
            return Ok(());
        }
        self.remove(selection.start - 1, 1).map(|_| ())
    }

    /// Replace `start..end` with `text` as one undoable step
    pub fn replace_range(&mut self, start: usize, end: usize, text: &str) -> Result<()> {
        if end < start || end > self.doc.len() {
            return Err(EditError::InvalidRange {
                offset: start,
                len: end.saturating_sub(start),
                length: self.doc.len(),
            });
        }
        self.undo.begin_atomic_edit("Replace");
        let result = self
            .remove(start, end - start)
            .and_then(|_| self.insert(start, text));
        self.end_atomic_scope();
        result
    }

    /// Swap the caret line with the line above. Returns false on the first
    /// line.
    pub fn move_line_up(&mut self) -> Result<bool> {
        let line = self.caret.line(&self.doc)?;
        if line == 0 {
            return Ok(false);
        }
        self.swap_lines(line - 1, line, true)?;
        Ok(true)
    }

    /// Swap the caret line with the line below. Returns false on the last
    /// line.
    pub fn move_line_down(&mut self) -> Result<bool> {
        let line = self.caret.line(&self.doc)?;
        if line + 1 >= self.doc.line_count() {
            return Ok(false);
        }
        self.swap_lines(line, line + 1, false)?;
        Ok(true)
    }

    /// Swap `upper` and `upper + 1`, keeping the caret column on the line
    /// it started on
    fn swap_lines(&mut self, upper: usize, lower: usize, caret_on_lower: bool) -> Result<()> {
        let dot = self.caret.dot(&self.doc)?;
        let caret_line = if caret_on_lower { lower } else { upper };
        let column = dot - self.doc.line_start_offset(caret_line)?;

        let start = self.doc.line_start_offset(upper)?;
        let upper_text = self.doc.line_text(upper)?;
        let lower_text = self.doc.line_text(lower)?;
        let lower_start = self.doc.line_start_offset(lower)?;
        let separator = self
            .doc
            .slice(start + upper_text.chars().count()..lower_start)?;
        let end = lower_start + lower_text.chars().count();

        let swapped = format!("{}{}{}", lower_text, separator, upper_text);
        self.undo.begin_atomic_edit("Move Line");
        let result = self
            .remove(start, end - start)
            .and_then(|_| self.insert(start, &swapped))
            .and_then(|_| {
                let target = if caret_on_lower {
                    start + column
                } else {
                    start + lower_text.chars().count() + separator.chars().count() + column
                };
                self.place_caret(target)
            });
        self.end_atomic_scope();
        debug!(upper, lower, "swapped lines");
        result
    }

    fn end_atomic_scope(&mut self) {
        if let Err(feedback) = self.undo.end_atomic_edit() {
            self.push_feedback(feedback);
        }
    }

    /// Bring offset-based state in line with a document mutation: pending
    /// char-range damage is shifted like a marker, fold ranges are re-read
    /// from their anchors
    fn after_mutation(&mut self, shift: impl FnOnce(&mut Damage)) -> Result<()> {
        let pending = self.highlights.take_damage();
        self.damage.merge(pending);
        shift(&mut self.damage);
        self.sync_folds()
    }

    fn after_edit(&mut self, first_line: usize, start: usize, end: usize, lines_changed: bool) {
        if lines_changed {
            let last = self.doc.line_count().saturating_sub(1);
            self.damage.merge(Damage::lines(first_line, last.max(first_line)));
        } else {
            self.damage.merge(Damage::range(start, end));
        }
        self.gutter.on_line_count_changed(self.doc.line_count());
    }

    // =========================================================================
    // Caret
    // =========================================================================

    pub fn dot(&self) -> Result<usize> {
        self.caret.dot(&self.doc)
    }

    pub fn mark(&self) -> Result<usize> {
        self.caret.mark(&self.doc)
    }

    pub fn caret_line(&self) -> Result<usize> {
        self.caret.line(&self.doc)
    }

    pub fn selection_range(&self) -> Result<std::ops::Range<usize>> {
        self.caret.selection_range(&self.doc)
    }

    pub fn set_caret_always_visible(&mut self, visible: bool) {
        self.caret.always_visible = visible;
    }

    pub fn caret_always_visible(&self) -> bool {
        self.caret.always_visible
    }

    /// Move the caret, collapsing the selection
    pub fn set_dot(&mut self, offset: usize) -> Result<CaretMove> {
        let before = self.caret_lines()?;
        let outcome = self.caret.set_dot(&mut self.doc, &self.folds, offset)?;
        self.after_caret_change(before, outcome)?;
        Ok(outcome)
    }

    /// Move the caret's active end, extending the selection
    pub fn move_dot(&mut self, offset: usize) -> Result<CaretMove> {
        let before = self.caret_lines()?;
        let outcome = self.caret.move_dot(&mut self.doc, &self.folds, offset)?;
        self.after_caret_change(before, outcome)?;
        Ok(outcome)
    }

    /// Set the selection anchor without moving the dot. The mark snaps out
    /// of collapsed folds like the dot does.
    pub fn set_mark(&mut self, offset: usize) -> Result<CaretMove> {
        let before = self.caret_lines()?;
        let outcome = self.caret.set_mark(&mut self.doc, &self.folds, offset)?;
        self.after_caret_change(before, outcome)?;
        Ok(outcome)
    }

    pub fn select_range(&mut self, start: usize, end: usize) -> Result<CaretMove> {
        self.set_dot(start)?;
        self.move_dot(end)
    }

    /// Move the caret as part of an edit. A blocked move keeps the caret
    /// where the marker shift put it, moved out of any fold it now sits in.
    fn place_caret(&mut self, offset: usize) -> Result<()> {
        let before = self.caret_lines()?;
        let outcome = self.caret.set_dot(&mut self.doc, &self.folds, offset)?;
        if outcome == CaretMove::Blocked {
            self.caret.revalidate(&mut self.doc, &self.folds)?;
        }
        self.after_caret_change(before, outcome)
    }

    fn caret_lines(&self) -> Result<(usize, usize)> {
        let dot = self.doc.line_of_offset(self.caret.dot(&self.doc)?)?;
        let mark = self.doc.line_of_offset(self.caret.mark(&self.doc)?)?;
        Ok((dot, mark))
    }

    fn after_caret_change(&mut self, before: (usize, usize), outcome: CaretMove) -> Result<()> {
        let blocked = outcome == CaretMove::Blocked;
        if blocked {
            self.push_feedback(Feedback::CaretBlockedByFold);
        }
        let after = self.caret_lines()?;
        if after != before {
            for line in [before.0, before.1, after.0, after.1] {
                self.damage.merge(Damage::lines(line, line));
            }
        }
        if !blocked || after != before {
            self.sync_selection_highlight()?;
        }
        self.sync_current_line_highlight()
    }

    fn sync_current_line_highlight(&mut self) -> Result<()> {
        if !self.config.highlight_current_line {
            return Ok(());
        }
        let line = self.caret.line(&self.doc)?;
        if let Some(handle) = self.current_line_highlight {
            if self.line_highlights.line_of(&self.doc, handle)? == line {
                return Ok(());
            }
            self.line_highlights.remove(&mut self.doc, handle)?;
        }
        let color = self.config.colors.current_line;
        self.current_line_highlight = Some(self.line_highlights.add(&mut self.doc, line, color)?);
        Ok(())
    }

    fn sync_selection_highlight(&mut self) -> Result<()> {
        let range = self.caret.selection_range(&self.doc)?;
        match (self.selection_highlight, range.is_empty()) {
            (Some(handle), true) => {
                self.highlights.remove(&mut self.doc, handle)?;
                self.selection_highlight = None;
            }
            (Some(handle), false) => {
                self.highlights
                    .update(&mut self.doc, handle, range.start, range.end)?;
            }
            (None, false) => {
                let painter = Painter::Fill(self.config.colors.selection);
                let handle = self.highlights.add(
                    &mut self.doc,
                    range.start,
                    range.end,
                    painter,
                    Layer::Selection,
                )?;
                self.selection_highlight = Some(handle);
            }
            (None, true) => {}
        }
        Ok(())
    }

    // =========================================================================
    // Undo
    // =========================================================================

    pub fn undo(&mut self) -> Result<bool> {
        match self.undo.undo(&mut self.doc)? {
            Some(caret) => {
                self.after_history_step(caret)?;
                Ok(true)
            }
            None => {
                self.push_feedback(Feedback::CannotUndo);
                Ok(false)
            }
        }
    }

    pub fn redo(&mut self) -> Result<bool> {
        match self.undo.redo(&mut self.doc)? {
            Some(caret) => {
                self.after_history_step(caret)?;
                Ok(true)
            }
            None => {
                self.push_feedback(Feedback::CannotRedo);
                Ok(false)
            }
        }
    }

    fn after_history_step(&mut self, caret: usize) -> Result<()> {
        self.damage.merge(Damage::Full);
        self.sync_folds()?;
        self.gutter.on_line_count_changed(self.doc.line_count());
        let before = self.caret_lines()?;
        let outcome = self.caret.set_dot(&mut self.doc, &self.folds, caret)?;
        if outcome == CaretMove::Blocked {
            // Nowhere visible in the travel direction; fall back to the
            // nearest visible spot around the current position.
            self.caret.revalidate(&mut self.doc, &self.folds)?;
        }
        self.after_caret_change(before, CaretMove::Moved(caret))
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    pub fn undo_command(&self) -> CommandState {
        self.undo.undo_command()
    }

    pub fn redo_command(&self) -> CommandState {
        self.undo.redo_command()
    }

    pub fn begin_atomic_edit(&mut self, name: &str) {
        self.undo.begin_atomic_edit(name);
    }

    pub fn end_atomic_edit(&mut self) {
        self.end_atomic_scope();
    }

    pub fn discard_all_edits(&mut self) {
        self.undo.discard_all_edits();
    }

    // =========================================================================
    // Folds
    // =========================================================================

    /// Replace the fold snapshot. Folds that start on the same line as a
    /// collapsed fold in the old snapshot stay collapsed.
    pub fn set_folds(&mut self, ranges: &[(usize, usize)]) -> Result<()> {
        let mut folds = FoldSet::new(&self.doc, ranges)?;
        for (start_line, _, collapsed) in self.folds.specs() {
            if collapsed {
                folds.set_collapsed(start_line, true);
            }
        }
        let mut anchors = Vec::new();
        for (start_line, end_line, _) in folds.specs() {
            anchors.push(FoldAnchor::new(&mut self.doc, start_line, end_line)?);
        }
        for anchor in std::mem::replace(&mut self.fold_anchors, anchors) {
            anchor.release(&mut self.doc);
        }
        self.folds = folds;
        self.damage.merge(Damage::Full);
        self.revalidate_caret()
    }

    /// Re-read fold line ranges from their anchors after the text changed.
    /// A fold whose lines were all removed is dropped, as is a fold that now
    /// duplicates or straddles another one.
    fn sync_folds(&mut self) -> Result<()> {
        if self.fold_anchors.is_empty() {
            return Ok(());
        }
        let mut specs = Vec::with_capacity(self.fold_anchors.len());
        let mut kept = Vec::with_capacity(self.fold_anchors.len());
        for anchor in std::mem::take(&mut self.fold_anchors) {
            let start_line = self.doc.line_of_offset(self.doc.marker_offset(anchor.start)?)?;
            let end_line = self.doc.line_of_offset(self.doc.marker_offset(anchor.end)?)?;
            let emptied = start_line == end_line && anchor.end_line > anchor.start_line;
            // Kept folds must stay nested or disjoint
            let clashes = specs.iter().any(|&(s, e, _)| {
                let same = (s, e) == (start_line, end_line);
                let overlaps = start_line <= e && s <= end_line;
                let nested =
                    (s <= start_line && end_line <= e) || (start_line <= s && e <= end_line);
                same || (overlaps && !nested)
            });
            if emptied || clashes {
                debug!(
                    start_line = anchor.start_line,
                    end_line = anchor.end_line,
                    "dropped fold after edit"
                );
                anchor.release(&mut self.doc);
                continue;
            }
            let collapsed = self
                .folds
                .find(anchor.start_line, anchor.end_line)
                .is_some_and(|fold| fold.is_collapsed());
            specs.push((start_line, end_line, collapsed));
            kept.push(FoldAnchor {
                start_line,
                end_line,
                ..anchor
            });
        }
        self.folds = FoldSet::with_states(&self.doc, &specs)?;
        self.fold_anchors = kept;
        Ok(())
    }

    /// Toggle the fold starting on `line`. Returns the new collapsed state,
    /// or `None` when no fold starts there.
    pub fn toggle_fold(&mut self, line: usize) -> Result<Option<bool>> {
        self.doc.line_start_offset(line)?;
        let state = self.folds.toggle_fold_at(line);
        if state.is_some() {
            self.damage.merge(Damage::Full);
            self.revalidate_caret()?;
        }
        Ok(state)
    }

    pub fn set_fold_collapsed(&mut self, line: usize, collapsed: bool) -> Result<bool> {
        self.doc.line_start_offset(line)?;
        let found = self.folds.set_collapsed(line, collapsed);
        if found {
            self.damage.merge(Damage::Full);
            self.revalidate_caret()?;
        }
        Ok(found)
    }

    fn revalidate_caret(&mut self) -> Result<()> {
        let before = self.caret_lines()?;
        let outcome = self.caret.revalidate(&mut self.doc, &self.folds)?;
        if let CaretMove::Snapped { requested, actual } = outcome {
            debug!(requested, actual, "caret moved out of collapsed fold");
        }
        self.after_caret_change(before, outcome)
    }

    // =========================================================================
    // Highlights
    // =========================================================================

    pub fn add_highlight(
        &mut self,
        start: usize,
        end: usize,
        painter: Painter,
        layer: Layer,
    ) -> Result<HighlightHandle> {
        self.highlights
            .add(&mut self.doc, start, end, painter, layer)
    }

    pub fn remove_highlight(&mut self, handle: HighlightHandle) -> Result<()> {
        if self.selection_highlight == Some(handle) {
            self.selection_highlight = None;
        }
        self.highlights.remove(&mut self.doc, handle)
    }

    pub fn clear_highlight_layer(&mut self, layer: Layer) -> Result<usize> {
        if layer == Layer::Selection {
            self.selection_highlight = None;
        }
        self.highlights.clear_layer(&mut self.doc, layer)
    }

    /// Replace the mark-all layer with `ranges`
    pub fn mark_all(&mut self, ranges: &[(usize, usize)]) -> Result<Vec<HighlightHandle>> {
        if let Some(&(start, end)) = ranges
            .iter()
            .find(|(s, e)| e < s || *e > self.doc.len())
        {
            return Err(EditError::InvalidRange {
                offset: start,
                len: end.saturating_sub(start),
                length: self.doc.len(),
            });
        }
        self.highlights.clear_layer(&mut self.doc, Layer::MarkAll)?;
        let painter = Painter::Fill(self.config.colors.mark_all);
        ranges
            .iter()
            .map(|&(start, end)| {
                self.highlights
                    .add(&mut self.doc, start, end, painter, Layer::MarkAll)
            })
            .collect()
    }

    pub fn add_line_highlight(&mut self, line: usize, color: Color) -> Result<LineHighlightHandle> {
        self.line_highlights.add(&mut self.doc, line, color)
    }

    pub fn remove_line_highlight(&mut self, handle: LineHighlightHandle) -> Result<()> {
        self.line_highlights.remove(&mut self.doc, handle)?;
        if self.current_line_highlight == Some(handle) {
            self.current_line_highlight = None;
        }
        Ok(())
    }

    /// Remove every line highlight. The current-line highlight comes back on
    /// the next caret move.
    pub fn remove_all_line_highlights(&mut self) -> Result<()> {
        self.current_line_highlight = None;
        self.line_highlights.remove_all(&mut self.doc)
    }

    // =========================================================================
    // Icons and bookmarks
    // =========================================================================

    pub fn add_icon_at_line(
        &mut self,
        line: usize,
        icon: &str,
        tooltip: Option<&str>,
    ) -> Result<IconHandle> {
        self.gutter
            .icons
            .add_icon_at_line(&mut self.doc, line, icon, tooltip)
    }

    pub fn add_icon_at_offset(
        &mut self,
        offset: usize,
        icon: &str,
        tooltip: Option<&str>,
    ) -> Result<IconHandle> {
        self.gutter
            .icons
            .add_icon_at_offset(&mut self.doc, offset, icon, tooltip)
    }

    pub fn remove_icon(&mut self, handle: IconHandle) -> Result<()> {
        self.gutter.icons.remove_icon(&mut self.doc, handle)
    }

    pub fn remove_all_icons(&mut self) -> Result<()> {
        self.gutter.icons.remove_all_icons(&mut self.doc)
    }

    /// Returns whether a bookmark was added
    pub fn toggle_bookmark(&mut self, line: usize) -> Result<bool> {
        self.gutter.icons.toggle_bookmark(&mut self.doc, line)
    }

    pub fn bookmarks(&self) -> Result<Vec<usize>> {
        self.gutter.icons.bookmarks(&self.doc)
    }

    /// Jump to the next bookmark after the caret line, wrapping around.
    /// Folds hiding the target are expanded first.
    pub fn next_bookmark(&mut self) -> Result<Option<usize>> {
        let line = self.caret_line()?;
        let target = self.gutter.icons.next_bookmark(&self.doc, line)?;
        self.go_to_bookmark(target)
    }

    pub fn prev_bookmark(&mut self) -> Result<Option<usize>> {
        let line = self.caret_line()?;
        let target = self.gutter.icons.prev_bookmark(&self.doc, line)?;
        self.go_to_bookmark(target)
    }

    fn go_to_bookmark(&mut self, target: Option<usize>) -> Result<Option<usize>> {
        let Some(line) = target else {
            self.push_feedback(Feedback::NoBookmarks);
            return Ok(None);
        };
        if self.folds.is_line_hidden(line) {
            let expanded = self.folds.ensure_line_visible(line);
            debug!(line, expanded, "expanded folds to reveal bookmark");
            self.damage.merge(Damage::Full);
        }
        let offset = self.doc.line_start_offset(line)?;
        self.set_dot(offset)?;
        Ok(Some(line))
    }

    // =========================================================================
    // Rendering queries
    // =========================================================================

    pub fn row_metrics(&self) -> RowMetrics {
        RowMetrics::new(self.config.gutter.row_height, self.config.gutter.inset_top)
    }

    /// Unwrapped layout over the current folds, with the text region
    /// `0..text_width`
    pub fn fixed_layout(&self, text_width: f32) -> FixedLayout<'_> {
        FixedLayout::new(
            self.row_metrics(),
            self.config.gutter.char_width,
            (0.0, text_width),
            self.doc.line_count(),
            &self.folds,
        )
    }

    pub fn paint_gutter(&self, mode: LayoutMode<'_>, viewport: Viewport) -> Result<GutterPaint> {
        let dot = self.caret.dot(&self.doc)?;
        let line = self.doc.line_of_offset(dot)?;
        self.gutter
            .paint(&self.doc, &self.folds, mode, viewport, line, dot)
    }

    /// Tooltip for a gutter hover: the displayed icon's tooltip, else a
    /// collapsed fold preview
    pub fn gutter_tooltip_at(
        &self,
        mode: LayoutMode<'_>,
        viewport: Viewport,
        y: f32,
    ) -> Result<Option<String>> {
        let lines = visible_lines(mode, viewport, &self.folds, self.doc.line_count());
        if let Some(tip) = self.gutter.icons.tooltip_at(&self.doc, &lines, y)? {
            return Ok(Some(tip));
        }
        self.gutter
            .fold_indicator
            .tooltip_at(&self.doc, &lines, &self.folds, y)
    }

    pub fn paint_highlights(
        &self,
        layout: &dyn TextLayout,
        viewport: Viewport,
    ) -> Result<Vec<PaintOp>> {
        self.highlights.paint(&self.doc, layout, viewport)
    }

    pub fn visible_line_highlights(
        &self,
        layout: &dyn TextLayout,
        viewport: Viewport,
    ) -> Result<Vec<VisibleLineHighlight>> {
        let mut visible = Vec::new();
        self.line_highlights
            .for_each_visible(&self.doc, layout, viewport, |v| visible.push(v))?;
        Ok(visible)
    }

    /// Drain damage from every component
    pub fn take_damage(&mut self) -> Damage {
        let mut damage = std::mem::take(&mut self.damage);
        damage.merge(self.highlights.take_damage());
        damage.merge(self.line_highlights.take_damage());
        damage.merge(self.gutter.take_damage());
        damage
    }

    pub fn take_feedback(&mut self) -> Vec<Feedback> {
        std::mem::take(&mut self.feedback)
    }

    fn push_feedback(&mut self, feedback: Feedback) {
        debug!(?feedback, "{}", feedback.message());
        self.feedback.push(feedback);
    }
}

impl Drop for TextArea {
    fn drop(&mut self) {
        if self.undo.atomic_depth() > 0 {
            warn!(
                depth = self.undo.atomic_depth(),
                "text area dropped inside an atomic edit"
            );
        }
    }
}
