//! Fold-aware caret.
//!
//! The caret is a dot (active end) and a mark (anchor end), both held as
//! sticky markers so they follow edits. Every position change passes
//! through a filter that keeps both ends out of collapsed folds: a target on a
//! hidden line snaps to the nearest visible line in the direction of travel,
//! or the move is rejected when no such line exists.

use std::ops::Range;

use tracing::{debug, trace};

use crate::document::{Document, Marker};
use crate::error::Result;
use crate::fold::FoldModel;

/// Result of a caret position change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretMove {
    /// Dot is at the requested offset
    Moved(usize),
    /// Requested offset was on a hidden line; dot snapped to a visible line
    Snapped { requested: usize, actual: usize },
    /// No visible line in the direction of travel; nothing changed
    Blocked,
}

impl CaretMove {
    /// Offset the dot ended up at, if it moved
    pub fn offset(&self) -> Option<usize> {
        match self {
            CaretMove::Moved(offset) => Some(*offset),
            CaretMove::Snapped { actual, .. } => Some(*actual),
            CaretMove::Blocked => None,
        }
    }
}

/// Dot and mark anchored in a document
#[derive(Debug, Clone)]
pub struct Caret {
    dot: Marker,
    mark: Marker,
    /// Keep painting the caret even when the text area is unfocused (popups)
    pub always_visible: bool,
}

impl Caret {
    /// Caret at offset 0
    pub fn new(doc: &mut Document) -> Result<Self> {
        Ok(Self {
            dot: doc.create_marker(0)?,
            mark: doc.create_marker(0)?,
            always_visible: false,
        })
    }

    pub fn dot(&self, doc: &Document) -> Result<usize> {
        doc.marker_offset(self.dot)
    }

    pub fn mark(&self, doc: &Document) -> Result<usize> {
        doc.marker_offset(self.mark)
    }

    /// Selected range (`min(dot, mark)..max(dot, mark)`)
    pub fn selection_range(&self, doc: &Document) -> Result<Range<usize>> {
        let (dot, mark) = (self.dot(doc)?, self.mark(doc)?);
        Ok(dot.min(mark)..dot.max(mark))
    }

    pub fn has_selection(&self, doc: &Document) -> Result<bool> {
        Ok(self.dot(doc)? != self.mark(doc)?)
    }

    /// Line the dot is on
    pub fn line(&self, doc: &Document) -> Result<usize> {
        doc.line_of_offset(self.dot(doc)?)
    }

    /// Move dot and mark together, collapsing any selection
    pub fn set_dot(
        &mut self,
        doc: &mut Document,
        folds: &dyn FoldModel,
        offset: usize,
    ) -> Result<CaretMove> {
        let outcome = filter(doc, folds, self.dot(doc)?, offset)?;
        if let Some(target) = outcome.offset() {
            doc.move_marker(self.dot, target)?;
            doc.move_marker(self.mark, target)?;
        }
        Ok(outcome)
    }

    /// Move only the dot, extending the selection from the mark
    pub fn move_dot(
        &mut self,
        doc: &mut Document,
        folds: &dyn FoldModel,
        offset: usize,
    ) -> Result<CaretMove> {
        let outcome = filter(doc, folds, self.dot(doc)?, offset)?;
        if let Some(target) = outcome.offset() {
            doc.move_marker(self.dot, target)?;
        }
        Ok(outcome)
    }

    /// Move only the mark. The direction of travel is taken from the
    /// mark's previous position.
    pub fn set_mark(
        &mut self,
        doc: &mut Document,
        folds: &dyn FoldModel,
        offset: usize,
    ) -> Result<CaretMove> {
        let outcome = filter(doc, folds, self.mark(doc)?, offset)?;
        if let Some(target) = outcome.offset() {
            doc.move_marker(self.mark, target)?;
        }
        Ok(outcome)
    }

    /// Re-run the fold filter on dot and mark where they stand. Used after
    /// folds change or an edit leaves the caret on a hidden line. Returns the
    /// dot's outcome.
    pub fn revalidate(&mut self, doc: &mut Document, folds: &dyn FoldModel) -> Result<CaretMove> {
        let dot = self.dot(doc)?;
        let outcome = filter(doc, folds, dot, dot)?;
        if let CaretMove::Snapped { actual, .. } = outcome {
            doc.move_marker(self.dot, actual)?;
        }

        let mark = self.mark(doc)?;
        if let CaretMove::Snapped { actual, .. } = filter(doc, folds, mark, mark)? {
            trace!(from = mark, to = actual, "mark moved out of fold");
            doc.move_marker(self.mark, actual)?;
        }
        Ok(outcome)
    }

    /// Release both markers. The caret must not be used afterwards.
    pub fn release(self, doc: &mut Document) {
        doc.release_marker(self.dot);
        doc.release_marker(self.mark);
    }
}

/// Resolve a move of one caret end from `from` to `offset`
fn filter(doc: &Document, folds: &dyn FoldModel, from: usize, offset: usize) -> Result<CaretMove> {
    let line = doc.line_of_offset(offset)?;
    if !folds.is_line_hidden(line) {
        return Ok(CaretMove::Moved(offset));
    }

    let target = if offset > from {
        next_visible_line_start(doc, folds, line)?
    } else {
        // Staying put on a hidden line (a fold collapsed around it) resolves
        // like a backward move, falling forward if needed.
        match previous_visible_line_end(doc, folds, line)? {
            Some(target) => Some(target),
            None if offset == from => next_visible_line_start(doc, folds, line)?,
            None => None,
        }
    };

    match target {
        Some(actual) => {
            debug!(requested = offset, actual, line, "caret snapped out of fold");
            Ok(CaretMove::Snapped {
                requested: offset,
                actual,
            })
        }
        None => {
            debug!(requested = offset, line, "caret move blocked by fold");
            Ok(CaretMove::Blocked)
        }
    }
}

fn next_visible_line_start(
    doc: &Document,
    folds: &dyn FoldModel,
    line: usize,
) -> Result<Option<usize>> {
    let line_count = doc.line_count();
    let mut candidate = line + 1;
    while candidate < line_count && folds.is_line_hidden(candidate) {
        candidate += 1;
    }
    if candidate < line_count {
        Ok(Some(doc.line_start_offset(candidate)?))
    } else {
        Ok(None)
    }
}

/// End of the nearest visible line above, before its terminator, so the
/// caret sits on the line's content
fn previous_visible_line_end(
    doc: &Document,
    folds: &dyn FoldModel,
    line: usize,
) -> Result<Option<usize>> {
    let mut candidate = line;
    while candidate > 0 {
        candidate -= 1;
        if !folds.is_line_hidden(candidate) {
            return Ok(Some(doc.line_content_end(candidate)?));
        }
    }
    Ok(None)
}
