//! Whole-line background highlights
//!
//! Entries are anchored at a line's first offset and kept sorted by that
//! offset. Marker shifting is monotone, so an edit never reorders entries
//! and the order stays valid without a re-sort; new entries are placed by
//! binary search, after any entry with the same offset.

use tracing::trace;

use crate::commands::Damage;
use crate::document::{Document, Marker};
use crate::error::{EditError, Result};
use crate::layout::{Rect, TextLayout, Viewport};
use crate::theme::Color;

/// Opaque handle to a line highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct LineHighlightHandle(u64);

#[derive(Debug, Clone)]
struct LineHighlight {
    id: u64,
    marker: Marker,
    color: Color,
}

/// A line highlight inside the viewport, ready to paint
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct VisibleLineHighlight {
    pub handle: LineHighlightHandle,
    pub line: usize,
    pub color: Color,
    pub rect: Rect,
}

#[derive(Debug, Default)]
pub struct LineHighlightManager {
    entries: Vec<LineHighlight>,
    next_id: u64,
    damage: Damage,
}

impl LineHighlightManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highlight `line`. Several highlights on one line are all kept; the
    /// later one paints on top.
    pub fn add(&mut self, doc: &mut Document, line: usize, color: Color) -> Result<LineHighlightHandle> {
        let offset = doc.line_start_offset(line)?;
        let idx = self.upper_bound(doc, offset)?;
        let marker = doc.create_marker(offset)?;
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(idx, LineHighlight { id, marker, color });
        self.damage.merge(Damage::lines(line, line));
        trace!(id, line, "added line highlight");
        Ok(LineHighlightHandle(id))
    }

    pub fn remove(&mut self, doc: &mut Document, handle: LineHighlightHandle) -> Result<()> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == handle.0)
            .ok_or(EditError::StaleHandle)?;
        let entry = self.entries.remove(idx);
        let line = doc.line_of_offset(doc.marker_offset(entry.marker)?)?;
        doc.release_marker(entry.marker);
        self.damage.merge(Damage::lines(line, line));
        Ok(())
    }

    pub fn remove_all(&mut self, doc: &mut Document) -> Result<()> {
        for entry in std::mem::take(&mut self.entries) {
            let line = doc.line_of_offset(doc.marker_offset(entry.marker)?)?;
            doc.release_marker(entry.marker);
            self.damage.merge(Damage::lines(line, line));
        }
        Ok(())
    }

    /// Line currently carrying a highlight
    pub fn line_of(&self, doc: &Document, handle: LineHighlightHandle) -> Result<usize> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.id == handle.0)
            .ok_or(EditError::StaleHandle)?;
        doc.line_of_offset(doc.marker_offset(entry.marker)?)
    }

    /// Visit every highlight on a visible line inside `viewport`, in paint
    /// order. Starts at the first entry at or after the viewport's first line
    /// and stops at the first entry past its last line. Returns how many
    /// entries were examined.
    pub fn for_each_visible<F>(
        &self,
        doc: &Document,
        layout: &dyn TextLayout,
        viewport: Viewport,
        mut visitor: F,
    ) -> Result<usize>
    where
        F: FnMut(VisibleLineHighlight),
    {
        if self.entries.is_empty() {
            return Ok(0);
        }
        let first_line = layout.line_at_y(viewport.top);
        let last_line = layout.line_at_y(viewport.bottom());
        let top_offset = doc.line_start_offset(first_line)?;
        let start = self.lower_bound(doc, top_offset)?;

        let mut examined = 0;
        for entry in &self.entries[start..] {
            examined += 1;
            let line = doc.line_of_offset(doc.marker_offset(entry.marker)?)?;
            if line > last_line {
                break;
            }
            let Some(bounds) = layout.line_bounds(line) else {
                continue;
            };
            let (left, right) = layout.text_margins();
            visitor(VisibleLineHighlight {
                handle: LineHighlightHandle(entry.id),
                line,
                color: entry.color,
                rect: Rect::new(left, bounds.y, right - left, bounds.height),
            });
        }
        Ok(examined)
    }

    pub fn take_damage(&mut self) -> Damage {
        std::mem::take(&mut self.damage)
    }

    /// First index whose offset is >= `offset`
    fn lower_bound(&self, doc: &Document, offset: usize) -> Result<usize> {
        let (mut lo, mut hi) = (0, self.entries.len());
        while lo < hi {
            let mid = (lo + hi) / 2;
            if doc.marker_offset(self.entries[mid].marker)? < offset {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Ok(lo)
    }

    /// First index whose offset is > `offset`
    fn upper_bound(&self, doc: &Document, offset: usize) -> Result<usize> {
        let (mut lo, mut hi) = (0, self.entries.len());
        while lo < hi {
            let mid = (lo + hi) / 2;
            if doc.marker_offset(self.entries[mid].marker)? <= offset {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Ok(lo)
    }
}
