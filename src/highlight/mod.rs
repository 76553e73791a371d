//! Highlight store: marker-anchored ranges in tagged layers
//!
//! Highlights live in one of three layers painted in a fixed order
//! (custom, then mark-all, then selection). Layers are never merged: a
//! mark-all match inside the selection still produces its own paint op, and
//! each layer composites differently so both stay distinguishable.
//!
//! Painting a highlight decomposes it per line:
//!
//! ```text
//!   start line:   [start ---------------> right margin]
//!   middle lines: [left margin ----------> right margin]
//!   end line:     [left margin --> end]
//! ```
//!
//! Zero-width highlights paint a caret-sized mark.

pub mod line;

use std::ops::Range;

use tracing::{debug, trace};

use crate::commands::Damage;
use crate::document::{Document, Marker};
use crate::error::{EditError, Result};
use crate::layout::{Rect, TextLayout, Viewport};
use crate::theme::Color;

pub use line::{LineHighlightHandle, LineHighlightManager, VisibleLineHighlight};

/// Width of the mark painted for a zero-width highlight
pub const CARET_MARK_WIDTH: f32 = 2.0;

/// Highlight layer. Declaration order is paint order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Explicit API highlights (occurrence marking, diagnostics)
    Custom,
    /// Search "mark all" occurrences
    MarkAll,
    /// The caret selection
    Selection,
}

impl Layer {
    pub const PAINT_ORDER: [Layer; 3] = [Layer::Custom, Layer::MarkAll, Layer::Selection];

    pub fn composite(self) -> Composite {
        match self {
            Layer::Custom => Composite::SourceOver,
            Layer::MarkAll => Composite::SourceOver,
            // Translucent so mark-all matches underneath stay visible
            Layer::Selection => Composite::Alpha(0x80),
        }
    }
}

/// How a layer's paint is combined with what is already drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Composite {
    /// Paint the painter's color with its own alpha
    SourceOver,
    /// Scale the painter's alpha to this value before blending
    Alpha(u8),
}

impl Composite {
    pub fn apply(self, color: Color) -> Color {
        match self {
            Composite::SourceOver => color,
            Composite::Alpha(a) => color.with_alpha(((color.a as u16 * a as u16) / 255) as u8),
        }
    }
}

/// Paint strategy for a highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "style", content = "color")]
pub enum Painter {
    Fill(Color),
    Outline(Color),
    Underline(Color),
    Squiggle(Color),
}

impl Painter {
    pub fn color(&self) -> Color {
        match *self {
            Painter::Fill(c) | Painter::Outline(c) | Painter::Underline(c) | Painter::Squiggle(c) => {
                c
            }
        }
    }
}

/// Opaque handle to a highlight in a [`HighlightStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct HighlightHandle(u64);

#[derive(Debug, Clone)]
struct Highlight {
    id: u64,
    start: Marker,
    end: Marker,
    painter: Painter,
    layer: Layer,
}

/// A highlight resolved against the current document
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ActiveHighlight {
    pub handle: HighlightHandle,
    pub range: Range<usize>,
    pub painter: Painter,
    pub layer: Layer,
}

impl ActiveHighlight {
    pub fn is_zero_width(&self) -> bool {
        self.range.is_empty()
    }
}

/// Shape of one per-line piece of a highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum SegmentKind {
    /// Start and end on the same line
    Partial,
    /// Start line of a multi-line highlight
    ToRightMargin,
    /// Line fully enclosed by a multi-line highlight
    FullLine,
    /// End line of a multi-line highlight
    FromLeftMargin,
    /// Zero-width highlight
    Caret,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Segment {
    pub line: usize,
    pub kind: SegmentKind,
    pub rect: Rect,
}

/// One rectangle to paint, in paint order
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PaintOp {
    pub handle: HighlightHandle,
    pub layer: Layer,
    pub composite: Composite,
    pub painter: Painter,
    pub segment: Segment,
}

/// Owns every range highlight of one document
#[derive(Debug, Default)]
pub struct HighlightStore {
    highlights: Vec<Highlight>,
    next_id: u64,
    damage: Damage,
}

impl HighlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.highlights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
    }

    pub fn layer_len(&self, layer: Layer) -> usize {
        self.highlights.iter().filter(|h| h.layer == layer).count()
    }

    /// Anchor a highlight on `start..end`
    pub fn add(
        &mut self,
        doc: &mut Document,
        start: usize,
        end: usize,
        painter: Painter,
        layer: Layer,
    ) -> Result<HighlightHandle> {
        if end < start || end > doc.len() {
            return Err(EditError::InvalidRange {
                offset: start,
                len: end.saturating_sub(start),
                length: doc.len(),
            });
        }
        let start_marker = doc.create_marker(start)?;
        let end_marker = doc.create_marker(end)?;
        let id = self.next_id;
        self.next_id += 1;
        self.highlights.push(Highlight {
            id,
            start: start_marker,
            end: end_marker,
            painter,
            layer,
        });
        self.damage.merge(Damage::range(start, end));
        trace!(id, start, end, ?layer, "added highlight");
        Ok(HighlightHandle(id))
    }

    /// Remove one highlight, damaging exactly its range
    pub fn remove(&mut self, doc: &mut Document, handle: HighlightHandle) -> Result<()> {
        let idx = self
            .highlights
            .iter()
            .position(|h| h.id == handle.0)
            .ok_or(EditError::StaleHandle)?;
        let highlight = self.highlights.remove(idx);
        let range = self.release(doc, &highlight)?;
        self.damage.merge(Damage::range(range.start, range.end));
        trace!(id = handle.0, ?range, "removed highlight");
        Ok(())
    }

    /// Remove every highlight in `layer`. Returns how many were removed.
    pub fn clear_layer(&mut self, doc: &mut Document, layer: Layer) -> Result<usize> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.highlights)
            .into_iter()
            .partition(|h| h.layer == layer);
        self.highlights = kept;
        for highlight in &removed {
            let range = self.release(doc, highlight)?;
            self.damage.merge(Damage::range(range.start, range.end));
        }
        debug!(?layer, count = removed.len(), "cleared highlight layer");
        Ok(removed.len())
    }

    /// Move an existing highlight to a new range
    pub fn update(
        &mut self,
        doc: &mut Document,
        handle: HighlightHandle,
        start: usize,
        end: usize,
    ) -> Result<()> {
        if end < start || end > doc.len() {
            return Err(EditError::InvalidRange {
                offset: start,
                len: end.saturating_sub(start),
                length: doc.len(),
            });
        }
        let highlight = self
            .highlights
            .iter()
            .find(|h| h.id == handle.0)
            .ok_or(EditError::StaleHandle)?;
        let (start_marker, end_marker) = (highlight.start, highlight.end);
        let old = doc.marker_offset(start_marker)?..doc.marker_offset(end_marker)?;
        if old == (start..end) {
            return Ok(());
        }
        doc.move_marker(start_marker, start)?;
        doc.move_marker(end_marker, end)?;
        self.damage.merge(Damage::range(old.start, old.end));
        self.damage.merge(Damage::range(start, end));
        Ok(())
    }

    /// Current range of a highlight
    pub fn get(&self, doc: &Document, handle: HighlightHandle) -> Result<ActiveHighlight> {
        let highlight = self
            .highlights
            .iter()
            .find(|h| h.id == handle.0)
            .ok_or(EditError::StaleHandle)?;
        self.resolve(doc, highlight)
    }

    /// Highlights overlapping `start..end`, in paint order (layer, then
    /// insertion order within a layer). A zero-width highlight overlaps when
    /// its offset is inside the range, or at `end` when `end` is the end of
    /// the document.
    pub fn query(&self, doc: &Document, start: usize, end: usize) -> Result<Vec<ActiveHighlight>> {
        let mut result = Vec::new();
        for layer in Layer::PAINT_ORDER {
            for highlight in self.highlights.iter().filter(|h| h.layer == layer) {
                let active = self.resolve(doc, highlight)?;
                let r = &active.range;
                let overlaps = if r.is_empty() {
                    (r.start >= start && r.start < end) || (r.start == end && end == doc.len())
                } else {
                    r.start < end && r.end > start
                };
                if overlaps {
                    result.push(active);
                }
            }
        }
        Ok(result)
    }

    /// Per-line decomposition of one highlight. Hidden lines produce no
    /// segment.
    pub fn segments(
        &self,
        doc: &Document,
        layout: &dyn TextLayout,
        highlight: &ActiveHighlight,
    ) -> Result<Vec<Segment>> {
        let first = doc.line_of_offset(highlight.range.start)?;
        let last = doc.line_of_offset(highlight.range.end)?;
        segments_between(doc, layout, &highlight.range, first, last)
    }

    /// Paint ops for everything visible in `viewport`, in paint order
    pub fn paint(
        &self,
        doc: &Document,
        layout: &dyn TextLayout,
        viewport: Viewport,
    ) -> Result<Vec<PaintOp>> {
        if doc.line_count() == 0 {
            return Ok(Vec::new());
        }
        let first_line = layout.line_at_y(viewport.top);
        let last_line = layout.line_at_y(viewport.bottom());
        let start = doc.line_start_offset(first_line)?;
        let end = doc.line_end_offset(last_line)?;

        let mut ops = Vec::new();
        for active in self.query(doc, start, end)? {
            let first = doc.line_of_offset(active.range.start)?;
            let last = doc.line_of_offset(active.range.end)?;
            let segments = segments_between(
                doc,
                layout,
                &active.range,
                first.max(first_line).min(last),
                last.min(last_line).max(first),
            )?;
            let composite = active.layer.composite();
            ops.extend(segments.into_iter().map(|segment| PaintOp {
                handle: active.handle,
                layer: active.layer,
                composite,
                painter: active.painter,
                segment,
            }));
        }
        Ok(ops)
    }

    /// Drain accumulated damage
    pub fn take_damage(&mut self) -> Damage {
        std::mem::take(&mut self.damage)
    }

    fn resolve(&self, doc: &Document, highlight: &Highlight) -> Result<ActiveHighlight> {
        let start = doc.marker_offset(highlight.start)?;
        let end = doc.marker_offset(highlight.end)?.max(start);
        Ok(ActiveHighlight {
            handle: HighlightHandle(highlight.id),
            range: start..end,
            painter: highlight.painter,
            layer: highlight.layer,
        })
    }

    fn release(&self, doc: &mut Document, highlight: &Highlight) -> Result<Range<usize>> {
        let range = self.resolve(doc, highlight)?;
        doc.release_marker(highlight.start);
        doc.release_marker(highlight.end);
        Ok(range.range)
    }
}

/// Segments of `range` on lines `first..=last`
fn segments_between(
    doc: &Document,
    layout: &dyn TextLayout,
    range: &Range<usize>,
    first: usize,
    last: usize,
) -> Result<Vec<Segment>> {
    let start_line = doc.line_of_offset(range.start)?;
    let end_line = doc.line_of_offset(range.end)?;
    let (left, right) = layout.text_margins();
    let mut segments = Vec::new();

    for line in first..=last {
        let Some(bounds) = layout.line_bounds(line) else {
            continue;
        };
        let line_start = doc.line_start_offset(line)?;
        let rect_between = |x0: f32, x1: f32| Rect::new(x0, bounds.y, (x1 - x0).max(0.0), bounds.height);

        let (kind, rect) = if range.is_empty() {
            let x = layout.column_x(range.start - line_start);
            (SegmentKind::Caret, rect_between(x, x + CARET_MARK_WIDTH))
        } else if start_line == end_line {
            let x0 = layout.column_x(range.start - line_start);
            let x1 = layout.column_x(range.end - line_start);
            (SegmentKind::Partial, rect_between(x0, x1))
        } else if line == start_line {
            let x0 = layout.column_x(range.start - line_start);
            (SegmentKind::ToRightMargin, rect_between(x0, right))
        } else if line == end_line {
            let column = range.end - line_start;
            if column == 0 {
                // Ends at the very start of the line; nothing of it is covered
                continue;
            }
            (SegmentKind::FromLeftMargin, rect_between(left, layout.column_x(column)))
        } else {
            (SegmentKind::FullLine, rect_between(left, right))
        };
        segments.push(Segment { line, kind, rect });
    }
    Ok(segments)
}
