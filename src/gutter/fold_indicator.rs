//! Fold indicator lane
//!
//! Draws a collapsed or expanded glyph on every fold start line, outlines
//! the innermost open fold around the caret, and previews the hidden text
//! of a collapsed fold as a tooltip.

use crate::document::Document;
use crate::error::Result;
use crate::fold::FoldModel;
use crate::layout::Viewport;

use super::{line_extent, LayoutMode, VisibleLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum FoldGlyphState {
    Collapsed,
    Expanded,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FoldGlyph {
    pub line: usize,
    pub y: f32,
    pub height: f32,
    pub state: FoldGlyphState,
}

/// Vertical extent of the open fold around the caret
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FoldOutline {
    pub start_line: usize,
    pub end_line: usize,
    pub top: f32,
    pub bottom: f32,
}

#[derive(Debug, Clone)]
pub struct FoldIndicatorLane {
    glyph_width: f32,
    tooltip_max_lines: usize,
}

impl FoldIndicatorLane {
    pub fn new(glyph_width: f32, tooltip_max_lines: usize) -> Self {
        Self {
            glyph_width,
            tooltip_max_lines: tooltip_max_lines.max(1),
        }
    }

    pub fn width(&self) -> f32 {
        self.glyph_width
    }

    pub fn paint(&self, lines: &[VisibleLine], folds: &dyn FoldModel) -> Vec<FoldGlyph> {
        lines
            .iter()
            .filter_map(|visible| {
                let fold = folds.fold_for_line(visible.line)?;
                if fold.line_count() == 0 {
                    return None;
                }
                Some(FoldGlyph {
                    line: visible.line,
                    y: visible.y,
                    height: visible.height,
                    state: if fold.is_collapsed() {
                        FoldGlyphState::Collapsed
                    } else {
                        FoldGlyphState::Expanded
                    },
                })
            })
            .collect()
    }

    /// Fold start line whose glyph is under `y`
    pub fn glyph_line_at(
        &self,
        lines: &[VisibleLine],
        folds: &dyn FoldModel,
        y: f32,
    ) -> Option<usize> {
        let visible = lines.iter().find(|l| y >= l.y && y < l.y + l.height)?;
        folds
            .fold_for_line(visible.line)
            .filter(|f| f.line_count() > 0)
            .map(|_| visible.line)
    }

    /// Preview of the text a collapsed fold hides, when hovering its glyph.
    /// Starts at the fold's first line and is cut at the configured maximum
    /// with a trailing `...` line.
    pub fn tooltip_at(
        &self,
        doc: &Document,
        lines: &[VisibleLine],
        folds: &dyn FoldModel,
        y: f32,
    ) -> Result<Option<String>> {
        let Some(line) = self.glyph_line_at(lines, folds, y) else {
            return Ok(None);
        };
        let Some(fold) = folds.fold_for_line(line).filter(|f| f.is_collapsed()) else {
            return Ok(None);
        };

        let last = fold
            .end_line()
            .min(fold.start_line() + self.tooltip_max_lines - 1);
        let mut preview = Vec::with_capacity(last - fold.start_line() + 2);
        for l in fold.start_line()..=last {
            preview.push(doc.line_text(l)?);
        }
        if last < fold.end_line() {
            preview.push("...".to_string());
        }
        Ok(Some(preview.join("\n")))
    }

    /// Outline of the innermost open fold containing the caret, if any part
    /// of it is inside the viewport
    pub fn outline(
        &self,
        folds: &dyn FoldModel,
        caret_offset: usize,
        mode: LayoutMode<'_>,
        viewport: Viewport,
    ) -> Option<FoldOutline> {
        let fold = folds.deepest_open_fold_containing(caret_offset)?;
        if fold.line_count() == 0 {
            return None;
        }
        let (top, _) = line_extent(mode, folds, fold.start_line())?;
        let (_, bottom) = line_extent(mode, folds, fold.end_line())?;
        if bottom <= viewport.top || top > viewport.bottom() {
            return None;
        }
        Some(FoldOutline {
            start_line: fold.start_line(),
            end_line: fold.end_line(),
            top,
            bottom,
        })
    }
}
