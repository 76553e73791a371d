//! Geometry shared by highlight painting and the gutter lanes
//!
//! The core never shapes or measures glyphs. It only needs to know where a
//! logical line's rendered region sits vertically, which logical line is at
//! a given y, and where a column starts horizontally. [`TextLayout`] is that
//! surface. Two implementations cover the two layout regimes:
//!
//! - [`FixedLayout`]: no line wrap, every visible line is one row, all
//!   positions computed arithmetically.
//! - [`WrappedLayout`]: each logical line occupies a variable number of
//!   rows; positions come from a precomputed table.

use crate::fold::FoldModel;

/// Rectangle for layout calculations
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Visible vertical band, `top..top + height`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub top: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    /// Viewport covering `top..bottom`
    pub fn between(top: f32, bottom: f32) -> Self {
        Self {
            top,
            height: (bottom - top).max(0.0),
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Row height and top inset of the text area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMetrics {
    pub row_height: f32,
    pub inset_top: f32,
}

impl RowMetrics {
    pub fn new(row_height: f32, inset_top: f32) -> Self {
        Self {
            row_height: row_height.max(1.0),
            inset_top,
        }
    }

    /// Visual row containing `y`, clamped at the top
    pub fn row_at_y(&self, y: f32) -> usize {
        ((y - self.inset_top) / self.row_height).floor().max(0.0) as usize
    }

    pub fn row_top(&self, row: usize) -> f32 {
        self.inset_top + row as f32 * self.row_height
    }
}

/// Layout engine queries
pub trait TextLayout {
    /// Physical region of logical `line`, or `None` if the line is hidden or
    /// out of range
    fn line_bounds(&self, line: usize) -> Option<Rect>;

    /// Logical line rendered at `y`, clamped to the document
    fn line_at_y(&self, y: f32) -> usize;

    /// Left edge of `column` on its line
    fn column_x(&self, column: usize) -> f32;

    /// Left and right margins of the text region
    fn text_margins(&self) -> (f32, f32);
}

/// Unwrapped layout: one row per visible line
pub struct FixedLayout<'a> {
    metrics: RowMetrics,
    char_width: f32,
    margins: (f32, f32),
    line_count: usize,
    folds: &'a dyn FoldModel,
}

impl<'a> FixedLayout<'a> {
    pub fn new(
        metrics: RowMetrics,
        char_width: f32,
        margins: (f32, f32),
        line_count: usize,
        folds: &'a dyn FoldModel,
    ) -> Self {
        Self {
            metrics,
            char_width,
            margins,
            line_count,
            folds,
        }
    }

    pub fn metrics(&self) -> RowMetrics {
        self.metrics
    }
}

impl TextLayout for FixedLayout<'_> {
    fn line_bounds(&self, line: usize) -> Option<Rect> {
        if line >= self.line_count || self.folds.is_line_hidden(line) {
            return None;
        }
        let row = line - self.folds.hidden_line_count_above(line, false);
        Some(Rect::new(
            self.margins.0,
            self.metrics.row_top(row),
            self.margins.1 - self.margins.0,
            self.metrics.row_height,
        ))
    }

    fn line_at_y(&self, y: f32) -> usize {
        let row = self.metrics.row_at_y(y);
        let line = row + self.folds.hidden_line_count_above(row, true);
        line.min(self.line_count.saturating_sub(1))
    }

    fn column_x(&self, column: usize) -> f32 {
        self.margins.0 + column as f32 * self.char_width
    }

    fn text_margins(&self) -> (f32, f32) {
        self.margins
    }
}

/// Wrapped layout backed by a per-line row table. Hidden lines get no rows.
#[derive(Debug, Clone)]
pub struct WrappedLayout {
    metrics: RowMetrics,
    char_width: f32,
    margins: (f32, f32),
    /// Top y of each logical line
    tops: Vec<f32>,
    /// Height of each logical line (0 when hidden)
    heights: Vec<f32>,
}

impl WrappedLayout {
    /// `rows_per_line[i]` is how many rows logical line `i` wraps into.
    pub fn new(
        metrics: RowMetrics,
        char_width: f32,
        margins: (f32, f32),
        rows_per_line: &[usize],
        folds: &dyn FoldModel,
    ) -> Self {
        let mut tops = Vec::with_capacity(rows_per_line.len());
        let mut heights = Vec::with_capacity(rows_per_line.len());
        let mut y = metrics.inset_top;
        for (line, &rows) in rows_per_line.iter().enumerate() {
            let height = if folds.is_line_hidden(line) {
                0.0
            } else {
                rows.max(1) as f32 * metrics.row_height
            };
            tops.push(y);
            heights.push(height);
            y += height;
        }
        Self {
            metrics,
            char_width,
            margins,
            tops,
            heights,
        }
    }

    /// Wrap each line of `text` at `columns` chars
    pub fn rows_for_text(text: &str, columns: usize) -> Vec<usize> {
        let columns = columns.max(1);
        text.split('\n')
            .map(|line| line.chars().count().div_ceil(columns).max(1))
            .collect()
    }

    pub fn total_height(&self) -> f32 {
        match (self.tops.last(), self.heights.last()) {
            (Some(top), Some(height)) => top + height - self.metrics.inset_top,
            _ => 0.0,
        }
    }
}

impl TextLayout for WrappedLayout {
    fn line_bounds(&self, line: usize) -> Option<Rect> {
        let height = *self.heights.get(line)?;
        if height == 0.0 {
            return None;
        }
        Some(Rect::new(
            self.margins.0,
            self.tops[line],
            self.margins.1 - self.margins.0,
            height,
        ))
    }

    fn line_at_y(&self, y: f32) -> usize {
        // Last line whose top is at or above y, skipping zero-height lines
        let idx = self.tops.partition_point(|&top| top <= y);
        let mut line = idx.saturating_sub(1);
        while line > 0 && self.heights[line] == 0.0 {
            line -= 1;
        }
        line
    }

    fn column_x(&self, column: usize) -> f32 {
        self.margins.0 + column as f32 * self.char_width
    }

    fn text_margins(&self) -> (f32, f32) {
        self.margins
    }
}
