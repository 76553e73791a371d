//! Gutter: line numbers, fold indicators and the icon row header
//!
//! Every lane first derives which logical lines are visible in a pixel band
//! and where each one sits, then paints per-line content. The derivation
//! has two forms:
//!
//! - Fixed rows: arithmetic. The first row is `floor((top - inset) / h)`,
//!   mapped to a logical line through the fold model, then one row per
//!   visible line.
//! - Wrapped: per-line bounds from the layout, accumulating y.
//!
//! Both walk forward one logical line at a time and jump over collapsed
//! folds.

pub mod fold_indicator;
pub mod icon_row;
pub mod line_numbers;

use tracing::trace;

use crate::commands::Damage;
use crate::document::Document;
use crate::error::Result;
use crate::fold::FoldModel;
use crate::layout::{RowMetrics, TextLayout, Viewport};

pub use fold_indicator::{FoldGlyph, FoldGlyphState, FoldIndicatorLane, FoldOutline};
pub use icon_row::{IconCell, IconHandle, IconRowHeader, TrackedIcon};
pub use line_numbers::{LineNumberCell, LineNumberLane};

/// How the text area lays out logical lines
#[derive(Clone, Copy)]
pub enum LayoutMode<'a> {
    /// One row of fixed height per visible line
    Fixed(RowMetrics),
    /// Variable rows per line, measured by the layout engine
    Wrapped(&'a dyn TextLayout),
}

/// A logical line inside the viewport and its vertical extent
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct VisibleLine {
    pub line: usize,
    pub y: f32,
    pub height: f32,
}

/// Logical lines visible in `viewport`, top to bottom
pub fn visible_lines(
    mode: LayoutMode<'_>,
    viewport: Viewport,
    folds: &dyn FoldModel,
    line_count: usize,
) -> Vec<VisibleLine> {
    if line_count == 0 {
        return Vec::new();
    }
    match mode {
        LayoutMode::Fixed(metrics) => fixed_visible_lines(metrics, viewport, folds, line_count),
        LayoutMode::Wrapped(layout) => wrapped_visible_lines(layout, viewport, folds, line_count),
    }
}

fn fixed_visible_lines(
    metrics: RowMetrics,
    viewport: Viewport,
    folds: &dyn FoldModel,
    line_count: usize,
) -> Vec<VisibleLine> {
    let first_row = metrics.row_at_y(viewport.top);
    let last_row = metrics.row_at_y(viewport.bottom());

    let mut line = first_row + folds.hidden_line_count_above(first_row, true);
    let mut row = first_row;
    let mut lines = Vec::with_capacity(last_row.saturating_sub(first_row) + 1);
    while row <= last_row && line < line_count {
        lines.push(VisibleLine {
            line,
            y: metrics.row_top(row),
            height: metrics.row_height,
        });
        line = next_visible_line(folds, line);
        row += 1;
    }
    trace!(first_row, last_row, count = lines.len(), "fixed visible lines");
    lines
}

fn wrapped_visible_lines(
    layout: &dyn TextLayout,
    viewport: Viewport,
    folds: &dyn FoldModel,
    line_count: usize,
) -> Vec<VisibleLine> {
    let mut line = layout.line_at_y(viewport.top).min(line_count - 1);
    while line > 0 && folds.is_line_hidden(line) {
        line -= 1;
    }

    let mut lines = Vec::new();
    let mut y = None;
    while line < line_count {
        let Some(bounds) = layout.line_bounds(line) else {
            line += 1;
            continue;
        };
        let top = *y.get_or_insert(bounds.y);
        if top > viewport.bottom() {
            break;
        }
        lines.push(VisibleLine {
            line,
            y: top,
            height: bounds.height,
        });
        y = Some(top + bounds.height);
        line = next_visible_line(folds, line);
    }
    trace!(count = lines.len(), "wrapped visible lines");
    lines
}

/// Line after `line`, jumping over a collapsed fold that starts on it. A
/// second collapsed fold starting where the first one ends is jumped too.
fn next_visible_line(folds: &dyn FoldModel, mut line: usize) -> usize {
    while let Some(fold) = folds.fold_for_line(line).filter(|f| f.is_collapsed()) {
        if fold.line_count() == 0 {
            break;
        }
        line += fold.line_count();
    }
    line + 1
}

/// Vertical band a lane must repaint
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub enum GutterClip {
    Nothing,
    All,
    Band { top: f32, bottom: f32 },
}

/// Per-frame paint output of every lane
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GutterPaint {
    pub width: f32,
    pub lines: Vec<VisibleLine>,
    pub numbers: Vec<LineNumberCell>,
    pub folds: Vec<FoldGlyph>,
    pub fold_outline: Option<FoldOutline>,
    pub icons: Vec<IconCell>,
}

/// The three lanes laid out left to right: icons, line numbers, fold
/// indicators
#[derive(Debug)]
pub struct Gutter {
    pub icons: IconRowHeader,
    pub line_numbers: LineNumberLane,
    pub fold_indicator: FoldIndicatorLane,
    damage: Damage,
}

impl Gutter {
    pub fn new(
        icons: IconRowHeader,
        line_numbers: LineNumberLane,
        fold_indicator: FoldIndicatorLane,
    ) -> Self {
        Self {
            icons,
            line_numbers,
            fold_indicator,
            damage: Damage::None,
        }
    }

    pub fn width(&self) -> f32 {
        self.icons.width() + self.line_numbers.width() + self.fold_indicator.width()
    }

    /// Left edge of each lane, relative to the gutter
    pub fn lane_offsets(&self) -> (f32, f32, f32) {
        let numbers = self.icons.width();
        let folds = numbers + self.line_numbers.width();
        (0.0, numbers, folds)
    }

    /// React to a line count change. Damages the whole gutter when the line
    /// number lane changed width.
    pub fn on_line_count_changed(&mut self, line_count: usize) {
        if self.line_numbers.update_width(line_count) {
            self.damage.merge(Damage::gutter());
        }
    }

    pub fn take_damage(&mut self) -> Damage {
        let mut damage = std::mem::take(&mut self.damage);
        damage.merge(self.icons.take_damage());
        damage
    }

    pub fn paint(
        &self,
        doc: &Document,
        folds: &dyn FoldModel,
        mode: LayoutMode<'_>,
        viewport: Viewport,
        caret_line: usize,
        caret_offset: usize,
    ) -> Result<GutterPaint> {
        let lines = visible_lines(mode, viewport, folds, doc.line_count());
        let numbers = self.line_numbers.paint(&lines, caret_line);
        let fold_glyphs = self.fold_indicator.paint(&lines, folds);
        let fold_outline = self
            .fold_indicator
            .outline(folds, caret_offset, mode, viewport);
        let icons = self.icons.paint(doc, &lines)?;
        Ok(GutterPaint {
            width: self.width(),
            lines,
            numbers,
            folds: fold_glyphs,
            fold_outline,
            icons,
        })
    }

    /// Pixel band covering `damage`. Hidden lines in the damage map to the
    /// visible line above them.
    pub fn damage_clip(
        &self,
        damage: &Damage,
        doc: &Document,
        folds: &dyn FoldModel,
        mode: LayoutMode<'_>,
    ) -> Result<GutterClip> {
        if !damage.needs_redraw() {
            return Ok(GutterClip::Nothing);
        }
        if damage.includes_gutter() {
            return Ok(GutterClip::All);
        }
        let Some((first, last)) = damage.line_span(doc)? else {
            return Ok(GutterClip::All);
        };
        let last_line = doc.line_count().saturating_sub(1);
        let first = line_extent(mode, folds, first.min(last_line));
        let last = line_extent(mode, folds, last.min(last_line));
        Ok(match first.zip(last) {
            Some(((top, _), (_, bottom))) => GutterClip::Band { top, bottom },
            None => GutterClip::All,
        })
    }
}

/// Top and bottom y of `line`. A hidden line maps to the visible line above
/// it, which is the start line of the collapsed fold hiding it.
pub(crate) fn line_extent(
    mode: LayoutMode<'_>,
    folds: &dyn FoldModel,
    line: usize,
) -> Option<(f32, f32)> {
    let line = visible_at_or_above(folds, line);
    match mode {
        LayoutMode::Fixed(metrics) => {
            let row = line.saturating_sub(folds.hidden_line_count_above(line, false));
            let top = metrics.row_top(row);
            Some((top, top + metrics.row_height))
        }
        LayoutMode::Wrapped(layout) => layout.line_bounds(line).map(|b| (b.y, b.bottom())),
    }
}

fn visible_at_or_above(folds: &dyn FoldModel, mut line: usize) -> usize {
    while line > 0 && folds.is_line_hidden(line) {
        line -= 1;
    }
    line
}
