//! Repaint notifications emitted by the core

use crate::document::Document;
use crate::error::Result;

// ============================================================================
// Damage Tracking (partial redraw optimization)
// ============================================================================

/// Represents which parts of the text area need redrawing
///
/// Accumulated across operations and drained by the host with
/// `TextArea::take_damage`. When in doubt, use `Damage::Full` for correctness.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub enum Damage {
    /// No redraw needed (default state for accumulation)
    #[default]
    None,
    /// Redraw everything (always safe fallback)
    Full,
    /// Redraw specific areas only
    Areas(Vec<DamageArea>),
}

/// Independently redrawable regions
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum DamageArea {
    /// Char range `start..end` of the text region. Zero-width ranges damage
    /// the caret-sized mark at `start`.
    Range { start: usize, end: usize },
    /// Logical lines `first..=last`, text region and gutter alike
    Lines { first: usize, last: usize },
    /// The whole gutter (a lane changed width)
    Gutter,
}

impl Damage {
    /// Damage for a char range
    pub fn range(start: usize, end: usize) -> Self {
        Damage::Areas(vec![DamageArea::Range {
            start: start.min(end),
            end: start.max(end),
        }])
    }

    /// Damage for an inclusive line span
    pub fn lines(first: usize, last: usize) -> Self {
        Damage::Areas(vec![DamageArea::Lines {
            first: first.min(last),
            last: first.max(last),
        }])
    }

    pub fn gutter() -> Self {
        Damage::Areas(vec![DamageArea::Gutter])
    }

    /// Merge another damage into this one
    ///
    /// If either damage is Full, the result is Full.
    /// If either damage is None, the other takes precedence.
    /// Otherwise, areas are combined with deduplication.
    pub fn merge(&mut self, other: Damage) {
        match (&mut *self, other) {
            (Damage::None, other) => *self = other,
            (_, Damage::None) => {}
            (Damage::Full, _) => {}
            (this, Damage::Full) => *this = Damage::Full,
            (Damage::Areas(areas), Damage::Areas(other_areas)) => {
                for area in other_areas {
                    if !areas.contains(&area) {
                        areas.push(area);
                    }
                }
            }
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Damage::Full)
    }

    /// Check if this damage includes the whole gutter (or is full)
    pub fn includes_gutter(&self) -> bool {
        match self {
            Damage::None => false,
            Damage::Full => true,
            Damage::Areas(areas) => areas.iter().any(|a| matches!(a, DamageArea::Gutter)),
        }
    }

    /// Check if any redraw is needed
    pub fn needs_redraw(&self) -> bool {
        match self {
            Damage::None => false,
            Damage::Full => true,
            Damage::Areas(areas) => !areas.is_empty(),
        }
    }

    /// Carry pending char ranges across an insert of `len` chars at `at`.
    /// Range ends move like sticky markers.
    pub fn shift_for_insert(&mut self, at: usize, len: usize) {
        self.shift_ranges(|offset| if offset >= at { offset + len } else { offset });
    }

    /// Carry pending char ranges across the removal of `start..end`. Range
    /// ends inside the removed text clamp to `start`.
    pub fn shift_for_remove(&mut self, start: usize, end: usize) {
        let removed = end.saturating_sub(start);
        self.shift_ranges(|offset| {
            if offset >= end {
                offset - removed
            } else if offset > start {
                start
            } else {
                offset
            }
        });
    }

    fn shift_ranges(&mut self, shift: impl Fn(usize) -> usize) {
        let Damage::Areas(areas) = self else {
            return;
        };
        for area in areas.iter_mut() {
            if let DamageArea::Range { start, end } = area {
                *start = shift(*start);
                *end = shift(*end);
            }
        }
        let mut unique = Vec::with_capacity(areas.len());
        for area in areas.drain(..) {
            if !unique.contains(&area) {
                unique.push(area);
            }
        }
        *areas = unique;
    }

    /// Smallest inclusive line span covering every range and line area.
    /// `None` for no damage, full damage, or gutter-only damage.
    pub fn line_span(&self, doc: &Document) -> Result<Option<(usize, usize)>> {
        let Damage::Areas(areas) = self else {
            return Ok(None);
        };
        let mut span: Option<(usize, usize)> = None;
        for area in areas {
            let (first, last) = match *area {
                DamageArea::Range { start, end } => {
                    (doc.line_of_offset(start)?, doc.line_of_offset(end)?)
                }
                DamageArea::Lines { first, last } => (first, last),
                DamageArea::Gutter => continue,
            };
            span = Some(match span {
                Some((lo, hi)) => (lo.min(first), hi.max(last)),
                None => (first, last),
            });
        }
        Ok(span)
    }
}
