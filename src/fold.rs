//! Fold collaborator: the narrow query surface the core needs from code
//! folding.
//!
//! How folds are computed (brace matching, indentation, a parser) is not this
//! crate's business. A folding provider hands the core a [`FoldModel`]; the
//! core only asks which lines are hidden and where collapsed regions start.
//! [`FoldSet`] is a ready-made snapshot implementation, [`NoFolds`] is the
//! "folding disabled" stub.

use tracing::debug;

use crate::document::Document;
use crate::error::{EditError, Result};

/// Read-only fold queries consumed by the caret, the line highlight manager
/// and the gutter lanes.
pub trait FoldModel {
    /// Whether `line` is hidden inside a collapsed fold. A fold's start line
    /// is never hidden by that fold.
    fn is_line_hidden(&self, line: usize) -> bool;

    /// The fold governing `line` when folds nest from the same start line:
    /// the outermost collapsed one, else the outermost one
    fn fold_for_line(&self, line: usize) -> Option<&Fold>;

    /// The innermost expanded fold whose range contains `offset`. Descent
    /// stops at the first collapsed fold.
    fn deepest_open_fold_containing(&self, offset: usize) -> Option<&Fold>;

    /// Number of hidden lines above `line`.
    ///
    /// With `physical == false`, `line` is a logical line index. With
    /// `physical == true`, `line` is a visual row index and the count also
    /// includes lines hidden above the rows it pushes down, so
    /// `line + hidden_line_count_above(line, true)` is the logical line shown
    /// on that row.
    fn hidden_line_count_above(&self, line: usize, physical: bool) -> usize;
}

/// A contiguous, collapsible line range. `start_line` stays visible when
/// collapsed; `start_line + 1 ..= end_line` are hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    start_line: usize,
    end_line: usize,
    start_offset: usize,
    end_offset: usize,
    collapsed: bool,
    children: Vec<Fold>,
}

impl Fold {
    pub fn new(doc: &Document, start_line: usize, end_line: usize) -> Result<Self> {
        doc.check_line(end_line)?;
        if start_line > end_line {
            return Err(EditError::InvalidLine {
                line: start_line,
                line_count: end_line + 1,
            });
        }
        Ok(Self {
            start_line,
            end_line,
            start_offset: doc.line_start_offset(start_line)?,
            end_offset: doc.line_end_offset(end_line)?,
            collapsed: false,
            children: Vec::new(),
        })
    }

    pub fn start_line(&self) -> usize {
        self.start_line
    }

    pub fn end_line(&self) -> usize {
        self.end_line
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    /// Number of lines hidden when collapsed
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Whether `line` is one of the lines this fold hides
    pub fn contains_line(&self, line: usize) -> bool {
        line > self.start_line && line <= self.end_line
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        offset >= self.start_offset && offset < self.end_offset
    }

    pub fn toggle_collapsed_state(&mut self) {
        if self.line_count() > 0 {
            self.collapsed = !self.collapsed;
        }
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        if self.line_count() > 0 {
            self.collapsed = collapsed;
        }
    }

    pub fn children(&self) -> &[Fold] {
        &self.children
    }

    fn encloses(&self, other: &Fold) -> bool {
        other.start_line >= self.start_line
            && other.end_line <= self.end_line
            && (other.start_line, other.end_line) != (self.start_line, self.end_line)
    }

    fn insert_child(&mut self, fold: Fold) {
        match self.children.iter_mut().find(|c| c.encloses(&fold)) {
            Some(parent) => parent.insert_child(fold),
            None => self.children.push(fold),
        }
    }

    fn is_line_hidden(&self, line: usize) -> bool {
        if !self.contains_line(line) {
            return false;
        }
        self.collapsed || self.children.iter().any(|c| c.is_line_hidden(line))
    }

    fn fold_starting_at(&self, line: usize) -> Option<&Fold> {
        if self.start_line == line {
            return Some(self);
        }
        if !self.contains_line(line) {
            return None;
        }
        self.children.iter().find_map(|c| c.fold_starting_at(line))
    }

    fn fold_starting_at_mut(&mut self, line: usize) -> Option<&mut Fold> {
        if self.start_line == line {
            return Some(self);
        }
        if !self.contains_line(line) {
            return None;
        }
        self.children
            .iter_mut()
            .find_map(|c| c.fold_starting_at_mut(line))
    }

    /// Hidden lines of a fold starting above `line`
    fn hidden_above(&self, line: usize, physical: bool) -> usize {
        if self.collapsed {
            return self.line_count();
        }
        let mut count = 0;
        for child in &self.children {
            let comparison = if physical { line + count } else { line };
            if child.start_line >= comparison {
                break;
            }
            count += child.hidden_above(comparison, physical);
        }
        count
    }

    /// Outermost collapsed fold among this one and the nested folds sharing
    /// its start line
    fn collapsed_from_start(&self) -> Option<&Fold> {
        if self.collapsed {
            return Some(self);
        }
        self.children
            .iter()
            .filter(|c| c.start_line == self.start_line)
            .find_map(|c| c.collapsed_from_start())
    }

    /// Expand this fold and the nested folds sharing its start line
    fn expand_from_start(&mut self) -> usize {
        let line = self.start_line;
        let mut expanded = usize::from(std::mem::replace(&mut self.collapsed, false));
        for child in self.children.iter_mut().filter(|c| c.start_line == line) {
            expanded += child.expand_from_start();
        }
        expanded
    }

    fn collect_specs(&self, out: &mut Vec<(usize, usize, bool)>) {
        out.push((self.start_line, self.end_line, self.collapsed));
        for child in &self.children {
            child.collect_specs(out);
        }
    }

    fn find(&self, start_line: usize, end_line: usize) -> Option<&Fold> {
        if (self.start_line, self.end_line) == (start_line, end_line) {
            return Some(self);
        }
        if start_line < self.start_line || end_line > self.end_line {
            return None;
        }
        self.children
            .iter()
            .find_map(|c| c.find(start_line, end_line))
    }

    fn expand_containing(&mut self, line: usize) -> usize {
        if !self.contains_line(line) {
            return 0;
        }
        let mut expanded = 0;
        if self.collapsed {
            self.collapsed = false;
            expanded += 1;
        }
        expanded
            + self
                .children
                .iter_mut()
                .map(|c| c.expand_containing(line))
                .sum::<usize>()
    }
}

/// A snapshot of folds for one document, nested by containment and sorted by
/// start line. Refreshed by whoever computes folds after edits.
#[derive(Debug, Clone, Default)]
pub struct FoldSet {
    folds: Vec<Fold>,
}

impl FoldSet {
    pub fn new(doc: &Document, ranges: &[(usize, usize)]) -> Result<Self> {
        let specs: Vec<_> = ranges.iter().map(|&(start, end)| (start, end, false)).collect();
        Self::with_states(doc, &specs)
    }

    /// Build from `(start_line, end_line, collapsed)` specs. Duplicate ranges
    /// keep the first spec.
    pub fn with_states(doc: &Document, specs: &[(usize, usize, bool)]) -> Result<Self> {
        let mut sorted = specs.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
        sorted.dedup_by_key(|spec| (spec.0, spec.1));

        let mut set = FoldSet::default();
        for (start, end, collapsed) in sorted {
            let mut fold = Fold::new(doc, start, end)?;
            fold.set_collapsed(collapsed);
            match set.folds.iter_mut().find(|f| f.encloses(&fold)) {
                Some(parent) => parent.insert_child(fold),
                None => set.folds.push(fold),
            }
        }
        Ok(set)
    }

    pub fn folds(&self) -> &[Fold] {
        &self.folds
    }

    pub fn is_empty(&self) -> bool {
        self.folds.is_empty()
    }

    /// Toggle the folds starting at `line`. When any of them is collapsed
    /// they all expand, otherwise the outermost one collapses. Returns the
    /// new collapsed state of the line.
    pub fn toggle_fold_at(&mut self, line: usize) -> Option<bool> {
        let fold = self
            .folds
            .iter_mut()
            .find_map(|f| f.fold_starting_at_mut(line))?;
        if fold.collapsed_from_start().is_some() {
            let expanded = fold.expand_from_start();
            debug!(line, expanded, "expanded folds");
            Some(false)
        } else {
            fold.toggle_collapsed_state();
            debug!(line, collapsed = fold.collapsed, "toggled fold");
            Some(fold.collapsed)
        }
    }

    /// Collapse the outermost fold starting at `line`, or expand every fold
    /// starting there. Returns false when no fold starts at `line`.
    pub fn set_collapsed(&mut self, line: usize, collapsed: bool) -> bool {
        match self
            .folds
            .iter_mut()
            .find_map(|f| f.fold_starting_at_mut(line))
        {
            Some(fold) if collapsed => {
                fold.set_collapsed(true);
                true
            }
            Some(fold) => {
                fold.expand_from_start();
                true
            }
            None => false,
        }
    }

    /// Fold with exactly this line range
    pub fn find(&self, start_line: usize, end_line: usize) -> Option<&Fold> {
        self.folds
            .iter()
            .find_map(|f| f.find(start_line, end_line))
    }

    /// Every fold as `(start_line, end_line, collapsed)`, outer folds before
    /// the folds they contain
    pub fn specs(&self) -> Vec<(usize, usize, bool)> {
        let mut specs = Vec::new();
        for fold in &self.folds {
            fold.collect_specs(&mut specs);
        }
        specs
    }

    /// Outermost collapsed fold hiding `line`
    pub fn collapsed_fold_containing(&self, line: usize) -> Option<&Fold> {
        let mut level = self.folds.as_slice();
        while let Some(fold) = level.iter().find(|f| f.contains_line(line)) {
            if fold.is_collapsed() {
                return Some(fold);
            }
            level = fold.children();
        }
        None
    }

    /// Expand every collapsed fold hiding `line`. Returns how many folds
    /// were expanded.
    pub fn ensure_line_visible(&mut self, line: usize) -> usize {
        self.folds
            .iter_mut()
            .map(|f| f.expand_containing(line))
            .sum()
    }
}

impl FoldModel for FoldSet {
    fn is_line_hidden(&self, line: usize) -> bool {
        self.folds.iter().any(|f| f.is_line_hidden(line))
    }

    fn fold_for_line(&self, line: usize) -> Option<&Fold> {
        let outermost = self.folds.iter().find_map(|f| f.fold_starting_at(line))?;
        Some(outermost.collapsed_from_start().unwrap_or(outermost))
    }

    fn deepest_open_fold_containing(&self, offset: usize) -> Option<&Fold> {
        let mut deepest = None;
        let mut level = self.folds.as_slice();
        while let Some(fold) = level.iter().find(|f| f.contains_offset(offset)) {
            if fold.is_collapsed() {
                break;
            }
            deepest = Some(fold);
            level = fold.children();
        }
        deepest
    }

    fn hidden_line_count_above(&self, line: usize, physical: bool) -> usize {
        let mut count = 0;
        for fold in &self.folds {
            let comparison = if physical { line + count } else { line };
            if fold.start_line >= comparison {
                break;
            }
            count += fold.hidden_above(comparison, physical);
        }
        count
    }
}

/// Fold model for documents without folding
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFolds;

impl FoldModel for NoFolds {
    fn is_line_hidden(&self, _line: usize) -> bool {
        false
    }

    fn fold_for_line(&self, _line: usize) -> Option<&Fold> {
        None
    }

    fn deepest_open_fold_containing(&self, _offset: usize) -> Option<&Fold> {
        None
    }

    fn hidden_line_count_above(&self, _line: usize, _physical: bool) -> usize {
        0
    }
}
