//! Icon row header lane: tracked per-line icons and bookmarks
//!
//! Icons are anchored by markers and kept sorted by offset. A line shows
//! only the most recently added icon anchored to it. Bookmarks are icons
//! whose name equals the configured bookmark icon.

use tracing::debug;

use crate::commands::Damage;
use crate::document::{Document, Marker};
use crate::error::{EditError, Result};

use super::VisibleLine;

/// Opaque handle to a tracked icon. Handles increase with insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct IconHandle(u64);

/// An icon anchored to a document offset
#[derive(Debug, Clone)]
pub struct TrackedIcon {
    handle: IconHandle,
    marker: Marker,
    icon: String,
    tooltip: Option<String>,
}

impl TrackedIcon {
    pub fn handle(&self) -> IconHandle {
        self.handle
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn offset(&self, doc: &Document) -> Result<usize> {
        doc.marker_offset(self.marker)
    }

    pub fn line(&self, doc: &Document) -> Result<usize> {
        doc.line_of_offset(self.offset(doc)?)
    }
}

/// The icon displayed on one visible line
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct IconCell {
    pub line: usize,
    pub handle: IconHandle,
    pub icon: String,
    pub y: f32,
    pub height: f32,
}

#[derive(Debug)]
pub struct IconRowHeader {
    bookmark_icon: String,
    icon_width: f32,
    icons: Vec<TrackedIcon>,
    next_id: u64,
    damage: Damage,
}

impl IconRowHeader {
    pub fn new(bookmark_icon: &str, icon_width: f32) -> Self {
        Self {
            bookmark_icon: bookmark_icon.to_string(),
            icon_width,
            icons: Vec::new(),
            next_id: 0,
            damage: Damage::None,
        }
    }

    pub fn width(&self) -> f32 {
        self.icon_width
    }

    pub fn bookmark_icon(&self) -> &str {
        &self.bookmark_icon
    }

    pub fn icons(&self) -> &[TrackedIcon] {
        &self.icons
    }

    pub fn add_icon_at_line(
        &mut self,
        doc: &mut Document,
        line: usize,
        icon: &str,
        tooltip: Option<&str>,
    ) -> Result<IconHandle> {
        let offset = doc.line_start_offset(line)?;
        self.add_icon_at_offset(doc, offset, icon, tooltip)
    }

    pub fn add_icon_at_offset(
        &mut self,
        doc: &mut Document,
        offset: usize,
        icon: &str,
        tooltip: Option<&str>,
    ) -> Result<IconHandle> {
        let line = doc.line_of_offset(offset)?;
        let idx = self.upper_bound(doc, offset)?;
        let marker = doc.create_marker(offset)?;
        let handle = IconHandle(self.next_id);
        self.next_id += 1;
        self.icons.insert(
            idx,
            TrackedIcon {
                handle,
                marker,
                icon: icon.to_string(),
                tooltip: tooltip.map(str::to_string),
            },
        );
        self.damage.merge(Damage::lines(line, line));
        debug!(line, offset, icon, "added tracked icon");
        Ok(handle)
    }

    pub fn remove_icon(&mut self, doc: &mut Document, handle: IconHandle) -> Result<()> {
        let idx = self
            .icons
            .iter()
            .position(|i| i.handle == handle)
            .ok_or(EditError::StaleHandle)?;
        self.remove_at(doc, idx)
    }

    pub fn remove_all_icons(&mut self, doc: &mut Document) -> Result<()> {
        while !self.icons.is_empty() {
            self.remove_at(doc, self.icons.len() - 1)?;
        }
        Ok(())
    }

    /// Remove the bookmarks on `line`, or add one at the line start when
    /// there are none. Other icons on the line are left alone. Returns
    /// whether a bookmark was added.
    pub fn toggle_bookmark(&mut self, doc: &mut Document, line: usize) -> Result<bool> {
        let range = doc.line_range(line)?;
        let start = self.lower_bound(doc, range.start)?;

        let mut bookmarks = Vec::new();
        for (idx, icon) in self.icons.iter().enumerate().skip(start) {
            if icon.offset(doc)? >= range.end && line + 1 < doc.line_count() {
                break;
            }
            if icon.icon == self.bookmark_icon {
                bookmarks.push(idx);
            }
        }

        if bookmarks.is_empty() {
            let icon = self.bookmark_icon.clone();
            self.add_icon_at_offset(doc, range.start, &icon, None)?;
            debug!(line, "bookmark added");
            return Ok(true);
        }
        for idx in bookmarks.into_iter().rev() {
            self.remove_at(doc, idx)?;
        }
        debug!(line, "bookmark removed");
        Ok(false)
    }

    /// Lines carrying a bookmark, ascending and without duplicates
    pub fn bookmarks(&self, doc: &Document) -> Result<Vec<usize>> {
        let mut lines = Vec::new();
        for icon in self.icons.iter().filter(|i| i.icon == self.bookmark_icon) {
            let line = icon.line(doc)?;
            if lines.last() != Some(&line) {
                lines.push(line);
            }
        }
        Ok(lines)
    }

    /// First bookmark below `from_line`, wrapping to the first bookmark
    pub fn next_bookmark(&self, doc: &Document, from_line: usize) -> Result<Option<usize>> {
        let lines = self.bookmarks(doc)?;
        Ok(lines
            .iter()
            .copied()
            .find(|&l| l > from_line)
            .or_else(|| lines.first().copied()))
    }

    /// Last bookmark above `from_line`, wrapping to the last bookmark
    pub fn prev_bookmark(&self, doc: &Document, from_line: usize) -> Result<Option<usize>> {
        let lines = self.bookmarks(doc)?;
        Ok(lines
            .iter()
            .rev()
            .copied()
            .find(|&l| l < from_line)
            .or_else(|| lines.last().copied()))
    }

    /// Most recently added icon on `line`
    pub fn displayed_icon(&self, doc: &Document, line: usize) -> Result<Option<&TrackedIcon>> {
        let range = doc.line_range(line)?;
        let last_line = line + 1 == doc.line_count();
        let start = self.lower_bound(doc, range.start)?;
        let mut shown: Option<&TrackedIcon> = None;
        for icon in &self.icons[start..] {
            let offset = icon.offset(doc)?;
            if offset >= range.end && !last_line {
                break;
            }
            if shown.map_or(true, |s| icon.handle > s.handle) {
                shown = Some(icon);
            }
        }
        Ok(shown)
    }

    pub fn paint(&self, doc: &Document, lines: &[VisibleLine]) -> Result<Vec<IconCell>> {
        let mut cells = Vec::new();
        if self.icons.is_empty() {
            return Ok(cells);
        }
        for visible in lines {
            if let Some(icon) = self.displayed_icon(doc, visible.line)? {
                cells.push(IconCell {
                    line: visible.line,
                    handle: icon.handle,
                    icon: icon.icon.clone(),
                    y: visible.y,
                    height: visible.height,
                });
            }
        }
        Ok(cells)
    }

    /// Tooltip of the icon displayed under `y`
    pub fn tooltip_at(
        &self,
        doc: &Document,
        lines: &[VisibleLine],
        y: f32,
    ) -> Result<Option<String>> {
        let Some(visible) = lines.iter().find(|l| y >= l.y && y < l.y + l.height) else {
            return Ok(None);
        };
        Ok(self
            .displayed_icon(doc, visible.line)?
            .and_then(|icon| icon.tooltip.clone()))
    }

    pub fn take_damage(&mut self) -> Damage {
        std::mem::take(&mut self.damage)
    }

    fn remove_at(&mut self, doc: &mut Document, idx: usize) -> Result<()> {
        let icon = self.icons.remove(idx);
        let line = icon.line(doc)?;
        doc.release_marker(icon.marker);
        self.damage.merge(Damage::lines(line, line));
        Ok(())
    }

    /// First index whose offset is >= `offset`
    fn lower_bound(&self, doc: &Document, offset: usize) -> Result<usize> {
        let (mut lo, mut hi) = (0, self.icons.len());
        while lo < hi {
            let mid = (lo + hi) / 2;
            if self.icons[mid].offset(doc)? < offset {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Ok(lo)
    }

    /// First index whose offset is > `offset`
    fn upper_bound(&self, doc: &Document, offset: usize) -> Result<usize> {
        let (mut lo, mut hi) = (0, self.icons.len());
        while lo < hi {
            let mid = (lo + hi) / 2;
            if self.icons[mid].offset(doc)? <= offset {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Ok(lo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOKMARK: &str = "bookmark";

    fn doc(n: usize) -> Document {
        let text: Vec<String> = (0..n).map(|i| format!("line {}", i)).collect();
        Document::with_text(&text.join("\n"))
    }

    fn rows(lines: &[usize]) -> Vec<VisibleLine> {
        lines
            .iter()
            .enumerate()
            .map(|(row, &line)| VisibleLine {
                line,
                y: row as f32 * 10.0,
                height: 10.0,
            })
            .collect()
    }

    #[test]
    fn test_toggle_bookmark_adds_then_removes() {
        let mut doc = doc(10);
        let mut header = IconRowHeader::new(BOOKMARK, 16.0);
        assert!(header.toggle_bookmark(&mut doc, 4).unwrap());
        assert_eq!(header.bookmarks(&doc).unwrap(), vec![4]);
        assert!(!header.toggle_bookmark(&mut doc, 4).unwrap());
        assert!(header.bookmarks(&doc).unwrap().is_empty());
        assert_eq!(doc.live_marker_count(), 0);
    }

    #[test]
    fn test_toggle_bookmark_keeps_other_icons() {
        let mut doc = doc(10);
        let mut header = IconRowHeader::new(BOOKMARK, 16.0);
        let error = header
            .add_icon_at_line(&mut doc, 2, "error", Some("type mismatch"))
            .unwrap();
        header.add_icon_at_line(&mut doc, 2, BOOKMARK, None).unwrap();

        assert!(!header.toggle_bookmark(&mut doc, 2).unwrap());
        assert_eq!(header.icons().len(), 1);
        assert_eq!(header.icons()[0].handle(), error);
    }

    #[test]
    fn test_most_recent_icon_wins() {
        let mut doc = doc(10);
        let mut header = IconRowHeader::new(BOOKMARK, 16.0);
        let mid_line = doc.line_start_offset(3).unwrap() + 3;
        header
            .add_icon_at_offset(&mut doc, mid_line, "warning", None)
            .unwrap();
        let later = header.add_icon_at_line(&mut doc, 3, "error", None).unwrap();

        let cells = header.paint(&doc, &rows(&[2, 3, 4])).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].line, 3);
        assert_eq!(cells[0].handle, later);
        assert_eq!(cells[0].y, 10.0);
    }

    #[test]
    fn test_icons_stay_sorted_by_offset() {
        let mut doc = doc(10);
        let mut header = IconRowHeader::new(BOOKMARK, 16.0);
        for line in [7, 1, 4] {
            header.add_icon_at_line(&mut doc, line, "x", None).unwrap();
        }
        let lines: Vec<_> = header
            .icons()
            .iter()
            .map(|i| i.line(&doc).unwrap())
            .collect();
        assert_eq!(lines, vec![1, 4, 7]);
    }

    #[test]
    fn test_bookmark_navigation_wraps() {
        let mut doc = doc(20);
        let mut header = IconRowHeader::new(BOOKMARK, 16.0);
        for line in [3, 9, 15] {
            header.toggle_bookmark(&mut doc, line).unwrap();
        }

        assert_eq!(header.next_bookmark(&doc, 3).unwrap(), Some(9));
        assert_eq!(header.next_bookmark(&doc, 15).unwrap(), Some(3));
        assert_eq!(header.prev_bookmark(&doc, 9).unwrap(), Some(3));
        assert_eq!(header.prev_bookmark(&doc, 2).unwrap(), Some(15));

        let empty = IconRowHeader::new(BOOKMARK, 16.0);
        assert_eq!(empty.next_bookmark(&doc, 0).unwrap(), None);
    }

    #[test]
    fn test_bookmark_on_last_line() {
        let mut doc = doc(3);
        let mut header = IconRowHeader::new(BOOKMARK, 16.0);
        assert!(header.toggle_bookmark(&mut doc, 2).unwrap());
        assert!(!header.toggle_bookmark(&mut doc, 2).unwrap());
    }

    #[test]
    fn test_tooltip_at() {
        let mut doc = doc(5);
        let mut header = IconRowHeader::new(BOOKMARK, 16.0);
        header
            .add_icon_at_line(&mut doc, 1, "error", Some("unused variable"))
            .unwrap();
        let lines = rows(&[0, 1, 2]);
        assert_eq!(
            header.tooltip_at(&doc, &lines, 15.0).unwrap().as_deref(),
            Some("unused variable")
        );
        assert_eq!(header.tooltip_at(&doc, &lines, 5.0).unwrap(), None);
    }

    #[test]
    fn test_remove_icon_and_stale_handle() {
        let mut doc = doc(5);
        let mut header = IconRowHeader::new(BOOKMARK, 16.0);
        let h = header.add_icon_at_line(&mut doc, 1, "x", None).unwrap();
        header.add_icon_at_line(&mut doc, 2, "y", None).unwrap();
        header.take_damage();

        header.remove_icon(&mut doc, h).unwrap();
        assert_eq!(header.take_damage(), Damage::lines(1, 1));
        assert_eq!(header.remove_icon(&mut doc, h), Err(EditError::StaleHandle));

        header.remove_all_icons(&mut doc).unwrap();
        assert!(header.icons().is_empty());
    }
}
