//! Document model - the mutable text buffer and its sticky markers
//!
//! The buffer is a `ropey::Rope`, so line structure is maintained
//! incrementally by the rope itself. All offsets are char offsets.
//!
//! Every mutation runs the marker shift pass before returning, which makes
//! markers synchronously consistent with the text.

pub mod marker;

use std::ops::Range;

use ropey::Rope;

use crate::error::{EditError, Result};
pub use marker::{Marker, MarkerArena};

/// Text buffer plus the markers anchored into it
#[derive(Debug, Clone)]
pub struct Document {
    buffer: Rope,
    markers: MarkerArena,
    /// Incremented on each edit
    revision: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::with_text("")
    }

    /// Create a document with initial text
    pub fn with_text(text: &str) -> Self {
        Self {
            buffer: Rope::from_str(text),
            markers: MarkerArena::new(),
            revision: 0,
        }
    }

    /// Length in chars
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len_chars()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lines. A trailing newline opens an empty last line.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.buffer.len_lines()
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Read access to the rope for callers that want slices without allocating
    pub fn rope(&self) -> &Rope {
        &self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn slice(&self, range: Range<usize>) -> Result<String> {
        if range.end < range.start {
            return Err(EditError::InvalidRange {
                offset: range.start,
                len: 0,
                length: self.len(),
            });
        }
        self.check_range(range.start, range.end - range.start)?;
        Ok(self.buffer.slice(range).to_string())
    }

    pub fn char_at(&self, offset: usize) -> Result<char> {
        if offset >= self.len() {
            return Err(EditError::InvalidOffset {
                offset,
                length: self.len(),
            });
        }
        Ok(self.buffer.char(offset))
    }

    pub fn line_of_offset(&self, offset: usize) -> Result<usize> {
        self.check_offset(offset)?;
        Ok(self.buffer.char_to_line(offset))
    }

    pub fn line_start_offset(&self, line: usize) -> Result<usize> {
        self.check_line(line)?;
        Ok(self.buffer.line_to_char(line))
    }

    /// Exclusive end of `line`, including its terminator. The last line ends
    /// at `len()`.
    pub fn line_end_offset(&self, line: usize) -> Result<usize> {
        self.check_line(line)?;
        if line + 1 < self.line_count() {
            Ok(self.buffer.line_to_char(line + 1))
        } else {
            Ok(self.len())
        }
    }

    /// End of `line`'s content: before its `\n`, `\r\n` or `\r` terminator
    pub fn line_content_end(&self, line: usize) -> Result<usize> {
        let start = self.line_start_offset(line)?;
        let mut end = self.line_end_offset(line)?;
        if end > start && self.buffer.char(end - 1) == '\n' {
            end -= 1;
        }
        if end > start && self.buffer.char(end - 1) == '\r' {
            end -= 1;
        }
        Ok(end)
    }

    /// Offset range of a line element, terminator included
    pub fn line_range(&self, line: usize) -> Result<Range<usize>> {
        Ok(self.line_start_offset(line)?..self.line_end_offset(line)?)
    }

    /// Line content without its terminator
    pub fn line_text(&self, line: usize) -> Result<String> {
        self.check_line(line)?;
        let text = self.buffer.line(line).to_string();
        Ok(text.trim_end_matches(&['\n', '\r'][..]).to_string())
    }

    /// Insert `text` at `offset`, shifting markers at or after `offset`
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
        self.check_offset(offset)?;
        if text.is_empty() {
            return Ok(());
        }
        self.buffer.insert(offset, text);
        self.markers.shift_for_insert(offset, text.chars().count());
        self.revision += 1;
        Ok(())
    }

    /// Remove `len` chars starting at `offset`. Returns the removed text so
    /// the caller can record it for undo.
    pub fn remove(&mut self, offset: usize, len: usize) -> Result<String> {
        self.check_range(offset, len)?;
        if len == 0 {
            return Ok(String::new());
        }
        let end = offset + len;
        let removed = self.buffer.slice(offset..end).to_string();
        self.buffer.remove(offset..end);
        self.markers.shift_for_remove(offset, end);
        self.revision += 1;
        Ok(removed)
    }

    // =========================================================================
    // Markers
    // =========================================================================

    pub fn create_marker(&mut self, offset: usize) -> Result<Marker> {
        self.check_offset(offset)?;
        Ok(self.markers.create(offset))
    }

    pub fn marker_offset(&self, marker: Marker) -> Result<usize> {
        self.markers.offset(marker)
    }

    /// Re-anchor an existing marker at a new offset
    pub fn move_marker(&mut self, marker: Marker, offset: usize) -> Result<()> {
        self.check_offset(offset)?;
        self.markers.set_offset(marker, offset)
    }

    pub fn release_marker(&mut self, marker: Marker) {
        self.markers.release(marker);
    }

    pub fn live_marker_count(&self) -> usize {
        self.markers.live_count()
    }

    // =========================================================================
    // Validation
    // =========================================================================

    fn check_offset(&self, offset: usize) -> Result<()> {
        if offset > self.len() {
            return Err(EditError::InvalidOffset {
                offset,
                length: self.len(),
            });
        }
        Ok(())
    }

    fn check_range(&self, offset: usize, len: usize) -> Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.len() => Ok(()),
            _ => Err(EditError::InvalidRange {
                offset,
                len,
                length: self.len(),
            }),
        }
    }

    pub(crate) fn check_line(&self, line: usize) -> Result<()> {
        if line >= self.line_count() {
            return Err(EditError::InvalidLine {
                line,
                line_count: self.line_count(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_queries() {
        let doc = Document::with_text("hello\nworld\n");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_start_offset(1).unwrap(), 6);
        assert_eq!(doc.line_end_offset(0).unwrap(), 6);
        assert_eq!(doc.line_end_offset(2).unwrap(), 12);
        assert_eq!(doc.line_of_offset(5).unwrap(), 0);
        assert_eq!(doc.line_of_offset(6).unwrap(), 1);
        assert_eq!(doc.line_of_offset(12).unwrap(), 2);
        assert_eq!(doc.line_text(1).unwrap(), "world");
    }

    #[test]
    fn test_line_content_end_skips_terminator() {
        let doc = Document::with_text("ab\r\ncd\nef");
        assert_eq!(doc.line_content_end(0).unwrap(), 2);
        assert_eq!(doc.line_content_end(1).unwrap(), 6);
        assert_eq!(doc.line_content_end(2).unwrap(), 9);
        assert_eq!(Document::new().line_content_end(0).unwrap(), 0);
    }

    #[test]
    fn test_line_elements_partition_document() {
        let doc = Document::with_text("a\nbc\n\ndef");
        let mut expected_start = 0;
        for line in 0..doc.line_count() {
            let range = doc.line_range(line).unwrap();
            assert_eq!(range.start, expected_start);
            expected_start = range.end;
        }
        assert_eq!(expected_start, doc.len());
    }

    #[test]
    fn test_out_of_range_is_rejected_without_mutation() {
        let mut doc = Document::with_text("abc");
        assert_eq!(
            doc.insert(4, "x"),
            Err(EditError::InvalidOffset {
                offset: 4,
                length: 3
            })
        );
        assert!(matches!(
            doc.remove(2, 5),
            Err(EditError::InvalidRange { .. })
        ));
        assert!(matches!(
            doc.line_start_offset(1),
            Err(EditError::InvalidLine { .. })
        ));
        assert_eq!(doc.text(), "abc");
        assert_eq!(doc.revision(), 0);
    }

    #[test]
    fn test_markers_shift_inside_the_edit_call() {
        let mut doc = Document::with_text("hello world");
        let w = doc.create_marker(6).unwrap();
        doc.insert(0, ">> ").unwrap();
        assert_eq!(doc.marker_offset(w).unwrap(), 9);
        assert_eq!(doc.char_at(9).unwrap(), 'w');

        let removed = doc.remove(0, 9).unwrap();
        assert_eq!(removed, ">> hello ");
        assert_eq!(doc.marker_offset(w).unwrap(), 0);
        assert_eq!(doc.text(), "world");
    }

    #[test]
    fn test_marker_on_deleted_char_moves_to_successor() {
        let mut doc = Document::with_text("abcdef");
        let d = doc.create_marker(3).unwrap();
        doc.remove(2, 2).unwrap(); // removes "cd"
        assert_eq!(doc.marker_offset(d).unwrap(), 2);
        assert_eq!(doc.char_at(2).unwrap(), 'e');
    }

    #[test]
    fn test_char_offsets_are_unicode_aware() {
        let mut doc = Document::with_text("héllo");
        let l = doc.create_marker(2).unwrap();
        doc.insert(1, "ü").unwrap();
        assert_eq!(doc.text(), "hüéllo");
        assert_eq!(doc.marker_offset(l).unwrap(), 3);
        assert_eq!(doc.char_at(3).unwrap(), 'l');
    }

    #[test]
    fn test_slice_rejects_inverted_range() {
        let doc = Document::with_text("abc");
        assert_eq!(doc.slice(1..3).unwrap(), "bc");
        #[allow(clippy::reversed_empty_ranges)]
        let inverted = doc.slice(2..1);
        assert!(inverted.is_err());
    }
}
