//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use textarea_core::config::EditorConfig;
use textarea_core::{Document, TextArea};

/// Text of `n` lines named `line0`, `line1`, ... with no trailing newline
pub fn numbered_text(n: usize) -> String {
    (0..n)
        .map(|i| format!("line{}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn numbered_doc(n: usize) -> Document {
    Document::with_text(&numbered_text(n))
}

/// Text area with default config
pub fn test_area(text: &str) -> TextArea {
    TextArea::new(text, EditorConfig::default()).unwrap()
}

/// Text area with default config and the caret at `offset`
pub fn test_area_at(text: &str, offset: usize) -> TextArea {
    let mut area = test_area(text);
    area.set_dot(offset).unwrap();
    area
}

/// Ten numbered lines with fold `3..=7` collapsed: lines 4-7 hidden
pub fn collapsed_fold_area() -> TextArea {
    let mut area = test_area(&numbered_text(10));
    area.set_folds(&[(3, 7)]).unwrap();
    area.toggle_fold(3).unwrap();
    area.take_damage();
    area
}

pub fn line_start(area: &TextArea, line: usize) -> usize {
    area.document().line_start_offset(line).unwrap()
}
