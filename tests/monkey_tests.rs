//! Monkey tests - edge cases and unusual sequences of operations
//!
//! These tests push the text area with empty documents, odd viewports,
//! multi-byte text and invalid input. Nothing here may panic, and invalid
//! input must leave the state untouched.

mod common;

use common::{collapsed_fold_area, numbered_text, test_area};
use textarea_core::gutter::LayoutMode;
use textarea_core::highlight::{Layer, Painter};
use textarea_core::layout::Viewport;
use textarea_core::messages::parse_script;
use textarea_core::update::update;
use textarea_core::{Color, EditError, Feedback};

// ========================================================================
// Empty Document
// ========================================================================

#[test]
fn test_empty_document_operations() {
    let mut area = test_area("");
    area.backspace().unwrap();
    assert!(!area.move_line_up().unwrap());
    assert!(!area.move_line_down().unwrap());
    assert!(!area.undo().unwrap());
    assert_eq!(area.next_bookmark().unwrap(), None);
    assert_eq!(area.document().line_count(), 1);

    let paint = area
        .paint_gutter(LayoutMode::Fixed(area.row_metrics()), Viewport::new(0.0, 100.0))
        .unwrap();
    assert_eq!(paint.numbers.len(), 1);
}

#[test]
fn test_bookmark_on_empty_document() {
    let mut area = test_area("");
    assert!(area.toggle_bookmark(0).unwrap());
    area.type_text("text").unwrap();
    // Inserting at the icon's offset pushes it along, but it stays on line 0
    assert_eq!(area.bookmarks().unwrap(), vec![0]);
}

// ========================================================================
// Viewport Edge Cases
// ========================================================================

#[test]
fn test_zero_height_viewport() {
    let area = test_area(&numbered_text(50));
    let paint = area
        .paint_gutter(LayoutMode::Fixed(area.row_metrics()), Viewport::new(0.0, 0.0))
        .unwrap();
    assert_eq!(paint.lines.len(), 1);
}

#[test]
fn test_viewport_far_below_document() {
    let area = test_area(&numbered_text(5));
    let paint = area
        .paint_gutter(
            LayoutMode::Fixed(area.row_metrics()),
            Viewport::new(10_000.0, 500.0),
        )
        .unwrap();
    assert!(paint.lines.is_empty());

    let layout = area.fixed_layout(100.0);
    assert!(area
        .paint_highlights(&layout, Viewport::new(10_000.0, 500.0))
        .unwrap()
        .is_empty());
}

#[test]
fn test_viewport_above_inset() {
    let area = collapsed_fold_area();
    let paint = area
        .paint_gutter(
            LayoutMode::Fixed(area.row_metrics()),
            Viewport::new(-50.0, 60.0),
        )
        .unwrap();
    assert_eq!(paint.lines[0].line, 0);
}

// ========================================================================
// Multi-byte And Line Terminators
// ========================================================================

#[test]
fn test_offsets_are_chars_not_bytes() {
    let mut area = test_area("héllo wörld");
    area.set_dot(11).unwrap();
    area.backspace().unwrap();
    assert_eq!(area.text(), "héllo wörl");

    area.replace_range(1, 2, "e").unwrap();
    assert_eq!(area.text(), "hello wörl");
    area.undo().unwrap();
    assert_eq!(area.text(), "héllo wörl");
}

#[test]
fn test_emoji_and_crlf_lines() {
    let mut area = test_area("a🎉\r\nb\r\nc");
    assert_eq!(area.document().line_count(), 3);
    assert_eq!(area.document().line_text(0).unwrap(), "a🎉");

    area.set_dot(area.document().line_start_offset(1).unwrap())
        .unwrap();
    area.move_line_up().unwrap();
    assert_eq!(area.text(), "b\r\na🎉\r\nc");
    area.undo().unwrap();
    assert_eq!(area.text(), "a🎉\r\nb\r\nc");
}

#[test]
fn test_move_last_line_without_terminator_up() {
    let mut area = test_area("one\ntwo");
    area.set_dot(6).unwrap();
    area.move_line_up().unwrap();
    assert_eq!(area.text(), "two\none");
    assert_eq!(area.dot().unwrap(), 2);
}

// ========================================================================
// Invalid Input
// ========================================================================

#[test]
fn test_invalid_offsets_are_errors() {
    let mut area = test_area("abc");
    assert_eq!(
        area.set_dot(4),
        Err(EditError::InvalidOffset {
            offset: 4,
            length: 3
        })
    );
    assert!(area.set_mark(100).is_err());
    assert!(area
        .add_highlight(2, 1, Painter::Fill(Color::rgb(0, 0, 0)), Layer::Custom)
        .is_err());
    assert!(area.add_line_highlight(1, Color::rgb(0, 0, 0)).is_err());
    assert!(area.add_icon_at_offset(4, "x", None).is_err());
    assert!(area.toggle_bookmark(1).is_err());
    assert!(area.set_folds(&[(0, 5)]).is_err());

    assert_eq!(area.text(), "abc");
    assert_eq!(area.dot().unwrap(), 0);
    assert!(area.take_feedback().is_empty());
}

#[test]
fn test_stale_handles_are_errors() {
    let mut area = test_area("abc");
    let handle = area
        .add_highlight(0, 1, Painter::Fill(Color::rgb(0, 0, 0)), Layer::Custom)
        .unwrap();
    area.remove_highlight(handle).unwrap();
    assert_eq!(area.remove_highlight(handle), Err(EditError::StaleHandle));

    let icon = area.add_icon_at_line(0, "x", None).unwrap();
    area.remove_all_icons().unwrap();
    assert_eq!(area.remove_icon(icon), Err(EditError::StaleHandle));
}

// ========================================================================
// Stress
// ========================================================================

#[test]
fn test_many_undo_redo_cycles() {
    let mut area = test_area("");
    for i in 0..50 {
        area.set_dot(0).unwrap();
        area.type_text(&format!("{}\n", i)).unwrap();
    }
    let edited = area.text();
    for _ in 0..5 {
        while area.undo().unwrap() {}
        assert_eq!(area.text(), "");
        while area.redo().unwrap() {}
        assert_eq!(area.text(), edited);
    }
}

#[test]
fn test_repeated_fold_toggling_keeps_caret_visible() {
    let mut area = test_area(&numbered_text(30));
    area.set_folds(&[(2, 10), (4, 6), (12, 20), (20, 25)]).unwrap();
    for i in 0..30 {
        let line = [2, 4, 12, 20][i % 4];
        area.set_dot(area.document().line_start_offset(i).unwrap())
            .unwrap();
        area.toggle_fold(line).unwrap();
        let caret_line = area.caret_line().unwrap();
        assert!(!textarea_core::FoldModel::is_line_hidden(
            area.folds(),
            caret_line
        ));
    }
}

#[test]
fn test_unbalanced_script_recovers() {
    let script = r#"
- history: end_atomic
- history: undo
- history: redo
- mark: next_bookmark
- edit: { type_text: "ok" }
"#;
    let mut area = test_area("");
    for msg in parse_script(script).unwrap() {
        update(&mut area, msg).unwrap();
    }
    assert_eq!(area.text(), "ok");
    assert_eq!(
        area.take_feedback(),
        vec![
            Feedback::UnbalancedAtomicEnd,
            Feedback::CannotUndo,
            Feedback::CannotRedo,
            Feedback::NoBookmarks,
        ]
    );
}
