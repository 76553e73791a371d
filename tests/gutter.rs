//! Gutter lanes driven through a text area

mod common;

use common::{collapsed_fold_area, line_start, numbered_text, test_area};
use textarea_core::config::{EditorConfig, GutterConfig};
use textarea_core::gutter::{FoldGlyphState, LayoutMode};
use textarea_core::layout::{Viewport, WrappedLayout};
use textarea_core::TextArea;

fn area_with_rows(text: &str, row_height: f32, inset_top: f32) -> TextArea {
    let config = EditorConfig {
        gutter: GutterConfig {
            row_height,
            inset_top,
            ..Default::default()
        },
        ..Default::default()
    };
    TextArea::new(text, config).unwrap()
}

fn painted_lines(area: &TextArea, viewport: Viewport) -> Vec<usize> {
    let mode = LayoutMode::Fixed(area.row_metrics());
    area.paint_gutter(mode, viewport)
        .unwrap()
        .lines
        .iter()
        .map(|l| l.line)
        .collect()
}

// ========================================================================
// Visible line derivation
// ========================================================================

#[test]
fn test_fixed_viewport_maps_to_lines() {
    let mut area = area_with_rows(&numbered_text(20), 15.0, 4.0);
    let viewport = Viewport::between(19.0, 49.0);
    assert_eq!(painted_lines(&area, viewport), vec![1, 2, 3]);

    area.set_folds(&[(1, 3)]).unwrap();
    area.toggle_fold(1).unwrap();
    assert_eq!(painted_lines(&area, viewport), vec![1, 4, 5]);
}

#[test]
fn test_wrapped_layout_paints_same_lines_as_fixed_for_single_rows() {
    let area = collapsed_fold_area();
    let viewport = Viewport::new(0.0, 160.0);
    let fixed = painted_lines(&area, viewport);

    let layout = WrappedLayout::new(
        area.row_metrics(),
        8.0,
        (0.0, 400.0),
        &[1; 10],
        area.folds(),
    );
    let wrapped: Vec<usize> = area
        .paint_gutter(LayoutMode::Wrapped(&layout), viewport)
        .unwrap()
        .lines
        .iter()
        .map(|l| l.line)
        .collect();
    assert_eq!(fixed, vec![0, 1, 2, 3, 8, 9]);
    assert_eq!(wrapped, fixed);
}

// ========================================================================
// Lanes
// ========================================================================

#[test]
fn test_line_numbers_mark_caret_line() {
    let mut area = test_area(&numbered_text(5));
    area.set_dot(area.document().line_start_offset(2).unwrap())
        .unwrap();
    let paint = area
        .paint_gutter(LayoutMode::Fixed(area.row_metrics()), Viewport::new(0.0, 80.0))
        .unwrap();

    let labels: Vec<&str> = paint.numbers.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["1", "2", "3", "4", "5"]);
    let active: Vec<usize> = paint
        .numbers
        .iter()
        .filter(|c| c.active)
        .map(|c| c.line)
        .collect();
    assert_eq!(active, vec![2]);
}

#[test]
fn test_line_number_start_is_configurable() {
    let mut config = EditorConfig::default();
    config.gutter.line_number_start = 0;
    let area = TextArea::new("a\nb", config).unwrap();
    let paint = area
        .paint_gutter(LayoutMode::Fixed(area.row_metrics()), Viewport::new(0.0, 80.0))
        .unwrap();
    assert_eq!(paint.numbers[0].label, "0");
}

#[test]
fn test_lane_width_changes_only_at_digit_boundary() {
    let mut area = test_area(&numbered_text(9));
    let narrow = area.gutter().width();

    area.insert(0, "\n").unwrap();
    let wide = area.gutter().width();
    assert!(wide > narrow);
    assert!(area.take_damage().includes_gutter());

    area.insert(0, "\n").unwrap();
    assert_eq!(area.gutter().width(), wide);
    assert!(!area.take_damage().includes_gutter());

    area.undo().unwrap();
    assert_eq!(area.gutter().width(), narrow);
}

#[test]
fn test_fold_glyphs_and_tooltip() {
    let area = collapsed_fold_area();
    let mode = LayoutMode::Fixed(area.row_metrics());
    let viewport = Viewport::new(0.0, 160.0);
    let paint = area.paint_gutter(mode, viewport).unwrap();

    assert_eq!(paint.folds.len(), 1);
    assert_eq!(paint.folds[0].line, 3);
    assert_eq!(paint.folds[0].state, FoldGlyphState::Collapsed);

    let row_height = area.row_metrics().row_height;
    let tip = area
        .gutter_tooltip_at(mode, viewport, 3.0 * row_height + 1.0)
        .unwrap()
        .unwrap();
    assert_eq!(tip, "line3\nline4\nline5\nline6\nline7");
    assert_eq!(area.gutter_tooltip_at(mode, viewport, 1.0).unwrap(), None);
}

#[test]
fn test_fold_outline_follows_caret() {
    let mut area = test_area(&numbered_text(10));
    area.set_folds(&[(2, 6)]).unwrap();
    area.set_dot(area.document().line_start_offset(4).unwrap())
        .unwrap();
    let paint = area
        .paint_gutter(LayoutMode::Fixed(area.row_metrics()), Viewport::new(0.0, 160.0))
        .unwrap();
    let outline = paint.fold_outline.unwrap();
    assert_eq!((outline.start_line, outline.end_line), (2, 6));
}

#[test]
fn test_most_recent_icon_wins_on_a_line() {
    let mut area = test_area(&numbered_text(5));
    area.add_icon_at_line(1, "warning", Some("old")).unwrap();
    let newest = area.add_icon_at_line(1, "error", Some("new")).unwrap();

    let mode = LayoutMode::Fixed(area.row_metrics());
    let viewport = Viewport::new(0.0, 80.0);
    let paint = area.paint_gutter(mode, viewport).unwrap();
    assert_eq!(paint.icons.len(), 1);
    assert_eq!(paint.icons[0].icon, "error");
    assert_eq!(paint.icons[0].handle, newest);

    let y = area.row_metrics().row_top(1) + 1.0;
    assert_eq!(
        area.gutter_tooltip_at(mode, viewport, y).unwrap().as_deref(),
        Some("new")
    );

    area.remove_icon(newest).unwrap();
    let paint = area.paint_gutter(mode, viewport).unwrap();
    assert_eq!(paint.icons[0].icon, "warning");
}

#[test]
fn test_icons_follow_edits() {
    let mut area = test_area(&numbered_text(5));
    area.add_icon_at_line(3, "error", None).unwrap();
    area.insert(0, "new\n").unwrap();

    let paint = area
        .paint_gutter(LayoutMode::Fixed(area.row_metrics()), Viewport::new(0.0, 160.0))
        .unwrap();
    assert_eq!(paint.icons[0].line, 4);
}

#[test]
fn test_collapsed_fold_follows_removal_above_it() {
    let mut area = test_area(&numbered_text(10));
    area.set_folds(&[(3, 9)]).unwrap();
    area.toggle_fold(3).unwrap();
    let start = line_start(&area, 3);
    area.remove(0, start).unwrap();

    let viewport = Viewport::new(0.0, 160.0);
    assert_eq!(painted_lines(&area, viewport), vec![0]);
    let mode = LayoutMode::Fixed(area.row_metrics());
    let tip = area.gutter_tooltip_at(mode, viewport, 1.0).unwrap().unwrap();
    assert_eq!(tip, "line3\nline4\nline5\nline6\nline7\nline8\nline9");
}

#[test]
fn test_damage_clip_after_edits_past_highlighted_text() {
    let mut area = test_area("abcdefghij\nxy");
    area.take_damage();
    area.mark_all(&[(6, 10)]).unwrap();
    area.insert(2, "--").unwrap();
    area.remove(0, 10).unwrap();

    let damage = area.take_damage();
    let mode = LayoutMode::Fixed(area.row_metrics());
    assert!(area
        .gutter()
        .damage_clip(&damage, area.document(), area.folds(), mode)
        .is_ok());
}
