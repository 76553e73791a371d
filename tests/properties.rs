//! Property tests for marker shifting, undo round trips and fold-aware
//! caret state under edits

mod common;

use proptest::prelude::*;

use common::{numbered_text, test_area};
use textarea_core::gutter::LayoutMode;
use textarea_core::layout::Viewport;
use textarea_core::{Document, FoldModel, TextArea};

#[derive(Debug, Clone)]
enum EditOp {
    Insert { position: usize, text: String },
    Remove { position: usize, length: usize },
}

fn arb_edit_op() -> impl Strategy<Value = EditOp> {
    prop_oneof![
        (0..200usize, "[a-z\n]{1,6}")
            .prop_map(|(position, text)| EditOp::Insert { position, text }),
        (0..200usize, 1..12usize)
            .prop_map(|(position, length)| EditOp::Remove { position, length }),
    ]
}

#[derive(Debug, Clone)]
enum AreaOp {
    Edit(EditOp),
    ToggleFold(usize),
    SetMark(usize),
    SetDot(usize),
    Undo,
}

fn arb_area_op() -> impl Strategy<Value = AreaOp> {
    prop_oneof![
        3 => arb_edit_op().prop_map(AreaOp::Edit),
        2 => (0..20usize).prop_map(AreaOp::ToggleFold),
        1 => (0..200usize).prop_map(AreaOp::SetMark),
        1 => (0..200usize).prop_map(AreaOp::SetDot),
        1 => Just(AreaOp::Undo),
    ]
}

fn line_of(area: &TextArea, offset: usize) -> usize {
    area.document().line_of_offset(offset).unwrap()
}

/// Clamp an op to the current document so it is always valid
fn clamp(op: &EditOp, len: usize) -> EditOp {
    match op {
        EditOp::Insert { position, text } => EditOp::Insert {
            position: (*position).min(len),
            text: text.clone(),
        },
        EditOp::Remove { position, length } => {
            let position = (*position).min(len);
            EditOp::Remove {
                position,
                length: (*length).min(len - position),
            }
        }
    }
}

/// Reference shift rule for one marker offset
fn expected_shift(offset: usize, op: &EditOp) -> usize {
    match op {
        EditOp::Insert { position, text } => {
            if offset >= *position {
                offset + text.chars().count()
            } else {
                offset
            }
        }
        EditOp::Remove { position, length } => {
            let end = position + length;
            if offset >= end {
                offset - length
            } else if offset > *position {
                *position
            } else {
                offset
            }
        }
    }
}

proptest! {
    /// Markers stay inside the document and follow the shift rule after
    /// every edit
    #[test]
    fn prop_markers_follow_edits(
        initial in "[a-z\n]{0,80}",
        ops in prop::collection::vec(arb_edit_op(), 1..30),
    ) {
        let mut doc = Document::with_text(&initial);
        let len = doc.len();
        let mut expected: Vec<usize> = (0..6).map(|i| i * len / 5).collect();
        let markers: Vec<_> = expected
            .iter()
            .map(|&offset| doc.create_marker(offset).unwrap())
            .collect();

        for op in &ops {
            let op = clamp(op, doc.len());
            match &op {
                EditOp::Insert { position, text } => doc.insert(*position, text).unwrap(),
                EditOp::Remove { position, length } => {
                    doc.remove(*position, *length).unwrap();
                }
            }
            for (marker, expected) in markers.iter().zip(expected.iter_mut()) {
                *expected = expected_shift(*expected, &op);
                let actual = doc.marker_offset(*marker).unwrap();
                prop_assert!(actual <= doc.len());
                prop_assert_eq!(actual, *expected);
            }
        }
        prop_assert_eq!(doc.live_marker_count(), markers.len());
    }

    /// Undoing every compound edit restores the original text, redoing all
    /// of them restores the edited text
    #[test]
    fn prop_undo_redo_round_trip(
        initial in "[a-z\n]{0,60}",
        ops in prop::collection::vec(arb_edit_op(), 1..25),
    ) {
        let mut area = test_area(&initial);
        for op in &ops {
            match clamp(op, area.document().len()) {
                EditOp::Insert { position, text } => area.insert(position, &text).unwrap(),
                EditOp::Remove { position, length } => {
                    area.remove(position, length).unwrap();
                }
            }
        }
        let edited = area.text();

        while area.undo().unwrap() {}
        prop_assert_eq!(area.text(), initial);
        while area.redo().unwrap() {}
        prop_assert_eq!(area.text(), edited);
    }

    /// Neither caret end rests on a hidden line and gutter queries keep
    /// working while edits reshape folded text
    #[test]
    fn prop_caret_stays_visible_across_edits_and_folds(
        ops in prop::collection::vec(arb_area_op(), 1..40),
    ) {
        let mut area = test_area(&numbered_text(16));
        area.set_folds(&[(1, 4), (2, 3), (6, 12), (6, 8), (13, 15)]).unwrap();
        let mode = LayoutMode::Fixed(area.row_metrics());
        let viewport = Viewport::new(0.0, 400.0);

        for op in &ops {
            let len = area.document().len();
            match op {
                AreaOp::Edit(edit) => match clamp(edit, len) {
                    EditOp::Insert { position, text } => area.insert(position, &text).unwrap(),
                    EditOp::Remove { position, length } => {
                        area.remove(position, length).unwrap();
                    }
                },
                AreaOp::ToggleFold(line) => {
                    let line = (*line).min(area.document().line_count() - 1);
                    area.toggle_fold(line).unwrap();
                }
                AreaOp::SetMark(offset) => {
                    area.set_mark((*offset).min(len)).unwrap();
                }
                AreaOp::SetDot(offset) => {
                    area.set_dot((*offset).min(len)).unwrap();
                }
                AreaOp::Undo => {
                    area.undo().unwrap();
                }
            }

            let dot_line = line_of(&area, area.dot().unwrap());
            let mark_line = line_of(&area, area.mark().unwrap());
            prop_assert!(!area.folds().is_line_hidden(dot_line), "dot on hidden line {}", dot_line);
            prop_assert!(!area.folds().is_line_hidden(mark_line), "mark on hidden line {}", mark_line);

            prop_assert!(area.paint_gutter(mode, viewport).is_ok());
            let damage = area.take_damage();
            prop_assert!(area
                .gutter()
                .damage_clip(&damage, area.document(), area.folds(), mode)
                .is_ok());
            for row in 0..20 {
                let y = area.row_metrics().row_top(row) + 1.0;
                prop_assert!(area.gutter_tooltip_at(mode, viewport, y).is_ok());
            }
        }
    }
}
