//! Snapshot undo over text edits.

use proptest::prelude::*;
use ttk_text::{CursorPos, MoveMode, MoveOperation, TextCursor, TextDocument};

#[test]
fn scenario_undo_restores_each_step() {
    let mut doc = TextDocument::new();
    let mut cursor = TextCursor::new();
    doc.insert_text(&mut cursor, "abc").unwrap();
    doc.insert_text(&mut cursor, "\n").unwrap();
    doc.insert_text(&mut cursor, "def").unwrap();
    assert_eq!(doc.to_plain_text(), "abc\ndef");

    let mut seen = Vec::new();
    for _ in 0..3 {
        assert!(doc.undo(&mut cursor).unwrap());
        seen.push(doc.to_plain_text());
    }
    assert_eq!(seen, vec!["abc\n", "abc", ""]);
    assert_eq!(cursor.position(), CursorPos::new(0, 0));
}

#[derive(Debug, Clone)]
enum Op {
    Insert(String),
    Move(MoveOperation, bool),
    Backspace,
    Delete,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-c \\n界]{0,4}".prop_map(Op::Insert),
        (
            prop::sample::select(vec![
                MoveOperation::Left,
                MoveOperation::Right,
                MoveOperation::Up,
                MoveOperation::Down,
                MoveOperation::StartOfLine,
                MoveOperation::EndOfLine,
                MoveOperation::WordLeft,
                MoveOperation::WordRight,
            ]),
            any::<bool>()
        )
            .prop_map(|(m, keep)| Op::Move(m, keep)),
        Just(Op::Backspace),
        Just(Op::Delete),
    ]
}

proptest! {
    #[test]
    fn undo_round_trip(initial in "[a-c \\n]{0,12}", ops in prop::collection::vec(op(), 0..16)) {
        let mut doc = TextDocument::from_text(&initial).with_undo_depth(64);
        let mut cursor = TextCursor::new();
        let original_text = doc.to_plain_text();
        // Moves are not edits: undo restores the cursor as it stood when the
        // first edit began.
        let mut first_edit_cursor = None;

        for op in &ops {
            let before = cursor.clone();
            let had_undo = doc.is_undo_available();
            match op {
                Op::Insert(text) => doc.insert_text(&mut cursor, text).unwrap(),
                Op::Move(m, keep) => {
                    let mode = if *keep { MoveMode::KeepAnchor } else { MoveMode::MoveAnchor };
                    cursor.move_position(&doc, *m, mode, 1, None);
                }
                Op::Backspace => doc.delete_backward(&mut cursor).unwrap(),
                Op::Delete => doc.delete_forward(&mut cursor).unwrap(),
            }
            if !had_undo && doc.is_undo_available() && first_edit_cursor.is_none() {
                first_edit_cursor = Some(before);
            }
        }
        while doc.undo(&mut cursor).unwrap() {}
        prop_assert_eq!(doc.to_plain_text(), original_text);
        if let Some(expected) = first_edit_cursor {
            prop_assert_eq!(cursor, expected);
        }
    }
}
