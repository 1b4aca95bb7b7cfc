//! The presenter keeps the screen identical to the editor state.
//!
//! After every event, the modelled terminal row shows the prompt followed by
//! the line text, and the modelled cursor sits at the editor's cursor.

use proptest::prelude::*;
use vtsh_core::{CursorDirection, EditEvent, EditOutcome, HistoryDirection, LineEditor};
use vtsh_render::LinePresenter;
use vtsh_render::ansi::{text_width, write_text};
use vtsh_render::line_model::LineModel;

const PROMPT: &str = "> ";

fn event_strategy() -> impl Strategy<Value = EditEvent> {
    prop_oneof![
        5 => any::<u8>().prop_map(EditEvent::InsertChar),
        2 => (0u32..4).prop_map(|n| EditEvent::MoveCursor(CursorDirection::Left, n)),
        2 => (0u32..4).prop_map(|n| EditEvent::MoveCursor(CursorDirection::Right, n)),
        1 => Just(EditEvent::Backspace),
        1 => Just(EditEvent::DeleteChar),
        1 => Just(EditEvent::HistoryNav(HistoryDirection::Older)),
        1 => Just(EditEvent::HistoryNav(HistoryDirection::Newer)),
        1 => Just(EditEvent::Submit),
    ]
}

fn expected_row(text: &[u8]) -> String {
    let mut rendered = PROMPT.as_bytes().to_vec();
    write_text(&mut rendered, text).unwrap();
    String::from_utf8(rendered).unwrap().trim_end().to_owned()
}

proptest! {
    #[test]
    fn screen_mirrors_editor(events in proptest::collection::vec(event_strategy(), 0..150)) {
        let mut editor = LineEditor::new();
        let mut presenter = LinePresenter::new(PROMPT);
        let mut model = LineModel::new();
        let mut out = Vec::new();
        presenter.present_prompt(&mut out).unwrap();

        for event in events {
            match editor.apply(event) {
                EditOutcome::Unchanged => {}
                EditOutcome::Render(intent) => {
                    presenter.present(&intent, editor.state(), &mut out).unwrap();
                }
                EditOutcome::Submit { .. } => {
                    presenter.present_submit(&mut out).unwrap();
                    presenter.present_prompt(&mut out).unwrap();
                }
            }
            model.process(&out);
            out.clear();

            let state = editor.state();
            let (x, y) = model.cursor();
            prop_assert_eq!(model.row_text(y), expected_row(state.text()));
            prop_assert_eq!(x, PROMPT.len() + text_width(&state.text()[..state.cursor()]));
        }
    }
}
