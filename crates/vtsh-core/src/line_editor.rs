#![forbid(unsafe_code)]

//! Single-line editing state with history recall.
//!
//! [`LineEditor`] applies one [`EditEvent`] at a time to a [`LineState`] and
//! reports what changed as an [`EditOutcome`]. The outcome's
//! [`RenderIntent`], read together with the new state, is enough for a
//! renderer to reproduce the exact text and cursor on screen.
//!
//! # Invariants
//!
//! 1. `cursor <= text.len()`.
//! 2. `history_cursor <= history.len()`; `history.len()` means "editing a
//!    fresh line".
//! 3. History is append-only and never holds an empty line.
//! 4. A recalled entry is copied into `text`. Editing it snaps the recall
//!    cursor back to the fresh-line position and leaves the stored entry
//!    untouched.

use crate::event::{CursorDirection, EditEvent, HistoryDirection};

/// Authoritative line-editing state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineState {
    text: Vec<u8>,
    cursor: usize,
    history: Vec<Vec<u8>>,
    history_cursor: usize,
}

impl LineState {
    /// Empty line, empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty line with pre-existing history (oldest first). Empty entries
    /// are skipped.
    #[must_use]
    pub fn with_history<I>(history: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Vec<u8>>,
    {
        let history: Vec<Vec<u8>> = history
            .into_iter()
            .map(Into::into)
            .filter(|line: &Vec<u8>| !line.is_empty())
            .collect();
        let history_cursor = history.len();
        Self {
            text: Vec::new(),
            cursor: 0,
            history,
            history_cursor,
        }
    }

    /// Current line contents.
    #[must_use]
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Cursor offset in `0..=text().len()`.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Submitted lines, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Vec<u8>] {
        &self.history
    }

    /// Recall position in `0..=history().len()`.
    #[must_use]
    pub fn history_cursor(&self) -> usize {
        self.history_cursor
    }

    /// Whether a history entry is currently displayed.
    #[must_use]
    pub fn is_recalling(&self) -> bool {
        self.history_cursor != self.history.len()
    }
}

/// What the renderer has to do after an edit.
///
/// Offsets are byte offsets into [`LineState::text`]. The renderer is
/// expected to know where it left the screen cursor; after carrying out any
/// intent the screen cursor must sit at [`LineState::cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderIntent {
    /// A byte was appended at end-of-line; echo it.
    Append(u8),
    /// The cursor moved one position left.
    CursorLeft,
    /// The cursor moved one position right.
    CursorRight,
    /// Text changed from offset `from` onward: move there, rewrite the tail,
    /// erase leftovers, and return to the cursor.
    RefreshTail {
        /// First changed offset.
        from: usize,
    },
    /// The whole line was replaced; redraw prompt and text.
    Redraw,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Nothing changed.
    Unchanged,
    /// The line changed; render the intent.
    Render(RenderIntent),
    /// The line was submitted and cleared. `line` is the submitted text, or
    /// `None` when the line was empty (nothing to execute, nothing recorded).
    Submit {
        /// Submitted text.
        line: Option<Vec<u8>>,
    },
}

/// Applies [`EditEvent`]s to a [`LineState`].
#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    state: LineState,
}

impl LineEditor {
    /// Editor with an empty line and no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor over an existing state.
    #[must_use]
    pub fn with_state(state: LineState) -> Self {
        Self { state }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &LineState {
        &self.state
    }

    /// Apply one event.
    pub fn apply(&mut self, event: EditEvent) -> EditOutcome {
        match event {
            EditEvent::InsertChar(byte) => self.insert(byte),
            EditEvent::Backspace => self.backspace(),
            EditEvent::DeleteChar => self.delete(),
            // The count is not a repeat: one key press, one position.
            EditEvent::MoveCursor(direction, _count) => self.move_cursor(direction),
            EditEvent::HistoryNav(direction) => self.navigate(direction),
            EditEvent::Submit => self.submit(),
        }
    }

    /// Apply a sequence of events, returning each outcome.
    pub fn apply_all<I>(&mut self, events: I) -> Vec<EditOutcome>
    where
        I: IntoIterator<Item = EditEvent>,
    {
        events.into_iter().map(|event| self.apply(event)).collect()
    }

    fn insert(&mut self, byte: u8) -> EditOutcome {
        self.detach_recall();
        let s = &mut self.state;
        let at = s.cursor;
        s.text.insert(at, byte);
        s.cursor += 1;
        if s.cursor == s.text.len() {
            EditOutcome::Render(RenderIntent::Append(byte))
        } else {
            EditOutcome::Render(RenderIntent::RefreshTail { from: at })
        }
    }

    fn backspace(&mut self) -> EditOutcome {
        if self.state.cursor == 0 {
            return EditOutcome::Unchanged;
        }
        self.detach_recall();
        let s = &mut self.state;
        s.cursor -= 1;
        s.text.remove(s.cursor);
        EditOutcome::Render(RenderIntent::RefreshTail { from: s.cursor })
    }

    fn delete(&mut self) -> EditOutcome {
        if self.state.cursor == self.state.text.len() {
            return EditOutcome::Unchanged;
        }
        self.detach_recall();
        let s = &mut self.state;
        s.text.remove(s.cursor);
        EditOutcome::Render(RenderIntent::RefreshTail { from: s.cursor })
    }

    fn move_cursor(&mut self, direction: CursorDirection) -> EditOutcome {
        let s = &mut self.state;
        match direction {
            CursorDirection::Left if s.cursor > 0 => {
                s.cursor -= 1;
                EditOutcome::Render(RenderIntent::CursorLeft)
            }
            CursorDirection::Right if s.cursor < s.text.len() => {
                s.cursor += 1;
                EditOutcome::Render(RenderIntent::CursorRight)
            }
            _ => EditOutcome::Unchanged,
        }
    }

    fn navigate(&mut self, direction: HistoryDirection) -> EditOutcome {
        let s = &mut self.state;
        match direction {
            HistoryDirection::Older => {
                if s.history_cursor == 0 {
                    return EditOutcome::Unchanged;
                }
                s.history_cursor -= 1;
            }
            HistoryDirection::Newer => {
                if s.history_cursor == s.history.len() {
                    return EditOutcome::Unchanged;
                }
                s.history_cursor += 1;
            }
        }
        // Always an owned copy: later edits must never reach the stored entry.
        s.text = s
            .history
            .get(s.history_cursor)
            .cloned()
            .unwrap_or_default();
        s.cursor = s.text.len();
        EditOutcome::Render(RenderIntent::Redraw)
    }

    fn submit(&mut self) -> EditOutcome {
        let s = &mut self.state;
        let line = std::mem::take(&mut s.text);
        s.cursor = 0;
        let line = if line.is_empty() {
            None
        } else {
            s.history.push(line.clone());
            Some(line)
        };
        s.history_cursor = s.history.len();
        EditOutcome::Submit { line }
    }

    /// Editing a recalled line turns it into a fresh line.
    fn detach_recall(&mut self) {
        if self.state.is_recalling() {
            crate::trace!(
                entry = self.state.history_cursor,
                "editing recalled line, detaching from history"
            );
            self.state.history_cursor = self.state.history.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(ed: &mut LineEditor, text: &[u8]) {
        for &b in text {
            ed.apply(EditEvent::InsertChar(b));
        }
    }

    fn submit(ed: &mut LineEditor, text: &[u8]) -> EditOutcome {
        type_text(ed, text);
        ed.apply(EditEvent::Submit)
    }

    const OLDER: EditEvent = EditEvent::HistoryNav(HistoryDirection::Older);
    const NEWER: EditEvent = EditEvent::HistoryNav(HistoryDirection::Newer);
    const LEFT: EditEvent = EditEvent::MoveCursor(CursorDirection::Left, 1);
    const RIGHT: EditEvent = EditEvent::MoveCursor(CursorDirection::Right, 1);

    #[test]
    fn typing_appends() {
        let mut ed = LineEditor::new();
        assert_eq!(
            ed.apply(EditEvent::InsertChar(b'l')),
            EditOutcome::Render(RenderIntent::Append(b'l'))
        );
        type_text(&mut ed, b"s");
        assert_eq!(ed.state().text(), b"ls");
        assert_eq!(ed.state().cursor(), 2);
    }

    #[test]
    fn insert_mid_line_refreshes_tail() {
        let mut ed = LineEditor::new();
        type_text(&mut ed, b"lx");
        ed.apply(LEFT);
        assert_eq!(
            ed.apply(EditEvent::InsertChar(b's')),
            EditOutcome::Render(RenderIntent::RefreshTail { from: 1 })
        );
        assert_eq!(ed.state().text(), b"lsx");
        assert_eq!(ed.state().cursor(), 2);
    }

    #[test]
    fn backspace_on_empty_line_is_noop() {
        let mut ed = LineEditor::new();
        assert_eq!(ed.apply(EditEvent::Backspace), EditOutcome::Unchanged);
        assert_eq!(ed.state().text(), b"");
        assert_eq!(ed.state().cursor(), 0);
    }

    #[test]
    fn backspace_removes_before_cursor() {
        let mut ed = LineEditor::new();
        type_text(&mut ed, b"abc");
        ed.apply(LEFT);
        assert_eq!(
            ed.apply(EditEvent::Backspace),
            EditOutcome::Render(RenderIntent::RefreshTail { from: 1 })
        );
        assert_eq!(ed.state().text(), b"ac");
        assert_eq!(ed.state().cursor(), 1);
    }

    #[test]
    fn delete_removes_under_cursor() {
        let mut ed = LineEditor::new();
        type_text(&mut ed, b"test");
        ed.apply(LEFT);
        ed.apply(LEFT);
        assert_eq!(ed.state().cursor(), 2);
        assert_eq!(
            ed.apply(EditEvent::DeleteChar),
            EditOutcome::Render(RenderIntent::RefreshTail { from: 2 })
        );
        assert_eq!(ed.state().text(), b"tet");
        assert_eq!(ed.state().cursor(), 2);
    }

    #[test]
    fn delete_at_end_is_noop() {
        let mut ed = LineEditor::new();
        type_text(&mut ed, b"ab");
        assert_eq!(ed.apply(EditEvent::DeleteChar), EditOutcome::Unchanged);
        assert_eq!(ed.state().text(), b"ab");
    }

    #[test]
    fn cursor_movement_is_clamped() {
        let mut ed = LineEditor::new();
        assert_eq!(ed.apply(LEFT), EditOutcome::Unchanged);
        assert_eq!(ed.apply(RIGHT), EditOutcome::Unchanged);

        type_text(&mut ed, b"hi");
        assert_eq!(ed.apply(RIGHT), EditOutcome::Unchanged);
        assert_eq!(ed.apply(LEFT), EditOutcome::Render(RenderIntent::CursorLeft));
        assert_eq!(ed.state().cursor(), 1);
        ed.apply(LEFT);
        assert_eq!(ed.apply(LEFT), EditOutcome::Unchanged);
        assert_eq!(ed.state().cursor(), 0);
        assert_eq!(ed.apply(RIGHT), EditOutcome::Render(RenderIntent::CursorRight));
        assert_eq!(ed.state().cursor(), 1);
    }

    #[test]
    fn cursor_count_moves_one_position() {
        let mut ed = LineEditor::new();
        type_text(&mut ed, b"hello");
        assert_eq!(
            ed.apply(EditEvent::MoveCursor(CursorDirection::Left, 3)),
            EditOutcome::Render(RenderIntent::CursorLeft)
        );
        assert_eq!(ed.state().cursor(), 4);
        ed.apply(EditEvent::MoveCursor(CursorDirection::Right, u32::MAX));
        assert_eq!(ed.state().cursor(), 5);
    }

    #[test]
    fn submit_records_history_and_clears() {
        let mut ed = LineEditor::new();
        assert_eq!(
            submit(&mut ed, b"ls"),
            EditOutcome::Submit {
                line: Some(b"ls".to_vec())
            }
        );
        assert_eq!(ed.state().text(), b"");
        assert_eq!(ed.state().cursor(), 0);
        assert_eq!(ed.state().history(), &[b"ls".to_vec()]);
        assert_eq!(ed.state().history_cursor(), 1);
    }

    #[test]
    fn empty_submit_is_not_recorded() {
        let mut ed = LineEditor::new();
        assert_eq!(ed.apply(EditEvent::Submit), EditOutcome::Submit { line: None });
        assert!(ed.state().history().is_empty());
        assert_eq!(ed.state().history_cursor(), 0);
    }

    #[test]
    fn history_recall_older_and_newer() {
        let mut ed = LineEditor::new();
        submit(&mut ed, b"ls");
        submit(&mut ed, b"pwd");

        assert_eq!(ed.apply(OLDER), EditOutcome::Render(RenderIntent::Redraw));
        assert_eq!(ed.state().text(), b"pwd");
        ed.apply(OLDER);
        assert_eq!(ed.state().text(), b"ls");
        assert_eq!(ed.state().cursor(), 2);
        assert_eq!(ed.apply(OLDER), EditOutcome::Unchanged);

        ed.apply(NEWER);
        assert_eq!(ed.state().text(), b"pwd");
        assert_eq!(ed.state().cursor(), 3);

        ed.apply(NEWER);
        assert_eq!(ed.state().text(), b"");
        assert_eq!(ed.state().cursor(), 0);
        assert!(!ed.state().is_recalling());
        assert_eq!(ed.apply(NEWER), EditOutcome::Unchanged);
    }

    #[test]
    fn history_nav_on_empty_history_is_noop() {
        let mut ed = LineEditor::new();
        type_text(&mut ed, b"draft");
        assert_eq!(ed.apply(OLDER), EditOutcome::Unchanged);
        assert_eq!(ed.apply(NEWER), EditOutcome::Unchanged);
        assert_eq!(ed.state().text(), b"draft");
    }

    #[test]
    fn editing_recalled_line_leaves_history_untouched() {
        let mut ed = LineEditor::new();
        submit(&mut ed, b"ls");
        submit(&mut ed, b"pwd");

        ed.apply(OLDER);
        ed.apply(OLDER);
        assert_eq!(ed.state().history_cursor(), 0);

        type_text(&mut ed, b" -la");
        assert_eq!(ed.state().text(), b"ls -la");
        assert_eq!(ed.state().history_cursor(), 2);
        assert_eq!(ed.state().history(), &[b"ls".to_vec(), b"pwd".to_vec()]);

        ed.apply(EditEvent::Backspace);
        ed.apply(LEFT);
        ed.apply(EditEvent::DeleteChar);
        assert_eq!(ed.state().history()[0], b"ls");

        assert_eq!(
            ed.apply(EditEvent::Submit),
            EditOutcome::Submit {
                line: Some(b"ls -".to_vec())
            }
        );
        assert_eq!(ed.state().history().len(), 3);
        assert_eq!(ed.state().history()[0], b"ls");
    }

    #[test]
    fn backspace_on_recalled_line_detaches() {
        let mut ed = LineEditor::with_state(LineState::with_history(["echo hi"]));
        ed.apply(OLDER);
        assert!(ed.state().is_recalling());
        ed.apply(EditEvent::Backspace);
        assert!(!ed.state().is_recalling());
        assert_eq!(ed.state().text(), b"echo h");
        assert_eq!(ed.state().history()[0], b"echo hi");
    }

    #[test]
    fn cursor_moves_keep_recall_position() {
        let mut ed = LineEditor::with_state(LineState::with_history(["a", "b"]));
        ed.apply(OLDER);
        ed.apply(LEFT);
        assert_eq!(ed.state().history_cursor(), 1);
    }

    #[test]
    fn with_history_skips_empty_entries() {
        let state = LineState::with_history(["ls", "", "pwd"]);
        assert_eq!(state.history(), &[b"ls".to_vec(), b"pwd".to_vec()]);
        assert_eq!(state.history_cursor(), 2);
    }

    #[test]
    fn apply_all_collects_outcomes() {
        let mut ed = LineEditor::new();
        let outcomes = ed.apply_all([
            EditEvent::InsertChar(b'a'),
            EditEvent::Backspace,
            EditEvent::Backspace,
        ]);
        assert_eq!(
            outcomes,
            vec![
                EditOutcome::Render(RenderIntent::Append(b'a')),
                EditOutcome::Render(RenderIntent::RefreshTail { from: 0 }),
                EditOutcome::Unchanged,
            ]
        );
    }
}
