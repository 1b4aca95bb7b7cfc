#![forbid(unsafe_code)]

//! Turns editor render intents into terminal output.
//!
//! The presenter keeps one piece of state: the screen column of the cursor,
//! measured from the first column after the prompt. Every intent is carried
//! out relative to that column and ends with the screen cursor at
//! [`LineState::cursor`], so the on-screen line always mirrors the editor.

use std::io::{self, Write};

use vtsh_core::{LineState, RenderIntent};

use crate::ansi;

/// Single-line presenter.
#[derive(Debug, Clone)]
pub struct LinePresenter {
    prompt: String,
    column: usize,
}

impl LinePresenter {
    /// Presenter for the given prompt.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            column: 0,
        }
    }

    /// The prompt text.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Cursor column relative to the end of the prompt.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Print the prompt at the current position and start a fresh line.
    pub fn present_prompt<W: Write>(&mut self, w: &mut W) -> io::Result<()> {
        w.write_all(self.prompt.as_bytes())?;
        self.column = 0;
        w.flush()
    }

    /// Render one intent against the editor's new state.
    pub fn present<W: Write>(
        &mut self,
        intent: &RenderIntent,
        state: &LineState,
        w: &mut W,
    ) -> io::Result<()> {
        let text = state.text();
        match *intent {
            RenderIntent::Append(byte) => {
                ansi::write_glyph(w, byte)?;
                self.column += ansi::glyph_width(byte);
            }
            RenderIntent::CursorLeft | RenderIntent::CursorRight => {}
            RenderIntent::RefreshTail { from } => {
                let from = from.min(text.len());
                self.move_to(w, ansi::text_width(&text[..from]))?;
                ansi::write_text(w, &text[from..])?;
                ansi::erase_to_end(w)?;
                self.column = ansi::text_width(text);
            }
            RenderIntent::Redraw => {
                ansi::cr(w)?;
                ansi::erase_to_end(w)?;
                w.write_all(self.prompt.as_bytes())?;
                ansi::write_text(w, text)?;
                self.column = ansi::text_width(text);
            }
        }
        self.move_to(w, ansi::text_width(&text[..state.cursor()]))?;
        w.flush()
    }

    /// Finish the current line after a submit: CR LF, column reset.
    pub fn present_submit<W: Write>(&mut self, w: &mut W) -> io::Result<()> {
        ansi::cr(w)?;
        ansi::lf(w)?;
        self.column = 0;
        w.flush()
    }

    fn move_to<W: Write>(&mut self, w: &mut W, column: usize) -> io::Result<()> {
        let delta = column as isize - self.column as isize;
        ansi::move_horizontal(w, delta)?;
        self.column = column;
        Ok(())
    }
}
