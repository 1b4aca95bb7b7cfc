#![forbid(unsafe_code)]

//! Canonical editing events.
//!
//! The [`EscapeDecoder`](crate::decoder::EscapeDecoder) reduces raw bytes to
//! these; the [`LineEditor`](crate::line_editor::LineEditor) applies them.
//! Text is handled as raw bytes: multi-byte characters are out of scope, and
//! a timed-out `ESC` must be insertable as a literal `0x1B`.

/// Horizontal cursor direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorDirection {
    /// Toward offset 0 (`CSI D`).
    Left,
    /// Toward the end of the line (`CSI C`).
    Right,
}

/// History recall direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryDirection {
    /// Previous (older) entry (`CSI A`).
    Older,
    /// Next (newer) entry, ending at the fresh line (`CSI B`).
    Newer,
}

/// One logical edit produced by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditEvent {
    /// Insert a byte at the cursor.
    InsertChar(u8),
    /// Cursor key. The second field is the CSI count parameter as sent
    /// (missing or 0 reads as 1); the editor always moves one position.
    MoveCursor(CursorDirection, u32),
    /// Delete the byte under the cursor (`CSI 3 ~`).
    DeleteChar,
    /// Delete the byte before the cursor (BS or DEL).
    Backspace,
    /// Recall an older or newer history entry.
    HistoryNav(HistoryDirection),
    /// Submit the current line (CR or LF).
    Submit,
}
