#![forbid(unsafe_code)]

//! VT100 byte generators for single-line editing.
//!
//! Pure functions, no state: the [`LinePresenter`](crate::presenter::LinePresenter)
//! decides what to emit and these helpers encode it.
//!
//! | Sequence | Meaning |
//! |----------|---------|
//! | `\r` | CR, column 0 |
//! | `\n` | LF, next row |
//! | `ESC [ n C` | CUF, cursor forward |
//! | `ESC [ n D` | CUB, cursor back |
//! | `ESC [ n K` | EL, erase line |

use std::io::{self, Write};

/// Move cursor forward (right): `CSI n C`
pub fn cuf<W: Write>(w: &mut W, n: u16) -> io::Result<()> {
    if n == 0 {
        return Ok(());
    }
    if n == 1 {
        w.write_all(b"\x1b[C")
    } else {
        write!(w, "\x1b[{n}C")
    }
}

/// Move cursor back (left): `CSI n D`
pub fn cub<W: Write>(w: &mut W, n: u16) -> io::Result<()> {
    if n == 0 {
        return Ok(());
    }
    if n == 1 {
        w.write_all(b"\x1b[D")
    } else {
        write!(w, "\x1b[{n}D")
    }
}

/// Move the cursor horizontally by `delta` columns, splitting large moves.
pub fn move_horizontal<W: Write>(w: &mut W, delta: isize) -> io::Result<()> {
    let mut remaining = delta.unsigned_abs();
    while remaining > 0 {
        let step = u16::try_from(remaining).unwrap_or(u16::MAX);
        if delta < 0 {
            cub(w, step)?;
        } else {
            cuf(w, step)?;
        }
        remaining -= usize::from(step);
    }
    Ok(())
}

/// Move cursor to start of line: `\r` (CR)
#[inline]
pub fn cr<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\r")
}

/// Move cursor down one line: `\n` (LF)
///
/// Note: In raw mode (OPOST disabled), this moves down but keeps the column.
#[inline]
pub fn lf<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\n")
}

/// EL (Erase in Line) from the cursor to the end of the line: `CSI K`
#[inline]
pub fn erase_to_end<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// Visible form of a line byte.
///
/// Printable ASCII is shown as is. C0 controls and DEL use caret notation
/// (`ESC` → `^[`), and bytes from 0x80 up are shown as `\xHH`, so no line
/// byte ever reaches the terminal as a control code.
pub fn write_glyph<W: Write>(w: &mut W, byte: u8) -> io::Result<()> {
    match byte {
        0x20..=0x7E => w.write_all(&[byte]),
        0x00..=0x1F => w.write_all(&[b'^', byte + 0x40]),
        0x7F => w.write_all(b"^?"),
        _ => write!(w, "\\x{byte:02X}"),
    }
}

/// Columns taken by [`write_glyph`] for `byte`.
#[must_use]
pub const fn glyph_width(byte: u8) -> usize {
    match byte {
        0x20..=0x7E => 1,
        0x00..=0x1F | 0x7F => 2,
        _ => 4,
    }
}

/// Columns taken by a run of line bytes.
#[must_use]
pub fn text_width(bytes: &[u8]) -> usize {
    bytes.iter().map(|&b| glyph_width(b)).sum()
}

/// Write a run of line bytes with [`write_glyph`].
pub fn write_text<W: Write>(w: &mut W, bytes: &[u8]) -> io::Result<()> {
    // Printable runs go out in one call.
    let mut rest = bytes;
    while !rest.is_empty() {
        let printable = rest
            .iter()
            .position(|b| !(0x20..=0x7E).contains(b))
            .unwrap_or(rest.len());
        if printable > 0 {
            w.write_all(&rest[..printable])?;
            rest = &rest[printable..];
        } else {
            write_glyph(w, rest[0])?;
            rest = &rest[1..];
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_bytes<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> Vec<u8> {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        buf
    }

    #[test]
    fn cursor_moves() {
        assert_eq!(to_bytes(|w| cuf(w, 0)), b"");
        assert_eq!(to_bytes(|w| cuf(w, 1)), b"\x1b[C");
        assert_eq!(to_bytes(|w| cuf(w, 12)), b"\x1b[12C");
        assert_eq!(to_bytes(|w| cub(w, 0)), b"");
        assert_eq!(to_bytes(|w| cub(w, 1)), b"\x1b[D");
        assert_eq!(to_bytes(|w| cub(w, 3)), b"\x1b[3D");
    }

    #[test]
    fn move_horizontal_picks_direction() {
        assert_eq!(to_bytes(|w| move_horizontal(w, 0)), b"");
        assert_eq!(to_bytes(|w| move_horizontal(w, -2)), b"\x1b[2D");
        assert_eq!(to_bytes(|w| move_horizontal(w, 1)), b"\x1b[C");
    }

    #[test]
    fn move_horizontal_splits_large_moves() {
        let bytes = to_bytes(|w| move_horizontal(w, 70_000));
        assert_eq!(bytes, b"\x1b[65535C\x1b[4465C");
    }

    #[test]
    fn line_controls() {
        assert_eq!(to_bytes(cr), b"\r");
        assert_eq!(to_bytes(lf), b"\n");
        assert_eq!(to_bytes(erase_to_end), b"\x1b[K");
    }

    #[test]
    fn glyphs() {
        assert_eq!(to_bytes(|w| write_glyph(w, b'a')), b"a");
        assert_eq!(to_bytes(|w| write_glyph(w, 0x1B)), b"^[");
        assert_eq!(to_bytes(|w| write_glyph(w, 0x01)), b"^A");
        assert_eq!(to_bytes(|w| write_glyph(w, 0x7F)), b"^?");
        assert_eq!(to_bytes(|w| write_glyph(w, 0xE9)), b"\\xE9");
    }

    #[test]
    fn glyph_widths_match_output() {
        for byte in 0..=u8::MAX {
            let out = to_bytes(|w| write_glyph(w, byte));
            assert_eq!(out.len(), glyph_width(byte), "byte {byte:#04x}");
        }
    }

    #[test]
    fn text_mixes_runs_and_glyphs() {
        assert_eq!(to_bytes(|w| write_text(w, b"ls\x1bx")), b"ls^[x");
        assert_eq!(text_width(b"ls\x1bx"), 5);
        assert_eq!(to_bytes(|w| write_text(w, b"")), b"");
    }
}
