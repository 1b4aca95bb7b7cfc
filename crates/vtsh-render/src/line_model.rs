#![forbid(unsafe_code)]

//! Terminal model for presenter validation.
//!
//! Understands exactly what the presenter emits: printable ASCII, CR, LF,
//! CUF, CUB and erase-to-end (`CSI K`). Anything else is ignored. Rows grow on demand and have
//! no width limit, so there is no wrapping.
//!
//! ```
//! use vtsh_render::line_model::LineModel;
//!
//! let mut model = LineModel::new();
//! model.process(b"$ hello\x1b[3D");
//! assert_eq!(model.row_text(0), "$ hello");
//! assert_eq!(model.cursor(), (4, 0));
//! ```

/// Minimal line-oriented terminal.
#[derive(Debug, Clone, Default)]
pub struct LineModel {
    rows: Vec<Vec<u8>>,
    x: usize,
    y: usize,
    parser: Parser,
}

#[derive(Debug, Clone, Default)]
enum Parser {
    #[default]
    Ground,
    Escape,
    Csi(Vec<u8>),
}

impl LineModel {
    /// Empty screen, cursor at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor position as `(column, row)`.
    #[must_use]
    pub fn cursor(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Text of a row with trailing blanks removed.
    #[must_use]
    pub fn row_text(&self, y: usize) -> String {
        let row = self.rows.get(y).map(Vec::as_slice).unwrap_or_default();
        String::from_utf8_lossy(row).trim_end().to_owned()
    }

    /// Feed output bytes.
    pub fn process(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.step(b);
        }
    }

    fn step(&mut self, b: u8) {
        match std::mem::take(&mut self.parser) {
            Parser::Ground => match b {
                0x1B => self.parser = Parser::Escape,
                b'\r' => self.x = 0,
                b'\n' => self.y += 1,
                0x20..=0x7E => self.put(b),
                _ => {}
            },
            Parser::Escape => {
                if b == b'[' {
                    self.parser = Parser::Csi(Vec::new());
                }
            }
            Parser::Csi(mut params) => match b {
                b'0'..=b'9' | b';' => {
                    params.push(b);
                    self.parser = Parser::Csi(params);
                }
                _ => self.dispatch_csi(&params, b),
            },
        }
    }

    fn dispatch_csi(&mut self, params: &[u8], final_byte: u8) {
        let n = std::str::from_utf8(params)
            .ok()
            .and_then(|s| s.parse::<usize>().ok());
        match final_byte {
            b'C' => self.x += n.unwrap_or(1).max(1),
            b'D' => self.x = self.x.saturating_sub(n.unwrap_or(1).max(1)),
            b'K' if n.unwrap_or(0) == 0 => {
                let x = self.x;
                self.row_mut().truncate(x);
            }
            _ => {}
        }
    }

    fn put(&mut self, b: u8) {
        let x = self.x;
        let row = self.row_mut();
        if row.len() <= x {
            row.resize(x + 1, b' ');
        }
        row[x] = b;
        self.x += 1;
    }

    fn row_mut(&mut self) -> &mut Vec<u8> {
        if self.rows.len() <= self.y {
            self.rows.resize_with(self.y + 1, Vec::new);
        }
        &mut self.rows[self.y]
    }
}
