//! Source positions in language-service coordinates.
//!
//! Lines and characters are 0-based, as on the LSP wire. `Range::end` is
//! exclusive in the character dimension and inclusive in the line dimension.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whole-line range `[start_line, end_line]`.
    pub fn lines(start_line: u32, end_line: u32) -> Self {
        Self {
            start: Position::new(start_line, 0),
            end: Position::new(end_line, 0),
        }
    }

    pub fn contains_line(&self, line: u32) -> bool {
        self.start.line <= line && line <= self.end.line
    }

    /// Slice `text` by this range. Out-of-bounds coordinates are clamped.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        let start = offset_of(text, self.start);
        let end = offset_of(text, self.end).max(start);
        &text[start..end]
    }
}

/// Byte offset of `pos` in `text`, clamped to line/text ends.
/// `character` counts UTF-16 code units, as LSP positions do.
fn offset_of(text: &str, pos: Position) -> usize {
    let mut line_start = 0usize;
    for _ in 0..pos.line {
        match text[line_start..].find('\n') {
            Some(i) => line_start += i + 1,
            None => return text.len(),
        }
    }
    let line_end = text[line_start..]
        .find('\n')
        .map_or(text.len(), |i| line_start + i);

    let mut units = 0u32;
    for (i, ch) in text[line_start..line_end].char_indices() {
        if units >= pos.character {
            return line_start + i;
        }
        units += ch.len_utf16() as u32;
    }
    line_end
}
