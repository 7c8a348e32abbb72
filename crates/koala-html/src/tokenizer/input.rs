//! The input cursor feeding the tokenizer.
//!
//! [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
//!
//! "Before the tokenization stage, the input stream must be preprocessed by
//! normalizing newlines." The cursor does that lazily: a CRLF pair or a lone
//! CR is handed out as a single LF, while line, column and byte offset still
//! refer to the original text.

use serde::Serialize;

/// A location in the original input.
///
/// `line` and `column` are 1-based and count code points; `offset` is the
/// byte offset into the input as given, before newline normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, in code points.
    pub column: usize,
    /// Byte offset into the original input.
    pub offset: usize,
}

impl Position {
    /// The position before any input has been consumed.
    pub const START: Self = Self {
        line: 1,
        column: 0,
        offset: 0,
    };
}

/// Pull-based code point source with lookahead and position tracking.
#[derive(Debug, Clone)]
pub struct InputCursor {
    input: String,
    /// Byte index of the next code point to hand out.
    pos: usize,
    /// Line and column the next code point will have.
    line: usize,
    column: usize,
    /// Position of the code point most recently returned by `consume`.
    current: Position,
}

impl InputCursor {
    /// Create a cursor over `input`.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            pos: 0,
            line: 1,
            column: 1,
            current: Position::START,
        }
    }

    /// "Consume the next input character"
    ///
    /// Returns `None` once the input is exhausted; the position then points
    /// just past the last code point.
    pub fn consume(&mut self) -> Option<char> {
        let Some((c, width)) = self.decode_at(self.pos) else {
            self.current = Position {
                line: self.line,
                column: self.column,
                offset: self.input.len(),
            };
            return None;
        };

        self.current = Position {
            line: self.line,
            column: self.column,
            offset: self.pos,
        };
        self.pos += width;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// The `k`-th upcoming code point (0 is the next one) without consuming.
    #[must_use]
    pub fn peek(&self, k: usize) -> Option<char> {
        let mut pos = self.pos;
        for _ in 0..k {
            let (_, width) = self.decode_at(pos)?;
            pos += width;
        }
        self.decode_at(pos).map(|(c, _)| c)
    }

    /// Position of the current input character (the one last consumed).
    #[must_use]
    pub const fn position(&self) -> Position {
        self.current
    }

    /// Whether every code point has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// "If the next few characters are..." (exact match).
    #[must_use]
    pub fn next_chars_are(&self, target: &str) -> bool {
        target
            .chars()
            .enumerate()
            .all(|(i, expected)| self.peek(i) == Some(expected))
    }

    /// "...an ASCII case-insensitive match for the word..."
    #[must_use]
    pub fn next_chars_are_ignore_ascii_case(&self, target: &str) -> bool {
        target
            .chars()
            .enumerate()
            .all(|(i, expected)| self.peek(i).is_some_and(|c| c.eq_ignore_ascii_case(&expected)))
    }

    /// Consume `count` code points, e.g. after a successful `next_chars_are`.
    pub fn skip(&mut self, count: usize) {
        for _ in 0..count {
            if self.consume().is_none() {
                break;
            }
        }
    }

    /// Decode the normalized code point starting at byte `pos`, returning it
    /// with the number of original bytes it spans.
    fn decode_at(&self, pos: usize) -> Option<(char, usize)> {
        let mut chars = self.input.get(pos..)?.chars();
        match chars.next()? {
            '\r' if chars.next() == Some('\n') => Some(('\n', 2)),
            '\r' => Some(('\n', 1)),
            c => Some((c, c.len_utf8())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(cursor: &mut InputCursor) -> String {
        std::iter::from_fn(|| cursor.consume()).collect()
    }

    #[test]
    fn test_crlf_and_cr_become_lf() {
        let mut cursor = InputCursor::new("a\r\nb\rc\n");
        assert_eq!(drain(&mut cursor), "a\nb\nc\n");
    }

    #[test]
    fn test_positions_track_original_offsets() {
        let mut cursor = InputCursor::new("a\r\nbc");
        assert_eq!(cursor.consume(), Some('a'));
        assert_eq!(cursor.position(), Position { line: 1, column: 1, offset: 0 });
        assert_eq!(cursor.consume(), Some('\n'));
        assert_eq!(cursor.position(), Position { line: 1, column: 2, offset: 1 });
        assert_eq!(cursor.consume(), Some('b'));
        assert_eq!(cursor.position(), Position { line: 2, column: 1, offset: 3 });
        assert_eq!(cursor.consume(), Some('c'));
        assert_eq!(cursor.consume(), None);
        assert_eq!(cursor.position(), Position { line: 2, column: 3, offset: 5 });
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut cursor = InputCursor::new("x\r\ny");
        assert_eq!(cursor.peek(0), Some('x'));
        assert_eq!(cursor.peek(1), Some('\n'));
        assert_eq!(cursor.peek(2), Some('y'));
        assert_eq!(cursor.peek(3), None);
        assert_eq!(cursor.consume(), Some('x'));
        assert_eq!(cursor.peek(0), Some('\n'));
    }

    #[test]
    fn test_multibyte_offsets() {
        let mut cursor = InputCursor::new("é<");
        assert_eq!(cursor.consume(), Some('é'));
        assert_eq!(cursor.consume(), Some('<'));
        assert_eq!(cursor.position().offset, 2);
        assert_eq!(cursor.position().column, 2);
    }

    #[test]
    fn test_lookahead_matching() {
        let mut cursor = InputCursor::new("DocType html");
        assert!(cursor.next_chars_are_ignore_ascii_case("DOCTYPE"));
        assert!(!cursor.next_chars_are("DOCTYPE"));
        cursor.skip(7);
        assert_eq!(cursor.consume(), Some(' '));
        assert!(!cursor.next_chars_are("html5"));
        assert!(cursor.next_chars_are("html"));
        assert!(!cursor.is_exhausted());
    }
}
