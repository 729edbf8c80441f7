use crate::error::{BvhError, Result};

/// A trimmed, non-blank source line together with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Line<'a> {
    pub number: usize,
    pub text: &'a str,
}

impl<'a> Line<'a> {
    pub fn tokens(&self) -> Vec<&'a str> {
        self.text.split_whitespace().collect()
    }
}

/// Forward-only cursor over the input lines. Blank lines are skipped.
pub(crate) struct LineCursor<'a> {
    lines: &'a [&'a str],
    pos: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(lines: &'a [&'a str]) -> Self {
        LineCursor { lines, pos: 0 }
    }

    /// Consume the next non-blank line, failing with `expected` in the message if the input is exhausted.
    pub fn next_line(&mut self, expected: &str) -> Result<Line<'a>> {
        self.advance().ok_or_else(|| BvhError::UnexpectedEof {
            expected: expected.to_string(),
        })
    }

    /// Consume the next line as-is, blank or not.
    pub fn next_raw_line(&mut self, expected: &str) -> Result<Line<'a>> {
        let text = self.lines.get(self.pos).copied().ok_or_else(|| BvhError::UnexpectedEof {
            expected: expected.to_string(),
        })?;
        self.pos += 1;
        Ok(Line {
            number: self.pos,
            text: text.trim(),
        })
    }

    /// Consume everything left, returning only the non-blank lines.
    pub fn remaining(&mut self) -> Vec<Line<'a>> {
        std::iter::from_fn(|| self.advance()).collect()
    }

    fn advance(&mut self) -> Option<Line<'a>> {
        while self.pos < self.lines.len() {
            let number = self.pos + 1;
            let text = self.lines[self.pos].trim();
            self.pos += 1;
            if !text.is_empty() {
                return Some(Line { number, text });
            }
        }
        None
    }
}

/// Parse a finite real number. `NaN` and infinities are rejected.
pub(crate) fn parse_real(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_skips_blank_lines_and_keeps_numbers() {
        let lines = ["HIERARCHY", "", "   ", "  ROOT hip  "];
        let mut cursor = LineCursor::new(&lines);
        assert_eq!(cursor.next_line("a").unwrap(), Line { number: 1, text: "HIERARCHY" });
        assert_eq!(cursor.next_line("b").unwrap(), Line { number: 4, text: "ROOT hip" });
        assert_eq!(
            cursor.next_line("MOTION"),
            Err(BvhError::UnexpectedEof {
                expected: "MOTION".to_string()
            })
        );
    }

    #[test]
    fn test_raw_line_keeps_blank_lines() {
        let lines = ["a", "", "  "];
        let mut cursor = LineCursor::new(&lines);
        cursor.next_line("a").unwrap();
        assert_eq!(cursor.next_raw_line("b").unwrap(), Line { number: 2, text: "" });
        assert_eq!(cursor.next_raw_line("c").unwrap(), Line { number: 3, text: "" });
        assert!(cursor.next_raw_line("d").is_err());
    }

    #[test]
    fn test_remaining_drains_cursor() {
        let lines = ["a", "", "b c"];
        let mut cursor = LineCursor::new(&lines);
        cursor.next_line("a").unwrap();
        let rest = cursor.remaining();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].tokens(), vec!["b", "c"]);
        assert!(cursor.remaining().is_empty());
    }

    #[test]
    fn test_parse_real() {
        assert_eq!(parse_real("-1.5"), Some(-1.5));
        assert_eq!(parse_real("3"), Some(3.0));
        assert_eq!(parse_real("1e-3"), Some(0.001));
        assert_eq!(parse_real("NaN"), None);
        assert_eq!(parse_real("inf"), None);
        assert_eq!(parse_real("abc"), None);
    }
}
