//! Read position over an immutable slice of lines.

pub(crate) struct Cursor<'a> {
    lines: &'a [String],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(lines: &'a [String]) -> Self {
        Self { lines, pos: 0 }
    }

    pub(crate) fn peek(&self) -> Option<&'a str> {
        self.peek_at(0)
    }

    /// Line `offset` positions ahead of the current one.
    pub(crate) fn peek_at(&self, offset: usize) -> Option<&'a str> {
        self.lines.get(self.pos + offset).map(String::as_str)
    }

    pub(crate) fn advance(&mut self) -> Option<&'a str> {
        let line = self.peek()?;
        self.pos += 1;
        Some(line)
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Lines between two saved positions.
    pub(crate) fn slice(&self, from: usize, to: usize) -> &'a [String] {
        &self.lines[from.min(self.lines.len())..to.min(self.lines.len())]
    }

    /// Advance while `pred` holds, returning the consumed lines.
    pub(crate) fn take_while<F>(&mut self, mut pred: F) -> &'a [String]
    where
        F: FnMut(&str) -> bool,
    {
        let start = self.pos;
        while let Some(line) = self.peek() {
            if !pred(line) {
                break;
            }
            self.pos += 1;
        }
        self.slice(start, self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &[&str]) -> Vec<String> {
        input.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn saved_positions_slice_consumed_lines() {
        let input = lines(&["a", "b", "c"]);
        let mut cursor = Cursor::new(&input);
        let mark = cursor.position();
        assert_eq!(cursor.peek_at(2), Some("c"));
        assert_eq!(cursor.peek_at(3), None);
        assert_eq!(cursor.advance(), Some("a"));
        assert_eq!(cursor.advance(), Some("b"));
        assert_eq!(cursor.slice(mark, cursor.position()), &input[..2]);
        assert_eq!(cursor.peek(), Some("c"));
    }

    #[test]
    fn take_while_stops_at_first_mismatch() {
        let input = lines(&["> a", "> b", "c"]);
        let mut cursor = Cursor::new(&input);
        let taken = cursor.take_while(|l| l.starts_with('>'));
        assert_eq!(taken.len(), 2);
        assert_eq!(cursor.peek(), Some("c"));
    }
}
