//! Mapping character offsets to line and column numbers.
use std::fmt;

/// Source location consisting of a line and column number.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct Location {
    /// The source line.
    ///
    /// This follows the convention where the first line is line `1`.
    pub line: usize,
    /// The (character based) source column.
    ///
    /// This follows the convention where the first column is column `0`, so a failure directly
    /// after a newline is reported at column `0`.
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L: {}, C: {}", self.line, self.column)
    }
}

/// Offsets of all newline characters of a document.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct SourceMap {
    // sorted ascending
    newlines: Vec<usize>,
}

impl SourceMap {
    /// Indexes the newlines of `text`.
    pub fn new(text: &str) -> Self {
        Self::from_chars(text.chars())
    }

    /// Indexes the newlines of a document given as a sequence of characters.
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Self {
        let newlines = chars
            .into_iter()
            .enumerate()
            .filter_map(|(offset, c)| (c == '\n').then_some(offset))
            .collect();
        Self { newlines }
    }

    /// The character offsets of all newlines, in ascending order.
    pub fn newlines(&self) -> &[usize] {
        &self.newlines
    }

    /// Returns the location of the character at `position`.
    ///
    /// A newline character belongs to the line it terminates.
    pub fn locate(&self, position: usize) -> Location {
        let preceding = self.newlines.partition_point(|&newline| newline < position);
        let column = match preceding {
            0 => position,
            n => position - self.newlines[n - 1] - 1,
        };
        Location {
            line: preceding + 1,
            column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(line: usize, column: usize) -> Location {
        Location { line, column }
    }

    #[test]
    fn display_contains_line_and_column() {
        assert_eq!(at(283, 465).to_string(), "L: 283, C: 465");
    }

    #[test]
    fn newline_offsets() {
        assert_eq!(SourceMap::new("").newlines(), &[] as &[usize]);
        assert_eq!(SourceMap::new("12345").newlines(), &[] as &[usize]);
        assert_eq!(SourceMap::new("\n\n\n\n").newlines(), &[0, 1, 2, 3]);
        assert_eq!(SourceMap::new("ä\nö\n").newlines(), &[1, 3]);
    }

    #[test]
    fn first_line_uses_offset_as_column() {
        let map = SourceMap::new("abcdefghijklmnop");
        for n in [0, 1, 7, 100] {
            assert_eq!(map.locate(n), at(1, n));
        }
        let map = SourceMap::from_chars("01234\n6789\n".chars());
        assert_eq!(map.locate(0), at(1, 0));
    }

    #[test]
    fn lines_after_newlines() {
        let map = SourceMap::new("abcd\nefgh");
        assert_eq!(map.locate(4), at(1, 4));
        assert_eq!(map.locate(5), at(2, 0));
        assert_eq!(map.locate(7), at(2, 2));

        let map = SourceMap::new("\na\n");
        assert_eq!(map.locate(0), at(1, 0));
        assert_eq!(map.locate(1), at(2, 0));
        assert_eq!(map.locate(3), at(3, 0));
    }

    #[test]
    fn position_after_n_newlines_is_column_zero() {
        for n in 0..100 {
            let text = "\n".repeat(n) + "x";
            assert_eq!(SourceMap::new(&text).locate(n), at(n + 1, 0));
        }
    }
}
