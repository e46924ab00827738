use std::fmt;
use std::ops::Range;

/// A byte offset into a pattern.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct Position {
    pub offset: usize,
}

impl Position {
    pub fn new(offset: usize) -> Position {
        Position { offset }
    }
}

/// The region of the pattern an instruction was compiled from.
#[derive(Clone, Copy, Eq, PartialEq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn point(pos: Position) -> Span {
        Span {
            start: pos,
            end: pos,
        }
    }

    pub fn new(start: Position, end: Position) -> Span {
        Span { start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start.offset..self.end.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Span {
        Span::new(Position::new(range.start), Position::new(range.end))
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}, {})", self.start.offset, self.end.offset)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.offset, self.end.offset)
    }
}
