use std::fmt::{self, Debug, Formatter};

/// A span of source code
#[derive(Clone, PartialEq, Eq, Copy, Hash, Default)]
pub struct Span {
    /// Byte offset from the start of the source. 0 indexed.
    pub start: u32,
    /// Length of the span in bytes.
    pub len: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Span {
            start,
            len: end.saturating_sub(start),
        }
    }

    pub fn end(&self) -> u32 {
        self.start + self.len
    }

    /// Smallest span covering both.
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end().max(other.end()))
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(a: Span) -> Self {
        a.start as usize..a.end() as usize
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

impl chumsky::Span for Span {
    type Context = ();

    type Offset = u32;

    fn new(_: Self::Context, range: std::ops::Range<Self::Offset>) -> Self {
        Span::new(range.start, range.end)
    }

    fn context(&self) -> Self::Context {}

    fn start(&self) -> Self::Offset {
        self.start
    }

    fn end(&self) -> Self::Offset {
        self.start + self.len
    }
}
