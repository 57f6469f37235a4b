//! Source positions.
//!
//! Every position is a byte offset into the UTF-8 source text. Nodes created by
//! the instrumenter carry [`TextRange::SYNTHESIZED`], which lets later stages
//! (the printer's comment pass, diagnostics) tell real source apart from
//! generated code.

use std::fmt;
use std::ops::Range;

/// A byte offset into the source text.
pub type TextPos = u32;

/// A `[pos, end)` range of source text attached to tokens and nodes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct TextRange {
    pub pos: TextPos,
    pub end: TextPos,
}

impl TextRange {
    /// Range used by nodes that have no source text of their own.
    pub const SYNTHESIZED: TextRange = TextRange {
        pos: TextPos::MAX,
        end: TextPos::MAX,
    };

    #[inline]
    pub fn new(pos: TextPos, end: TextPos) -> Self {
        debug_assert!(end >= pos);
        Self { pos, end }
    }

    #[inline]
    pub fn empty(pos: TextPos) -> Self {
        Self { pos, end: pos }
    }

    #[inline]
    pub fn len(&self) -> TextPos {
        self.end - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos == self.end
    }

    #[inline]
    pub fn is_synthesized(&self) -> bool {
        self.pos == TextPos::MAX
    }

    #[inline]
    pub fn contains(&self, pos: TextPos) -> bool {
        pos >= self.pos && pos < self.end
    }

    #[inline]
    pub fn to_range(&self) -> Range<usize> {
        self.pos as usize..self.end as usize
    }

    #[inline]
    pub fn to_span(&self) -> TextSpan {
        if self.is_synthesized() {
            return TextSpan::new(0, 0);
        }
        TextSpan::from_bounds(self.pos, self.end)
    }

    /// Return the smallest range covering both ranges. Synthesized ranges are
    /// absorbed by real ones.
    pub fn cover(&self, other: TextRange) -> TextRange {
        match (self.is_synthesized(), other.is_synthesized()) {
            (true, _) => other,
            (_, true) => *self,
            _ => TextRange::new(self.pos.min(other.pos), self.end.max(other.end)),
        }
    }

    /// Slice the source text this range covers. Synthesized or out-of-bounds
    /// ranges yield an empty string.
    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        if self.is_synthesized() {
            return "";
        }
        text.get(self.to_range()).unwrap_or("")
    }
}

impl fmt::Debug for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_synthesized() {
            write!(f, "<synthesized>")
        } else {
            write!(f, "{}..{}", self.pos, self.end)
        }
    }
}

/// A `start + length` span, the shape diagnostics and miette labels use.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct TextSpan {
    pub start: TextPos,
    pub length: TextPos,
}

impl TextSpan {
    #[inline]
    pub fn new(start: TextPos, length: TextPos) -> Self {
        Self { start, length }
    }

    #[inline]
    pub fn from_bounds(start: TextPos, end: TextPos) -> Self {
        debug_assert!(end >= start);
        Self {
            start,
            length: end - start,
        }
    }

    #[inline]
    pub fn end(&self) -> TextPos {
        self.start + self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    pub fn contains(&self, pos: TextPos) -> bool {
        pos >= self.start && pos < self.end()
    }
}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.start, self.length)
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

impl From<TextRange> for TextSpan {
    fn from(range: TextRange) -> Self {
        range.to_span()
    }
}

/// Zero-based line and byte column.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LineAndColumn {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for LineAndColumn {
    /// Renders the one-based `line:column` form editors expect.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Offsets of every line start, for turning byte offsets into line/column pairs.
#[derive(Debug, Clone)]
pub struct LineMap {
    line_starts: Vec<TextPos>,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| (i + 1) as TextPos),
        );
        Self { line_starts }
    }

    pub fn line_of(&self, pos: TextPos) -> u32 {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line as u32,
            Err(next) => (next - 1) as u32,
        }
    }

    pub fn line_and_column_of(&self, pos: TextPos) -> LineAndColumn {
        let line = self.line_of(pos);
        LineAndColumn {
            line,
            column: pos - self.line_starts[line as usize],
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_basics() {
        let r = TextRange::new(4, 9);
        assert_eq!(r.len(), 5);
        assert!(r.contains(4));
        assert!(!r.contains(9));
        assert_eq!(r.slice("let value = 1;"), "value");
    }

    #[test]
    fn test_synthesized_range() {
        let r = TextRange::SYNTHESIZED;
        assert!(r.is_synthesized());
        assert_eq!(r.slice("abc"), "");
        assert_eq!(r.cover(TextRange::new(1, 2)), TextRange::new(1, 2));
        assert_eq!(format!("{:?}", r), "<synthesized>");
    }

    #[test]
    fn test_cover() {
        let a = TextRange::new(2, 5);
        let b = TextRange::new(4, 11);
        assert_eq!(a.cover(b), TextRange::new(2, 11));
    }

    #[test]
    fn test_span_from_range() {
        let span: TextSpan = TextRange::new(3, 8).into();
        assert_eq!(span.start, 3);
        assert_eq!(span.length, 5);
        assert_eq!(span.end(), 8);
    }

    #[test]
    fn test_line_map() {
        let map = LineMap::new("a\nbc\n\ndef");
        assert_eq!(map.line_count(), 4);
        assert_eq!(map.line_of(0), 0);
        assert_eq!(map.line_of(2), 1);
        assert_eq!(map.line_of(5), 2);
        let lc = map.line_and_column_of(7);
        assert_eq!(lc, LineAndColumn { line: 3, column: 1 });
        assert_eq!(lc.to_string(), "4:2");
    }
}
