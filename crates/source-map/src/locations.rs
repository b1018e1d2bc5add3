//! Coordinate pairs and the location-conversion collaborator.

use crate::{ByteOffset, LineCol, LineIndex, Span};

/// A human-facing position: 1-based line, 0-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 0-indexed column (byte offset within the line).
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    #[inline]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl From<LineCol> for Position {
    fn from(lc: LineCol) -> Self {
        Self {
            line: lc.line + 1,
            column: lc.col,
        }
    }
}

/// The line/column half of a coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
}

impl SourceLocation {
    #[inline]
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// A location expressed both as line/column and as a byte range.
///
/// The two halves are always produced together by a [`LocationConverter`],
/// which keeps them consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordinatePair {
    pub range: Span,
    pub loc: SourceLocation,
}

/// Turns a byte range into a full coordinate pair.
///
/// This is the single source of truth for line/column information. Both the
/// restoration passes and the callers that build synthetic nodes go through
/// it.
pub trait LocationConverter {
    /// Converts a range in the converter's target coordinates.
    fn convert(&self, range: Span) -> CoordinatePair;

    /// Converts a single offset, returning its position.
    fn position(&self, offset: ByteOffset) -> Position {
        self.convert(Span::empty(offset)).loc.start
    }
}

impl<T: LocationConverter + ?Sized> LocationConverter for &T {
    fn convert(&self, range: Span) -> CoordinatePair {
        (**self).convert(range)
    }
}

/// Location conversion for the original document.
#[derive(Debug, Clone)]
pub struct DocumentLocations<'a> {
    text: &'a str,
    index: LineIndex,
}

impl<'a> DocumentLocations<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            index: LineIndex::new(text),
        }
    }

    /// The original document text.
    #[inline]
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// The line index over the original document.
    #[inline]
    pub fn line_index(&self) -> &LineIndex {
        &self.index
    }
}

impl LocationConverter for DocumentLocations<'_> {
    fn convert(&self, range: Span) -> CoordinatePair {
        // Offsets past the end clamp to the last position rather than failing.
        CoordinatePair {
            range,
            loc: SourceLocation {
                start: self.index.line_col_clamped(range.start).into(),
                end: self.index.line_col_clamped(range.end).into(),
            },
        }
    }
}
