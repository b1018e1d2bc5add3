//! Script parse error types.

use source_map::{ByteOffset, LocationConverter};
use thiserror::Error;

/// An error raised by a script parser, in the coordinates of the text it parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ScriptError {
    /// The kind of error.
    pub kind: ScriptErrorKind,
    /// Offset into the parsed text.
    pub offset: ByteOffset,
}

impl ScriptError {
    /// Creates a new script error.
    pub fn new(kind: ScriptErrorKind, offset: impl Into<ByteOffset>) -> Self {
        Self {
            kind,
            offset: offset.into(),
        }
    }

    /// Creates a syntax error.
    pub fn syntax(message: impl Into<String>, offset: impl Into<ByteOffset>) -> Self {
        Self::new(
            ScriptErrorKind::Syntax {
                message: message.into(),
            },
            offset,
        )
    }

    /// Translates this error into document coordinates.
    ///
    /// `index` is where the error lands in the original document; callers
    /// compute it with the same offset or map they restore the tree with.
    pub fn at_document_index<C>(&self, index: ByteOffset, converter: &C) -> ParseError
    where
        C: LocationConverter + ?Sized,
    {
        ParseError::new(self.kind.to_string(), index, converter)
    }

    /// Translates this error by a fixed offset.
    pub fn shifted<C>(&self, offset: ByteOffset, converter: &C) -> ParseError
    where
        C: LocationConverter + ?Sized,
    {
        self.at_document_index(self.offset + offset, converter)
    }
}

/// The kind of script error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptErrorKind {
    /// The text is not valid script.
    #[error("{message}")]
    Syntax {
        /// A description of the problem.
        message: String,
    },

    /// The parser does not support a construct in the text.
    #[error("unsupported syntax: {message}")]
    Unsupported {
        /// A description of the construct.
        message: String,
    },
}

/// A parse error reported in original-document coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({line}:{column})")]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// Byte offset in the original document.
    pub index: ByteOffset,
    /// 1-indexed line.
    pub line: u32,
    /// 0-indexed column.
    pub column: u32,
}

impl ParseError {
    /// Creates a parse error located at `index` in the original document.
    pub fn new<C>(message: impl Into<String>, index: ByteOffset, converter: &C) -> Self
    where
        C: LocationConverter + ?Sized,
    {
        let position = converter.position(index);
        Self {
            message: message.into(),
            index,
            line: position.line,
            column: position.column,
        }
    }
}
