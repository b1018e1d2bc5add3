//! Source position tracking and restoration.
//!
//! This crate provides the coordinate substrate shared by the synthesis and
//! restoration stages: byte spans, line indexes, coordinate pairs and the
//! [`RestoreMap`] that maps a synthesized script back to the document it was
//! assembled from.

mod line_index;
mod locations;
mod restore_map;
mod span;

pub use line_index::{LineCol, LineIndex};
pub use locations::{CoordinatePair, DocumentLocations, LocationConverter, Position, SourceLocation};
pub use restore_map::{CorrespondencePoint, Mapping, RestoreMap};
pub use span::{ByteOffset, Span};
