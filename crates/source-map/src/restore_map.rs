//! The ledger that inverts a synthesized text back to its original document.
//!
//! A [`RestoreMap`] is filled while a synthesized ("dist") text is assembled
//! from copied original slices and injected virtual fragments. Every copied
//! slice contributes a [`CorrespondencePoint`] at its start; every injected
//! fragment contributes a virtual range. Within a copied slice the mapping is
//! a pure additive shift, so one point per slice is enough.

use crate::{ByteOffset, Span};
use text_size::TextSize;

/// `dist` in the synthesized text corresponds to `original` in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrespondencePoint {
    pub original: ByteOffset,
    pub dist: ByteOffset,
}

impl CorrespondencePoint {
    #[inline]
    pub fn new(original: impl Into<ByteOffset>, dist: impl Into<ByteOffset>) -> Self {
        Self {
            original: original.into(),
            dist: dist.into(),
        }
    }

    /// Applies this point's additive shift to a dist offset.
    ///
    /// Offsets before the point shift backwards, saturating at zero.
    fn apply(&self, dist: ByteOffset) -> ByteOffset {
        let original = u32::from(self.original);
        let (dist, base) = (u32::from(dist), u32::from(self.dist));
        if dist >= base {
            TextSize::from(original + (dist - base))
        } else {
            TextSize::from(original.saturating_sub(base - dist))
        }
    }
}

/// A copied segment of the synthesized text and the original slice it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    /// The span in the synthesized output.
    pub generated: Span,
    /// The span in the original document.
    pub original: Span,
}

/// Correspondence points plus virtual ranges for one synthesized text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RestoreMap {
    /// Sorted by strictly increasing `dist`.
    points: Vec<CorrespondencePoint>,
    /// Sorted, non-overlapping, never adjacent (adjacent ranges are merged).
    virtual_ranges: Vec<Span>,
    /// Length of the synthesized text covered so far.
    dist_len: TextSize,
}

impl RestoreMap {
    /// Creates a new empty restore map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `dist` (a span at the current end of the synthesized
    /// text) was copied verbatim from `original`.
    pub fn push_copy(&mut self, original: ByteOffset, dist: Span) {
        if dist.is_empty() {
            return;
        }
        debug_assert!(
            self.points.last().map_or(true, |p| p.dist < dist.start),
            "correspondence points must be appended in increasing dist order"
        );
        self.points.push(CorrespondencePoint {
            original,
            dist: dist.start,
        });
        self.dist_len = self.dist_len.max(dist.end);
    }

    /// Records a synthesized span with no original counterpart.
    pub fn push_virtual(&mut self, dist: Span) {
        if dist.is_empty() {
            return;
        }
        self.dist_len = self.dist_len.max(dist.end);
        if let Some(last) = self.virtual_ranges.last_mut() {
            if last.end == dist.start {
                last.end = dist.end;
                return;
            }
        }
        self.virtual_ranges.push(dist);
    }

    /// Returns all correspondence points in recording order.
    #[inline]
    pub fn points(&self) -> &[CorrespondencePoint] {
        &self.points
    }

    /// Returns all virtual ranges in synthesized coordinates.
    #[inline]
    pub fn virtual_ranges(&self) -> &[Span] {
        &self.virtual_ranges
    }

    /// Returns the length of the synthesized text this map covers.
    #[inline]
    pub fn dist_len(&self) -> TextSize {
        self.dist_len
    }

    /// Returns true if nothing was recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.virtual_ranges.is_empty()
    }

    /// Returns the virtual range containing `dist`, if any.
    pub fn virtual_range_at(&self, dist: ByteOffset) -> Option<Span> {
        let idx = self.virtual_ranges.partition_point(|r| r.start <= dist);
        idx.checked_sub(1)
            .map(|i| self.virtual_ranges[i])
            .filter(|r| r.contains(dist))
    }

    /// Returns true if `span` lies entirely inside a single virtual range.
    pub fn is_virtual_span(&self, span: Span) -> bool {
        let idx = self.virtual_ranges.partition_point(|r| r.start <= span.start);
        idx.checked_sub(1)
            .map(|i| self.virtual_ranges[i])
            .is_some_and(|r| r.contains_span(span))
    }

    /// Finds the original offset corresponding to a synthesized offset.
    ///
    /// Returns `None` for offsets inside a virtual range, offsets before the
    /// first correspondence point and offsets past the synthesized text.
    pub fn original_offset(&self, dist: ByteOffset) -> Option<ByteOffset> {
        if dist > self.dist_len || self.virtual_range_at(dist).is_some() {
            return None;
        }
        let index = self.points.partition_point(|p| p.dist <= dist).checked_sub(1)?;
        let segment = self.segment(index);
        if dist > segment.generated.end {
            return None;
        }
        Some(self.points[index].apply(dist))
    }

    /// Finds the synthesized offset corresponding to an original offset.
    ///
    /// Returns `None` if the original offset was skipped during synthesis.
    pub fn dist_offset(&self, original: ByteOffset) -> Option<ByteOffset> {
        self.mappings()
            .find(|m| m.original.contains(original))
            .map(|m| m.generated.start + (original - m.original.start))
    }

    /// Remaps a synthesized range to original coordinates.
    ///
    /// Endpoints inside a virtual range snap to the adjacent copied text: a
    /// start snaps forward to the range's end and an end snaps back to its
    /// start. A span inside one virtual range collapses to that range's start.
    pub fn remap_span(&self, span: Span) -> Span {
        let Span { mut start, mut end } = span;

        let start_range = self.virtual_range_at(start);
        if let Some(range) = start_range {
            start = range.end;
        }
        let end_range = self.virtual_range_containing_end(end);
        if let Some(range) = end_range {
            end = range.start;
            if start_range == Some(range) {
                start = range.start;
            }
        }
        let Span { start, end } = Span { start, end }.ordered();

        let Some(first) = self.points.first() else {
            return Span { start, end };
        };
        let start_point = self.last_point_at_or_before(start).unwrap_or(first);
        let end_point = self.last_point_before(end).unwrap_or(first);
        Span {
            start: start_point.apply(start),
            end: end_point.apply(end),
        }
    }

    /// Enumerates the copied segments of the synthesized text.
    pub fn mappings(&self) -> impl Iterator<Item = Mapping> + '_ {
        (0..self.points.len()).map(move |index| self.segment(index))
    }

    /// The copied segment that starts at `points[index]`. It runs until the
    /// next point or the next virtual range, whichever comes first.
    fn segment(&self, index: usize) -> Mapping {
        let point = self.points[index];
        let next_point = self
            .points
            .get(index + 1)
            .map(|p| p.dist)
            .unwrap_or(self.dist_len);
        let next_virtual = self
            .virtual_ranges
            .iter()
            .map(|r| r.start)
            .find(|&start| start > point.dist)
            .unwrap_or(self.dist_len);
        let end = next_point.min(next_virtual);
        let len = end - point.dist;
        Mapping {
            generated: Span::new(point.dist, end),
            original: Span::new(point.original, point.original + len),
        }
    }

    fn last_point_at_or_before(&self, dist: ByteOffset) -> Option<&CorrespondencePoint> {
        let idx = self.points.partition_point(|p| p.dist <= dist);
        idx.checked_sub(1).map(|i| &self.points[i])
    }

    fn last_point_before(&self, dist: ByteOffset) -> Option<&CorrespondencePoint> {
        let idx = self.points.partition_point(|p| p.dist < dist);
        idx.checked_sub(1).map(|i| &self.points[i])
    }

    /// Virtual range with `start < end <= range.end`.
    fn virtual_range_containing_end(&self, end: ByteOffset) -> Option<Span> {
        let idx = self.virtual_ranges.partition_point(|r| r.start < end);
        idx.checked_sub(1)
            .map(|i| self.virtual_ranges[i])
            .filter(|r| end <= r.end)
    }
}
