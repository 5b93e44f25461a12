// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Segment algebra for piecewise-linear remapping.
//!
//! A `Segment<T>` maps a closed source range onto a closed destination range
//! of the same length by a fixed translation. Segments are values: every
//! operation here returns fresh segments and leaves the receiver untouched.
//!
//! Three operations subdivide a segment by another range and return the
//! replacement pieces in source order (one to three of them, kept inline in a
//! `SmallVec`):
//!
//! - `split_source` cuts at the boundaries of a source-space range.
//! - `split_destination` cuts at the boundaries of a destination-space range.
//! - `insert` cuts at the boundaries of another segment's source range and
//!   remaps the covered piece through that segment.
//!
//! The pieces always cover exactly the receiver's source range. A request that
//! does not touch the receiver yields the receiver unchanged. Nothing here
//! enumerates the values of a range, so ranges spanning billions of values
//! cost the same as short ones.

use crate::error::SegmentError;
use num_traits::PrimInt;
use remapper_core::math::interval::ClosedInterval;
use smallvec::{SmallVec, smallvec};

/// The replacement pieces produced by subdividing one segment.
pub type Pieces<T> = SmallVec<[Segment<T>; 3]>;

/// Distinguishes rules supplied by the caller from identity filler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// A mapping supplied explicitly.
    Explicit,
    /// Placeholder covering values no explicit rule mentions.
    Default,
}

impl SegmentKind {
    /// Returns `true` for `SegmentKind::Default`.
    #[inline]
    pub fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// Combines the kinds of an existing piece and the rule remapping it.
    /// The result stays `Default` only if both are.
    #[inline]
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Default, Self::Default) => Self::Default,
            _ => Self::Explicit,
        }
    }
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// A translation of one closed source range onto an equally long
/// destination range.
///
/// # Invariants
///
/// `source.span() == destination.span()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment<T>
where
    T: PrimInt,
{
    source: ClosedInterval<T>,
    destination: ClosedInterval<T>,
    kind: SegmentKind,
}

/// Returns the inclusive end of a range of `length` values starting at `start`.
#[inline]
fn last_value<T>(start: T, length: T) -> Result<T, SegmentError<T>>
where
    T: PrimInt,
{
    if length <= T::zero() {
        return Err(SegmentError::NonPositiveLength { length });
    }
    start
        .checked_add(&(length - T::one()))
        .ok_or(SegmentError::Overflow { start, length })
}

impl<T> Segment<T>
where
    T: PrimInt,
{
    /// Creates an explicit segment mapping `length` values starting at
    /// `source_start` onto values starting at `destination_start`.
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::NonPositiveLength` if `length <= 0` and
    /// `SegmentError::Overflow` if either range would run past `T::max_value()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use remapper_engine::segment::Segment;
    ///
    /// let s = Segment::new(98u64, 50, 2).unwrap();
    /// assert_eq!(s.transform(99), Some(51));
    /// assert_eq!(s.transform(100), None);
    /// ```
    pub fn new(
        source_start: T,
        destination_start: T,
        length: T,
    ) -> Result<Self, SegmentError<T>> {
        let source_end = last_value(source_start, length)?;
        let destination_end = last_value(destination_start, length)?;
        Ok(Self {
            source: ClosedInterval::new_unchecked(source_start, source_end),
            destination: ClosedInterval::new_unchecked(destination_start, destination_end),
            kind: SegmentKind::Explicit,
        })
    }

    /// Creates an explicit segment from a `(destination_start, source_start, length)`
    /// record, the field order used by mapping tables.
    #[inline]
    pub fn from_record(
        destination_start: T,
        source_start: T,
        length: T,
    ) -> Result<Self, SegmentError<T>> {
        Self::new(source_start, destination_start, length)
    }

    /// Creates a segment from explicit bounds.
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::LengthMismatch` if the ranges differ in length.
    pub fn from_intervals(
        source: ClosedInterval<T>,
        destination: ClosedInterval<T>,
        kind: SegmentKind,
    ) -> Result<Self, SegmentError<T>> {
        if source.span() != destination.span() {
            return Err(SegmentError::LengthMismatch {
                source,
                destination,
            });
        }
        Ok(Self {
            source,
            destination,
            kind,
        })
    }

    /// Creates a segment mapping `interval` onto itself.
    #[inline]
    pub fn identity(interval: ClosedInterval<T>, kind: SegmentKind) -> Self {
        Self {
            source: interval,
            destination: interval,
            kind,
        }
    }

    /// Returns a copy of this segment with its kind replaced.
    #[inline]
    pub fn with_kind(self, kind: SegmentKind) -> Self {
        Self { kind, ..self }
    }

    #[inline]
    pub fn source(&self) -> ClosedInterval<T> {
        self.source
    }

    #[inline]
    pub fn destination(&self) -> ClosedInterval<T> {
        self.destination
    }

    #[inline]
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        self.kind.is_default()
    }

    #[inline]
    pub fn contains_source(&self, value: T) -> bool {
        self.source.contains_point(value)
    }

    #[inline]
    pub fn contains_destination(&self, value: T) -> bool {
        self.destination.contains_point(value)
    }

    /// Maps a source value to its destination, or `None` if `value` lies
    /// outside the source range.
    #[inline]
    pub fn transform(&self, value: T) -> Option<T> {
        self.source
            .offset_of(value)
            .map(|offset| self.destination.start() + offset)
    }

    /// Maps a destination value back to its source, or `None` if `value`
    /// lies outside the destination range.
    #[inline]
    pub fn reverse_transform(&self, value: T) -> Option<T> {
        self.destination
            .offset_of(value)
            .map(|offset| self.source.start() + offset)
    }

    /// Returns the sub-segment covering `piece` of the source range, keeping
    /// the translation and kind.
    ///
    /// # Panics
    ///
    /// Panics if `piece` is not contained in the source range.
    fn restrict(&self, piece: ClosedInterval<T>) -> Self {
        assert!(
            self.source.contains_interval(piece),
            "called `restrict` with a piece outside the segment's source range"
        );
        let start = self.destination.start() + (piece.start() - self.source.start());
        Self {
            source: piece,
            destination: ClosedInterval::new_unchecked(start, start + piece.span()),
            kind: self.kind,
        }
    }

    /// Maps a sub-range of the destination back into source coordinates.
    fn source_of(&self, piece: ClosedInterval<T>) -> ClosedInterval<T> {
        debug_assert!(self.destination.contains_interval(piece));
        let start = self.source.start() + (piece.start() - self.destination.start());
        ClosedInterval::new_unchecked(start, start + piece.span())
    }

    /// Cuts this segment at the boundaries of `range`, given in source
    /// coordinates. The translation and kind of every piece are unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use remapper_core::math::interval::ClosedInterval;
    /// # use remapper_engine::segment::Segment;
    ///
    /// let s = Segment::new(100u32, 0, 100).unwrap();
    /// let pieces = s.split_source(ClosedInterval::new(150, 300));
    /// assert_eq!(pieces.len(), 2);
    /// assert_eq!(pieces[1].source(), ClosedInterval::new(150, 199));
    /// assert_eq!(pieces[1].destination(), ClosedInterval::new(50, 99));
    /// ```
    pub fn split_source(&self, range: ClosedInterval<T>) -> Pieces<T> {
        match self.source.trisect(range) {
            Some(cut) if cut.is_proper() => cut.pieces().map(|p| self.restrict(p)).collect(),
            _ => smallvec![*self],
        }
    }

    /// Cuts this segment at the boundaries of `range`, given in destination
    /// coordinates. The translation and kind of every piece are unchanged.
    pub fn split_destination(&self, range: ClosedInterval<T>) -> Pieces<T> {
        match self.destination.intersection(range) {
            Some(overlap) => self.split_source(self.source_of(overlap)),
            None => smallvec![*self],
        }
    }

    /// Merges the rule `other` into this segment.
    ///
    /// The part of this segment's source range covered by `other.source()` is
    /// remapped through `other`; the parts before and after it keep this
    /// segment's translation and kind. Up to three pieces are returned:
    ///
    /// - no overlap: `[self]`
    /// - `other` covers `self`: `[remapped]`
    /// - overlap at one edge: `[remapped, rest]` or `[rest, remapped]`
    /// - `other` strictly inside: `[left, remapped, right]`
    ///
    /// On an identity segment, remapping through `other` is the composition
    /// `other ∘ self`. The remapped piece is default only if both inputs are.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use remapper_core::math::interval::ClosedInterval;
    /// # use remapper_engine::segment::{Segment, SegmentKind};
    ///
    /// let filler = Segment::identity(ClosedInterval::new(100u32, 200), SegmentKind::Default);
    /// let rule = Segment::new(130, 50, 51).unwrap();
    /// let pieces = filler.insert(&rule);
    /// assert_eq!(pieces.len(), 3);
    /// assert_eq!(pieces[1].destination(), ClosedInterval::new(50, 100));
    /// assert!(!pieces[1].is_default());
    /// ```
    pub fn insert(&self, other: &Segment<T>) -> Pieces<T> {
        let mut pieces = self.split_source(other.source);
        for piece in pieces.iter_mut() {
            if other.source.contains_interval(piece.source) {
                let mapped = other.restrict(piece.source);
                *piece = Self {
                    source: piece.source,
                    destination: mapped.destination,
                    kind: piece.kind.merge(other.kind),
                };
            }
        }
        pieces
    }

    /// Returns `true` if `split_source(range)` would subdivide this segment.
    #[inline]
    pub fn cuts_source(&self, range: ClosedInterval<T>) -> bool {
        self.source
            .trisect(range)
            .is_some_and(|cut| cut.is_proper())
    }

    /// Returns `true` if `split_destination(range)` would subdivide this segment.
    #[inline]
    pub fn cuts_destination(&self, range: ClosedInterval<T>) -> bool {
        self.destination
            .trisect(range)
            .is_some_and(|cut| cut.is_proper())
    }
}

impl<T> std::fmt::Display for Segment<T>
where
    T: PrimInt + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {} ({})", self.source, self.destination, self.kind)
    }
}
