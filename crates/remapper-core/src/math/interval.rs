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

use num_traits::PrimInt;
use std::{
    cmp::{max, min},
    iter::FusedIterator,
    ops::RangeInclusive,
};

/// A closed interval `[start, end]` with both bounds inclusive.
///
/// This struct represents a contiguous, non-empty set of integers. Unlike a
/// half-open range it can end at `T::max_value()`, which is required for
/// mappings that cover the whole domain of the integer type.
///
/// # Invariants
///
/// - `start` must be less than or equal to `end`.
/// - The span `end - start` must be representable in `T`. This only rules out
///   signed intervals wider than `T::max_value()`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClosedInterval<T>
where
    T: PrimInt,
{
    start: T,
    end: T,
}

/// The result of cutting one interval by another.
///
/// `inside` is the overlap of the two intervals, `before` and `after` are the
/// remainders of the interval that was cut. Together they cover the original
/// interval exactly, in ascending order, without overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trisection<T>
where
    T: PrimInt,
{
    /// The part that lies strictly before the cut, if any.
    pub before: Option<ClosedInterval<T>>,
    /// The part covered by the cut.
    pub inside: ClosedInterval<T>,
    /// The part that lies strictly after the cut, if any.
    pub after: Option<ClosedInterval<T>>,
}

impl<T> Trisection<T>
where
    T: PrimInt,
{
    /// Returns `true` if the cut introduced at least one new boundary, i.e.
    /// the original interval was not entirely inside the cut.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use remapper_core::math::interval::ClosedInterval;
    ///
    /// let iv = ClosedInterval::new(0, 9);
    /// assert!(iv.trisect(ClosedInterval::new(5, 20)).unwrap().is_proper());
    /// assert!(!iv.trisect(ClosedInterval::new(0, 20)).unwrap().is_proper());
    /// ```
    #[inline]
    pub fn is_proper(&self) -> bool {
        self.before.is_some() || self.after.is_some()
    }

    /// Returns the number of pieces (1 to 3).
    #[inline]
    pub fn len(&self) -> usize {
        1 + usize::from(self.before.is_some()) + usize::from(self.after.is_some())
    }

    /// Always `false`; a trisection holds at least the `inside` piece.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates over the pieces in ascending order.
    #[inline]
    pub fn pieces(&self) -> TrisectionPieces<T> {
        TrisectionPieces {
            slots: [self.before, Some(self.inside), self.after],
            position: 0,
        }
    }
}

/// An iterator over the non-empty pieces of a `Trisection`, in ascending order.
pub struct TrisectionPieces<T>
where
    T: PrimInt,
{
    slots: [Option<ClosedInterval<T>>; 3],
    position: usize,
}

impl<T> Iterator for TrisectionPieces<T>
where
    T: PrimInt,
{
    type Item = ClosedInterval<T>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.position < self.slots.len() {
            let slot = self.slots[self.position];
            self.position += 1;
            if slot.is_some() {
                return slot;
            }
        }
        None
    }
}

impl<T> FusedIterator for TrisectionPieces<T> where T: PrimInt {}

impl<T> ClosedInterval<T>
where
    T: PrimInt,
{
    /// Creates a new `ClosedInterval`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`, or if `end - start` overflows `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use remapper_core::math::interval::ClosedInterval;
    ///
    /// let iv = ClosedInterval::new(0, 10);
    /// assert_eq!(iv.span(), 10);
    /// ```
    #[inline]
    pub fn new(start: T, end: T) -> Self {
        assert!(
            start <= end,
            "Invalid interval: start must be less than or equal to end"
        );
        assert!(
            end.checked_sub(&start).is_some(),
            "Invalid interval: span end - start is not representable"
        );
        Self { start, end }
    }

    /// Creates a new `ClosedInterval` if the inputs are valid.
    ///
    /// Returns `None` if `start > end` or if the span overflows `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use remapper_core::math::interval::ClosedInterval;
    ///
    /// assert!(ClosedInterval::try_new(0, 10).is_some());
    /// assert!(ClosedInterval::try_new(10, 0).is_none());
    /// assert!(ClosedInterval::try_new(i8::MIN, i8::MAX).is_none());
    /// ```
    #[inline]
    pub fn try_new(start: T, end: T) -> Option<Self> {
        if start <= end && end.checked_sub(&start).is_some() {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Creates a new `ClosedInterval` without checking invariants in release builds.
    ///
    /// The caller must ensure `start <= end`. This function contains a
    /// `debug_assert!` to catch errors during development.
    #[inline]
    pub fn new_unchecked(start: T, end: T) -> Self {
        debug_assert!(
            start <= end,
            "Invalid interval: start must be less than or equal to end"
        );
        Self { start, end }
    }

    /// Returns the inclusive start bound of the interval.
    #[inline]
    pub const fn start(&self) -> T {
        self.start
    }

    /// Returns the inclusive end bound of the interval.
    #[inline]
    pub const fn end(&self) -> T {
        self.end
    }

    /// Returns `end - start`, one less than the number of contained values.
    ///
    /// The count itself is not returned because it does not fit in `T` for
    /// an interval spanning the whole type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use remapper_core::math::interval::ClosedInterval;
    ///
    /// assert_eq!(ClosedInterval::new(5u8, 5).span(), 0);
    /// assert_eq!(ClosedInterval::new(0u8, 255).span(), 255);
    /// ```
    #[inline]
    pub fn span(&self) -> T {
        self.end - self.start
    }

    /// Returns `true` if `value` lies in `[start, end]`.
    #[inline]
    pub fn contains_point(&self, value: T) -> bool {
        self.start <= value && value <= self.end
    }

    /// Returns `true` if `other` lies entirely within `self`.
    #[inline]
    pub fn contains_interval(&self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns `true` if the two intervals share at least one value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use remapper_core::math::interval::ClosedInterval;
    ///
    /// let a = ClosedInterval::new(0, 10);
    /// assert!(a.intersects(ClosedInterval::new(10, 20))); // shared endpoint
    /// assert!(!a.intersects(ClosedInterval::new(11, 20)));
    /// ```
    #[inline]
    pub fn intersects(&self, other: Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Calculates the intersection of two intervals.
    ///
    /// Returns `None` if the intervals share no value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use remapper_core::math::interval::ClosedInterval;
    ///
    /// let a = ClosedInterval::new(0, 10);
    /// let b = ClosedInterval::new(5, 15);
    /// assert_eq!(a.intersection(b), Some(ClosedInterval::new(5, 10)));
    /// ```
    #[inline]
    pub fn intersection(&self, other: Self) -> Option<Self> {
        let start = max(self.start, other.start);
        let end = min(self.end, other.end);
        if start <= end {
            Some(Self::new_unchecked(start, end))
        } else {
            None
        }
    }

    /// Returns the distance of `value` from `start`, or `None` if `value`
    /// lies outside the interval.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use remapper_core::math::interval::ClosedInterval;
    ///
    /// let iv = ClosedInterval::new(100, 200);
    /// assert_eq!(iv.offset_of(150), Some(50));
    /// assert_eq!(iv.offset_of(201), None);
    /// ```
    #[inline]
    pub fn offset_of(&self, value: T) -> Option<T> {
        if self.contains_point(value) {
            Some(value - self.start)
        } else {
            None
        }
    }

    /// Returns the value at distance `offset` from `start`, or `None` if that
    /// would fall outside the interval. Inverse of `offset_of`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use remapper_core::math::interval::ClosedInterval;
    ///
    /// let iv = ClosedInterval::new(100, 200);
    /// assert_eq!(iv.at_offset(50), Some(150));
    /// assert_eq!(iv.at_offset(101), None);
    /// ```
    #[inline]
    pub fn at_offset(&self, offset: T) -> Option<T> {
        if offset >= T::zero() && offset <= self.span() {
            Some(self.start + offset)
        } else {
            None
        }
    }

    /// Cuts `self` by `cut`, producing the parts before, inside and after it.
    ///
    /// Returns `None` if the intervals do not intersect. The cut points are
    /// `cut.start()` (first value inside) and `cut.end() + 1` (first value
    /// after), so no value ends up in two pieces.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use remapper_core::math::interval::ClosedInterval;
    ///
    /// let iv = ClosedInterval::new(100, 200);
    /// let t = iv.trisect(ClosedInterval::new(130, 180)).unwrap();
    /// assert_eq!(t.before, Some(ClosedInterval::new(100, 129)));
    /// assert_eq!(t.inside, ClosedInterval::new(130, 180));
    /// assert_eq!(t.after, Some(ClosedInterval::new(181, 200)));
    /// ```
    pub fn trisect(&self, cut: Self) -> Option<Trisection<T>> {
        let inside = self.intersection(cut)?;

        // inside.start > self.start >= T::min_value(), so the decrement is safe;
        // likewise inside.end < self.end <= T::max_value() for the increment.
        let before = if self.start < inside.start {
            Some(Self::new_unchecked(self.start, inside.start - T::one()))
        } else {
            None
        };
        let after = if inside.end < self.end {
            Some(Self::new_unchecked(inside.end + T::one(), self.end))
        } else {
            None
        };

        Some(Trisection {
            before,
            inside,
            after,
        })
    }
}

impl<T> std::fmt::Debug for ClosedInterval<T>
where
    T: PrimInt + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosedInterval")
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}

impl<T> std::fmt::Display for ClosedInterval<T>
where
    T: PrimInt + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

impl<T> From<RangeInclusive<T>> for ClosedInterval<T>
where
    T: PrimInt,
{
    #[inline]
    fn from(range: RangeInclusive<T>) -> Self {
        let (start, end) = range.into_inner();
        Self::new(start, end)
    }
}

impl<T> From<ClosedInterval<T>> for RangeInclusive<T>
where
    T: PrimInt,
{
    #[inline]
    fn from(iv: ClosedInterval<T>) -> Self {
        iv.start..=iv.end
    }
}
