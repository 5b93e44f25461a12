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

//! Partitions: total piecewise-linear mappings over a bounded domain.
//!
//! A `Partition<T>` owns an ordered sequence of `Segment<T>` values whose
//! source ranges tile its domain exactly: sorted, contiguous, with no gap and
//! no overlap. A new partition is a single default identity segment over the
//! whole domain; explicit rules are merged in with `add`, and boundaries are
//! introduced without changing the mapping with `split_source` and
//! `split_destination`. All three keep the tiling intact.
//!
//! Lookups come in three flavors: `transform` (source point to destination
//! point, binary search), `reverse_transform` (destination point back to the
//! first source point mapping onto it, linear scan) and `traverse` (exact
//! destination range to the segment producing it, hashed). The `traverse`
//! index is built on first use and dropped by every mutation, so it is never
//! read stale.

use crate::{
    error::{PartitionError, SegmentError},
    segment::{Pieces, Segment, SegmentKind},
};
use num_traits::PrimInt;
use remapper_core::math::interval::ClosedInterval;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::{cell::OnceCell, fmt::Debug, hash::Hash, ops::Range};
use tracing::trace;

/// Returns `[0, T::max_value()]`, the domain of a partition built without
/// an explicit one.
#[inline]
pub fn full_domain<T>() -> ClosedInterval<T>
where
    T: PrimInt,
{
    ClosedInterval::new_unchecked(T::zero(), T::max_value())
}

/// Checks that consecutive source ranges touch without gap or overlap.
fn check_contiguous<T>(segments: &[Segment<T>]) -> Result<(), PartitionError<T>>
where
    T: PrimInt,
{
    for pair in segments.windows(2) {
        let after = pair[0].source();
        let next = pair[1].source();
        if next.start() <= after.end() {
            return Err(PartitionError::Overlap { after, next });
        }
        // after.end() < next.start(), so the increment cannot overflow.
        if after.end() + T::one() != next.start() {
            return Err(PartitionError::Gap { after, next });
        }
    }
    Ok(())
}

/// Positions of the segments sharing one destination range, in source order.
type Producers = SmallVec<[usize; 2]>;

/// A named, gap-free tiling of a domain by segments.
#[derive(Debug, Clone)]
pub struct Partition<T>
where
    T: PrimInt + Hash,
{
    name: String,
    domain: ClosedInterval<T>,
    segments: Vec<Segment<T>>,
    destination_index: OnceCell<FxHashMap<ClosedInterval<T>, Producers>>,
}

impl<T> Partition<T>
where
    T: PrimInt + Hash + Debug,
{
    /// Creates a partition over `[0, T::max_value()]` holding a single
    /// default identity segment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use remapper_engine::partition::Partition;
    ///
    /// let p: Partition<u64> = Partition::new("seed-to-soil");
    /// assert_eq!(p.len(), 1);
    /// assert_eq!(p.transform(u64::MAX), Some(u64::MAX));
    /// ```
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_domain(name, full_domain())
    }

    /// Creates a partition over `domain` holding a single default identity segment.
    pub fn with_domain(name: impl Into<String>, domain: ClosedInterval<T>) -> Self {
        Self {
            name: name.into(),
            domain,
            segments: vec![Segment::identity(domain, SegmentKind::Default)],
            destination_index: OnceCell::new(),
        }
    }

    /// Creates a partition from explicit segments. The segments are sorted by
    /// source start; their union becomes the domain.
    ///
    /// # Errors
    ///
    /// Returns `PartitionError::Empty` for no segments, and
    /// `PartitionError::Gap` / `PartitionError::Overlap` if the source
    /// ranges do not tile a contiguous domain.
    pub fn from_segments(
        name: impl Into<String>,
        segments: impl IntoIterator<Item = Segment<T>>,
    ) -> Result<Self, PartitionError<T>> {
        let mut segments: Vec<Segment<T>> = segments.into_iter().collect();
        segments.sort_unstable_by_key(|segment| segment.source().start());

        let (first, last) = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => (first.source(), last.source()),
            _ => return Err(PartitionError::Empty),
        };
        check_contiguous(&segments)?;

        Ok(Self {
            name: name.into(),
            domain: ClosedInterval::new_unchecked(first.start(), last.end()),
            segments,
            destination_index: OnceCell::new(),
        })
    }

    /// Starts a `PartitionBuilder`.
    #[inline]
    pub fn builder(name: impl Into<String>) -> PartitionBuilder<T> {
        PartitionBuilder::new(name)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn domain(&self) -> ClosedInterval<T> {
        self.domain
    }

    /// The segments in ascending source order.
    #[inline]
    pub fn segments(&self) -> &[Segment<T>] {
        &self.segments
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Segment<T>> {
        self.segments.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`: a partition covers its domain with at least one segment.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns `true` if the segments tile the domain exactly.
    pub fn is_canonical(&self) -> bool {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => {
                first.source().start() == self.domain.start()
                    && last.source().end() == self.domain.end()
                    && check_contiguous(&self.segments).is_ok()
            }
            _ => false,
        }
    }

    /// Indices of the segments whose source range intersects `range`.
    fn overlapping(&self, range: ClosedInterval<T>) -> Range<usize> {
        let first = self
            .segments
            .partition_point(|segment| segment.source().end() < range.start());
        let last = self
            .segments
            .partition_point(|segment| segment.source().start() <= range.end());
        first..last.max(first)
    }

    /// Replaces the segments in `affected` with the pieces `f` produces for
    /// each of them. Returns the number of segments added.
    fn rebuild<F>(&mut self, affected: Range<usize>, f: F) -> usize
    where
        F: Fn(&Segment<T>) -> Pieces<T>,
    {
        if affected.is_empty() {
            return 0;
        }

        let replaced = affected.len();
        let replacement: Vec<Segment<T>> = self.segments[affected.clone()]
            .iter()
            .flat_map(&f)
            .collect();
        let added = replacement.len() - replaced;

        self.segments.splice(affected, replacement);
        self.destination_index.take();

        debug_assert!(
            self.is_canonical(),
            "partition `{}` lost its tiling after a rebuild",
            self.name
        );
        added
    }

    /// Merges the rule `segment` into the partition. Every segment whose
    /// source range meets the rule's is replaced by the result of
    /// `Segment::insert`; the rest are untouched, so sort order is preserved.
    /// Parts of the rule outside the domain are ignored.
    ///
    /// Returns the number of segments added.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use remapper_engine::{partition::Partition, segment::Segment};
    ///
    /// let mut p: Partition<u64> = Partition::new("seed-to-soil");
    /// p.add(Segment::from_record(50, 98, 2).unwrap());
    /// p.add(Segment::from_record(52, 50, 48).unwrap());
    /// assert_eq!(p.transform(79), Some(81));
    /// assert_eq!(p.transform(99), Some(51));
    /// assert_eq!(p.transform(13), Some(13));
    /// ```
    pub fn add(&mut self, segment: Segment<T>) -> usize {
        let affected = self.overlapping(segment.source());
        let added = self.rebuild(affected, |current| current.insert(&segment));
        trace!(
            partition = %self.name,
            source = ?segment.source(),
            destination = ?segment.destination(),
            added,
            "merged rule"
        );
        added
    }

    /// Cuts the partition at the boundaries of `range` in source coordinates
    /// without changing the mapping. Returns the number of segments added;
    /// zero means both boundaries already existed or lie outside the domain.
    pub fn split_source(&mut self, range: ClosedInterval<T>) -> usize {
        let affected = self.overlapping(range);
        if !self.segments[affected.clone()]
            .iter()
            .any(|segment| segment.cuts_source(range))
        {
            return 0;
        }
        let added = self.rebuild(affected, |current| current.split_source(range));
        trace!(partition = %self.name, ?range, added, "split source");
        added
    }

    /// Cuts the partition at the boundaries of `range` in destination
    /// coordinates without changing the mapping. Returns the number of
    /// segments added.
    pub fn split_destination(&mut self, range: ClosedInterval<T>) -> usize {
        if !self
            .segments
            .iter()
            .any(|segment| segment.cuts_destination(range))
        {
            return 0;
        }
        let all = 0..self.segments.len();
        let added = self.rebuild(all, |current| current.split_destination(range));
        trace!(partition = %self.name, ?range, added, "split destination");
        added
    }

    /// Maps a source value through the partition, or returns `None` if it
    /// lies outside the domain.
    pub fn transform(&self, value: T) -> Option<T> {
        let position = self
            .segments
            .partition_point(|segment| segment.source().start() <= value);
        position
            .checked_sub(1)
            .and_then(|index| self.segments[index].transform(value))
    }

    /// Maps a destination value back to a source value. If several segments
    /// map onto `value`, the one with the smallest source range wins.
    /// Returns `None` if no segment maps onto `value`.
    pub fn reverse_transform(&self, value: T) -> Option<T> {
        self.segments
            .iter()
            .find_map(|segment| segment.reverse_transform(value))
    }

    /// Returns the segment whose destination range is exactly `destination`.
    ///
    /// If several segments share that destination range, the one with the
    /// smallest source range wins. Use `producers` when the partition is not
    /// injective and every origin matters.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use remapper_core::math::interval::ClosedInterval;
    /// # use remapper_engine::{partition::Partition, segment::Segment};
    ///
    /// let mut p: Partition<u32> = Partition::new("stage");
    /// p.add(Segment::new(10, 500, 10).unwrap());
    /// let hit = p.traverse(ClosedInterval::new(500, 509)).unwrap();
    /// assert_eq!(hit.source(), ClosedInterval::new(10, 19));
    /// assert!(p.traverse(ClosedInterval::new(500, 508)).is_none());
    /// ```
    pub fn traverse(&self, destination: ClosedInterval<T>) -> Option<&Segment<T>> {
        self.producers(destination).next()
    }

    /// Returns every segment whose destination range is exactly
    /// `destination`, in source order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use remapper_core::math::interval::ClosedInterval;
    /// # use remapper_engine::{partition::Partition, segment::Segment};
    ///
    /// let mut p = Partition::builder("stage")
    ///     .domain(ClosedInterval::new(0u32, 99))
    ///     .rule(Segment::new(50, 0, 10).unwrap())
    ///     .build()
    ///     .unwrap();
    /// p.split_source(ClosedInterval::new(0, 9));
    /// let sources: Vec<_> = p.producers(ClosedInterval::new(0, 9)).map(|s| s.source()).collect();
    /// assert_eq!(sources, vec![ClosedInterval::new(0, 9), ClosedInterval::new(50, 59)]);
    /// ```
    pub fn producers(
        &self,
        destination: ClosedInterval<T>,
    ) -> impl Iterator<Item = &Segment<T>> + '_ {
        self.destination_index()
            .get(&destination)
            .into_iter()
            .flatten()
            .map(|&position| &self.segments[position])
    }

    fn destination_index(&self) -> &FxHashMap<ClosedInterval<T>, Producers> {
        self.destination_index.get_or_init(|| {
            let mut index: FxHashMap<ClosedInterval<T>, Producers> =
                FxHashMap::with_capacity_and_hasher(self.segments.len(), Default::default());
            for (position, segment) in self.segments.iter().enumerate() {
                index.entry(segment.destination()).or_default().push(position);
            }
            index
        })
    }
}

impl<'a, T> IntoIterator for &'a Partition<T>
where
    T: PrimInt + Hash,
{
    type Item = &'a Segment<T>;
    type IntoIter = std::slice::Iter<'a, Segment<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

impl<T> std::fmt::Display for Partition<T>
where
    T: PrimInt + Hash + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} over {}:", self.name, self.domain)?;
        for segment in &self.segments {
            writeln!(f, "  {}", segment)?;
        }
        Ok(())
    }
}

/// Builder for `Partition`.
///
/// # Configuration
///
/// * `domain`: the covered range; defaults to `[0, T::max_value()]`.
/// * `segments`: start from an explicit tiling instead of identity filler.
///   When combined with `domain`, the tiling must cover exactly that domain.
/// * `rule` / `rules`: explicit segments merged with `Partition::add`, in order,
///   after the partition is created.
#[derive(Debug, Clone)]
pub struct PartitionBuilder<T>
where
    T: PrimInt,
{
    name: String,
    domain: Option<ClosedInterval<T>>,
    segments: Option<Vec<Segment<T>>>,
    rules: Vec<PendingRule<T>>,
}

/// A rule queued on a `PartitionBuilder`, validated in `build`.
#[derive(Debug, Clone, Copy)]
enum PendingRule<T>
where
    T: PrimInt,
{
    Segment(Segment<T>),
    Record {
        destination_start: T,
        source_start: T,
        length: T,
    },
}

impl<T> PendingRule<T>
where
    T: PrimInt,
{
    fn into_segment(self) -> Result<Segment<T>, SegmentError<T>> {
        match self {
            Self::Segment(segment) => Ok(segment),
            Self::Record {
                destination_start,
                source_start,
                length,
            } => Segment::from_record(destination_start, source_start, length),
        }
    }
}

impl<T> PartitionBuilder<T>
where
    T: PrimInt + Hash + Debug,
{
    /// Creates a new `PartitionBuilder` with default settings.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: None,
            segments: None,
            rules: Vec::new(),
        }
    }

    /// Sets the domain the partition covers.
    #[inline]
    pub fn domain(mut self, domain: ClosedInterval<T>) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Sets the initial tiling.
    #[inline]
    pub fn segments(mut self, segments: impl IntoIterator<Item = Segment<T>>) -> Self {
        self.segments = Some(segments.into_iter().collect());
        self
    }

    /// Appends one rule to merge after creation.
    #[inline]
    pub fn rule(mut self, rule: Segment<T>) -> Self {
        self.rules.push(PendingRule::Segment(rule));
        self
    }

    /// Appends several rules to merge after creation.
    #[inline]
    pub fn rules(mut self, rules: impl IntoIterator<Item = Segment<T>>) -> Self {
        self.rules.extend(rules.into_iter().map(PendingRule::Segment));
        self
    }

    /// Appends a `(destination_start, source_start, length)` record as a rule.
    /// The record is checked when the partition is built.
    #[inline]
    pub fn record(mut self, destination_start: T, source_start: T, length: T) -> Self {
        self.rules.push(PendingRule::Record {
            destination_start,
            source_start,
            length,
        });
        self
    }

    /// Appends several `(destination_start, source_start, length)` records.
    #[inline]
    pub fn records(mut self, records: impl IntoIterator<Item = (T, T, T)>) -> Self {
        self.rules.extend(
            records
                .into_iter()
                .map(|(destination_start, source_start, length)| PendingRule::Record {
                    destination_start,
                    source_start,
                    length,
                }),
        );
        self
    }

    /// Builds the partition.
    ///
    /// # Errors
    ///
    /// Propagates the errors of `Partition::from_segments`, returns
    /// `PartitionError::DomainMismatch` if an explicit tiling does not cover
    /// the configured domain, and `PartitionError::Segment` if a record does
    /// not describe a valid segment.
    pub fn build(self) -> Result<Partition<T>, PartitionError<T>> {
        let mut partition = match self.segments {
            Some(segments) => {
                let partition = Partition::from_segments(self.name, segments)?;
                if let Some(expected) = self.domain
                    && expected != partition.domain
                {
                    return Err(PartitionError::DomainMismatch {
                        expected,
                        covered: partition.domain,
                    });
                }
                partition
            }
            None => Partition::with_domain(self.name, self.domain.unwrap_or_else(full_domain)),
        };

        for rule in self.rules {
            partition.add(rule.into_segment()?);
        }
        Ok(partition)
    }
}
