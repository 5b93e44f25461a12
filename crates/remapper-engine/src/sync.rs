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

//! Boundary synchronization between chained partitions.
//!
//! When partition `left` feeds partition `right`, left's destination space is
//! right's source space. `sync` cuts both so that every destination range of
//! `left` is made of whole source ranges of `right` and vice versa, after
//! which a segment of `right` can be traced back to the segment of `left`
//! producing it with `Partition::traverse`.
//!
//! A single `sync` only aligns one seam. Cuts introduced at one seam change
//! the boundaries seen by the neighboring seams, so `sync_chain` sweeps the
//! whole chain forward and then backward, and repeats the sweep until a full
//! round adds no segment. The number of rounds is bounded by `SyncOptions`.

use crate::{error::SyncError, partition::Partition};
use num_traits::PrimInt;
use std::{fmt::Debug, hash::Hash};
use tracing::{debug, warn};

/// Aligns the seam between `left` and `right`.
///
/// First every destination range of `left` is cut into `right`'s source
/// space, then every source range of `right` is cut into `left`'s
/// destination space. Mappings are never changed. Returns the number of
/// segments added to both partitions together.
///
/// # Examples
///
/// ```rust
/// # use remapper_core::math::interval::ClosedInterval;
/// # use remapper_engine::{partition::Partition, segment::Segment, sync::sync};
///
/// let domain = ClosedInterval::new(0u32, 99);
/// let mut left = Partition::builder("left").domain(domain).build().unwrap();
/// let mut right = Partition::builder("right")
///     .domain(domain)
///     .rule(Segment::new(50, 0, 50).unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(sync(&mut left, &mut right), 1);
/// assert_eq!(left.len(), 2);
/// assert_eq!(sync(&mut left, &mut right), 0);
/// ```
pub fn sync<T>(left: &mut Partition<T>, right: &mut Partition<T>) -> usize
where
    T: PrimInt + Hash + Debug,
{
    let mut added = 0;
    for segment in left.segments() {
        added += right.split_source(segment.destination());
    }
    for segment in right.segments() {
        added += left.split_destination(segment.source());
    }
    added
}

/// Returns `true` if `sync(left, right)` would add no segment.
pub fn is_aligned<T>(left: &Partition<T>, right: &Partition<T>) -> bool
where
    T: PrimInt + Hash + Debug,
{
    let forward = left.iter().all(|produced| {
        !right
            .iter()
            .any(|consumer| consumer.cuts_source(produced.destination()))
    });
    let backward = right.iter().all(|consumer| {
        !left
            .iter()
            .any(|produced| produced.cuts_destination(consumer.source()))
    });
    forward && backward
}

/// Returns `true` if every adjacent pair of `chain` is aligned.
pub fn is_chain_aligned<T>(chain: &[Partition<T>]) -> bool
where
    T: PrimInt + Hash + Debug,
{
    chain.windows(2).all(|pair| is_aligned(&pair[0], &pair[1]))
}

/// Returns the two partitions meeting at `seam` (`seam` and `seam + 1`).
#[inline]
fn adjacent_mut<T>(
    chain: &mut [Partition<T>],
    seam: usize,
) -> (&mut Partition<T>, &mut Partition<T>)
where
    T: PrimInt + Hash,
{
    let (head, tail) = chain.split_at_mut(seam + 1);
    (&mut head[seam], &mut tail[0])
}

/// Options for `sync_chain`.
///
/// # Configuration
/// * `max_rounds`: upper bound on forward-then-backward sweeps. The final
///   round must add nothing, so a chain that needs `n` productive rounds
///   needs `max_rounds >= n + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    max_rounds: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self { max_rounds: 64 }
    }
}

impl SyncOptions {
    /// Creates a new `SyncOptions` with default settings.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of sweeps.
    #[inline]
    pub fn max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    #[inline]
    pub fn rounds_limit(&self) -> usize {
        self.max_rounds
    }
}

impl std::fmt::Display for SyncOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SyncOptions(max_rounds: {})", self.max_rounds)
    }
}

/// Statistics collected by `sync_chain`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatistics {
    /// Number of sweeps performed, including the final one that added nothing.
    pub rounds: usize,
    /// Total number of segments added across the chain.
    pub segments_added: usize,
    /// Segment count of each partition after synchronization, in chain order.
    pub segment_counts: Vec<usize>,
}

impl std::fmt::Display for SyncStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Sync Statistics:")?;
        writeln!(f, "  Rounds: {}", self.rounds)?;
        writeln!(f, "  Segments Added: {}", self.segments_added)?;
        writeln!(f, "  Segment Counts: {:?}", self.segment_counts)
    }
}

/// Aligns every seam of `chain`, where `chain[i]` feeds `chain[i + 1]`.
///
/// Each round runs `sync` over the seams front to back and then back to
/// front. Rounds repeat until one adds no segment, at which point
/// `is_chain_aligned(chain)` holds.
///
/// # Errors
///
/// Returns `SyncError::NotConverged` if the boundaries are still changing
/// after `options` allows no further rounds. The partitions keep the cuts
/// made so far; their mappings are unchanged.
pub fn sync_chain<T>(
    chain: &mut [Partition<T>],
    options: &SyncOptions,
) -> Result<SyncStatistics, SyncError>
where
    T: PrimInt + Hash + Debug,
{
    let mut stats = SyncStatistics::default();
    if chain.len() < 2 {
        stats.segment_counts = chain.iter().map(Partition::len).collect();
        return Ok(stats);
    }

    let seams = chain.len() - 1;
    for round in 1..=options.max_rounds {
        let mut added = 0;
        for seam in (0..seams).chain((0..seams).rev()) {
            let (left, right) = adjacent_mut(chain, seam);
            added += sync(left, right);
        }

        stats.rounds = round;
        stats.segments_added += added;
        debug!(round, added, "synchronization round finished");

        if added == 0 {
            stats.segment_counts = chain.iter().map(Partition::len).collect();
            debug!(
                rounds = stats.rounds,
                segments_added = stats.segments_added,
                "partition chain aligned"
            );
            return Ok(stats);
        }
    }

    warn!(
        max_rounds = options.max_rounds,
        partitions = chain.len(),
        "partition boundaries did not converge"
    );
    Err(SyncError::NotConverged {
        rounds: options.max_rounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{Segment, SegmentKind};
    use remapper_core::math::interval::ClosedInterval;

    fn iv(start: u32, end: u32) -> ClosedInterval<u32> {
        ClosedInterval::new(start, end)
    }

    fn default_seg(source: (u32, u32), destination: (u32, u32)) -> Segment<u32> {
        Segment::from_intervals(
            iv(source.0, source.1),
            iv(destination.0, destination.1),
            SegmentKind::Default,
        )
        .unwrap()
    }

    fn bounded(name: &str) -> Partition<u32> {
        Partition::builder(name).domain(iv(0, 99)).build().unwrap()
    }

    fn sources(p: &Partition<u32>) -> Vec<ClosedInterval<u32>> {
        p.iter().map(|s| s.source()).collect()
    }

    /// `a` is identity, `b` swaps the two halves, `c` carves out `[10, 19]`.
    fn three_stage_chain() -> Vec<Partition<u32>> {
        let a = bounded("a");
        let b = Partition::builder("b")
            .domain(iv(0, 99))
            .rule(Segment::new(0, 50, 50).unwrap())
            .rule(Segment::new(50, 0, 50).unwrap())
            .build()
            .unwrap();
        let c = Partition::builder("c")
            .domain(iv(0, 99))
            .rule(Segment::new(10, 500, 10).unwrap())
            .build()
            .unwrap();
        vec![a, b, c]
    }

    #[test]
    fn test_sync_splits_left_destination() {
        let mut left = Partition::from_segments("left", [default_seg((0, 99), (0, 99))]).unwrap();
        let mut right = Partition::from_segments(
            "right",
            [default_seg((0, 49), (0, 49)), default_seg((50, 99), (0, 49))],
        )
        .unwrap();
        let right_before = right.segments().to_vec();

        assert!(!is_aligned(&left, &right));
        assert_eq!(sync(&mut left, &mut right), 1);

        assert_eq!(
            left.segments(),
            &[default_seg((0, 49), (0, 49)), default_seg((50, 99), (50, 99))]
        );
        assert_eq!(right.segments(), right_before.as_slice());
        assert!(is_aligned(&left, &right));
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mut chain = three_stage_chain();
        let (left, right) = adjacent_mut(&mut chain, 1);
        assert!(sync(left, right) > 0);
        let snapshot = (left.segments().to_vec(), right.segments().to_vec());
        assert_eq!(sync(left, right), 0);
        assert_eq!(left.segments(), snapshot.0.as_slice());
        assert_eq!(right.segments(), snapshot.1.as_slice());
    }

    #[test]
    fn test_sync_splits_right_source() {
        let mut left = Partition::builder("left")
            .domain(iv(0, 99))
            .rule(Segment::new(0, 40, 20).unwrap())
            .build()
            .unwrap();
        let mut right = bounded("right");

        let added = sync(&mut left, &mut right);
        // left produces [40, 59] and [20, 99], cutting right at 20, 40 and 60.
        assert_eq!(sources(&right), vec![iv(0, 19), iv(20, 39), iv(40, 59), iv(60, 99)]);
        // Those cuts land inside left's identity filler [20, 99].
        assert_eq!(sources(&left), vec![iv(0, 19), iv(20, 39), iv(40, 59), iv(60, 99)]);
        assert_eq!(added, 3 + 2);
        assert!(is_aligned(&left, &right));
    }

    #[test]
    fn test_sync_chain_propagates_across_seams() {
        let mut chain = three_stage_chain();
        let stats = sync_chain(&mut chain, &SyncOptions::default()).unwrap();

        assert_eq!(stats.rounds, 2);
        assert_eq!(stats.segments_added, 6);
        assert_eq!(stats.segment_counts, vec![4, 4, 4]);
        assert!(is_chain_aligned(&chain));

        // The cut c makes at 10 reaches a through b's swap.
        assert_eq!(
            sources(&chain[0]),
            vec![iv(0, 49), iv(50, 59), iv(60, 69), iv(70, 99)]
        );
        assert_eq!(
            sources(&chain[1]),
            vec![iv(0, 49), iv(50, 59), iv(60, 69), iv(70, 99)]
        );
        assert_eq!(
            sources(&chain[2]),
            vec![iv(0, 9), iv(10, 19), iv(20, 49), iv(50, 99)]
        );

        // Walk c's explicit segment back to a.
        let last = chain[2]
            .iter()
            .find(|s| !s.is_default())
            .copied()
            .unwrap();
        let mid = chain[1].traverse(last.source()).unwrap();
        let first = chain[0].traverse(mid.source()).unwrap();
        assert_eq!(first.source(), iv(60, 69));
    }

    #[test]
    fn test_sync_chain_preserves_mappings() {
        let mut chain = three_stage_chain();
        let before: Vec<Vec<Option<u32>>> = chain
            .iter()
            .map(|p| (0..100).map(|v| p.transform(v)).collect())
            .collect();
        sync_chain(&mut chain, &SyncOptions::default()).unwrap();
        let after: Vec<Vec<Option<u32>>> = chain
            .iter()
            .map(|p| (0..100).map(|v| p.transform(v)).collect())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_sync_chain_round_limit() {
        let mut chain = three_stage_chain();
        let err = sync_chain(&mut chain, &SyncOptions::new().max_rounds(1)).unwrap_err();
        assert_eq!(err, SyncError::NotConverged { rounds: 1 });

        // The work already done is kept; one more call finishes it.
        let stats = sync_chain(&mut chain, &SyncOptions::default()).unwrap();
        assert_eq!(stats.rounds, 1);
        assert_eq!(stats.segments_added, 0);
    }

    #[test]
    fn test_sync_chain_short_chains() {
        let mut empty: Vec<Partition<u32>> = Vec::new();
        let stats = sync_chain(&mut empty, &SyncOptions::default()).unwrap();
        assert_eq!(stats, SyncStatistics::default());

        let mut single = vec![bounded("only")];
        let stats = sync_chain(&mut single, &SyncOptions::default()).unwrap();
        assert_eq!(stats.rounds, 0);
        assert_eq!(stats.segment_counts, vec![1]);
    }

    #[test]
    fn test_options() {
        assert_eq!(SyncOptions::default().rounds_limit(), 64);
        let options = SyncOptions::new().max_rounds(3);
        assert_eq!(options.rounds_limit(), 3);
        assert_eq!(options.to_string(), "SyncOptions(max_rounds: 3)");
    }

    #[test]
    fn test_statistics_display() {
        let stats = SyncStatistics {
            rounds: 2,
            segments_added: 6,
            segment_counts: vec![4, 4, 4],
        };
        let rendered = stats.to_string();
        assert!(rendered.contains("Sync Statistics:"), "missing header");
        assert!(rendered.contains("Rounds: 2"));
        assert!(rendered.contains("Segments Added: 6"));
        assert!(rendered.contains("Segment Counts: [4, 4, 4]"));
    }
}
