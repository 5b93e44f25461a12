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

//! Property-based invariants for partitions and synchronization.
//!
//! All partitions here live on the domain `[0, 999]` so that every value can
//! be checked against a naive model.
//!
//! 1. **Coverage**: after any sequence of rules, the segments tile the
//!    domain exactly and every domain value has an image.
//!
//! 2. **Length preservation**: every segment's source and destination ranges
//!    have the same length.
//!
//! 3. **Last rule wins**: `transform` agrees with a model that applies the
//!    most recent rule containing the value, and the identity otherwise.
//!
//! 4. **Round trip**: for injective partitions,
//!    `reverse_transform(transform(v)) == v`.
//!
//! 5. **Sync**: `sync` never changes any mapping, leaves the pair aligned,
//!    and a second call adds nothing. `sync_chain` aligns whole chains.

use proptest::prelude::*;
use remapper_core::math::interval::ClosedInterval;
use remapper_engine::{
    partition::Partition,
    segment::Segment,
    sync::{SyncOptions, is_aligned, is_chain_aligned, sync, sync_chain},
};

const DOMAIN_END: u32 = 999;

// ── Strategies ──────────────────────────────────────────────────────────

/// `(source_start, destination_start, length)`; may reach past the domain.
fn rule_strategy() -> impl Strategy<Value = (u32, u32, u32)> {
    (0u32..=DOMAIN_END, 0u32..2000, 1u32..200)
}

fn rules_strategy() -> impl Strategy<Value = Vec<(u32, u32, u32)>> {
    prop::collection::vec(rule_strategy(), 0..10)
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn build(name: &str, rules: &[(u32, u32, u32)]) -> Partition<u32> {
    let rules = rules
        .iter()
        .map(|&(source, destination, length)| Segment::new(source, destination, length).unwrap());
    Partition::builder(name)
        .domain(ClosedInterval::new(0, DOMAIN_END))
        .rules(rules)
        .build()
        .unwrap()
}

/// Applies the most recent rule whose source range holds `value`.
fn model_transform(rules: &[(u32, u32, u32)], value: u32) -> u32 {
    rules
        .iter()
        .rev()
        .find(|&&(source, _, length)| source <= value && value - source < length)
        .map_or(value, |&(source, destination, _)| destination + (value - source))
}

fn images(partition: &Partition<u32>) -> Vec<Option<u32>> {
    (0..=DOMAIN_END + 1).map(|v| partition.transform(v)).collect()
}

// ── Coverage and length ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn segments_tile_domain(rules in rules_strategy()) {
        let partition = build("p", &rules);
        prop_assert!(partition.is_canonical());

        let segments = partition.segments();
        prop_assert_eq!(segments[0].source().start(), 0);
        prop_assert_eq!(segments[segments.len() - 1].source().end(), DOMAIN_END);
        for pair in segments.windows(2) {
            prop_assert_eq!(
                pair[0].source().end() + 1,
                pair[1].source().start(),
                "segments {} and {} must touch", pair[0], pair[1]
            );
        }
    }

    #[test]
    fn segments_preserve_length(rules in rules_strategy()) {
        let partition = build("p", &rules);
        for segment in &partition {
            prop_assert_eq!(
                segment.source().span(),
                segment.destination().span(),
                "segment {} changes length", segment
            );
        }
    }

    #[test]
    fn segment_count_bounded_by_rules(rules in rules_strategy()) {
        let partition = build("p", &rules);
        // Each rule adds at most two boundaries.
        prop_assert!(partition.len() <= 1 + 2 * rules.len());
    }
}

// ── Point lookups ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn transform_matches_last_rule_wins(rules in rules_strategy()) {
        let partition = build("p", &rules);
        for value in 0..=DOMAIN_END {
            prop_assert_eq!(
                partition.transform(value),
                Some(model_transform(&rules, value)),
                "value {}", value
            );
        }
        prop_assert_eq!(partition.transform(DOMAIN_END + 1), None);
    }

    #[test]
    fn injective_partition_round_trips(
        blocks in prop::collection::vec((0u32..=DOMAIN_END, 1u32..200), 0..6),
    ) {
        // Rule `i` writes into its own block `[1000 * (i + 1), ...)`, so no two
        // segments share a destination value.
        let rules: Vec<(u32, u32, u32)> = blocks
            .iter()
            .enumerate()
            .map(|(i, &(source, length))| (source, 1000 * (i as u32 + 1), length))
            .collect();
        let partition = build("p", &rules);
        for value in 0..=DOMAIN_END {
            let image = partition.transform(value).unwrap();
            prop_assert_eq!(partition.reverse_transform(image), Some(value));
        }
    }
}

// ── Synchronization ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn sync_aligns_and_is_idempotent(
        left_rules in rules_strategy(),
        right_rules in rules_strategy(),
    ) {
        let mut left = build("left", &left_rules);
        let mut right = build("right", &right_rules);
        let before = (images(&left), images(&right));

        sync(&mut left, &mut right);
        prop_assert!(is_aligned(&left, &right));
        prop_assert!(left.is_canonical() && right.is_canonical());
        prop_assert_eq!((images(&left), images(&right)), before);

        let snapshot = (left.segments().to_vec(), right.segments().to_vec());
        prop_assert_eq!(sync(&mut left, &mut right), 0);
        prop_assert_eq!(left.segments(), snapshot.0.as_slice());
        prop_assert_eq!(right.segments(), snapshot.1.as_slice());
    }

    #[test]
    fn sync_chain_aligns_every_seam(
        chain_rules in prop::collection::vec(rules_strategy(), 2..5),
    ) {
        let mut chain: Vec<Partition<u32>> = chain_rules
            .iter()
            .enumerate()
            .map(|(i, rules)| build(&format!("stage-{}", i), rules))
            .collect();
        let before: Vec<_> = chain.iter().map(images).collect();

        let stats = sync_chain(&mut chain, &SyncOptions::default()).unwrap();
        prop_assert!(is_chain_aligned(&chain));
        prop_assert_eq!(chain.iter().map(images).collect::<Vec<_>>(), before);
        prop_assert_eq!(
            stats.segment_counts,
            chain.iter().map(Partition::len).collect::<Vec<_>>()
        );

        // Every destination range that feeds the next stage is one of its
        // source ranges.
        for pair in chain.windows(2) {
            for produced in &pair[0] {
                let overlapping: Vec<_> = pair[1]
                    .iter()
                    .filter(|consumer| consumer.source().intersects(produced.destination()))
                    .collect();
                prop_assert!(
                    overlapping.is_empty()
                        || (overlapping.len() == 1
                            && overlapping[0].source() == produced.destination()),
                    "{} is not a whole source range of {}", produced, pair[1].name()
                );
            }
        }
    }
}
