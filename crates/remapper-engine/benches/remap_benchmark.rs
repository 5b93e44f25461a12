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

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use remapper_engine::partition::Partition;
use remapper_engine::segment::Segment;
use remapper_engine::sync::{SyncOptions, sync_chain};
use std::hint::black_box;

const RULE_COUNTS: [usize; 3] = [10, 100, 1000];
const CHAIN_RULE_COUNTS: [usize; 3] = [10, 50, 200];

/// Deterministic rule stream from a linear congruential generator, so runs
/// are comparable without pulling in a random number generator.
fn generate_rules(count: usize, seed: u64) -> Vec<Segment<u64>> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        state >> 24
    };
    (0..count)
        .map(|_| {
            let source = next() % 4_000_000_000;
            let destination = next() % 4_000_000_000;
            let length = 1 + next() % 50_000_000;
            Segment::new(source, destination, length).expect("generated rule fits u64")
        })
        .collect()
}

fn build_partition(name: &str, rules: &[Segment<u64>]) -> Partition<u64> {
    let mut partition = Partition::new(name);
    for rule in rules {
        partition.add(*rule);
    }
    partition
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition_add");

    for count in RULE_COUNTS {
        let rules = generate_rules(count, 0x5eed);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &rules, |b, rules| {
            b.iter(|| black_box(build_partition("bench", black_box(rules))))
        });
    }
    group.finish();
}

fn bench_sync_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_chain");
    let options = SyncOptions::default();

    for count in CHAIN_RULE_COUNTS {
        let chain: Vec<Partition<u64>> = (0..7u64)
            .map(|stage| build_partition("stage", &generate_rules(count, 0x5eed + stage)))
            .collect();
        group.throughput(Throughput::Elements((count * chain.len()) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &chain, |b, chain| {
            b.iter_batched(
                || chain.clone(),
                |mut chain| {
                    let stats = sync_chain(&mut chain, &options)
                        .unwrap_or_else(|e| panic!("Benchmark chain failed to align: {}", e));
                    black_box(stats)
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_add, bench_sync_chain);
criterion_main!(benches);
