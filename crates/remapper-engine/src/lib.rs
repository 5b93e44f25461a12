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

//! # Remapper Engine
//!
//! Piecewise-linear integer mappings built from contiguous ranges, and the
//! machinery to chain them.
//!
//! A `partition::Partition<T>` is a total mapping over a bounded domain. It
//! starts as the identity and is refined by adding rules, each a
//! `segment::Segment<T>` that translates one source range onto a destination
//! range of the same length. Adding a rule only reshapes the few segments it
//! overlaps, so a rule covering billions of values costs as much as one
//! covering a single value.
//!
//! When partitions are chained (the destination space of one is the source
//! space of the next), `sync` cuts their boundaries until they line up. A
//! segment of the last partition can then be traced back stage by stage with
//! `Partition::producers`, which is how range-level questions ("which inputs
//! reach the smallest output?") are answered without enumerating values.
//! A stage that maps several source ranges onto one destination range has
//! several producers for it; `Partition::traverse` returns only the first,
//! so a walk through it alone is exact only for injective stages.
//!
//! Module map
//! - `segment`: one range-to-range translation and its subdivision algebra.
//! - `partition`: ordered, gap-free sequence of segments with point lookups.
//! - `sync`: boundary alignment between adjacent partitions and whole chains.
//! - `error`: construction and convergence errors.
//!
//! Logging goes through `tracing`. No subscriber is installed here.

pub mod error;
pub mod partition;
pub mod segment;
pub mod sync;
