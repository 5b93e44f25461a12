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

//! Error types for segment construction, partition assembly and
//! boundary synchronization.
//!
//! Boundary arithmetic that would produce an inverted interval is not
//! reported here: it indicates a bug in the engine and panics instead.

use num_traits::PrimInt;
use remapper_core::math::interval::ClosedInterval;
use std::fmt::Display;

/// The error type for building a `Segment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentError<T>
where
    T: PrimInt,
{
    /// The requested length was zero or negative.
    NonPositiveLength { length: T },
    /// `start + length - 1` does not fit in the coordinate type.
    Overflow { start: T, length: T },
    /// The source and destination ranges contain a different number of values.
    LengthMismatch {
        source: ClosedInterval<T>,
        destination: ClosedInterval<T>,
    },
}

impl<T> Display for SegmentError<T>
where
    T: PrimInt + Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveLength { length } => {
                write!(f, "Segment length must be positive, got {}", length)
            }
            Self::Overflow { start, length } => write!(
                f,
                "Segment starting at {} with length {} exceeds the coordinate range",
                start, length
            ),
            Self::LengthMismatch {
                source,
                destination,
            } => write!(
                f,
                "Source range {} and destination range {} differ in length",
                source, destination
            ),
        }
    }
}

impl<T> std::error::Error for SegmentError<T> where T: PrimInt + Display + std::fmt::Debug {}

/// The error type for assembling a `Partition` from explicit segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionError<T>
where
    T: PrimInt,
{
    /// No segments were supplied.
    Empty,
    /// Two consecutive segments leave values between them uncovered.
    Gap {
        after: ClosedInterval<T>,
        next: ClosedInterval<T>,
    },
    /// Two consecutive segments cover a value twice.
    Overlap {
        after: ClosedInterval<T>,
        next: ClosedInterval<T>,
    },
    /// The segments do not cover exactly the requested domain.
    DomainMismatch {
        expected: ClosedInterval<T>,
        covered: ClosedInterval<T>,
    },
    /// A record passed to `PartitionBuilder` does not describe a valid segment.
    Segment(SegmentError<T>),
}

impl<T> Display for PartitionError<T>
where
    T: PrimInt + Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "A partition needs at least one segment"),
            Self::Gap { after, next } => {
                write!(f, "Gap between source ranges {} and {}", after, next)
            }
            Self::Overlap { after, next } => {
                write!(f, "Source ranges {} and {} overlap", after, next)
            }
            Self::DomainMismatch { expected, covered } => {
                write!(f, "Segments cover {} but the domain is {}", covered, expected)
            }
            Self::Segment(e) => write!(f, "Segment error: {}", e),
        }
    }
}

impl<T> std::error::Error for PartitionError<T> where T: PrimInt + Display + std::fmt::Debug {}

impl<T> From<SegmentError<T>> for PartitionError<T>
where
    T: PrimInt,
{
    fn from(e: SegmentError<T>) -> Self {
        Self::Segment(e)
    }
}

/// The error type for synchronizing a chain of partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    /// Boundaries were still changing after the configured number of rounds.
    NotConverged { rounds: usize },
}

impl Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConverged { rounds } => write!(
                f,
                "Partition boundaries did not converge within {} rounds",
                rounds
            ),
        }
    }
}

impl std::error::Error for SyncError {}
