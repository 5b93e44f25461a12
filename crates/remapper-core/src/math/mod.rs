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

//! # Math Primitives
//!
//! Interval math for piecewise-linear remapping.
//!
//! ## Submodules
//!
//! - `interval`: A generic `[start, end]` interval type with validation,
//!   predicates, offset arithmetic, and `trisect`, which splits an interval
//!   into the parts before, inside, and after another interval. Includes
//!   conversions to/from `std::ops::RangeInclusive`.
//!
//! ## Motivation
//!
//! A mapping that covers the whole domain of an integer type must be able to
//! name `T::max_value()` as an inclusive end. Closed intervals make that
//! representable without a sentinel and keep the cut points `b` and `b + 1`
//! explicit, which is where off-by-one errors in range splitting come from.

pub mod interval;
