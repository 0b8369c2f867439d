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

//! # Waypoint Core
//!
//! Lock-free building blocks shared by the waypoint solver crates. Everything
//! here is independent of the traveling-salesman domain: the primitives only
//! know about pointers, stamps and values.
//!
//! ## Modules
//!
//! - `sync`: a 128-bit stamped reference with ABA-safe compare-and-swap
//!   (`StampedRef<T>`), a Treiber stack built on it (`ConcurrentStack<T>`),
//!   and a single-slot broadcast cell with read-modify-publish updates
//!   (`PublishedCell<T>`).
//!
//! ## Memory reclamation
//!
//! Stamps make a stale `(pointer, stamp)` pair fail its compare-and-swap, but
//! they do not keep the memory behind a pointer alive. Retired nodes and
//! replaced values are therefore handed to `crossbeam_epoch`, which frees
//! them only once no pinned thread can still be reading them.

pub mod sync;
