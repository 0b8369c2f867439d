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

//! # Lock-Free Synchronization Primitives
//!
//! - `stamped`: `StampedRef<T>`, an atomic `(pointer, u64 stamp)` pair.
//! - `stack`: `ConcurrentStack<T>`, a LIFO work queue (Treiber stack).
//! - `published`: `PublishedCell<T>`, a single-slot value broadcast to all
//!   threads, replaced wholesale on every write.
//!
//! All containers follow the same discipline: read the current pair, build
//! the replacement, install it with a stamp one higher than the one read,
//! and retry on failure. Nothing in this module takes a lock.

pub mod published;
pub mod stack;
pub mod stamped;

use crossbeam_epoch::{Guard, Shared};

/// Hands an unlinked heap allocation to the epoch collector.
///
/// # Safety
///
/// `ptr` must originate from `Box::into_raw`, must be non-null, and must no
/// longer be reachable from any shared location. The caller must not use it
/// after this call.
#[inline]
pub(crate) unsafe fn retire<T>(guard: &Guard, ptr: *mut T) {
    debug_assert!(!ptr.is_null(), "called `retire` with a null pointer");
    unsafe { guard.defer_destroy(Shared::from(ptr as *const T)) };
}
