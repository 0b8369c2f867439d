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

//! # Published Cell
//!
//! `PublishedCell<T>` is a single shared slot that always holds exactly one
//! heap-allocated value. Writers never mutate the current value; they build a
//! replacement and swap the pointer with a stamped compare-and-swap. Readers
//! therefore always see a complete value that some writer installed, never a
//! torn mix of two writes.
//!
//! ## Operations
//!
//! - `set`: unconditional overwrite.
//! - `get` / `read`: clone or borrow the current value.
//! - `update`: read-copy-mutate-publish. The closure sees the current value
//!   and returns the replacement, or `None` to leave the cell untouched. If
//!   another writer wins in between, the closure runs again against the
//!   fresh value, so compound records never lose an update.
//!
//! Replaced values are retired through the epoch collector, which keeps them
//! alive for readers that loaded the old pointer just before the swap.

use crate::sync::{retire, stamped::StampedRef};
use crossbeam_epoch as epoch;
use crossbeam_utils::Backoff;

/// A lock-free single-value cell with copy-on-write updates.
///
/// # Examples
///
/// ```rust
/// use waypoint_core::sync::published::PublishedCell;
///
/// let cell = PublishedCell::new(10u64);
/// cell.set(7);
/// assert_eq!(cell.get(), 7);
///
/// // Only lower the value; leave it alone otherwise.
/// assert_eq!(cell.update(|v| (*v > 5).then_some(5)), Some(5));
/// assert_eq!(cell.update(|v| (*v > 5).then_some(5)), None);
/// assert_eq!(cell.into_inner(), 5);
/// ```
pub struct PublishedCell<T> {
    slot: StampedRef<T>,
}

unsafe impl<T: Send + Sync> Send for PublishedCell<T> {}
unsafe impl<T: Send + Sync> Sync for PublishedCell<T> {}

impl<T> PublishedCell<T> {
    /// Creates a cell publishing `value`.
    #[inline]
    pub fn new(value: T) -> Self {
        Self {
            slot: StampedRef::new(Box::into_raw(Box::new(value)), 0),
        }
    }

    /// Replaces the published value with `value`.
    pub fn set(&self, value: T) {
        let fresh = Box::into_raw(Box::new(value));
        let guard = epoch::pin();
        let backoff = Backoff::new();
        loop {
            let (current, stamp) = self.slot.load();
            if self
                .slot
                .compare_and_swap(current, stamp, fresh, stamp.wrapping_add(1))
            {
                // SAFETY: `current` was unlinked by the winning CAS.
                unsafe { retire(&guard, current) };
                return;
            }
            backoff.spin();
        }
    }

    /// Calls `f` with a reference to the currently published value.
    ///
    /// The borrow is valid only for the duration of the call; the value may
    /// be replaced by another thread right after `f` returns.
    #[inline]
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let _guard = epoch::pin();
        let (current, _) = self.slot.load();
        // SAFETY: the cell never holds null, and the pinned guard keeps a
        // concurrently retired value alive until we return.
        f(unsafe { &*current })
    }

    /// Applies `f` to the current value and publishes its result.
    ///
    /// Returns the installed value, or `None` if `f` declined by returning
    /// `None`. `f` may be called several times under contention and must
    /// therefore be free of side effects beyond its return value.
    pub fn update<F>(&self, mut f: F) -> Option<T>
    where
        F: FnMut(&T) -> Option<T>,
        T: Clone,
    {
        let guard = epoch::pin();
        let backoff = Backoff::new();
        loop {
            let (current, stamp) = self.slot.load();
            // SAFETY: see `read`.
            let next = f(unsafe { &*current })?;
            let installed = next.clone();
            let fresh = Box::into_raw(Box::new(next));
            if self
                .slot
                .compare_and_swap(current, stamp, fresh, stamp.wrapping_add(1))
            {
                // SAFETY: `current` was unlinked by the winning CAS.
                unsafe { retire(&guard, current) };
                return Some(installed);
            }
            // SAFETY: `fresh` was never published.
            drop(unsafe { Box::from_raw(fresh) });
            backoff.spin();
        }
    }

    /// Returns the number of successful writes since construction.
    #[inline]
    pub fn version(&self) -> u64 {
        self.slot.stamp()
    }

    /// Tears the cell down and returns the last published value.
    pub fn into_inner(self) -> T {
        let (current, _) = self.slot.load();
        std::mem::forget(self);
        // SAFETY: we own the cell, `current` is the live allocation.
        *unsafe { Box::from_raw(current) }
    }
}

impl<T: Clone> PublishedCell<T> {
    /// Returns a clone of the currently published value.
    #[inline]
    pub fn get(&self) -> T {
        self.read(T::clone)
    }
}

impl<T: Default> Default for PublishedCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Drop for PublishedCell<T> {
    fn drop(&mut self) {
        let (current, _) = self.slot.load();
        if !current.is_null() {
            // SAFETY: `&mut self` gives exclusive access to the live value.
            drop(unsafe { Box::from_raw(current) });
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for PublishedCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.read(|value| {
            f.debug_struct("PublishedCell")
                .field("value", value)
                .field("version", &self.version())
                .finish()
        })
    }
}
