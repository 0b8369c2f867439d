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

//! # Stamped References
//!
//! `StampedRef<T>` stores a raw pointer together with a 64-bit version stamp
//! in a single 128-bit atomic word. Both halves are read and replaced
//! together, so a compare-and-swap only succeeds if the pointer *and* the
//! stamp still match what the caller observed.
//!
//! ## Motivation
//!
//! Pointer-only CAS suffers from the ABA hazard: a node is popped, freed,
//! and its address reused for a new node before a slow thread retries its
//! stale CAS, which then succeeds against an unrelated allocation. Callers
//! of `StampedRef` bump the stamp on every successful swap, so a stale pair
//! can never match again, even if the pointer value does.
//!
//! ## Layout
//!
//! ```raw
//! bits 127..64  stamp
//! bits  63..0   pointer address
//! ```
//!
//! The primitive never allocates or frees; ownership of the pointee is
//! entirely the caller's business.

use portable_atomic::{AtomicU128, Ordering};
use std::marker::PhantomData;

#[inline(always)]
fn pack<T>(ptr: *mut T, stamp: u64) -> u128 {
    ((stamp as u128) << 64) | (ptr.expose_provenance() as u64 as u128)
}

#[inline(always)]
fn unpack<T>(word: u128) -> (*mut T, u64) {
    let address = word as u64 as usize;
    let stamp = (word >> 64) as u64;
    (std::ptr::with_exposed_provenance_mut(address), stamp)
}

/// An atomic `(pointer, stamp)` pair with ABA-safe compare-and-swap.
///
/// # Examples
///
/// ```rust
/// use waypoint_core::sync::stamped::StampedRef;
///
/// let mut a = 1u32;
/// let mut b = 2u32;
/// let cell = StampedRef::new(&mut a as *mut u32, 0);
///
/// let (ptr, stamp) = cell.load();
/// assert!(cell.compare_and_swap(ptr, stamp, &mut b as *mut u32, stamp + 1));
///
/// // The old pair is stale now, even though `ptr` could be reused.
/// assert!(!cell.compare_and_swap(ptr, stamp, ptr, stamp + 1));
/// assert_eq!(cell.load().1, 1);
/// ```
pub struct StampedRef<T> {
    word: AtomicU128,
    _marker: PhantomData<*mut T>,
}

// The cell only ever stores an address; it never dereferences it.
unsafe impl<T> Send for StampedRef<T> {}
unsafe impl<T> Sync for StampedRef<T> {}

impl<T> Default for StampedRef<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> StampedRef<T> {
    /// Creates a new stamped reference holding `ptr` and `stamp`.
    #[inline]
    pub fn new(ptr: *mut T, stamp: u64) -> Self {
        Self {
            word: AtomicU128::new(pack(ptr, stamp)),
            _marker: PhantomData,
        }
    }

    /// Creates a stamped reference holding the null pointer and stamp `0`.
    #[inline]
    pub fn null() -> Self {
        Self::new(std::ptr::null_mut(), 0)
    }

    /// Returns a consistent snapshot of the current `(pointer, stamp)` pair.
    #[inline]
    pub fn load(&self) -> (*mut T, u64) {
        unpack(self.word.load(Ordering::Acquire))
    }

    /// Returns the current stamp.
    #[inline]
    pub fn stamp(&self) -> u64 {
        self.load().1
    }

    /// Returns `true` if the current pointer is null.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.load().0.is_null()
    }

    /// Atomically replaces the pair with `(new_ptr, new_stamp)` if the
    /// current pair equals `(expected_ptr, expected_stamp)`.
    ///
    /// Returns `true` on success. On failure nothing is written.
    #[inline]
    pub fn compare_and_swap(
        &self,
        expected_ptr: *mut T,
        expected_stamp: u64,
        new_ptr: *mut T,
        new_stamp: u64,
    ) -> bool {
        self.word
            .compare_exchange(
                pack(expected_ptr, expected_stamp),
                pack(new_ptr, new_stamp),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Returns `true` if 128-bit atomics are natively lock-free on this target.
    ///
    /// On targets without a double-width CAS the underlying atomic falls back
    /// to a global lock table, which is still correct but no longer lock-free.
    #[inline]
    pub fn is_lock_free() -> bool {
        AtomicU128::is_lock_free()
    }
}

impl<T> std::fmt::Debug for StampedRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (ptr, stamp) = self.load();
        f.debug_struct("StampedRef")
            .field("ptr", &ptr)
            .field("stamp", &stamp)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::StampedRef;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_null_has_zero_stamp() {
        let cell: StampedRef<u64> = StampedRef::null();
        let (ptr, stamp) = cell.load();
        assert!(ptr.is_null());
        assert_eq!(stamp, 0);
        assert!(cell.is_null());
    }

    #[test]
    fn test_cas_succeeds_on_matching_pair() {
        let mut a = 10u64;
        let mut b = 20u64;
        let pa: *mut u64 = &mut a;
        let pb: *mut u64 = &mut b;

        let cell = StampedRef::new(pa, 7);
        assert!(cell.compare_and_swap(pa, 7, pb, 8));
        assert_eq!(cell.load(), (pb, 8));
    }

    #[test]
    fn test_cas_fails_on_stale_stamp_with_same_pointer() {
        // A -> B -> A round trip: the pointer matches again, the stamp does not.
        let mut a = 1u64;
        let mut b = 2u64;
        let pa: *mut u64 = &mut a;
        let pb: *mut u64 = &mut b;

        let cell = StampedRef::new(pa, 0);
        let (stale_ptr, stale_stamp) = cell.load();

        assert!(cell.compare_and_swap(pa, 0, pb, 1));
        assert!(cell.compare_and_swap(pb, 1, pa, 2));
        assert_eq!(cell.load().0, stale_ptr);

        assert!(!cell.compare_and_swap(stale_ptr, stale_stamp, pb, stale_stamp + 1));
        assert_eq!(cell.load(), (pa, 2), "failed CAS must not mutate");
    }

    #[test]
    fn test_cas_fails_on_wrong_pointer() {
        let mut a = 1u64;
        let mut b = 2u64;
        let pa: *mut u64 = &mut a;
        let pb: *mut u64 = &mut b;

        let cell = StampedRef::new(pa, 3);
        assert!(!cell.compare_and_swap(pb, 3, pb, 4));
        assert_eq!(cell.load(), (pa, 3));
    }

    #[test]
    fn test_stamp_survives_high_values() {
        let cell: StampedRef<u8> = StampedRef::new(std::ptr::null_mut(), u64::MAX);
        assert_eq!(cell.stamp(), u64::MAX);
        assert!(cell.compare_and_swap(
            std::ptr::null_mut(),
            u64::MAX,
            std::ptr::null_mut(),
            u64::MAX.wrapping_add(1)
        ));
        assert_eq!(cell.stamp(), 0);
    }

    #[test]
    fn test_concurrent_increments_are_never_lost() {
        const THREADS: usize = 4;
        const PER_THREAD: u64 = 5_000;

        let cell: StampedRef<u8> = StampedRef::null();
        let successes = AtomicU64::new(0);

        std::thread::scope(|scope| {
            for _ in 0..THREADS {
                scope.spawn(|| {
                    let mut done = 0;
                    while done < PER_THREAD {
                        let (ptr, stamp) = cell.load();
                        if cell.compare_and_swap(ptr, stamp, ptr, stamp + 1) {
                            done += 1;
                            successes.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            }
        });

        assert_eq!(successes.load(Ordering::Relaxed), THREADS as u64 * PER_THREAD);
        assert_eq!(cell.stamp(), THREADS as u64 * PER_THREAD);
    }
}
