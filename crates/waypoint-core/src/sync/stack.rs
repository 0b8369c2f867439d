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

//! # Concurrent Stack
//!
//! A lock-free LIFO (Treiber stack) whose top-of-stack is a
//! `StampedRef<Node<T>>`. Pushes and pops both read the current
//! `(top, stamp)` pair and install a new pair with `stamp + 1`, so a thread
//! that read a stale top can never win its compare-and-swap.
//!
//! ## Reclamation
//!
//! A popping thread dereferences the top node to read its successor before
//! it knows whether its CAS will win. Another thread may pop and retire the
//! same node in the meantime. Popped nodes are therefore never freed
//! directly: they are handed to the epoch collector and only released once
//! every thread that was pinned at the time has moved on.
//!
//! ## Ordering
//!
//! The most recently pushed element is popped first. There is no fairness
//! guarantee between competing threads.

use crate::sync::{retire, stamped::StampedRef};
use crossbeam_epoch as epoch;
use crossbeam_utils::Backoff;
use std::mem::ManuallyDrop;

struct Node<T> {
    value: ManuallyDrop<T>,
    next: *mut Node<T>,
}

/// A lock-free, unbounded LIFO stack.
///
/// `pop` never blocks: it returns `None` as soon as it observes an empty
/// stack.
///
/// # Examples
///
/// ```rust
/// use waypoint_core::sync::stack::ConcurrentStack;
///
/// let stack = ConcurrentStack::new();
/// stack.push(1);
/// stack.push(2);
/// assert_eq!(stack.pop(), Some(2));
/// assert_eq!(stack.pop(), Some(1));
/// assert_eq!(stack.pop(), None);
/// ```
pub struct ConcurrentStack<T> {
    top: StampedRef<Node<T>>,
}

unsafe impl<T: Send> Send for ConcurrentStack<T> {}
unsafe impl<T: Send> Sync for ConcurrentStack<T> {}

impl<T> Default for ConcurrentStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConcurrentStack<T> {
    /// Creates an empty stack.
    #[inline]
    pub fn new() -> Self {
        Self {
            top: StampedRef::null(),
        }
    }

    /// Pushes `value` on top of the stack.
    pub fn push(&self, value: T) {
        let node = Box::into_raw(Box::new(Node {
            value: ManuallyDrop::new(value),
            next: std::ptr::null_mut(),
        }));

        let backoff = Backoff::new();
        loop {
            let (top, stamp) = self.top.load();
            // SAFETY: `node` is not published yet, this thread owns it.
            unsafe { (*node).next = top };
            if self
                .top
                .compare_and_swap(top, stamp, node, stamp.wrapping_add(1))
            {
                return;
            }
            backoff.spin();
        }
    }

    /// Removes and returns the top element, or `None` if the stack is empty.
    pub fn pop(&self) -> Option<T> {
        let guard = epoch::pin();
        let backoff = Backoff::new();
        loop {
            let (top, stamp) = self.top.load();
            if top.is_null() {
                return None;
            }

            // SAFETY: the guard is pinned before the load, so `top` cannot be
            // freed while we read it even if another thread retires it.
            // `next` is written only before the node is published.
            let next = unsafe { (*top).next };

            if self
                .top
                .compare_and_swap(top, stamp, next, stamp.wrapping_add(1))
            {
                // SAFETY: the winning CAS unlinked `top`; no other thread can
                // take its value. The node itself is freed by the collector,
                // which never drops the `ManuallyDrop` payload.
                let value = unsafe { ManuallyDrop::into_inner(std::ptr::read(&raw const (*top).value)) };
                unsafe { retire(&guard, top) };
                return Some(value);
            }
            backoff.spin();
        }
    }

    /// Returns `true` if the stack was empty at the moment of the read.
    ///
    /// This is a snapshot only; concurrent pushes may make it stale
    /// immediately.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.top.is_null()
    }
}

impl<T> Drop for ConcurrentStack<T> {
    fn drop(&mut self) {
        let (mut current, _) = self.top.load();
        while !current.is_null() {
            // SAFETY: `&mut self` guarantees exclusive access; every linked
            // node came from `Box::into_raw` and is still owned by the stack.
            let mut node = unsafe { Box::from_raw(current) };
            current = node.next;
            unsafe { ManuallyDrop::drop(&mut node.value) };
        }
    }
}

impl<T> std::fmt::Debug for ConcurrentStack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentStack")
            .field("top", &self.top)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::ConcurrentStack;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_pop_on_empty_returns_none() {
        let stack: ConcurrentStack<u32> = ConcurrentStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_lifo_order() {
        let stack = ConcurrentStack::new();
        for i in 0..10 {
            stack.push(i);
        }
        assert!(!stack.is_empty());
        for i in (0..10).rev() {
            assert_eq!(stack.pop(), Some(i));
        }
        assert!(stack.is_empty());
    }

    #[test]
    fn test_owned_values_move_through() {
        let stack = ConcurrentStack::new();
        stack.push(String::from("left"));
        stack.push(String::from("right"));
        assert_eq!(stack.pop().as_deref(), Some("right"));
        assert_eq!(stack.pop().as_deref(), Some("left"));
    }

    #[test]
    fn test_drop_releases_remaining_values() {
        let drops = Arc::new(AtomicUsize::new(0));
        {
            let stack = ConcurrentStack::new();
            for _ in 0..5 {
                stack.push(DropCounter(Arc::clone(&drops)));
            }
            drop(stack.pop());
            assert_eq!(drops.load(Ordering::Relaxed), 1);
        }
        assert_eq!(drops.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_popped_values_are_dropped_exactly_once() {
        let drops = Arc::new(AtomicUsize::new(0));
        let stack = ConcurrentStack::new();
        for _ in 0..100 {
            stack.push(DropCounter(Arc::clone(&drops)));
        }
        while let Some(value) = stack.pop() {
            drop(value);
        }
        // Retired nodes must not drop the payload a second time.
        crossbeam_epoch::pin().flush();
        assert_eq!(drops.load(Ordering::Relaxed), 100);
    }

    #[test]
    fn test_concurrent_push_pop_counts_balance() {
        const PUSHERS: usize = 2;
        const POPPERS: usize = 2;
        const OPERATIONS: usize = 100_000;

        let stack = ConcurrentStack::new();
        let pushed = AtomicUsize::new(0);
        let popped = AtomicUsize::new(0);
        let popped_sum = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for t in 0..PUSHERS {
                let stack = &stack;
                let pushed = &pushed;
                scope.spawn(move || {
                    for i in 0..OPERATIONS {
                        // A push is counted before poppers can observe it.
                        pushed.fetch_add(1, Ordering::SeqCst);
                        stack.push(t * OPERATIONS + i);
                    }
                });
            }
            for _ in 0..POPPERS {
                let stack = &stack;
                let pushed = &pushed;
                let popped = &popped;
                let popped_sum = &popped_sum;
                scope.spawn(move || {
                    for _ in 0..OPERATIONS {
                        if let Some(v) = stack.pop() {
                            let total = popped.fetch_add(1, Ordering::SeqCst) + 1;
                            popped_sum.fetch_add(v, Ordering::Relaxed);
                            assert!(total <= pushed.load(Ordering::SeqCst));
                        }
                    }
                });
            }
        });

        let mut drained = 0;
        let mut drained_sum = 0;
        while let Some(v) = stack.pop() {
            drained += 1;
            drained_sum += v;
        }

        let total_pushed = PUSHERS * OPERATIONS;
        assert!(stack.is_empty());
        assert_eq!(pushed.load(Ordering::SeqCst), total_pushed);
        assert_eq!(popped.load(Ordering::SeqCst) + drained, total_pushed);

        let expected_sum: usize = (0..total_pushed).sum();
        assert_eq!(
            popped_sum.load(Ordering::Relaxed) + drained_sum,
            expected_sum,
            "every pushed value must be popped exactly once"
        );
    }
}
