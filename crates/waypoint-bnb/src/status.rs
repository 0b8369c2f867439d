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

//! The global run-status record.
//!
//! One `RunStatus` is published per run. Workers never edit it in place:
//! every change is a read-copy-publish cycle through
//! `PublishedCell::update`, so the keep-running flag and the slot table are
//! always observed together.

/// Activity of a single worker slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotStatus {
    /// The worker holds, or is about to take, a state from the frontier.
    Busy,
    /// The worker found the frontier empty and is waiting for work.
    Idle,
    /// No worker runs in this slot.
    NotSpawned,
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotStatus::Busy => write!(f, "Busy"),
            SlotStatus::Idle => write!(f, "Idle"),
            SlotStatus::NotSpawned => write!(f, "NotSpawned"),
        }
    }
}

/// Keep-running flag, slot table and fault marker of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStatus {
    keep_running: bool,
    slots: Vec<SlotStatus>,
    fault: Option<usize>,
}

impl RunStatus {
    /// Creates the initial record: running, the first `active` slots `Busy`
    /// and the rest of the `capacity` slots `NotSpawned`.
    ///
    /// # Panics
    ///
    /// Panics if `active > capacity`.
    pub fn new(active: usize, capacity: usize) -> Self {
        assert!(
            active <= capacity,
            "called `RunStatus::new` with {} active slots but a capacity of {}",
            active,
            capacity
        );

        let mut slots = vec![SlotStatus::NotSpawned; capacity];
        slots[..active].fill(SlotStatus::Busy);
        Self {
            keep_running: true,
            slots,
            fault: None,
        }
    }

    #[inline]
    pub fn keep_running(&self) -> bool {
        self.keep_running
    }

    /// Returns the status of `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of bounds.
    #[inline]
    pub fn slot(&self, slot: usize) -> SlotStatus {
        self.slots[slot]
    }

    /// Returns the number of slots in the table.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of `Busy` slots.
    #[inline]
    pub fn busy_count(&self) -> usize {
        self.slots.iter().filter(|s| **s == SlotStatus::Busy).count()
    }

    /// Returns the slot of the worker that aborted the run, if any.
    #[inline]
    pub fn fault(&self) -> Option<usize> {
        self.fault
    }

    /// Sets the status of `slot`.
    #[inline]
    pub fn set_slot(&mut self, slot: usize, status: SlotStatus) {
        debug_assert!(
            slot < self.slots.len(),
            "called `RunStatus::set_slot` with slot out of bounds: the capacity is {} but the slot is {}",
            self.slots.len(),
            slot
        );
        self.slots[slot] = status;
    }

    /// Clears the keep-running flag.
    #[inline]
    pub fn stop(&mut self) {
        self.keep_running = false;
    }

    /// Clears the keep-running flag and records `slot` as the fault.
    ///
    /// The first recorded fault wins.
    #[inline]
    pub fn stop_with_fault(&mut self, slot: usize) {
        self.keep_running = false;
        self.fault.get_or_insert(slot);
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RunStatus(keep_running: {}, busy: {}/{}",
            self.keep_running,
            self.busy_count(),
            self.slots.len()
        )?;
        if let Some(slot) = self.fault {
            write!(f, ", fault: {}", slot)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_marks_active_slots_busy() {
        let status = RunStatus::new(3, 8);
        assert!(status.keep_running());
        assert_eq!(status.capacity(), 8);
        assert_eq!(status.busy_count(), 3);
        assert_eq!(status.slot(2), SlotStatus::Busy);
        assert_eq!(status.slot(3), SlotStatus::NotSpawned);
        assert_eq!(status.fault(), None);
    }

    #[test]
    fn test_slot_transitions() {
        let mut status = RunStatus::new(2, 2);
        status.set_slot(0, SlotStatus::Idle);
        assert_eq!(status.busy_count(), 1);
        status.set_slot(1, SlotStatus::Idle);
        assert_eq!(status.busy_count(), 0);
        status.stop();
        assert!(!status.keep_running());
    }

    #[test]
    fn test_first_fault_wins() {
        let mut status = RunStatus::new(4, 4);
        status.stop_with_fault(2);
        status.stop_with_fault(0);
        assert!(!status.keep_running());
        assert_eq!(status.fault(), Some(2));
    }

    #[test]
    fn test_display() {
        let mut status = RunStatus::new(1, 4);
        assert_eq!(
            status.to_string(),
            "RunStatus(keep_running: true, busy: 1/4)"
        );
        status.stop_with_fault(0);
        assert_eq!(
            status.to_string(),
            "RunStatus(keep_running: false, busy: 1/4, fault: 0)"
        );
    }

    #[test]
    #[should_panic(expected = "called `RunStatus::new`")]
    fn test_more_active_than_capacity_panics() {
        let _ = RunStatus::new(5, 4);
    }
}
