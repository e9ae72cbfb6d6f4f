//! A weighted counting semaphore (spec.md §4.6/§5: "two weighted counting
//! semaphores (interactive, batch)"), supporting both a single interactive
//! unit per search and the full-capacity exclusive acquisition reload/close
//! use to guarantee no search is in flight.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

pub struct WeightedSemaphore {
    capacity: u32,
    used: Mutex<u32>,
    available: Condvar,
}

/// Held for the duration of one search's (or one exclusive operation's)
/// occupancy; releases its weight back to the semaphore on drop.
pub struct SemaphorePermit<'a> {
    sem: &'a WeightedSemaphore,
    weight: u32,
}

impl Drop for SemaphorePermit<'_> {
    fn drop(&mut self) {
        let mut used = self.sem.used.lock();
        *used -= self.weight;
        self.sem.available.notify_all();
    }
}

impl WeightedSemaphore {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            used: Mutex::new(0),
            available: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Blocks until `weight` units are free or `deadline` passes, whichever
    /// comes first. `None` deadline blocks indefinitely.
    pub fn acquire(&self, weight: u32, deadline: Option<Instant>) -> Option<SemaphorePermit<'_>> {
        let weight = weight.min(self.capacity);
        let mut used = self.used.lock();
        loop {
            if self.capacity - *used >= weight {
                *used += weight;
                return Some(SemaphorePermit { sem: self, weight });
            }
            match deadline {
                None => self.available.wait(&mut used),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return None;
                    }
                    let timeout = deadline - now;
                    let result = self.available.wait_for(&mut used, timeout);
                    if result.timed_out() && self.capacity - *used < weight {
                        return None;
                    }
                }
            }
        }
    }

    /// Acquires the full capacity (spec.md §4.6 "Exclusive mode"), so the
    /// caller can be certain no other search is concurrently running.
    pub fn acquire_exclusive(&self, deadline: Option<Instant>) -> Option<SemaphorePermit<'_>> {
        self.acquire(self.capacity, deadline)
    }
}
