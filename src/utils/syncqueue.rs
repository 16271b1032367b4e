#[cfg(test)]
mod tests;

use {
    parking_lot::{Condvar, Mutex},
    std::{collections::VecDeque, time::Duration},
};

/// A bounded multi-producer queue.
///
/// Producers block while the queue is full and consumers block while it is empty. Both sides
/// wait at most for the given timeout so that they can observe a shutdown.
pub struct SyncQueue<T> {
    capacity: usize,
    el: Mutex<VecDeque<T>>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl<T> SyncQueue<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0);
        Self {
            capacity,
            el: Mutex::new(VecDeque::with_capacity(capacity)),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Pushes `t` or hands it back if the queue stayed full for `timeout`.
    pub fn push(&self, t: T, timeout: Duration) -> Result<(), T> {
        let mut el = self.el.lock();
        while el.len() >= self.capacity {
            if self.not_full.wait_for(&mut el, timeout).timed_out() && el.len() >= self.capacity {
                return Err(t);
            }
        }
        el.push_back(t);
        self.not_empty.notify_one();
        Ok(())
    }

    pub fn pop(&self, timeout: Duration) -> Option<T> {
        let mut el = self.el.lock();
        if el.is_empty() {
            self.not_empty.wait_for(&mut el, timeout);
        }
        let t = el.pop_front();
        if t.is_some() {
            self.not_full.notify_one();
        }
        t
    }

    pub fn try_pop(&self) -> Option<T> {
        let t = self.el.lock().pop_front();
        if t.is_some() {
            self.not_full.notify_one();
        }
        t
    }
}
