//! Lock-free queue distributing pending tasks across parallel workers

use std::sync::atomic::{AtomicUsize, Ordering};

/// Lock-free queue handing out items to pool workers.
///
/// Workers call [`next()`](TaskQueue::next) to atomically claim the next
/// item; once the cursor passes the end the queue is drained for good.
pub struct TaskQueue<T> {
    items: Vec<T>,
    cursor: AtomicUsize,
}

impl<T> TaskQueue<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Claim the next item (lock-free).
    pub fn next(&self) -> Option<&T> {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.items.get(i)
    }

    /// Total items the queue started with.
    pub fn total(&self) -> usize {
        self.items.len()
    }
}
