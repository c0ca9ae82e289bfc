//! Thread-safe wrapper around any lazy sequence.
//!
//! Serializes `next` calls through a mutual-exclusion lock so several
//! consumers can pull from one generator without overlapping advancement.
//! Exhaustion is observed by every consumer; fairness between waiting
//! callers is whatever the lock's wait queue provides. The lock blocks
//! indefinitely and there is no cancellation hook.

use std::sync::Mutex;

/// Mutex-guarded iterator, shareable across threads behind an `Arc`.
pub struct ThreadsafeIter<I> {
    inner: Mutex<I>,
}

impl<I: Iterator> ThreadsafeIter<I> {
    /// Wrap an iterator for concurrent consumption.
    pub fn new(it: I) -> Self {
        Self {
            inner: Mutex::new(it),
        }
    }

    /// Pull the next element, holding the lock only for the advancement.
    ///
    /// A poisoned lock is recovered: the cursor state itself cannot be left
    /// mid-update by a panicking consumer, only unobserved.
    pub fn next(&self) -> Option<I::Item> {
        self.inner
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .next()
    }
}

impl<I: Iterator> Iterator for &ThreadsafeIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        ThreadsafeIter::next(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn single_consumer_sees_everything_in_order() {
        let it = ThreadsafeIter::new(0..5);
        let got: Vec<i32> = (&it).collect();
        assert_eq!(got, vec![0, 1, 2, 3, 4]);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn concurrent_consumers_share_without_duplicates() {
        const THREADS: usize = 4;
        const PER_THREAD: usize = 250;
        let total = THREADS * PER_THREAD;

        let it = Arc::new(ThreadsafeIter::new(0..total));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let it = Arc::clone(&it);
                std::thread::spawn(move || {
                    let mut seen = Vec::with_capacity(PER_THREAD);
                    for _ in 0..PER_THREAD {
                        seen.push(it.next().expect("iterator exhausted early"));
                    }
                    seen
                })
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            for item in handle.join().unwrap() {
                assert!(all.insert(item), "item {item} delivered twice");
            }
        }
        assert_eq!(all.len(), total);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn exhaustion_reaches_all_consumers() {
        let it = Arc::new(ThreadsafeIter::new(0..3));
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let it = Arc::clone(&it);
                std::thread::spawn(move || {
                    let mut count = 0;
                    while it.next().is_some() {
                        count += 1;
                    }
                    count
                })
            })
            .collect();

        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 3);
    }
}
