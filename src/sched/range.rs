/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A shared half-open interval of sources not yet claimed.
///
/// The driver [publishes](WorkRange::publish) both bounds when a batch
/// starts; workers [claim](WorkRange::claim) sources by atomically
/// incrementing the lower bound, which is thus nondecreasing within a batch.
/// The range is drained when the lower bound reaches the upper bound.
///
/// The upper bound can be [extended](WorkRange::extend) by one while the
/// batch is running, to substitute a source that turned out not to carry any
/// work, but never beyond the limit fixed at construction (usually, the
/// number of nodes of the graph).
///
/// A claim never moves the lower bound past the upper bound, so an
/// extension is always visible to subsequent claims.
#[derive(Debug)]
pub struct WorkRange {
    start: CachePadded<AtomicUsize>,
    end: CachePadded<AtomicUsize>,
    limit: usize,
}

impl WorkRange {
    /// Creates an empty range whose upper bound will never exceed `limit`.
    pub fn new(limit: usize) -> Self {
        Self {
            start: CachePadded::new(AtomicUsize::new(0)),
            end: CachePadded::new(AtomicUsize::new(0)),
            limit,
        }
    }

    /// Returns the limit of the upper bound.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Sets the range to `[start . . end)`.
    ///
    /// This method must not be called while other threads are claiming
    /// sources.
    pub fn publish(&self, start: usize, end: usize) {
        debug_assert!(end <= self.limit);
        self.end.store(end, Ordering::Release);
        self.start.store(start, Ordering::Release);
    }

    /// Claims the next source, if any.
    #[inline]
    pub fn claim(&self) -> Option<usize> {
        self.start
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |start| {
                (start < self.end.load(Ordering::Acquire)).then_some(start + 1)
            })
            .ok()
    }

    /// Extends the upper bound by one, unless it has reached the limit.
    ///
    /// Returns true if the range was extended.
    pub fn extend(&self) -> bool {
        self.end
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |end| {
                (end < self.limit).then_some(end + 1)
            })
            .is_ok()
    }

    /// Returns the current bounds.
    pub fn bounds(&self) -> (usize, usize) {
        (
            self.start.load(Ordering::Acquire),
            self.end.load(Ordering::Acquire),
        )
    }

    /// Returns true if all sources in the range have been claimed.
    pub fn is_drained(&self) -> bool {
        let (start, end) = self.bounds();
        start >= end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_claim() {
        let range = WorkRange::new(10);
        assert!(range.is_drained());
        assert_eq!(range.claim(), None);
        range.publish(3, 5);
        assert!(!range.is_drained());
        assert_eq!(range.claim(), Some(3));
        assert_eq!(range.claim(), Some(4));
        assert_eq!(range.claim(), None);
        assert_eq!(range.claim(), None);
        assert!(range.is_drained());
        // Failed claims do not overshoot
        assert_eq!(range.bounds(), (5, 5));
        assert!(range.extend());
        assert_eq!(range.claim(), Some(5));
    }

    #[test]
    fn test_empty_publish() {
        let range = WorkRange::new(10);
        range.publish(7, 2);
        assert!(range.is_drained());
        assert_eq!(range.claim(), None);
    }

    #[test]
    fn test_limit() {
        let range = WorkRange::new(2);
        range.publish(0, 1);
        assert!(range.extend());
        assert!(!range.extend());
        assert_eq!(range.bounds(), (0, 2));
    }

    #[test]
    fn test_concurrent_claims() {
        let range = WorkRange::new(10_000);
        range.publish(0, 10_000);
        let claimed = Mutex::new(Vec::new());
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let mut local = Vec::new();
                    while let Some(source) = range.claim() {
                        local.push(source);
                    }
                    claimed.lock().unwrap().extend(local);
                });
            }
        });
        let mut claimed = claimed.into_inner().unwrap();
        claimed.sort_unstable();
        assert_eq!(claimed, (0..10_000).collect::<Vec<_>>());
    }
}
