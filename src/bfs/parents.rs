/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::frontier::UpdateRule;
use rayon::{prelude::*, ThreadPool};
use std::sync::atomic::{AtomicUsize, Ordering};

/// The sentinel denoting an unvisited node in a [`ParentArray`].
pub const UNVISITED: usize = usize::MAX;

/// The parent array of a breadth-first task.
///
/// Each slot contains either [`UNVISITED`] or the node that discovered the
/// corresponding node. A slot changes at most once, from [`UNVISITED`] to a
/// node: the transition is performed either by [`try_claim`](Self::try_claim),
/// which is safe in the presence of concurrent writers, or by
/// [`set`](Self::set), which must be used only when the caller is the only
/// writer of the slot.
///
/// A parent array is exclusively owned by the task that allocated it, and it
/// is released when the task completes.
#[derive(Debug)]
pub struct ParentArray {
    parents: Box<[AtomicUsize]>,
}

impl ParentArray {
    /// Creates a parent array for `num_nodes` nodes, all unvisited.
    ///
    /// The array is filled in parallel using `thread_pool`.
    pub fn new(num_nodes: usize, thread_pool: &ThreadPool) -> Self {
        let parents = thread_pool.install(|| {
            (0..num_nodes)
                .into_par_iter()
                .map(|_| AtomicUsize::new(UNVISITED))
                .collect::<Vec<_>>()
        });
        Self {
            parents: parents.into_boxed_slice(),
        }
    }

    /// Returns the number of slots.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Returns true if there are no slots.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Returns whether `node` has not been visited yet.
    #[inline(always)]
    pub fn is_unvisited(&self, node: usize) -> bool {
        self.parents[node].load(Ordering::Relaxed) == UNVISITED
    }

    /// Returns the parent of `node`, or `None` if `node` has not been visited.
    #[inline(always)]
    pub fn get(&self, node: usize) -> Option<usize> {
        match self.parents[node].load(Ordering::Relaxed) {
            UNVISITED => None,
            parent => Some(parent),
        }
    }

    /// Tries to record `claimant` as the parent of `node`.
    ///
    /// Returns true if the slot of `node` was unvisited and this call
    /// recorded `claimant`; among concurrent calls on the same node, exactly
    /// one succeeds if the node was unvisited.
    ///
    /// Relaxed ordering suffices: the only requirement is the atomicity of
    /// the transition, as rounds are separated by the join of the thread
    /// pool running the traversal step.
    #[inline(always)]
    pub fn try_claim(&self, node: usize, claimant: usize) -> bool {
        self.parents[node]
            .compare_exchange(UNVISITED, claimant, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }

    /// Records `parent` as the parent of `node` without checking.
    ///
    /// The caller must be the only thread writing the slot of `node`, and the
    /// slot must be unvisited.
    #[inline(always)]
    pub fn set(&self, node: usize, parent: usize) {
        debug_assert!(self.is_unvisited(node), "Node {node} has already a parent");
        self.parents[node].store(parent, Ordering::Relaxed);
    }

    /// Returns the parents as a vector, with [`UNVISITED`] denoting
    /// unvisited nodes.
    pub fn into_vec(self) -> Vec<usize> {
        self.parents
            .into_vec()
            .into_iter()
            .map(AtomicUsize::into_inner)
            .collect()
    }
}

/// The breadth-first update rule: a node is discovered by the first node of
/// the frontier recording itself as its parent.
#[derive(Debug, Clone, Copy)]
pub struct ParentUpdate<'a> {
    parents: &'a ParentArray,
}

impl<'a> ParentUpdate<'a> {
    pub fn new(parents: &'a ParentArray) -> Self {
        Self { parents }
    }
}

impl UpdateRule for ParentUpdate<'_> {
    #[inline(always)]
    fn cond(&self, dst: usize) -> bool {
        self.parents.is_unvisited(dst)
    }

    #[inline(always)]
    fn update(&self, src: usize, dst: usize) -> bool {
        self.parents.set(dst, src);
        true
    }

    #[inline(always)]
    fn update_atomic(&self, src: usize, dst: usize) -> bool {
        self.parents.try_claim(dst, src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_claim_once() {
        let pool = thread_pool![4];
        let parents = ParentArray::new(10, &pool);
        assert_eq!(parents.len(), 10);
        assert!(parents.is_unvisited(7));
        assert!(parents.try_claim(7, 3));
        assert!(!parents.try_claim(7, 4));
        assert_eq!(parents.get(7), Some(3));
        assert_eq!(parents.get(6), None);
        parents.set(6, 1);
        assert_eq!(parents.get(6), Some(1));
    }

    #[test]
    fn test_concurrent_claims() {
        let pool = thread_pool![8];
        let parents = ParentArray::new(1, &pool);
        let winners = AtomicUsize::new(0);
        pool.install(|| {
            (0..10_000).into_par_iter().for_each(|claimant| {
                if parents.try_claim(0, claimant) {
                    winners.fetch_add(1, Ordering::Relaxed);
                }
            })
        });
        assert_eq!(winners.into_inner(), 1);
        assert!(parents.get(0).is_some());
    }

    #[test]
    fn test_into_vec() {
        let pool = thread_pool![1];
        let parents = ParentArray::new(3, &pool);
        parents.set(1, 0);
        assert_eq!(parents.into_vec(), vec![UNVISITED, 0, UNVISITED]);
    }
}
