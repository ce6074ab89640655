/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Frontiers and traversal steps.
//!
//! A [`Frontier`] is the set of nodes that are active in a round of a
//! breadth-first task. A [traversal step](TraversalStep) applies an
//! [`UpdateRule`] to every arc leaving the frontier and returns the next
//! frontier, formed by the destinations for which the rule reported a
//! discovery.
//!
//! Traversal steps are data-parallel: they run on a Rayon
//! [`ThreadPool`](rayon::ThreadPool) passed by the caller. Depending on the
//! size of the frontier, a step might use a *sparse* (push) strategy, in which
//! threads enumerate the successors of active nodes, or a *dense* (pull)
//! strategy, in which threads enumerate the predecessors of inactive nodes.
//! In the first case the same destination can be reached concurrently by
//! several threads, and the step calls
//! [`update_atomic`](UpdateRule::update_atomic); in the second case every
//! destination is handled by exactly one thread, and the step calls
//! [`update`](UpdateRule::update). Update rules must provide correct
//! semantics for both.
//!
//! Two steps are available:
//! * [`Push`] uses always the sparse strategy, and works on any
//!   [`RandomAccessGraph`];
//! * [`DirOpt`] chooses the strategy at each round depending on the number of
//!   arcs leaving the frontier, and requires a [`BidiGraph`](crate::traits::BidiGraph).

mod dir_opt;
pub use dir_opt::*;

mod push;
pub use push::*;

use crate::traits::RandomAccessGraph;
use rayon::{prelude::*, ThreadPool};
use std::sync::atomic::{AtomicBool, Ordering};

/// The strategy used by a traversal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Edge-centric: successors of active nodes are enumerated.
    Sparse,
    /// Vertex-centric: predecessors of inactive nodes are enumerated.
    Dense,
}

/// A rule applied by a [traversal step](TraversalStep) to the arcs leaving
/// a frontier.
///
/// For each arc `(src, dst)` leaving the frontier, the step first checks
/// [`cond(dst)`](UpdateRule::cond); if the condition holds, it calls one of
/// [`update`](UpdateRule::update) or [`update_atomic`](UpdateRule::update_atomic),
/// and adds `dst` to the next frontier if the update returns true.
pub trait UpdateRule: Sync {
    /// Returns whether `dst` should still be considered.
    fn cond(&self, dst: usize) -> bool;

    /// Updates `dst` from `src`, knowing that no other thread is updating
    /// `dst` concurrently.
    ///
    /// Returns true if `dst` must be added to the next frontier.
    fn update(&self, src: usize, dst: usize) -> bool;

    /// Updates `dst` from `src` when other threads might be updating `dst`
    /// concurrently.
    ///
    /// Returns true if `dst` must be added to the next frontier; an
    /// implementation must return true for at most one of the concurrent
    /// calls on the same `dst`.
    fn update_atomic(&self, src: usize, dst: usize) -> bool;
}

/// A data-parallel traversal step.
pub trait TraversalStep<G: RandomAccessGraph>: Sync {
    /// Applies `rule` to the arcs leaving `frontier`, returning the next
    /// frontier.
    ///
    /// # Arguments
    ///
    /// * `graph`: the graph to visit.
    ///
    /// * `frontier`: the current frontier.
    ///
    /// * `rule`: the update rule.
    ///
    /// * `thread_pool`: the thread pool running the step; the returned
    ///   frontier is bound to it.
    fn step<'a, R: UpdateRule>(
        &self,
        graph: &G,
        frontier: &Frontier<'_>,
        rule: &R,
        thread_pool: &'a ThreadPool,
    ) -> Frontier<'a>;
}

/// A set of nodes represented by a bit per node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseSet {
    bits: Box<[bool]>,
    len: usize,
}

impl DenseSet {
    /// Creates a dense set from a boxed slice of flags.
    pub fn from_bits(bits: Box<[bool]>) -> Self {
        let len = bits.par_iter().filter(|&&b| b).count();
        Self { bits, len }
    }

    /// Returns the number of nodes in the set.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the set is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns whether `node` belongs to the set.
    #[inline(always)]
    pub fn contains(&self, node: usize) -> bool {
        self.bits[node]
    }

    /// Returns the size of the universe of the set.
    #[inline(always)]
    pub fn num_nodes(&self) -> usize {
        self.bits.len()
    }
}

/// The set of active nodes of a round of a breadth-first task.
///
/// A frontier is either sparse, that is, a list of nodes filled concurrently
/// by the threads of a thread pool, or dense, that is, a [`DenseSet`].
/// Traversal steps convert between the two representations as needed.
pub enum Frontier<'a> {
    /// A list of nodes, without duplicates.
    Sparse(parallel_frontier::Frontier<'a, usize>),
    /// A bit per node.
    Dense(DenseSet),
}

impl core::fmt::Debug for Frontier<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Frontier::Sparse(nodes) => f.debug_struct("Sparse").field("len", &nodes.len()).finish(),
            Frontier::Dense(set) => f.debug_struct("Dense").field("len", &set.len()).finish(),
        }
    }
}

impl<'a> Frontier<'a> {
    /// Creates a sparse frontier containing just `node`.
    pub fn singleton(node: usize, thread_pool: &'a ThreadPool) -> Self {
        let mut nodes = parallel_frontier::Frontier::with_threads(thread_pool, None);
        nodes.as_mut()[0] = vec![node];
        Frontier::Sparse(nodes)
    }

    /// Returns the number of nodes in the frontier.
    pub fn len(&self) -> usize {
        match self {
            Frontier::Sparse(nodes) => nodes.len(),
            Frontier::Dense(set) => set.len(),
        }
    }

    /// Returns true if the frontier is empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Frontier::Sparse(nodes) => nodes.is_empty(),
            Frontier::Dense(set) => set.is_empty(),
        }
    }

    /// Returns the strategy that produced this frontier representation.
    pub fn representation(&self) -> Strategy {
        match self {
            Frontier::Sparse(_) => Strategy::Sparse,
            Frontier::Dense(_) => Strategy::Dense,
        }
    }

    /// Returns the nodes of the frontier in increasing order.
    pub fn to_sorted_vec(&self, thread_pool: &ThreadPool) -> Vec<usize> {
        thread_pool.install(|| match self {
            Frontier::Sparse(nodes) => {
                let mut nodes = nodes.par_iter().copied().collect::<Vec<_>>();
                nodes.par_sort_unstable();
                nodes
            }
            Frontier::Dense(set) => (0..set.num_nodes())
                .into_par_iter()
                .filter(|&node| set.contains(node))
                .collect(),
        })
    }

    /// Returns a dense copy of this frontier over a universe of `num_nodes`
    /// nodes.
    pub(crate) fn to_dense(&self, num_nodes: usize, thread_pool: &ThreadPool) -> DenseSet {
        match self {
            Frontier::Dense(set) => set.clone(),
            Frontier::Sparse(nodes) => thread_pool.install(|| {
                let bits = (0..num_nodes)
                    .into_par_iter()
                    .map(|_| AtomicBool::new(false))
                    .collect::<Vec<_>>();
                nodes
                    .par_iter()
                    .for_each(|&node| bits[node].store(true, Ordering::Relaxed));
                DenseSet {
                    bits: bits
                        .into_par_iter()
                        .map(AtomicBool::into_inner)
                        .collect::<Vec<_>>()
                        .into_boxed_slice(),
                    len: nodes.len(),
                }
            }),
        }
    }

    /// Returns the sum of the outdegrees of the nodes in the frontier.
    pub(crate) fn outdegree_sum<G: RandomAccessGraph>(
        &self,
        graph: &G,
        thread_pool: &ThreadPool,
    ) -> usize {
        thread_pool.install(|| match self {
            Frontier::Sparse(nodes) => nodes.par_iter().map(|&node| graph.outdegree(node)).sum(),
            Frontier::Dense(set) => (0..set.num_nodes())
                .into_par_iter()
                .filter(|&node| set.contains(node))
                .map(|node| graph.outdegree(node))
                .sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singleton() {
        let pool = thread_pool![2];
        let frontier = Frontier::singleton(3, &pool);
        assert_eq!(frontier.len(), 1);
        assert!(!frontier.is_empty());
        assert_eq!(frontier.representation(), Strategy::Sparse);
        assert_eq!(frontier.to_sorted_vec(&pool), vec![3]);

        let dense = frontier.to_dense(5, &pool);
        assert_eq!(dense.len(), 1);
        assert!(dense.contains(3));
        assert!(!dense.contains(0));
    }

    #[test]
    fn test_to_dense() {
        let pool = thread_pool![4];
        let nodes = parallel_frontier::Frontier::with_threads(&pool, None);
        pool.install(|| {
            (0..10_000_usize)
                .into_par_iter()
                .filter(|x| x % 3 == 0)
                .for_each(|x| nodes.push(x))
        });
        let frontier = Frontier::Sparse(nodes);
        let dense = frontier.to_dense(10_001, &pool);
        assert_eq!(dense.len(), frontier.len());
        assert_eq!(dense.num_nodes(), 10_001);
        assert!((0..10_001).all(|x| dense.contains(x) == (x % 3 == 0 && x < 10_000)));
        assert_eq!(
            Frontier::Dense(dense).to_sorted_vec(&pool),
            frontier.to_sorted_vec(&pool)
        );
    }

    #[test]
    fn test_dense() {
        let pool = thread_pool![2];
        let set = DenseSet::from_bits(vec![true, false, true, false].into_boxed_slice());
        assert_eq!(set.len(), 2);
        let frontier = Frontier::Dense(set);
        assert_eq!(frontier.to_sorted_vec(&pool), vec![0, 2]);
        let empty = Frontier::Dense(DenseSet::from_bits(vec![false; 4].into_boxed_slice()));
        assert!(empty.is_empty());
    }
}
