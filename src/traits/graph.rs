/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Capability traits for the graphs visited by breadth-first tasks.

A [random-access graph](RandomAccessGraph) exposes the number of nodes and
arcs and the list of successors of every node. A [bidirectional
graph](BidiGraph) additionally exposes the list of predecessors of every
node, which is necessary to run dense (pull) traversal steps.

Graphs are immutable once built: all methods take `&self`, and the traits
require [`Sync`], as a graph is visited concurrently by all threads of the
worker pool and of the intra-task thread pools.

Both traits are implemented for references and for [`Arc`]s of graphs, so a
graph can be shared by reference in scoped code and by [`Arc`] with the
persistent [worker pool](crate::sched::WorkerPool).

*/

use std::sync::Arc;

/// A graph providing random access to successor lists.
pub trait RandomAccessGraph: Sync {
    /// Returns the number of nodes of the graph.
    fn num_nodes(&self) -> usize;

    /// Returns the number of arcs of the graph.
    fn num_arcs(&self) -> u64;

    /// Returns the successors of a node.
    fn successors(&self, node: usize) -> impl Iterator<Item = usize> + '_;

    /// Returns the outdegree of a node.
    ///
    /// The default implementation counts the successors.
    fn outdegree(&self, node: usize) -> usize {
        self.successors(node).count()
    }

    /// Returns whether there is an arc going from `src` to `dst`.
    ///
    /// Note that the default implementation performs a linear scan.
    fn has_arc(&self, src: usize, dst: usize) -> bool {
        self.successors(src).any(|succ| succ == dst)
    }
}

/// A [random-access graph](RandomAccessGraph) providing, additionally, random
/// access to predecessor lists.
pub trait BidiGraph: RandomAccessGraph {
    /// Returns the predecessors of a node.
    fn predecessors(&self, node: usize) -> impl Iterator<Item = usize> + '_;

    /// Returns the indegree of a node.
    ///
    /// The default implementation counts the predecessors.
    fn indegree(&self, node: usize) -> usize {
        self.predecessors(node).count()
    }
}

impl<G: RandomAccessGraph + ?Sized> RandomAccessGraph for &G {
    #[inline(always)]
    fn num_nodes(&self) -> usize {
        (**self).num_nodes()
    }

    #[inline(always)]
    fn num_arcs(&self) -> u64 {
        (**self).num_arcs()
    }

    #[inline(always)]
    fn successors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        (**self).successors(node)
    }

    #[inline(always)]
    fn outdegree(&self, node: usize) -> usize {
        (**self).outdegree(node)
    }
}

impl<G: BidiGraph + ?Sized> BidiGraph for &G {
    #[inline(always)]
    fn predecessors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        (**self).predecessors(node)
    }

    #[inline(always)]
    fn indegree(&self, node: usize) -> usize {
        (**self).indegree(node)
    }
}

impl<G: RandomAccessGraph + Send + ?Sized> RandomAccessGraph for Arc<G> {
    #[inline(always)]
    fn num_nodes(&self) -> usize {
        (**self).num_nodes()
    }

    #[inline(always)]
    fn num_arcs(&self) -> u64 {
        (**self).num_arcs()
    }

    #[inline(always)]
    fn successors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        (**self).successors(node)
    }

    #[inline(always)]
    fn outdegree(&self, node: usize) -> usize {
        (**self).outdegree(node)
    }
}

impl<G: BidiGraph + Send + ?Sized> BidiGraph for Arc<G> {
    #[inline(always)]
    fn predecessors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        (**self).predecessors(node)
    }

    #[inline(always)]
    fn indegree(&self, node: usize) -> usize {
        (**self).indegree(node)
    }
}
