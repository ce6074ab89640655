/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{DenseSet, Frontier, TraversalStep, UpdateRule};
use crate::{traits::RandomAccessGraph, utils::Granularity};
use rayon::{prelude::*, ThreadPool};

/// Sparse (push) traversal steps.
///
/// The nodes of the frontier are divided in chunks of approximately equal
/// size; threads consume the chunks and enumerate the successors of the
/// associated nodes, calling [`update_atomic`](UpdateRule::update_atomic) on
/// each successor satisfying the [condition](UpdateRule::cond). The next
/// frontier is always sparse.
///
/// This step works on every [`RandomAccessGraph`], but it can be
/// significantly slower than a [direction-optimizing step](super::DirOpt)
/// when frontiers become large.
#[derive(Debug, Clone, Copy, Default)]
pub struct Push {
    granularity: Granularity,
}

impl Push {
    /// Creates a push step with the [default granularity](Granularity::default).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a push step with a given granularity.
    ///
    /// High granularity reduces overhead, but may lead to decreased
    /// performance on graphs with a skewed outdegree distribution.
    pub fn with_granularity(granularity: Granularity) -> Self {
        Self { granularity }
    }
}

impl<G: RandomAccessGraph> TraversalStep<G> for Push {
    fn step<'a, R: UpdateRule>(
        &self,
        graph: &G,
        frontier: &Frontier<'_>,
        rule: &R,
        thread_pool: &'a ThreadPool,
    ) -> Frontier<'a> {
        let granularity = self
            .granularity
            .node_granularity(graph.num_nodes(), graph.num_arcs());
        push_step(graph, frontier, rule, granularity, thread_pool)
    }
}

/// Runs a sparse step, converting dense frontiers first.
pub(crate) fn push_step<'a, G: RandomAccessGraph, R: UpdateRule>(
    graph: &G,
    frontier: &Frontier<'_>,
    rule: &R,
    granularity: usize,
    thread_pool: &'a ThreadPool,
) -> Frontier<'a> {
    match frontier {
        Frontier::Sparse(nodes) => push_nodes(graph, nodes, rule, granularity, thread_pool),
        Frontier::Dense(set) => {
            let nodes = sparsify(set, thread_pool);
            push_nodes(graph, &nodes, rule, granularity, thread_pool)
        }
    }
}

fn push_nodes<'a, G: RandomAccessGraph, R: UpdateRule>(
    graph: &G,
    nodes: &parallel_frontier::Frontier<'_, usize>,
    rule: &R,
    granularity: usize,
    thread_pool: &'a ThreadPool,
) -> Frontier<'a> {
    // We do not provide a capacity in the hope of allocating dynamically
    // space as the frontiers grow.
    let next = parallel_frontier::Frontier::with_threads(thread_pool, None);
    thread_pool.install(|| {
        nodes.par_iter().chunks(granularity).for_each(|chunk| {
            for &src in chunk {
                for dst in graph.successors(src) {
                    if rule.cond(dst) && rule.update_atomic(src, dst) {
                        next.push(dst);
                    }
                }
            }
        })
    });
    Frontier::Sparse(next)
}

/// Turns a dense set into a sparse frontier bound to `thread_pool`.
fn sparsify<'a>(
    set: &DenseSet,
    thread_pool: &'a ThreadPool,
) -> parallel_frontier::Frontier<'a, usize> {
    let nodes = parallel_frontier::Frontier::with_threads(thread_pool, None);
    thread_pool.install(|| {
        (0..set.num_nodes())
            .into_par_iter()
            .filter(|&node| set.contains(node))
            .for_each(|node| nodes.push(node))
    });
    nodes
}
