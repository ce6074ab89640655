/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{push::push_step, DenseSet, Frontier, Strategy, TraversalStep, UpdateRule};
use crate::{traits::BidiGraph, utils::Granularity};
use rayon::{prelude::*, ThreadPool};

/// Direction-optimizing traversal steps.
///
/// At each round, the step estimates the work of a sparse step as the number
/// of nodes in the frontier plus the sum of their outdegrees. If the estimate
/// exceeds the number of arcs of the graph divided by the
/// [threshold](DirOpt::with_threshold) (20 by default), the step uses a dense
/// (pull) strategy: every node satisfying the [condition](UpdateRule::cond)
/// scans its predecessors, and calls [`update`](UpdateRule::update) for each
/// predecessor in the frontier until the condition becomes false. Since each
/// destination is handled by a single thread, the non-atomic update is safe.
/// The next frontier is then dense.
///
/// Otherwise, the step behaves exactly like a [push step](super::Push).
#[derive(Debug, Clone, Copy)]
pub struct DirOpt {
    granularity: Granularity,
    threshold: u64,
}

impl core::default::Default for DirOpt {
    fn default() -> Self {
        Self {
            granularity: Granularity::default(),
            threshold: 20,
        }
    }
}

impl DirOpt {
    /// Creates a direction-optimizing step with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the granularity of the chunks of the sparse strategy.
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Sets the threshold: the dense strategy is used when the number of
    /// arcs leaving the frontier exceeds the number of arcs of the graph
    /// divided by the threshold.
    ///
    /// A threshold of zero disables the dense strategy.
    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns the strategy that a step would use on `frontier`.
    pub fn strategy<G: BidiGraph>(
        &self,
        graph: &G,
        frontier: &Frontier<'_>,
        thread_pool: &ThreadPool,
    ) -> Strategy {
        if self.threshold == 0 {
            return Strategy::Sparse;
        }
        let work = (frontier.len() + frontier.outdegree_sum(graph, thread_pool)) as u64;
        if work > graph.num_arcs() / self.threshold {
            Strategy::Dense
        } else {
            Strategy::Sparse
        }
    }
}

impl<G: BidiGraph> TraversalStep<G> for DirOpt {
    fn step<'a, R: UpdateRule>(
        &self,
        graph: &G,
        frontier: &Frontier<'_>,
        rule: &R,
        thread_pool: &'a ThreadPool,
    ) -> Frontier<'a> {
        let num_nodes = graph.num_nodes();
        match self.strategy(graph, frontier, thread_pool) {
            Strategy::Sparse => {
                let granularity = self
                    .granularity
                    .node_granularity(num_nodes, graph.num_arcs());
                push_step(graph, frontier, rule, granularity, thread_pool)
            }
            Strategy::Dense => {
                let curr = frontier.to_dense(num_nodes, thread_pool);
                Frontier::Dense(pull(graph, &curr, rule, thread_pool))
            }
        }
    }
}

fn pull<G: BidiGraph, R: UpdateRule>(
    graph: &G,
    curr: &DenseSet,
    rule: &R,
    thread_pool: &ThreadPool,
) -> DenseSet {
    thread_pool.install(|| {
        let bits = (0..graph.num_nodes())
            .into_par_iter()
            .map(|dst| {
                let mut discovered = false;
                if !rule.cond(dst) {
                    return false;
                }
                for src in graph.predecessors(dst) {
                    if curr.contains(src) && rule.update(src, dst) {
                        discovered = true;
                    }
                    if !rule.cond(dst) {
                        break;
                    }
                }
                discovered
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();
        DenseSet::from_bits(bits)
    })
}
