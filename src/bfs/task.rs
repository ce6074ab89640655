/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{ParentArray, ParentUpdate};
use crate::frontier::{Frontier, TraversalStep, UpdateRule};
use crate::sched::{SourceTask, TaskOutcome};
use crate::traits::RandomAccessGraph;
use rayon::ThreadPool;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by breadth-first tasks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BfsError {
    #[error("Source {node} is out of range (the graph has {num_nodes} nodes)")]
    SourceOutOfRange { node: usize, num_nodes: usize },
}

/// Statistics about a frontier expansion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Expansion {
    /// The number of traversal steps executed, including the last one, which
    /// returned an empty frontier.
    pub rounds: usize,
    /// The number of nodes reached, including the source.
    pub reached: usize,
    /// Whether the first step returned an empty frontier.
    pub isolated: bool,
}

/// Expands frontiers from `source` until a step returns an empty frontier.
///
/// The caller is responsible for marking `source` as discovered in the state
/// managed by `rule` before calling this function.
pub fn expand<G, S, R>(
    graph: &G,
    step: &S,
    rule: &R,
    source: usize,
    thread_pool: &ThreadPool,
) -> Expansion
where
    G: RandomAccessGraph,
    S: TraversalStep<G>,
    R: UpdateRule,
{
    let mut frontier = Frontier::singleton(source, thread_pool);
    let mut expansion = Expansion {
        rounds: 0,
        reached: 1,
        isolated: false,
    };

    while !frontier.is_empty() {
        let next = step.step(graph, &frontier, rule, thread_pool);
        expansion.rounds += 1;
        expansion.reached += next.len();
        if expansion.rounds == 1 && next.is_empty() {
            expansion.isolated = true;
        }
        // The previous frontier is dropped here
        frontier = next;
    }

    debug_assert!(expansion.rounds <= graph.num_nodes().max(1));
    expansion
}

/// The result of a breadth-first visit from a single source.
#[derive(Debug)]
pub struct BfsTree {
    source: usize,
    parents: ParentArray,
    expansion: Expansion,
}

impl BfsTree {
    /// Returns the source of the visit.
    pub fn source(&self) -> usize {
        self.source
    }

    /// Returns the parent array; the source is its own parent.
    pub fn parents(&self) -> &ParentArray {
        &self.parents
    }

    /// Returns the expansion statistics.
    pub fn expansion(&self) -> Expansion {
        self.expansion
    }

    /// Returns the number of rounds of the visit.
    pub fn rounds(&self) -> usize {
        self.expansion.rounds
    }

    /// Returns the number of nodes reached from the source, including the
    /// source.
    pub fn reached(&self) -> usize {
        self.expansion.reached
    }

    /// Returns whether the source has no reachable neighbors.
    pub fn isolated(&self) -> bool {
        self.expansion.isolated
    }

    /// Returns the maximum distance from the source of a reached node.
    pub fn depth(&self) -> usize {
        self.expansion.rounds.saturating_sub(1)
    }

    /// Returns the distance of `node` from the source, obtained by following
    /// parent pointers, or `None` if `node` was not reached.
    pub fn distance(&self, node: usize) -> Option<usize> {
        let mut current = node;
        let mut distance = 0;
        while current != self.source {
            current = self.parents.get(current)?;
            distance += 1;
            // Parent pointers form a tree rooted at the source
            if distance > self.parents.len() {
                return None;
            }
        }
        Some(distance)
    }

    /// Consumes the tree, returning the parent array.
    pub fn into_parents(self) -> ParentArray {
        self.parents
    }
}

/// A breadth-first task from a single source.
///
/// The task owns a handle to the graph, a [traversal step](TraversalStep)
/// and the thread pool used for intra-task parallelism. Every visit
/// allocates a fresh [`ParentArray`], which is released when the visit
/// result is dropped.
///
/// The thread pool is shared by all tasks running concurrently on the
/// workers of a [`WorkerPool`](crate::sched::WorkerPool); Rayon schedules
/// the steps of the different tasks on its threads.
///
/// # Examples
///
/// ```
/// use msbfs::prelude::*;
/// use msbfs::thread_pool;
/// use std::sync::Arc;
///
/// let graph = CsrGraph::from_arcs(4, [(0, 1), (1, 2), (2, 0), (1, 3)])?;
/// let task = BfsTask::new(&graph, DirOpt::new(), Arc::new(thread_pool![2]));
/// let tree = task.visit(0)?;
/// assert_eq!(tree.parents().get(0), Some(0));
/// assert_eq!(tree.parents().get(1), Some(0));
/// assert_eq!(tree.parents().get(2), Some(1));
/// assert_eq!(tree.parents().get(3), Some(1));
/// assert_eq!(tree.distance(3), Some(2));
/// assert_eq!(tree.rounds(), 3);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct BfsTask<G, S> {
    graph: G,
    step: S,
    thread_pool: Arc<ThreadPool>,
}

impl<G: RandomAccessGraph, S: TraversalStep<G>> BfsTask<G, S> {
    /// Creates a breadth-first task.
    ///
    /// # Arguments
    ///
    /// * `graph`: the graph to visit.
    ///
    /// * `step`: the traversal step.
    ///
    /// * `thread_pool`: the thread pool used by traversal steps.
    pub fn new(graph: G, step: S, thread_pool: Arc<ThreadPool>) -> Self {
        Self {
            graph,
            step,
            thread_pool,
        }
    }

    /// Returns the graph visited by the task.
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Returns the thread pool used by traversal steps.
    pub fn thread_pool(&self) -> &ThreadPool {
        &self.thread_pool
    }

    /// Visits the graph from `source`.
    pub fn visit(&self, source: usize) -> Result<BfsTree, BfsError> {
        let num_nodes = self.graph.num_nodes();
        if source >= num_nodes {
            return Err(BfsError::SourceOutOfRange {
                node: source,
                num_nodes,
            });
        }
        let parents = ParentArray::new(num_nodes, &self.thread_pool);
        parents.set(source, source);
        let expansion = expand(
            &self.graph,
            &self.step,
            &ParentUpdate::new(&parents),
            source,
            &self.thread_pool,
        );
        Ok(BfsTree {
            source,
            parents,
            expansion,
        })
    }
}

impl<G, S> SourceTask for BfsTask<G, S>
where
    G: RandomAccessGraph + Send,
    S: TraversalStep<G> + Send,
{
    fn run(&self, source: usize) -> TaskOutcome {
        match self.visit(source) {
            Ok(tree) => {
                log::trace!(
                    "Source {source}: {} nodes reached in {} rounds",
                    tree.reached(),
                    tree.rounds()
                );
                TaskOutcome::from(tree.expansion())
            }
            Err(err) => {
                log::error!("{err}");
                TaskOutcome::default()
            }
        }
    }

    fn num_sources(&self) -> Option<usize> {
        Some(self.graph.num_nodes())
    }
}

impl From<Expansion> for TaskOutcome {
    fn from(expansion: Expansion) -> Self {
        TaskOutcome {
            rounds: expansion.rounds,
            reached: expansion.reached,
            isolated: expansion.isolated,
        }
    }
}
