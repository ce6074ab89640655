/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::traits::*;
use thiserror::Error;

/// Errors raised while building a graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Arc ({src}, {dst}) has an endpoint out of range (the graph has {num_nodes} nodes)")]
    ArcOutOfRange {
        src: usize,
        dst: usize,
        num_nodes: usize,
    },
}

/// One direction of the adjacency of a [`CsrGraph`].
///
/// The degree-cumulative function `dcf` has `num_nodes + 1` entries; the
/// neighbors of node `x` are `targets[dcf[x]..dcf[x + 1]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Adjacency {
    dcf: Box<[usize]>,
    targets: Box<[usize]>,
}

impl Adjacency {
    /// Builds the adjacency by a counting sort on the first coordinate of the
    /// given pairs.
    fn from_pairs(num_nodes: usize, pairs: &[(usize, usize)]) -> Self {
        let mut dcf = vec![0; num_nodes + 1];
        for &(x, _) in pairs {
            dcf[x + 1] += 1;
        }
        for i in 0..num_nodes {
            dcf[i + 1] += dcf[i];
        }
        let mut next = dcf.clone();
        let mut targets = vec![0; pairs.len()];
        for &(x, y) in pairs {
            targets[next[x]] = y;
            next[x] += 1;
        }
        Self {
            dcf: dcf.into(),
            targets: targets.into(),
        }
    }

    #[inline(always)]
    fn neighbors(&self, node: usize) -> &[usize] {
        &self.targets[self.dcf[node]..self.dcf[node + 1]]
    }

    #[inline(always)]
    fn degree(&self, node: usize) -> usize {
        self.dcf[node + 1] - self.dcf[node]
    }
}

/// An in-memory compressed sparse-row graph storing both successors and
/// predecessors.
///
/// The graph is built once from a list of arcs and it is immutable
/// afterwards. Successors (and predecessors) of a node are returned in the
/// order in which the corresponding arcs were provided. Duplicate arcs and
/// loops are kept.
///
/// Since predecessors are available, the graph implements [`BidiGraph`], and
/// thus it can be visited by
/// [direction-optimizing](crate::frontier::DirOpt) traversal steps.
///
/// # Examples
///
/// ```
/// use msbfs::graphs::csr_graph::CsrGraph;
/// use msbfs::traits::*;
///
/// let graph = CsrGraph::from_arcs(4, [(0, 1), (1, 2), (2, 0), (1, 3)])?;
/// assert_eq!(graph.num_nodes(), 4);
/// assert_eq!(graph.num_arcs(), 4);
/// assert_eq!(graph.successors(1).collect::<Vec<_>>(), vec![2, 3]);
/// assert_eq!(graph.predecessors(0).collect::<Vec<_>>(), vec![2]);
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrGraph {
    out: Adjacency,
    inc: Adjacency,
}

impl core::default::Default for CsrGraph {
    fn default() -> Self {
        Self::from_checked_arcs(0, &[])
    }
}

impl CsrGraph {
    /// Creates an empty CSR graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a CSR graph with `num_nodes` nodes from a list of arcs.
    ///
    /// An error is returned if an arc has an endpoint greater than or equal
    /// to `num_nodes`.
    pub fn from_arcs(
        num_nodes: usize,
        arcs: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self, GraphError> {
        let arcs = arcs.into_iter().collect::<Vec<_>>();
        if let Some(&(src, dst)) = arcs
            .iter()
            .find(|&&(src, dst)| src >= num_nodes || dst >= num_nodes)
        {
            return Err(GraphError::ArcOutOfRange {
                src,
                dst,
                num_nodes,
            });
        }
        Ok(Self::from_checked_arcs(num_nodes, &arcs))
    }

    fn from_checked_arcs(num_nodes: usize, arcs: &[(usize, usize)]) -> Self {
        let out = Adjacency::from_pairs(num_nodes, arcs);
        let transposed = arcs.iter().map(|&(x, y)| (y, x)).collect::<Vec<_>>();
        let inc = Adjacency::from_pairs(num_nodes, &transposed);
        Self { out, inc }
    }

    /// Returns the arcs of the graph, sorted by source.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.num_nodes()).flat_map(move |x| self.out.neighbors(x).iter().map(move |&y| (x, y)))
    }

    /// Returns a new graph containing the arcs of this graph and their
    /// reverses.
    pub fn symmetrize(&self) -> Self {
        let arcs = self
            .arcs()
            .flat_map(|(x, y)| [(x, y), (y, x)])
            .collect::<Vec<_>>();
        Self::from_checked_arcs(self.num_nodes(), &arcs)
    }

    /// Returns the successors of a node as a slice.
    #[inline(always)]
    pub fn successors_slice(&self, node: usize) -> &[usize] {
        self.out.neighbors(node)
    }

    /// Returns the predecessors of a node as a slice.
    #[inline(always)]
    pub fn predecessors_slice(&self, node: usize) -> &[usize] {
        self.inc.neighbors(node)
    }
}

impl RandomAccessGraph for CsrGraph {
    #[inline(always)]
    fn num_nodes(&self) -> usize {
        self.out.dcf.len() - 1
    }

    #[inline(always)]
    fn num_arcs(&self) -> u64 {
        self.out.targets.len() as u64
    }

    #[inline(always)]
    fn successors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.out.neighbors(node).iter().copied()
    }

    #[inline(always)]
    fn outdegree(&self, node: usize) -> usize {
        self.out.degree(node)
    }
}

impl BidiGraph for CsrGraph {
    #[inline(always)]
    fn predecessors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.inc.neighbors(node).iter().copied()
    }

    #[inline(always)]
    fn indegree(&self, node: usize) -> usize {
        self.inc.degree(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let graph = CsrGraph::new();
        assert_eq!(graph.num_nodes(), 0);
        assert_eq!(graph.num_arcs(), 0);
    }

    #[test]
    fn test_isolated_tail() -> anyhow::Result<()> {
        // Nodes 3 and 4 have no arcs at all
        let graph = CsrGraph::from_arcs(5, [(0, 1), (2, 0), (0, 2)])?;
        assert_eq!(graph.num_nodes(), 5);
        assert_eq!(graph.successors(0).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(graph.outdegree(3), 0);
        assert_eq!(graph.indegree(4), 0);
        assert_eq!(graph.predecessors(0).collect::<Vec<_>>(), vec![2]);
        assert!(graph.has_arc(2, 0));
        assert!(!graph.has_arc(1, 0));
        Ok(())
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            CsrGraph::from_arcs(2, [(0, 1), (1, 2)]),
            Err(GraphError::ArcOutOfRange {
                src: 1,
                dst: 2,
                num_nodes: 2
            })
        );
    }

    #[test]
    fn test_symmetrize() -> anyhow::Result<()> {
        let graph = CsrGraph::from_arcs(3, [(0, 1), (1, 2)])?.symmetrize();
        assert_eq!(graph.num_arcs(), 4);
        for (x, y) in graph.arcs() {
            assert!(graph.has_arc(y, x));
        }
        assert_eq!(
            graph.successors(1).collect::<Vec<_>>(),
            graph.predecessors(1).collect::<Vec<_>>()
        );
        Ok(())
    }
}
