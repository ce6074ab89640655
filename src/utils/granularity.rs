/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/// Granularity of the parallel chunks of a traversal step, specified
/// transparently by nodes or arcs.
///
/// Sparse traversal steps split the current frontier in chunks that are
/// processed by the threads of the intra-task thread pool. Since the cost of
/// a chunk is the sum of the outdegrees of its nodes, it is sometimes more
/// natural to express the size of a chunk as a number of arcs; the method
/// [`node_granularity`](Self::node_granularity) converts such a
/// value into a number of nodes using the average outdegree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Node granularity: each chunk contains the specified number of nodes.
    Nodes(usize),
    /// Arc granularity: each chunk contains a number of nodes whose sum of
    /// outdegrees is, tentatively, the specified number of arcs.
    Arcs(u64),
}

impl core::default::Default for Granularity {
    /// Returns a default granularity of 64 nodes.
    fn default() -> Self {
        Self::Nodes(64)
    }
}

impl Granularity {
    /// Returns a node granularity for a graph with a given number of nodes
    /// and arcs.
    ///
    /// For the variant [`Nodes`](Self::Nodes), the specified number of nodes is
    /// returned. For the variant [`Arcs`](Self::Arcs), the number of nodes is
    /// computed as the specified number of arcs divided by the average
    /// outdegree. The result is never zero.
    pub fn node_granularity(&self, num_nodes: usize, num_arcs: u64) -> usize {
        match self {
            Self::Nodes(n) => (*n).max(1),
            Self::Arcs(n) => {
                let average_degree = num_arcs.max(1) as f64 / num_nodes.max(1) as f64;
                (*n as f64 / average_degree)
                    .min(usize::MAX as f64)
                    .ceil()
                    .max(1.) as usize
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_granularity() {
        assert_eq!(Granularity::Nodes(100).node_granularity(10, 20), 100);
        assert_eq!(Granularity::Nodes(0).node_granularity(10, 20), 1);
        // Average outdegree 4
        assert_eq!(Granularity::Arcs(100).node_granularity(10, 40), 25);
        assert_eq!(Granularity::Arcs(1).node_granularity(10, 1000), 1);
        assert_eq!(Granularity::Arcs(10).node_granularity(0, 0), 10);
    }
}
