/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::graphs::csr_graph::CsrGraph;

/// Provides Erdös-Rényi random graphs in the G(n, m) model.
///
/// The graph has `n` nodes and `m` arcs whose endpoints are chosen uniformly
/// at random. In this implementation, loops are never included, but the same
/// arc might be generated more than once.
///
/// Differently from the G(n, p) model, arcs can be generated in time linear
/// in `m`, which makes it possible to generate benchmark graphs with
/// millions of nodes.
#[derive(Debug, Clone)]
pub struct ErdosRenyi {
    n: usize,
    m: usize,
    seed: u64,
}

impl ErdosRenyi {
    /// Creates a new Erdös-Rényi random graph, given the number of nodes, the
    /// number of arcs and a seed for the [pseudorandom number
    /// generator](SmallRng).
    ///
    /// # Panics
    ///
    /// This method panics if `m > 0` and `n < 2`, as no loop-free arc can be
    /// generated.
    pub fn new(n: usize, m: usize, seed: u64) -> Self {
        assert!(m == 0 || n >= 2, "At least two nodes are needed to generate arcs");
        Self { n, m, seed }
    }

    /// Returns the number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.n
    }

    /// Returns an iterator over the arcs of the graph.
    ///
    /// Two calls return the same sequence of arcs.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> {
        let n = self.n;
        let mut rng = SmallRng::seed_from_u64(self.seed);
        (0..self.m).map(move |_| {
            let src = rng.random_range(0..n);
            // Shift to skip the loop
            let mut dst = rng.random_range(0..n - 1);
            if dst >= src {
                dst += 1;
            }
            (src, dst)
        })
    }

    /// Stores the graph in a [`CsrGraph`].
    pub fn to_csr(&self) -> CsrGraph {
        CsrGraph::from_arcs(self.n, self.arcs())
            .expect("Erdös-Rényi arcs are always within range")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::*;

    #[test]
    fn test_er() {
        let g = ErdosRenyi::new(100, 500, 0);
        assert_eq!(g.arcs().collect::<Vec<_>>(), g.arcs().collect::<Vec<_>>());
        for (src, dst) in g.arcs() {
            assert_ne!(src, dst);
            assert!(src < 100 && dst < 100);
        }
        let csr = g.to_csr();
        assert_eq!(csr.num_nodes(), 100);
        assert_eq!(csr.num_arcs(), 500);
    }

    #[test]
    fn test_seed() {
        let a = ErdosRenyi::new(1000, 100, 0).arcs().collect::<Vec<_>>();
        let b = ErdosRenyi::new(1000, 100, 1).arcs().collect::<Vec<_>>();
        assert_ne!(a, b);
    }
}
