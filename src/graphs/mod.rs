/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

pub mod csr_graph;
pub mod random;

pub mod prelude {
    pub use super::csr_graph::{CsrGraph, GraphError};
    pub use super::random::ErdosRenyi;
}
