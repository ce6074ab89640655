/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Breadth-first tasks from a single source.
//!
//! A [`BfsTask`] expands frontiers from a source until a traversal step
//! returns an empty frontier, recording in a [`ParentArray`] the node that
//! discovered each reached node. Following parent pointers from a reached
//! node leads to the source along a shortest path.
//!
//! When several nodes of a frontier have an arc to the same node, the
//! recorded parent is the one whose [`try_claim`](ParentArray::try_claim)
//! wins the race, so it might differ from run to run; distances, instead,
//! are always the same.

mod parents;
pub use parents::*;

mod task;
pub use task::*;
