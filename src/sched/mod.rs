/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Scheduling of independent tasks from batches of sources.

A [`WorkerPool`] owns a fixed set of persistent threads. The [`Driver`]
publishes a batch of sources as a [`WorkRange`]; workers claim sources one at
a time by atomically incrementing the lower bound of the range, and run a
[`SourceTask`] (usually, a [breadth-first task](crate::bfs::BfsTask)) on each
claimed source. The driver waits until all claimed tasks have completed and
reports the elapsed time of the batch.

There are two levels of parallelism: tasks from different sources run
concurrently on different workers, and each task may use a Rayon thread pool
to parallelize its traversal steps. The two thread counts are independent,
and choosing them is a matter of tuning.

*/

mod range;
pub use range::*;

mod pool;
pub use pool::*;

mod driver;
pub use driver::*;
