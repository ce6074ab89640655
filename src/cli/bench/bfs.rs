/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::cli::{get_thread_pool, GlobalArgs, GranularityArgs, NumThreadsArg};
use crate::prelude::*;
use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use dsi_progress_logger::{progress_logger, ProgressLog};
use std::collections::VecDeque;
use std::sync::Arc;

/// The traversal step used by breadth-first tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Direction-optimizing (push or pull, depending on the frontier).
    DirOpt,
    /// Always push.
    Push,
}

#[derive(Parser, Debug)]
#[command(
    name = "bfs",
    about = "Benchmarks batches of breadth-first visits from many sources on a random graph.",
    long_about = None
)]
pub struct CliArgs {
    /// The number of nodes of the random graph.
    #[arg(short = 'n', long, default_value_t = 1_000_000)]
    pub nodes: usize,
    /// The average number of arcs per node of the random graph.
    #[arg(short = 'd', long, default_value_t = 8)]
    pub arcs_per_node: usize,
    /// The seed of the random graph.
    #[arg(short, long, default_value_t = 0)]
    pub seed: u64,
    /// Add the reverse of every arc to the random graph.
    #[arg(long)]
    pub symmetric: bool,

    /// The first source of the batch.
    #[arg(long, default_value_t = 0)]
    pub source_start: usize,
    /// The exclusive end of the batch.
    #[arg(long, conflicts_with("num_sources"))]
    pub source_end: Option<usize>,
    /// The number of sources of the batch.
    #[arg(long, conflicts_with("source_end"))]
    pub num_sources: Option<usize>,
    /// The number of timed repetitions of the batch.
    #[arg(short = 'R', long, default_value_t = 2)]
    pub rounds: usize,
    /// Do not substitute sources with no reachable neighbors.
    #[arg(long)]
    pub no_fairness: bool,

    /// The number of workers running tasks from different sources; 0 runs
    /// tasks on the main thread.
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub workers: usize,
    #[clap(flatten)]
    pub num_threads: NumThreadsArg,
    /// The traversal step.
    #[arg(long, value_enum, default_value_t = StrategyArg::DirOpt)]
    pub strategy: StrategyArg,
    /// The threshold of direction-optimizing steps (0 disables pull steps).
    #[arg(long, default_value_t = 20)]
    pub threshold: u64,
    #[clap(flatten)]
    pub granularity: GranularityArgs,

    /// Check distances against a sequential visit after the benchmark.
    #[arg(long)]
    pub check: bool,
}

impl CliArgs {
    fn batch_config(&self) -> BatchConfig {
        let source_end = match (self.source_end, self.num_sources) {
            (Some(end), _) => end,
            (None, Some(num_sources)) => self.source_start.saturating_add(num_sources),
            (None, None) => BatchConfig::default().source_end,
        };
        BatchConfig {
            source_start: self.source_start,
            source_end,
            rounds: self.rounds,
            fairness: !self.no_fairness,
        }
    }
}

pub fn main(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    ensure!(
        args.nodes >= 2 || args.arcs_per_node == 0,
        "A random graph with arcs needs at least two nodes"
    );
    let num_arcs = args
        .nodes
        .checked_mul(args.arcs_per_node)
        .context("The number of arcs overflows")?;

    log::info!(
        "Generating a random graph with {} nodes and {} arcs (seed {})",
        args.nodes,
        num_arcs,
        args.seed
    );
    let mut graph = ErdosRenyi::new(args.nodes, num_arcs, args.seed).to_csr();
    if args.symmetric {
        log::info!("Symmetrizing the graph");
        graph = graph.symmetrize();
    }
    let graph = Arc::new(graph);

    let granularity = args.granularity.into_granularity();
    match args.strategy {
        StrategyArg::DirOpt => bench(
            global_args,
            &args,
            graph,
            DirOpt::new()
                .with_granularity(granularity)
                .with_threshold(args.threshold),
        ),
        StrategyArg::Push => bench(global_args, &args, graph, Push::with_granularity(granularity)),
    }
}

fn bench<S>(global_args: GlobalArgs, args: &CliArgs, graph: Arc<CsrGraph>, step: S) -> Result<()>
where
    S: TraversalStep<Arc<CsrGraph>> + Send + 'static,
{
    let num_nodes = graph.num_nodes();
    let thread_pool = Arc::new(get_thread_pool(args.num_threads.num_threads)?);
    let task = BfsTask::new(graph.clone(), step, thread_pool);
    let mut pool = WorkerPool::new(args.workers, task, num_nodes)?;

    let mut pl = progress_logger![];
    if let Some(log_interval) = global_args.log_interval {
        pl.log_interval(log_interval);
    }

    let driver = Driver::new(args.batch_config());
    let reports = driver.run(&mut pool, &mut std::io::stdout().lock(), &mut pl)?;

    if args.check {
        if let Some(report) = reports.last() {
            check(&graph, pool.task(), report.start..report.end)?;
        }
    }

    pool.shutdown()?;
    Ok(())
}

/// Checks the distances computed by `task` against a sequential visit.
fn check<S: TraversalStep<Arc<CsrGraph>>>(
    graph: &CsrGraph,
    task: &BfsTask<Arc<CsrGraph>, S>,
    sources: std::ops::Range<usize>,
) -> Result<()> {
    let mut pl = progress_logger![item_name = "source"];
    pl.expected_updates(Some(sources.len()));
    pl.start("Checking distances...");

    for source in sources {
        let tree = task.visit(source)?;
        let expected = distances(graph, source);
        for (node, &distance) in expected.iter().enumerate() {
            ensure!(
                tree.distance(node) == distance,
                "Node {node} has distance {:?} from source {source}, but it should be {:?}",
                tree.distance(node),
                distance
            );
        }
        pl.update();
    }

    pl.done();
    Ok(())
}

/// Computes distances from `source` using a sequential visit.
fn distances(graph: &CsrGraph, source: usize) -> Vec<Option<usize>> {
    let mut distances = vec![None; graph.num_nodes()];
    let mut queue = VecDeque::new();
    distances[source] = Some(0);
    queue.push_back((source, 0));

    while let Some((node, distance)) = queue.pop_front() {
        for &succ in graph.successors_slice(node) {
            if distances[succ].is_none() {
                distances[succ] = Some(distance + 1);
                queue.push_back((succ, distance + 1));
            }
        }
    }
    distances
}
