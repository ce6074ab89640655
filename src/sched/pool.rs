/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::WorkRange;
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors raised by a [`WorkerPool`].
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Could not spawn worker thread {id}")]
    Spawn {
        id: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("The batch [{start} . . {end}) exceeds the number of sources ({limit})")]
    OutOfRange {
        start: usize,
        end: usize,
        limit: usize,
    },
    #[error("The pool has {num_sources} sources, but its task accepts only {max}")]
    TooManySources { num_sources: usize, max: usize },
    #[error("A task panicked while running a batch")]
    WorkerPanicked,
    #[error("All worker threads have terminated")]
    Disconnected,
    #[error("{0} worker thread(s) panicked")]
    Join(usize),
}

/// The outcome of a task run from a single source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskOutcome {
    /// The number of expansion rounds.
    pub rounds: usize,
    /// The number of nodes reached, including the source.
    pub reached: usize,
    /// Whether the source has no reachable neighbors, that is, the first
    /// expansion round produced an empty frontier.
    pub isolated: bool,
}

impl TaskOutcome {
    /// The outcome of a source without reachable neighbors.
    pub fn isolated() -> Self {
        Self {
            rounds: 1,
            reached: 1,
            isolated: true,
        }
    }
}

/// A unit of work that can be run from any source.
///
/// Tasks must be independent: a task never waits for another task, and runs
/// from different sources can happen concurrently on different workers.
pub trait SourceTask: Send + Sync {
    /// Runs the task from `source`.
    fn run(&self, source: usize) -> TaskOutcome;

    /// Returns the number of sources the task accepts, if bounded.
    ///
    /// A [`WorkerPool`] refuses to draw sources beyond this bound.
    fn num_sources(&self) -> Option<usize> {
        None
    }
}

impl<F: Fn(usize) -> TaskOutcome + Send + Sync> SourceTask for F {
    fn run(&self, source: usize) -> TaskOutcome {
        self(source)
    }
}

/// The report of a completed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// The first source of the batch.
    pub start: usize,
    /// The requested end of the batch.
    pub requested_end: usize,
    /// The end of the batch after the substitution of isolated sources.
    pub end: usize,
    /// The number of sources claimed.
    pub claimed: usize,
    /// The number of isolated sources claimed.
    pub isolated: usize,
    /// The overall number of expansion rounds.
    pub rounds: usize,
    /// The overall number of nodes reached.
    pub reached: usize,
    /// The wall-clock time between the publication of the batch and the
    /// completion of its last task.
    pub elapsed: Duration,
}

impl BatchReport {
    /// Returns the number of sources that performed at least one expansion
    /// round discovering some node.
    pub fn expanded(&self) -> usize {
        self.claimed - self.isolated
    }
}

/// Per-batch state shared by the driver and the workers.
#[derive(Debug, Default)]
struct Ticket {
    /// Outstanding batch messages.
    pending: AtomicUsize,
    claimed: AtomicUsize,
    isolated: AtomicUsize,
    rounds: AtomicUsize,
    reached: AtomicUsize,
    failed: AtomicBool,
}

impl Ticket {
    fn record(&self, outcome: &TaskOutcome) {
        self.claimed.fetch_add(1, Ordering::Relaxed);
        self.rounds.fetch_add(outcome.rounds, Ordering::Relaxed);
        self.reached.fetch_add(outcome.reached, Ordering::Relaxed);
        if outcome.isolated {
            self.isolated.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Counts down the outstanding messages of a batch when dropped, even
/// during unwinding; the worker bringing the count to zero signals the
/// driver.
struct Participation<'a> {
    ticket: &'a Ticket,
    done: &'a Sender<()>,
}

impl Drop for Participation<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.ticket.failed.store(true, Ordering::Release);
        }
        if self.ticket.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            // The receiver is gone only if the driver stopped waiting
            let _ = self.done.send(());
        }
    }
}

enum Message {
    Batch {
        ticket: Arc<Ticket>,
        done: Sender<()>,
    },
    Shutdown,
}

struct Shared<T> {
    task: T,
    range: WorkRange,
    shutdown: AtomicBool,
    fairness: AtomicBool,
}

impl<T: SourceTask> Shared<T> {
    /// Claims and runs sources until the range is drained or shutdown is
    /// requested.
    fn drain(&self, ticket: &Ticket) {
        while !self.shutdown.load(Ordering::Acquire) {
            let Some(source) = self.range.claim() else {
                break;
            };
            let outcome = self.task.run(source);
            ticket.record(&outcome);
            if outcome.isolated && self.fairness.load(Ordering::Relaxed) {
                if self.range.extend() {
                    log::debug!("Source {source} is isolated: extending the batch");
                } else {
                    log::warn!("Source {source} is isolated, but there are no more sources to substitute it");
                }
            }
        }
    }
}

fn work<T: SourceTask>(id: usize, shared: &Shared<T>, receiver: Receiver<Message>) {
    log::debug!("Worker {id} started");
    // Blocks without spinning until the driver sends a message
    while let Ok(message) = receiver.recv() {
        if shared.shutdown.load(Ordering::Acquire) {
            break;
        }
        match message {
            Message::Shutdown => break,
            Message::Batch { ticket, done } => {
                let _participation = Participation {
                    ticket: &ticket,
                    done: &done,
                };
                shared.drain(&ticket);
            }
        }
    }
    log::debug!("Worker {id} terminated");
}

/// A fixed set of persistent threads running [source tasks](SourceTask) on
/// batches of sources.
///
/// Threads are created by [`new`](WorkerPool::new) and joined by
/// [`shutdown`](WorkerPool::shutdown) (or when the pool is dropped). For each
/// batch, the driver [publishes](WorkerPool::publish) a [`WorkRange`] and
/// sends a message to each worker; the workers wake up, claim sources from
/// the range one at a time, and run the task on each claimed source. The
/// shared counter balances sources of uneven cost across workers.
///
/// Each message of a batch decrements an atomic countdown when its worker
/// finds the range drained; the worker bringing the countdown to zero
/// signals the driver. Thus, [`PendingBatch::wait`] returns only when every
/// claimed task has completed, and reported times include the last task.
///
/// If fairness is enabled (the default), a source whose task reports it as
/// [isolated](TaskOutcome::isolated) is substituted by extending the range
/// by one, so the number of sources carrying work equals the requested batch
/// size (unless the limit is reached).
///
/// A pool with zero workers runs batches inline: [`PendingBatch::wait`]
/// drains the range in the calling thread, using the same claiming logic.
///
/// # Examples
///
/// ```
/// use msbfs::sched::{TaskOutcome, WorkerPool};
/// use std::sync::Mutex;
/// use std::sync::Arc;
///
/// let claimed = Arc::new(Mutex::new(Vec::new()));
/// let task_claimed = claimed.clone();
/// let mut pool = WorkerPool::new(
///     4,
///     move |source: usize| {
///         task_claimed.lock().unwrap().push(source);
///         TaskOutcome { rounds: 1, reached: 2, isolated: false }
///     },
///     100,
/// )?;
/// let report = pool.run_batch(0, 8)?;
/// pool.shutdown()?;
///
/// assert_eq!(report.claimed, 8);
/// let mut claimed = claimed.lock().unwrap().clone();
/// claimed.sort();
/// assert_eq!(claimed, (0..8).collect::<Vec<_>>());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct WorkerPool<T: SourceTask + 'static> {
    shared: Arc<Shared<T>>,
    sender: Option<Sender<Message>>,
    workers: Vec<JoinHandle<()>>,
}

impl<T: SourceTask + 'static> WorkerPool<T> {
    /// Creates a pool and starts its threads.
    ///
    /// # Arguments
    ///
    /// * `num_workers`: the number of worker threads; if zero, batches will
    ///   be run inline by the thread waiting for them.
    ///
    /// * `task`: the task run on every claimed source.
    ///
    /// * `num_sources`: sources must be smaller than this value (usually,
    ///   the number of nodes of the graph); it cannot exceed
    ///   [`SourceTask::num_sources`].
    pub fn new(num_workers: usize, task: T, num_sources: usize) -> Result<Self, PoolError> {
        if let Some(max) = task.num_sources() {
            if num_sources > max {
                return Err(PoolError::TooManySources { num_sources, max });
            }
        }
        let shared = Arc::new(Shared {
            task,
            range: WorkRange::new(num_sources),
            shutdown: AtomicBool::new(false),
            fairness: AtomicBool::new(true),
        });
        let (sender, receiver) = crossbeam_channel::unbounded();
        let mut pool = Self {
            shared,
            sender: Some(sender),
            workers: Vec::with_capacity(num_workers),
        };

        for id in 0..num_workers {
            let shared = pool.shared.clone();
            let receiver = receiver.clone();
            let handle = std::thread::Builder::new()
                .name(format!("msbfs-worker-{id}"))
                .spawn(move || work(id, &shared, receiver))
                .map_err(|source| PoolError::Spawn { id, source })?;
            pool.workers.push(handle);
        }

        log::debug!("Started a pool with {num_workers} workers");
        Ok(pool)
    }

    /// Enables or disables the substitution of isolated sources.
    pub fn set_fairness(&mut self, fairness: bool) {
        self.shared.fairness.store(fairness, Ordering::Relaxed);
    }

    /// Returns the number of worker threads.
    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Returns the task run by the workers.
    pub fn task(&self) -> &T {
        &self.shared.task
    }

    /// Returns the range of the current (or last) batch.
    pub fn range(&self) -> &WorkRange {
        &self.shared.range
    }

    /// Publishes the batch `[start . . end)` and wakes up the workers.
    ///
    /// If `end < start` the batch is empty. An error is returned if `end`
    /// exceeds the number of sources, or if all workers have terminated.
    pub fn publish(&mut self, start: usize, end: usize) -> Result<PendingBatch<'_, T>, PoolError> {
        let limit = self.shared.range.limit();
        if end > limit {
            return Err(PoolError::OutOfRange { start, end, limit });
        }
        if end < start {
            log::warn!("Empty batch: the end ({end}) precedes the start ({start})");
        }

        let started = Instant::now();
        self.shared.range.publish(start, end);
        let ticket = Arc::new(Ticket::default());
        let (done_sender, done_receiver) = crossbeam_channel::bounded(1);

        if !self.workers.is_empty() {
            ticket.pending.store(self.workers.len(), Ordering::Release);
            let sender = self.sender.as_ref().ok_or(PoolError::Disconnected)?;
            for _ in 0..self.workers.len() {
                sender
                    .send(Message::Batch {
                        ticket: ticket.clone(),
                        done: done_sender.clone(),
                    })
                    .map_err(|_| PoolError::Disconnected)?;
            }
        }

        Ok(PendingBatch {
            pool: self,
            ticket,
            done: done_receiver,
            start,
            requested_end: end,
            started,
            waited: false,
        })
    }

    /// Publishes the batch `[start . . end)` and waits for its completion.
    pub fn run_batch(&mut self, start: usize, end: usize) -> Result<BatchReport, PoolError> {
        self.publish(start, end)?.wait()
    }

    /// Sets the shutdown flag, wakes up all workers and joins them.
    pub fn shutdown(mut self) -> Result<(), PoolError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), PoolError> {
        self.shared.shutdown.store(true, Ordering::Release);
        if let Some(sender) = self.sender.take() {
            for _ in 0..self.workers.len() {
                // Fails only if all workers have already terminated
                let _ = sender.send(Message::Shutdown);
            }
        }
        let mut panicked = 0;
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                panicked += 1;
            }
        }
        if panicked > 0 {
            Err(PoolError::Join(panicked))
        } else {
            Ok(())
        }
    }
}

impl<T: SourceTask + 'static> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            log::error!("Error while shutting down the worker pool: {err}");
        }
    }
}

/// A published batch.
///
/// The batch is awaited by [`wait`](PendingBatch::wait); dropping a pending
/// batch waits for its completion, too, so that a new batch is never
/// published while workers are still claiming sources.
pub struct PendingBatch<'a, T: SourceTask + 'static> {
    pool: &'a WorkerPool<T>,
    ticket: Arc<Ticket>,
    done: Receiver<()>,
    start: usize,
    requested_end: usize,
    started: Instant,
    waited: bool,
}

impl<T: SourceTask + 'static> PendingBatch<'_, T> {
    /// Waits until all sources of the batch have been claimed and all
    /// claimed tasks have completed, and returns a report.
    pub fn wait(mut self) -> Result<BatchReport, PoolError> {
        self.finish()
    }

    fn finish(&mut self) -> Result<BatchReport, PoolError> {
        self.waited = true;
        let shared = &self.pool.shared;
        if self.pool.workers.is_empty() {
            shared.drain(&self.ticket);
        } else {
            self.done.recv().map_err(|_| PoolError::Disconnected)?;
        }
        let elapsed = self.started.elapsed();

        if self.ticket.failed.load(Ordering::Acquire) {
            return Err(PoolError::WorkerPanicked);
        }

        let (_, end) = shared.range.bounds();
        Ok(BatchReport {
            start: self.start,
            requested_end: self.requested_end,
            end,
            claimed: self.ticket.claimed.load(Ordering::Relaxed),
            isolated: self.ticket.isolated.load(Ordering::Relaxed),
            rounds: self.ticket.rounds.load(Ordering::Relaxed),
            reached: self.ticket.reached.load(Ordering::Relaxed),
            elapsed,
        })
    }
}

impl<T: SourceTask + 'static> Drop for PendingBatch<'_, T> {
    fn drop(&mut self) {
        if !self.waited {
            if let Err(err) = self.finish() {
                log::error!("Error while completing a dropped batch: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// A task recording the claimed sources; sources in `isolated` are
    /// reported as isolated.
    struct Recorder {
        claimed: Mutex<Vec<usize>>,
        isolated: Vec<usize>,
    }

    impl Recorder {
        fn new(isolated: Vec<usize>) -> Self {
            Self {
                claimed: Mutex::new(Vec::new()),
                isolated,
            }
        }

        fn sorted(&self) -> Vec<usize> {
            let mut claimed = self.claimed.lock().unwrap().clone();
            claimed.sort_unstable();
            claimed
        }
    }

    impl SourceTask for Recorder {
        fn run(&self, source: usize) -> TaskOutcome {
            self.claimed.lock().unwrap().push(source);
            if self.isolated.contains(&source) {
                TaskOutcome::isolated()
            } else {
                TaskOutcome {
                    rounds: 2,
                    reached: 2,
                    isolated: false,
                }
            }
        }
    }

    #[test]
    fn test_exhaustive_claiming() -> anyhow::Result<()> {
        let mut pool = WorkerPool::new(4, Recorder::new(vec![]), 100)?;
        let report = pool.run_batch(0, 8)?;
        assert_eq!(pool.task().sorted(), (0..8).collect::<Vec<_>>());
        assert_eq!(report.claimed, 8);
        assert_eq!(report.isolated, 0);
        assert_eq!(report.end, 8);
        assert_eq!(report.rounds, 16);
        assert_eq!(report.expanded(), 8);
        pool.shutdown()?;
        Ok(())
    }

    #[test]
    fn test_fairness() -> anyhow::Result<()> {
        let mut pool = WorkerPool::new(2, Recorder::new(vec![5]), 100)?;
        let report = pool.run_batch(5, 6)?;
        assert_eq!(pool.task().sorted(), vec![5, 6]);
        assert_eq!(report.requested_end, 6);
        assert_eq!(report.end, 7);
        assert_eq!(report.claimed, 2);
        assert_eq!(report.isolated, 1);
        assert_eq!(report.expanded(), 1);
        Ok(())
    }

    #[test]
    fn test_fairness_chain() -> anyhow::Result<()> {
        // Every substitute is isolated, too, until the limit is reached
        let mut pool = WorkerPool::new(3, Recorder::new((4..10).collect()), 10)?;
        let report = pool.run_batch(3, 6)?;
        assert_eq!(pool.task().sorted(), (3..10).collect::<Vec<_>>());
        assert_eq!(report.end, 10);
        assert_eq!(report.expanded(), 1);
        Ok(())
    }

    #[test]
    fn test_no_fairness() -> anyhow::Result<()> {
        let mut pool = WorkerPool::new(2, Recorder::new(vec![5]), 100)?;
        pool.set_fairness(false);
        let report = pool.run_batch(5, 6)?;
        assert_eq!(pool.task().sorted(), vec![5]);
        assert_eq!(report.end, 6);
        Ok(())
    }

    #[test]
    fn test_inline() -> anyhow::Result<()> {
        let mut pool = WorkerPool::new(0, Recorder::new(vec![2]), 10)?;
        assert_eq!(pool.num_workers(), 0);
        let report = pool.run_batch(0, 4)?;
        assert_eq!(pool.task().sorted(), (0..5).collect::<Vec<_>>());
        assert_eq!(report.claimed, 5);
        assert_eq!(report.end, 5);
        pool.shutdown()?;
        Ok(())
    }

    #[test]
    fn test_repeated_batches() -> anyhow::Result<()> {
        let mut pool = WorkerPool::new(4, Recorder::new(vec![]), 1000)?;
        for round in 0..10 {
            let report = pool.run_batch(round * 10, round * 10 + 50)?;
            assert_eq!(report.claimed, 50);
        }
        let claimed = pool.task().sorted();
        assert_eq!(claimed.len(), 500);
        Ok(())
    }

    #[test]
    fn test_empty_and_invalid_batches() -> anyhow::Result<()> {
        let mut pool = WorkerPool::new(2, Recorder::new(vec![]), 10)?;
        let report = pool.run_batch(7, 3)?;
        assert_eq!(report.claimed, 0);
        assert!(matches!(
            pool.run_batch(0, 11),
            Err(PoolError::OutOfRange {
                start: 0,
                end: 11,
                limit: 10
            })
        ));
        assert!(pool.task().sorted().is_empty());
        Ok(())
    }

    #[test]
    fn test_dropped_batch() -> anyhow::Result<()> {
        let mut pool = WorkerPool::new(3, Recorder::new(vec![]), 100)?;
        drop(pool.publish(0, 20)?);
        // The dropped batch has been completed
        assert_eq!(pool.task().sorted(), (0..20).collect::<Vec<_>>());
        assert!(pool.range().is_drained());
        Ok(())
    }

    /// A task accepting only the sources smaller than its bound.
    struct Bounded(usize);

    impl SourceTask for Bounded {
        fn run(&self, source: usize) -> TaskOutcome {
            assert!(source < self.0);
            TaskOutcome::default()
        }

        fn num_sources(&self) -> Option<usize> {
            Some(self.0)
        }
    }

    #[test]
    fn test_bounded_task() -> anyhow::Result<()> {
        assert!(matches!(
            WorkerPool::new(2, Bounded(3), 10),
            Err(PoolError::TooManySources {
                num_sources: 10,
                max: 3
            })
        ));
        let mut pool = WorkerPool::new(2, Bounded(3), 3)?;
        assert_eq!(pool.run_batch(0, 3)?.claimed, 3);
        assert!(matches!(
            pool.run_batch(0, 4),
            Err(PoolError::OutOfRange { .. })
        ));
        pool.shutdown()?;
        Ok(())
    }

    #[test]
    fn test_panicking_task() -> anyhow::Result<()> {
        let mut pool = WorkerPool::new(
            2,
            |source: usize| {
                assert_ne!(source, 3, "Source 3 is cursed");
                TaskOutcome::default()
            },
            10,
        )?;
        assert!(matches!(
            pool.run_batch(0, 6),
            Err(PoolError::WorkerPanicked)
        ));
        assert!(matches!(pool.shutdown(), Err(PoolError::Join(1))));
        Ok(())
    }

    #[test]
    fn test_shutdown() -> anyhow::Result<()> {
        let pool = WorkerPool::new(8, Recorder::new(vec![]), 10)?;
        assert_eq!(pool.num_workers(), 8);
        pool.shutdown()?;
        // Dropping an idle pool joins the workers, too
        let pool = WorkerPool::new(4, Recorder::new(vec![]), 10)?;
        drop(pool);
        Ok(())
    }
}
