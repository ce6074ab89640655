/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{BatchReport, SourceTask, WorkerPool};
use anyhow::{Context, Result};
use dsi_progress_logger::ProgressLog;
use std::io::Write;
use std::ops::Range;
use thiserror::Error;

/// Errors raised while validating a [`BatchConfig`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("The end of the batch ({end}) exceeds the number of sources ({num_sources})")]
    SourceOutOfRange { end: usize, num_sources: usize },
    #[error("The number of rounds must be positive")]
    NoRounds,
}

/// The configuration of a benchmark: a batch of sources and the number of
/// timed repetitions of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// The first source of the batch.
    pub source_start: usize,
    /// The exclusive end of the batch.
    pub source_end: usize,
    /// The number of timed repetitions.
    pub rounds: usize,
    /// Whether isolated sources are substituted.
    pub fairness: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            source_start: 0,
            source_end: 0,
            rounds: 2,
            fairness: true,
        }
    }
}

impl BatchConfig {
    /// Validates the configuration against the number of sources, returning
    /// the range of the batch.
    ///
    /// A batch whose end precedes its start is empty; this is not an error.
    pub fn validate(&self, num_sources: usize) -> Result<Range<usize>, ConfigError> {
        if self.rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        if self.source_end > num_sources {
            return Err(ConfigError::SourceOutOfRange {
                end: self.source_end,
                num_sources,
            });
        }
        if self.source_end < self.source_start {
            log::warn!(
                "The end of the batch ({}) precedes its start ({}): the batch is empty",
                self.source_end,
                self.source_start
            );
        }
        Ok(self.source_start..self.source_end)
    }
}

/// Runs timed batches on a [`WorkerPool`].
///
/// For each round, the driver publishes the batch, waits for its completion
/// and prints a line `total time: <ms>` to the report sink.
#[derive(Debug, Clone, Default)]
pub struct Driver {
    config: BatchConfig,
}

impl Driver {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Runs all rounds, returning a report for each round.
    ///
    /// The pool is not shut down; this is the responsibility of the caller.
    pub fn run<T: SourceTask + 'static>(
        &self,
        pool: &mut WorkerPool<T>,
        out: &mut impl Write,
        pl: &mut impl ProgressLog,
    ) -> Result<Vec<BatchReport>> {
        let range = self.config.validate(pool.range().limit())?;
        pool.set_fairness(self.config.fairness);

        pl.item_name("round");
        pl.expected_updates(Some(self.config.rounds));
        pl.start(format!(
            "Running {} rounds on sources [{} . . {}) with {} workers...",
            self.config.rounds,
            range.start,
            range.end,
            pool.num_workers()
        ));

        let mut reports = Vec::with_capacity(self.config.rounds);
        for round in 0..self.config.rounds {
            let report = pool
                .run_batch(range.start, range.end)
                .with_context(|| format!("Round {round} failed"))?;
            log::info!(
                "Round {round}: {} sources claimed ({} isolated), batch end {} -> {}, {} nodes reached in {} rounds",
                report.claimed,
                report.isolated,
                report.requested_end,
                report.end,
                report.reached,
                report.rounds,
            );
            writeln!(out, "total time: {}", report.elapsed.as_millis())
                .context("Could not write the batch time")?;
            reports.push(report);
            pl.update();
        }
        pl.done();

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::TaskOutcome;
    use dsi_progress_logger::no_logging;

    #[test]
    fn test_validate() {
        let config = BatchConfig {
            source_start: 2,
            source_end: 5,
            ..Default::default()
        };
        assert_eq!(config.validate(10), Ok(2..5));
        assert_eq!(
            config.validate(4),
            Err(ConfigError::SourceOutOfRange {
                end: 5,
                num_sources: 4
            })
        );
        let config = BatchConfig {
            rounds: 0,
            ..config
        };
        assert_eq!(config.validate(10), Err(ConfigError::NoRounds));
        let config = BatchConfig {
            source_start: 5,
            source_end: 2,
            rounds: 1,
            fairness: true,
        };
        assert!(config.validate(10).unwrap().is_empty());
    }

    #[test]
    fn test_run() -> Result<()> {
        let mut pool = WorkerPool::new(
            3,
            |_: usize| TaskOutcome {
                rounds: 2,
                reached: 2,
                isolated: false,
            },
            100,
        )?;
        let driver = Driver::new(BatchConfig {
            source_start: 10,
            source_end: 20,
            rounds: 3,
            fairness: true,
        });
        let mut out = Vec::new();
        let reports = driver.run(&mut pool, &mut out, no_logging![])?;
        pool.shutdown()?;

        assert_eq!(reports.len(), 3);
        for report in &reports {
            assert_eq!(report.claimed, 10);
            assert_eq!(report.end, 20);
            assert_eq!(report.rounds, 20);
        }
        let out = String::from_utf8(out)?;
        assert_eq!(out.lines().count(), 3);
        assert!(out.lines().all(|line| line.starts_with("total time: ")));
        Ok(())
    }

    #[test]
    fn test_run_empty() -> Result<()> {
        let mut pool = WorkerPool::new(2, |_: usize| TaskOutcome::default(), 10)?;
        let driver = Driver::new(BatchConfig::default());
        let reports = driver.run(&mut pool, &mut std::io::sink(), no_logging![])?;
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|report| report.claimed == 0));
        Ok(())
    }

    #[test]
    fn test_run_invalid() -> Result<()> {
        let mut pool = WorkerPool::new(0, |_: usize| TaskOutcome::default(), 10)?;
        let driver = Driver::new(BatchConfig {
            source_end: 11,
            ..Default::default()
        });
        assert!(driver
            .run(&mut pool, &mut std::io::sink(), no_logging![])
            .is_err());
        Ok(())
    }
}
