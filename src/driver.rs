/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Sequential driver chaining rounds over checkpoints.
//!
//! Starting from the checkpoint of round `start`, the [`Driver`] runs a
//! [round](crate::round) for each *t* in `start..end`, reading the checkpoint
//! of round *t* and committing the checkpoint of round *t* + 1 before the
//! next round starts. The number of partitions of each round is the number of
//! parts of its input checkpoint, so partitioning is stable across rounds.
//!
//! No convergence test is performed: the caller inspects the returned
//! [`RoundReport`]s to decide whether to keep iterating.
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use pprank::prelude::*;
//!
//! let driver = Driver::new(RunConfig::new("/data/pr", 0, 10, 1_000_000, "1,2,3"))?;
//! for report in driver.run()? {
//!     println!("{}: {}", report.round, report.counters);
//! }
//! #     Ok(())
//! # }
//! ```

use crate::checkpoint::{Checkpoint, write_checkpoint};
use crate::config::{ConfigError, RunConfig};
use crate::counters::RoundCounters;
use crate::round::{RoundParams, run_round};
use anyhow::{Context, Result};
use dsi_progress_logger::{ConcurrentProgressLog, ProgressLog, no_logging};
use std::num::NonZeroUsize;

/// Information about an executed round.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundReport {
    /// The round of the checkpoint that was written.
    pub round: usize,
    /// The number of partitions of the input and of the output checkpoint.
    pub num_partitions: usize,
    pub counters: RoundCounters,
}

/// Runs rounds `start..end` of a [`RunConfig`].
#[derive(Debug, Clone)]
pub struct Driver {
    config: RunConfig,
    params: RoundParams,
}

impl Driver {
    /// Creates a driver, validating the configuration.
    ///
    /// No checkpoint is accessed.
    pub fn new(config: RunConfig) -> Result<Self, ConfigError> {
        let sources = config.validate()?;
        let params = RoundParams::new(config.alpha, sources)?;
        Ok(Self { config, params })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn params(&self) -> &RoundParams {
        &self.params
    }

    /// Runs all rounds, returning a report for each round.
    pub fn run(&self) -> Result<Vec<RoundReport>> {
        self.run_with_logging(no_logging![], no_logging![])
    }

    /// Runs all rounds, logging progress.
    ///
    /// `pl` is a sequential [`ProgressLog`] counting rounds. `cpl` is a
    /// [`ConcurrentProgressLog`] used for node-level progress inside each
    /// round. Their options will be preserved, making thus possible to
    /// customize the logs.
    ///
    /// The first failing round stops the run; checkpoints of the previous
    /// rounds are kept.
    pub fn run_with_logging(
        &self,
        pl: &mut impl ProgressLog,
        cpl: &mut impl ConcurrentProgressLog,
    ) -> Result<Vec<RoundReport>> {
        let config = &self.config;
        log::info!("Base path: {}", config.base.display());
        log::info!("Number of nodes: {}", config.num_nodes);
        log::info!("Start round: {}", config.start);
        log::info!("End round: {}", config.end);
        log::info!("Sources: {}", self.params.sources());
        log::info!("Alpha: {}", self.params.alpha());
        log::info!("Pre-aggregation: {}", config.combine);

        pl.item_name("round");
        pl.expected_updates(Some(config.end - config.start));
        pl.start("Iterating personalized PageRank...");

        let mut reports = Vec::with_capacity(config.end - config.start);
        for round in config.start..config.end {
            reports.push(self.iterate(round, cpl)?);
            pl.update_and_display();
        }

        pl.done();
        Ok(reports)
    }

    /// Runs a single round, reading the checkpoint of round `round` and
    /// writing the checkpoint of round `round + 1`.
    pub fn iterate(
        &self,
        round: usize,
        cpl: &mut impl ConcurrentProgressLog,
    ) -> Result<RoundReport> {
        let config = &self.config;
        let input = Checkpoint::open(&config.base, round)
            .with_context(|| format!("Could not open the checkpoint of round {round}"))?;
        // We count the part files to get the number of partitions
        let num_partitions = NonZeroUsize::new(input.num_parts())
            .with_context(|| format!("No parts in {}", input.dir().display()))?;

        log::info!("PageRank: round {}", round + 1);
        log::info!(" - input: {}", input.dir().display());
        log::info!(
            " - output: {}",
            crate::checkpoint::round_dir(&config.base, round + 1).display()
        );
        log::info!("Computed number of partitions: {}", num_partitions);

        let parts = input.read()?;
        let output = run_round(&parts, &self.params, num_partitions, config.combine, cpl)
            .with_context(|| format!("Round {} aborted", round + 1))?;
        drop(parts);

        output.counters.log();
        if output.counters.nodes != config.num_nodes as u64 {
            log::warn!(
                "Processed {} nodes, but the graph has {} nodes",
                output.counters.nodes,
                config.num_nodes
            );
        }

        write_checkpoint(&config.base, round + 1, &output.parts)?;

        Ok(RoundReport {
            round: round + 1,
            num_partitions: num_partitions.get(),
            counters: output.counters,
        })
    }
}
