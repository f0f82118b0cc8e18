/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{GlobalArgs, NumThreadsArg, get_thread_pool};
use crate::config::RunConfig;
use crate::driver::Driver;
use anyhow::Result;
use clap::Parser;
use dsi_progress_logger::{ProgressLog, concurrent_progress_logger, progress_logger};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    about = "Runs rounds of personalized PageRank, reading the checkpoint of round START and writing the checkpoints of rounds START + 1 to END.",
    long_about = None
)]
pub struct CliArgs {
    #[arg(long)]
    /// The directory containing the checkpoints.
    pub base: PathBuf,

    #[arg(long)]
    /// The round of the first checkpoint to read.
    pub start: usize,

    #[arg(long)]
    /// The round of the last checkpoint to write.
    pub end: usize,

    #[arg(short, long)]
    /// The number of nodes of the graph.
    pub num_nodes: usize,

    #[arg(short, long)]
    /// Comma-separated list of source node ids.
    pub sources: String,

    #[arg(short, long, default_value_t = RunConfig::DEFAULT_ALPHA)]
    /// The teleportation probability α (must be in the interval [0 . . 1).
    pub alpha: f64,

    #[arg(long)]
    /// Do not pre-aggregate mass fragments before the exchange.
    pub no_combine: bool,

    #[clap(flatten)]
    pub num_threads: NumThreadsArg,
}

pub fn main(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    let config = RunConfig::new(args.base, args.start, args.end, args.num_nodes, args.sources)
        .alpha(args.alpha)
        .combine(!args.no_combine);
    let driver = Driver::new(config)?;

    let mut pl = progress_logger![];
    pl.display_memory(true);
    if let Some(log_interval) = global_args.log_interval {
        pl.log_interval(log_interval);
    }

    let mut cpl = concurrent_progress_logger![];
    cpl.display_memory(true);
    if let Some(log_interval) = global_args.log_interval {
        cpl.log_interval(log_interval);
    }

    let thread_pool = get_thread_pool(args.num_threads.num_threads)?;
    let reports = thread_pool.install(|| driver.run_with_logging(&mut pl, &mut cpl))?;

    for report in &reports {
        log::info!("Round {}: {}", report.round, report.counters);
    }

    Ok(())
}
