/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::GlobalArgs;
use crate::init::{InitialMass, init_checkpoint};
use crate::sources::SourceSet;
use anyhow::{Context, Result};
use clap::Parser;
use dsi_progress_logger::{ProgressLog, progress_logger};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    about = "Builds the first checkpoint of a run from an adjacency list. Each line contains a node id followed by the ids of its successors, separated by whitespace; lines starting with '#' are ignored.",
    long_about = None
)]
pub struct CliArgs {
    #[arg(long)]
    /// The directory containing the checkpoints.
    pub base: PathBuf,

    #[arg(long, default_value_t = 0)]
    /// The round of the checkpoint to write.
    pub round: usize,

    #[arg(short, long)]
    /// The number of nodes of the graph.
    pub num_nodes: usize,

    #[arg(short, long)]
    /// The adjacency list; if not specified, it is read from standard input.
    pub input: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = InitialMass::Uniform)]
    /// The initial distribution of mass.
    pub initial: InitialMass,

    #[arg(short, long, required_if_eq("initial", "sources"))]
    /// Comma-separated list of source node ids.
    pub sources: Option<String>,

    #[arg(short, long, default_value_t = num_cpus::get().max(1))]
    /// The number of partitions of the checkpoint.
    pub partitions: usize,
}

pub fn main(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    let num_partitions =
        NonZeroUsize::new(args.partitions).context("The number of partitions must be positive")?;
    let sources = args
        .sources
        .as_deref()
        .map(str::parse::<SourceSet>)
        .transpose()?;

    let mut pl = progress_logger![];
    pl.display_memory(true);
    if let Some(log_interval) = global_args.log_interval {
        pl.log_interval(log_interval);
    }

    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => {
            log::info!("Reading adjacency list from {}", path.display());
            Box::new(BufReader::new(
                File::open(path).with_context(|| format!("Could not open {}", path.display()))?,
            ))
        }
        None => {
            log::info!("Reading adjacency list from stdin...");
            Box::new(std::io::stdin().lock())
        }
    };

    init_checkpoint(
        &args.base,
        args.round,
        input,
        args.num_nodes,
        args.initial,
        sources.as_ref(),
        num_partitions,
        &mut pl,
    )?;

    Ok(())
}
