/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::GlobalArgs;
use crate::checkpoint::Checkpoint;
use crate::inspect::top_nodes;
use crate::log_prob::exp;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    about = "Prints the nodes of highest mass of a checkpoint, one per line, as a node id and its mass separated by a TAB, followed by the total mass.",
    long_about = None
)]
pub struct CliArgs {
    #[arg(long)]
    /// The directory containing the checkpoints.
    pub base: PathBuf,

    #[arg(long)]
    /// The round of the checkpoint.
    pub round: usize,

    #[arg(short, long, default_value_t = 10)]
    /// The number of nodes to print.
    pub k: usize,
}

pub fn main(_global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    let checkpoint = Checkpoint::open(&args.base, args.round)?;
    log::info!(
        "Reading {} parts from {}",
        checkpoint.num_parts(),
        checkpoint.dir().display()
    );
    let nodes = checkpoint.read()?;
    let top = top_nodes(nodes.into_iter().flatten(), args.k);

    let mut out = BufWriter::new(std::io::stdout().lock());
    for (id, log_mass) in &top.nodes {
        writeln!(out, "{}\t{}", id, exp(*log_mass)).context("Could not write to stdout")?;
    }
    writeln!(out, "# total mass\t{}", exp(top.total_log_mass))
        .context("Could not write to stdout")?;
    out.flush().context("Could not flush stdout")?;

    Ok(())
}
