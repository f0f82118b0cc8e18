/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Construction of the first checkpoint of a run from a text adjacency list.
//!
//! Each non-empty line of the input contains a node id followed by the ids of
//! its successors, separated by whitespace; lines starting with `#` are
//! comments. Nodes without successors are rejected: dangling nodes must be
//! redirected before the graph is fed to the engine.

use crate::checkpoint::{Checkpoint, write_checkpoint};
use crate::log_prob::{LOG_ZERO, ln};
use crate::node::{GraphNode, NodeId};
use crate::round::partition_of;
use crate::sources::SourceSet;
use anyhow::{Context, Result, bail, ensure};
use dsi_progress_logger::ProgressLog;
use std::collections::HashSet;
use std::io::BufRead;
use std::num::NonZeroUsize;
use std::path::Path;

/// The initial distribution of mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum InitialMass {
    /// Mass 1/*n* on every node.
    #[default]
    Uniform,
    /// Mass 1/|*S*| on every source node, zero elsewhere.
    Sources,
}

impl InitialMass {
    /// Returns the initial log-domain mass of a node.
    ///
    /// A missing source set behaves as an empty one.
    pub fn log_mass(self, id: NodeId, num_nodes: usize, sources: Option<&SourceSet>) -> f32 {
        match (self, sources) {
            (InitialMass::Uniform, _) => -ln(num_nodes as f64),
            (InitialMass::Sources, Some(sources)) if sources.contains(id) => {
                -ln(sources.len() as f64)
            }
            (InitialMass::Sources, _) => LOG_ZERO,
        }
    }
}

/// Parses an adjacency list, returning complete records with the given
/// initial mass, in input order.
///
/// # Errors
///
/// Fails on unparsable ids, ids not smaller than `num_nodes`, lines without
/// successors, and nodes appearing at the start of more than one line. With
/// [`InitialMass::Sources`], fails if `sources` is missing or contains ids
/// not smaller than `num_nodes`.
pub fn read_adjacency_list(
    input: impl BufRead,
    num_nodes: usize,
    initial_mass: InitialMass,
    sources: Option<&SourceSet>,
    pl: &mut impl ProgressLog,
) -> Result<Vec<GraphNode>> {
    if initial_mass == InitialMass::Sources {
        let sources = sources.context("A source set is needed to put the initial mass on sources")?;
        if let Some(id) = sources.iter().find(|&id| id as usize >= num_nodes) {
            bail!("Source node {id} is not smaller than the number of nodes ({num_nodes})");
        }
    }

    let parse_id = |token: &str, line_num: usize| -> Result<NodeId> {
        let id: NodeId = token
            .parse()
            .with_context(|| format!("Line {line_num}: cannot parse node id {token:?}"))?;
        ensure!(
            (id as usize) < num_nodes,
            "Line {line_num}: node {id} is not smaller than the number of nodes ({num_nodes})"
        );
        Ok(id)
    };

    pl.item_name("line");
    pl.expected_updates(Some(num_nodes));
    pl.start("Reading adjacency list...");

    let mut seen = HashSet::new();
    let mut nodes = Vec::new();
    for (i, line) in input.lines().enumerate() {
        let line_num = i + 1;
        let line = line.with_context(|| format!("Could not read line {line_num}"))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        // The line is not empty, so there is at least one token
        let Some(first) = tokens.next() else {
            continue;
        };
        let id = parse_id(first, line_num)?;
        let adjacency = tokens
            .map(|token| parse_id(token, line_num))
            .collect::<Result<Vec<_>>>()?;
        if adjacency.is_empty() {
            bail!("Line {line_num}: node {id} is dangling");
        }
        if !seen.insert(id) {
            bail!("Line {line_num}: node {id} appears more than once");
        }
        nodes.push(GraphNode::Complete {
            id,
            log_mass: initial_mass.log_mass(id, num_nodes, sources),
            adjacency,
        });
        pl.light_update();
    }

    pl.done();

    if nodes.len() != num_nodes {
        log::warn!(
            "The adjacency list contains {} nodes, but the graph has {} nodes",
            nodes.len(),
            num_nodes
        );
    }
    Ok(nodes)
}

/// Distributes records into partitions by node id, sorting each partition.
pub fn partition_nodes(
    nodes: impl IntoIterator<Item = GraphNode>,
    num_partitions: NonZeroUsize,
) -> Vec<Vec<GraphNode>> {
    let mut parts: Vec<Vec<GraphNode>> = (0..num_partitions.get()).map(|_| Vec::new()).collect();
    for node in nodes {
        parts[partition_of(node.id(), num_partitions)].push(node);
    }
    for part in parts.iter_mut() {
        part.sort_by_key(GraphNode::id);
    }
    parts
}

/// Reads an adjacency list and writes it as the checkpoint of the given
/// round.
#[allow(clippy::too_many_arguments)]
pub fn init_checkpoint(
    base: impl AsRef<Path>,
    round: usize,
    input: impl BufRead,
    num_nodes: usize,
    initial_mass: InitialMass,
    sources: Option<&SourceSet>,
    num_partitions: NonZeroUsize,
    pl: &mut impl ProgressLog,
) -> Result<Checkpoint> {
    ensure!(num_nodes > 0, "The number of nodes must be positive");
    let nodes = read_adjacency_list(input, num_nodes, initial_mass, sources, pl)?;
    let parts = partition_nodes(nodes, num_partitions);
    log::info!(
        "Writing {} partitions to {}",
        num_partitions,
        crate::checkpoint::round_dir(base.as_ref(), round).display()
    );
    write_checkpoint(base, round, &parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_prob::exp;
    use dsi_progress_logger::no_logging;

    #[test]
    fn test_read() -> Result<()> {
        let input = "# a triangle\n0\t1 2\n\n1 2\n2 0\n";
        let sources: SourceSet = "1".parse()?;
        let nodes = read_adjacency_list(
            input.as_bytes(),
            3,
            InitialMass::Sources,
            Some(&sources),
            no_logging![],
        )?;
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].adjacency(), Some(&[1, 2][..]));
        assert_eq!(nodes[0].log_mass(), Some(LOG_ZERO));
        assert_eq!(nodes[1].log_mass(), Some(0.0));

        let nodes = read_adjacency_list(
            input.as_bytes(),
            3,
            InitialMass::Uniform,
            None,
            no_logging![],
        )?;
        for node in &nodes {
            assert!((exp(node.log_mass().unwrap()) - 1.0 / 3.0).abs() < 1E-6);
        }
        Ok(())
    }

    #[test]
    fn test_rejected() -> Result<()> {
        for input in ["0 1\n1\n", "0 1\n1 3\n", "0 1\n0 1\n", "0 x\n"] {
            assert!(
                read_adjacency_list(
                    input.as_bytes(),
                    3,
                    InitialMass::Uniform,
                    None,
                    no_logging![]
                )
                .is_err(),
                "{input:?}"
            );
        }
        let input = "0 1\n1 0\n";
        assert!(
            read_adjacency_list(input.as_bytes(), 2, InitialMass::Sources, None, no_logging![])
                .is_err()
        );
        let sources: SourceSet = "0,2".parse()?;
        assert!(
            read_adjacency_list(
                input.as_bytes(),
                2,
                InitialMass::Sources,
                Some(&sources),
                no_logging![]
            )
            .is_err()
        );
        Ok(())
    }

    #[test]
    fn test_partition_nodes() {
        let node = |id| GraphNode::Complete {
            id,
            log_mass: 0.0,
            adjacency: vec![0],
        };
        let parts = partition_nodes(
            [node(4), node(1), node(2), node(0)],
            NonZeroUsize::new(2).unwrap(),
        );
        let ids: Vec<Vec<NodeId>> = parts
            .iter()
            .map(|part| part.iter().map(GraphNode::id).collect())
            .collect();
        assert_eq!(ids, vec![vec![0, 2, 4], vec![1]]);
    }
}
