/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! In-process execution of a whole round over a partitioned checkpoint.
//!
//! Each input partition is handled by a Rayon task that
//! [propagates](super::propagate) its nodes, distributing the fragments into
//! one bucket per output partition (fragment for node *i* go to partition
//! *i* mod *p*). Buckets are sorted by node id and, optionally,
//! [pre-aggregated](super::combine). Then each output partition is handled by
//! a Rayon task that merges the buckets addressed to it with a
//! [`KMergeNodes`], groups fragments by node id, and
//! [assembles](super::assemble) the next-round nodes.
//!
//! The output is a deterministic function of the input: parts are sorted by
//! node id, and fragments with the same id are merged in input-partition
//! order. The first fatal anomaly aborts the round, and no output is
//! returned.

use super::{RoundError, RoundParams, assemble, combine, propagate};
use crate::counters::RoundCounters;
use crate::node::{GraphNode, NodeId};
use crate::utils::KMergeNodes;
use dsi_progress_logger::ConcurrentProgressLog;
use itertools::Itertools;
use rayon::prelude::*;
use std::num::NonZeroUsize;

/// Returns the output partition of a node.
#[inline(always)]
pub fn partition_of(id: NodeId, num_partitions: NonZeroUsize) -> usize {
    id as usize % num_partitions.get()
}

/// The result of a round: the partitions of the next checkpoint, each sorted
/// by node id, and the counters of the round.
#[derive(Debug, Clone)]
pub struct RoundOutput {
    pub parts: Vec<Vec<GraphNode>>,
    pub counters: RoundCounters,
}

// One bucket of fragments for each output partition
type Buckets = Vec<Vec<GraphNode>>;

/// Runs a round on the given input partitions, producing `num_partitions`
/// output partitions.
///
/// If `pre_aggregate` is true, mass fragments are [combined](super::combine)
/// within each bucket before the exchange.
///
/// `cpl` is a [`ConcurrentProgressLog`] counting the processed nodes; its
/// options will be preserved. Use
/// [`no_logging![]`](dsi_progress_logger::no_logging) to avoid logging.
pub fn run_round(
    parts: &[Vec<GraphNode>],
    params: &RoundParams,
    num_partitions: NonZeroUsize,
    pre_aggregate: bool,
    cpl: &mut impl ConcurrentProgressLog,
) -> Result<RoundOutput, RoundError> {
    let num_nodes = parts.iter().map(Vec::len).sum();

    cpl.item_name("node");
    cpl.expected_updates(Some(num_nodes));
    cpl.start("Propagating mass...");

    let mapped = parts
        .par_iter()
        .map_with(cpl.clone(), |cpl, part| {
            map_part(part, num_partitions, pre_aggregate, cpl)
        })
        .collect::<Result<Vec<_>, _>>()?;

    cpl.done();

    // Transpose {input partition -> {output partition -> bucket}}
    let mut counters = RoundCounters::default();
    let mut exchanged: Vec<Buckets> = (0..num_partitions.get())
        .map(|_| Vec::with_capacity(mapped.len()))
        .collect();
    for (buckets, map_counters) in mapped {
        counters += map_counters;
        for (bucket, partition) in buckets.into_iter().zip(exchanged.iter_mut()) {
            partition.push(bucket);
        }
    }

    cpl.expected_updates(None);
    cpl.start("Assembling nodes...");

    let reduced = exchanged
        .into_par_iter()
        .enumerate()
        .map_with(cpl.clone(), |cpl, (partition, buckets)| {
            reduce_partition(partition, buckets, params, num_partitions, cpl)
        })
        .collect::<Result<Vec<_>, _>>()?;

    cpl.done();

    let mut parts = Vec::with_capacity(reduced.len());
    for (nodes, reduce_counters) in reduced {
        counters += reduce_counters;
        parts.push(nodes);
    }

    Ok(RoundOutput { parts, counters })
}

fn map_part(
    part: &[GraphNode],
    num_partitions: NonZeroUsize,
    pre_aggregate: bool,
    cpl: &mut impl ConcurrentProgressLog,
) -> Result<(Buckets, RoundCounters), RoundError> {
    let mut counters = RoundCounters::default();
    let mut buckets: Buckets = (0..num_partitions.get()).map(|_| Vec::new()).collect();

    for node in part {
        propagate(node, &mut counters, |fragment| {
            buckets[partition_of(fragment.id(), num_partitions)].push(fragment)
        })?;
        cpl.light_update();
    }

    for bucket in buckets.iter_mut() {
        // stable, so that the order of fragments with the same id is preserved
        bucket.sort_by_key(GraphNode::id);
        if pre_aggregate {
            *bucket = pre_aggregate_bucket(std::mem::take(bucket), &mut counters)?;
        }
    }

    Ok((buckets, counters))
}

/// Combines the fragments of a bucket sorted by node id.
fn pre_aggregate_bucket(
    bucket: Vec<GraphNode>,
    counters: &mut RoundCounters,
) -> Result<Vec<GraphNode>, RoundError> {
    let mut combined = Vec::with_capacity(bucket.len());
    for (id, fragments) in &bucket.into_iter().chunk_by(GraphNode::id) {
        combine(id, fragments, counters, |fragment| combined.push(fragment))?;
    }
    Ok(combined)
}

/// Assembles the nodes of an output partition.
///
/// Sources of the partition that received no fragment at all are assembled
/// from no fragments, so that their teleportation mass is accounted for as
/// lost mass of a node without structure.
fn reduce_partition(
    partition: usize,
    buckets: Buckets,
    params: &RoundParams,
    num_partitions: NonZeroUsize,
    cpl: &mut impl ConcurrentProgressLog,
) -> Result<(Vec<GraphNode>, RoundCounters), RoundError> {
    let mut counters = RoundCounters::default();
    let mut nodes = Vec::new();
    // in increasing order
    let mut sources = params
        .sources()
        .iter()
        .filter(|&id| partition_of(id, num_partitions) == partition)
        .peekable();

    let merged = KMergeNodes::new(buckets.into_iter().map(Vec::into_iter));
    for (id, fragments) in &merged.chunk_by(GraphNode::id) {
        while let Some(source) = sources.next_if(|&source| source < id) {
            assemble(source, std::iter::empty(), params, &mut counters)?;
        }
        sources.next_if_eq(&id);
        if let Some(node) = assemble(id, fragments, params, &mut counters)? {
            nodes.push(node);
        }
        cpl.light_update();
    }
    for source in sources {
        assemble(source, std::iter::empty(), params, &mut counters)?;
    }

    Ok((nodes, counters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_prob::ln;
    use dsi_progress_logger::no_logging;

    fn node(id: NodeId, p: f64, adjacency: Vec<NodeId>) -> GraphNode {
        GraphNode::Complete {
            id,
            log_mass: ln(p),
            adjacency,
        }
    }

    #[test]
    fn test_partitioning() {
        let p = NonZeroUsize::new(3).unwrap();
        assert_eq!(partition_of(0, p), 0);
        assert_eq!(partition_of(4, p), 1);
        assert_eq!(partition_of(8, p), 2);
    }

    #[test]
    fn test_unreached_source() -> anyhow::Result<()> {
        // node 3 is a source without a record and without in-links
        let params = RoundParams::new(0.15, "0,3".parse()?)?;
        let parts = vec![vec![
            node(0, 1.0 / 3.0, vec![1]),
            node(1, 1.0 / 3.0, vec![2]),
            node(2, 1.0 / 3.0, vec![0]),
        ]];
        for p in 1..=3 {
            let output = run_round(
                &parts,
                &params,
                NonZeroUsize::new(p).unwrap(),
                false,
                no_logging![],
            )?;
            assert_eq!(output.parts.iter().map(Vec::len).sum::<usize>(), 3);
            assert_eq!(output.counters.missing_structure, 1);
            assert!((output.counters.lost_mass() - 0.075).abs() < 1E-6);
            assert!((output.counters.accounted_mass() - 1.0).abs() < 1E-6);
        }
        Ok(())
    }

    #[test]
    fn test_output_layout() -> anyhow::Result<()> {
        let params = RoundParams::new(0.15, "0".parse()?)?;
        let parts = vec![
            vec![node(0, 0.25, vec![1, 2]), node(3, 0.25, vec![0])],
            vec![node(1, 0.25, vec![3]), node(2, 0.25, vec![3, 0])],
        ];
        let output = run_round(
            &parts,
            &params,
            NonZeroUsize::new(2).unwrap(),
            true,
            no_logging![],
        )?;
        assert_eq!(output.parts.len(), 2);
        let ids: Vec<Vec<NodeId>> = output
            .parts
            .iter()
            .map(|part| part.iter().map(GraphNode::id).collect())
            .collect();
        assert_eq!(ids, vec![vec![0, 2], vec![1, 3]]);
        assert_eq!(output.counters.nodes, 4);
        assert_eq!(output.counters.edges, 6);
        assert!((output.counters.total_mass() - 1.0).abs() < 1E-6);
        Ok(())
    }
}
