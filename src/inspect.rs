/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Inspection of checkpoints.

use crate::log_prob::{LOG_ZERO, sum_log_probs};
use crate::node::{GraphNode, NodeId};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
/// A node with its mass, ordered so that the heap top is the smallest
/// retained entry: lower mass first, then larger id.
struct Entry {
    id: NodeId,
    log_mass: f32,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .log_mass
            .total_cmp(&self.log_mass)
            .then(self.id.cmp(&other.id))
    }
}

/// The nodes of highest mass of a set of records.
#[derive(Debug, Clone, PartialEq)]
pub struct TopNodes {
    /// Pairs (node id, log-domain mass), by decreasing mass and then by
    /// increasing id.
    pub nodes: Vec<(NodeId, f32)>,
    /// Log-domain sum of the mass of all records.
    pub total_log_mass: f32,
}

/// Returns the `k` records of highest mass, and the total mass.
///
/// Records without mass are ignored.
///
/// ```
/// use pprank::inspect::top_nodes;
/// use pprank::node::GraphNode;
///
/// let nodes = [0.1_f32, 0.5, 0.2].map(|p| p.ln()).into_iter().enumerate().map(
///     |(id, log_mass)| GraphNode::Complete { id: id as u32, log_mass, adjacency: vec![0] },
/// );
/// let top = top_nodes(nodes, 2);
/// assert_eq!(top.nodes.iter().map(|&(id, _)| id).collect::<Vec<_>>(), vec![1, 2]);
/// ```
pub fn top_nodes(nodes: impl IntoIterator<Item = GraphNode>, k: usize) -> TopNodes {
    let mut heap = dary_heap::QuaternaryHeap::new();
    let mut total_log_mass = LOG_ZERO;
    for node in nodes {
        let Some(log_mass) = node.log_mass() else {
            continue;
        };
        total_log_mass = sum_log_probs(total_log_mass, log_mass);
        if k == 0 {
            continue;
        }
        heap.push(Entry {
            id: node.id(),
            log_mass,
        });
        if heap.len() > k {
            heap.pop();
        }
    }

    let mut entries = heap.into_vec();
    // Entries sort from the largest mass
    entries.sort();
    TopNodes {
        nodes: entries.into_iter().map(|e| (e.id, e.log_mass)).collect(),
        total_log_mass,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_prob::{exp, ln};

    fn node(id: NodeId, p: f64) -> GraphNode {
        GraphNode::MassOnly {
            id,
            log_mass: ln(p),
        }
    }

    #[test]
    fn test_top() {
        let nodes = vec![
            node(0, 0.1),
            node(1, 0.3),
            node(2, 0.1),
            node(3, 0.3),
            node(4, 0.2),
            GraphNode::StructureOnly {
                id: 5,
                adjacency: vec![0],
            },
        ];
        let top = top_nodes(nodes.clone(), 4);
        let ids: Vec<_> = top.nodes.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![1, 3, 4, 0]);
        assert!((exp(top.total_log_mass) - 1.0).abs() < 1E-6);

        let top = top_nodes(nodes.clone(), 10);
        assert_eq!(top.nodes.len(), 5);

        let top = top_nodes(nodes, 0);
        assert!(top.nodes.is_empty());
        assert!((exp(top.total_log_mass) - 1.0).abs() < 1E-6);
    }
}
