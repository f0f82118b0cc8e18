/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{RoundError, Stage};
use crate::counters::RoundCounters;
use crate::node::GraphNode;

/// Splits a complete node into its structure fragment and one mass fragment
/// per successor.
///
/// Each successor receives ln *m* − ln *d*, where ln *m* is the mass of the
/// node and *d* its outdegree. The structure fragment is emitted first; for
/// a node with repeated successors a mass fragment is emitted for each
/// occurrence.
///
/// Nothing is emitted if an error is returned.
///
/// # Errors
///
/// [`RoundError::DanglingNode`] if the node has no successors, and
/// [`RoundError::UnexpectedRecord`] if the record is not
/// [complete](GraphNode::Complete).
pub fn propagate(
    node: &GraphNode,
    counters: &mut RoundCounters,
    mut emit: impl FnMut(GraphNode),
) -> Result<(), RoundError> {
    let GraphNode::Complete {
        id,
        log_mass,
        adjacency,
    } = node
    else {
        return Err(RoundError::UnexpectedRecord {
            id: node.id(),
            kind: node.kind(),
            stage: Stage::Propagation,
        });
    };
    let id = *id;
    if adjacency.is_empty() {
        return Err(RoundError::DanglingNode { id });
    }

    emit(GraphNode::StructureOnly {
        id,
        adjacency: adjacency.clone(),
    });

    let degree = adjacency.len();
    let share = (*log_mass as f64 - (degree as f64).ln()) as f32;
    for &succ in adjacency {
        emit(GraphNode::MassOnly {
            id: succ,
            log_mass: share,
        });
    }

    counters.nodes += 1;
    counters.edges += degree as u64;
    counters.mass_messages += degree as u64;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_prob::ln;

    #[test]
    fn test_shares() {
        let node = GraphNode::Complete {
            id: 2,
            log_mass: ln(0.3),
            adjacency: vec![0, 5, 7],
        };
        let mut counters = RoundCounters::default();
        let mut out = Vec::new();
        propagate(&node, &mut counters, |fragment| out.push(fragment)).unwrap();

        assert_eq!(out.len(), 4);
        assert_eq!(
            out[0],
            GraphNode::StructureOnly {
                id: 2,
                adjacency: vec![0, 5, 7]
            }
        );
        for (fragment, succ) in out[1..].iter().zip([0, 5, 7]) {
            assert_eq!(fragment.id(), succ);
            let share = fragment.log_mass().unwrap();
            assert!((share.exp() - 0.1).abs() < 1E-6);
        }
        assert_eq!(counters.nodes, 1);
        assert_eq!(counters.edges, 3);
        assert_eq!(counters.mass_messages, 3);
    }

    #[test]
    fn test_dangling() {
        let node = GraphNode::Complete {
            id: 4,
            log_mass: ln(0.5),
            adjacency: vec![],
        };
        let mut counters = RoundCounters::default();
        let mut out = Vec::new();
        assert_eq!(
            propagate(&node, &mut counters, |fragment| out.push(fragment)),
            Err(RoundError::DanglingNode { id: 4 })
        );
        assert!(out.is_empty());
        assert_eq!(counters, RoundCounters::default());
    }

    #[test]
    fn test_fragment_input() {
        let node = GraphNode::MassOnly {
            id: 4,
            log_mass: ln(0.5),
        };
        assert_eq!(
            propagate(&node, &mut RoundCounters::default(), |_| {}),
            Err(RoundError::UnexpectedRecord {
                id: 4,
                kind: crate::node::NodeKind::MassOnly,
                stage: Stage::Propagation
            })
        );
    }
}
