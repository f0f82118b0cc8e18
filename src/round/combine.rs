/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{RoundError, Stage};
use crate::counters::RoundCounters;
use crate::log_prob::{LOG_ZERO, sum_log_probs};
use crate::node::{GraphNode, NodeId};

/// Pre-aggregates co-located fragments addressed to node `id`.
///
/// Structure fragments are passed through unchanged; mass fragments are
/// folded into a single mass fragment, which is emitted after the structure
/// fragments. Since the fold is a log-domain sum, applying this function any
/// number of times to any grouping of the fragments of a node does not change
/// the result of the [assembly step](super::assemble).
///
/// # Errors
///
/// [`RoundError::UnexpectedRecord`] if a [complete](GraphNode::Complete)
/// record is found among the fragments.
pub fn combine(
    id: NodeId,
    fragments: impl IntoIterator<Item = GraphNode>,
    counters: &mut RoundCounters,
    mut emit: impl FnMut(GraphNode),
) -> Result<(), RoundError> {
    let mut mass = LOG_ZERO;
    let mut mass_messages = 0_u64;

    for fragment in fragments {
        debug_assert_eq!(fragment.id(), id);
        match fragment {
            GraphNode::StructureOnly { .. } => emit(fragment),
            GraphNode::MassOnly { log_mass, .. } => {
                mass = sum_log_probs(mass, log_mass);
                mass_messages += 1;
            }
            GraphNode::Complete { .. } => {
                return Err(RoundError::UnexpectedRecord {
                    id,
                    kind: fragment.kind(),
                    stage: Stage::PreAggregation,
                });
            }
        }
    }

    if mass_messages > 0 {
        emit(GraphNode::MassOnly { id, log_mass: mass });
        counters.mass_messages_saved += mass_messages - 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_prob::ln;

    #[test]
    fn test_fold() {
        let fragments = vec![
            GraphNode::MassOnly {
                id: 3,
                log_mass: ln(0.1),
            },
            GraphNode::StructureOnly {
                id: 3,
                adjacency: vec![1, 2],
            },
            GraphNode::MassOnly {
                id: 3,
                log_mass: ln(0.2),
            },
            GraphNode::MassOnly {
                id: 3,
                log_mass: ln(0.05),
            },
        ];
        let mut counters = RoundCounters::default();
        let mut out = Vec::new();
        combine(3, fragments, &mut counters, |f| out.push(f)).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(
            out[0],
            GraphNode::StructureOnly {
                id: 3,
                adjacency: vec![1, 2]
            }
        );
        assert!((out[1].log_mass().unwrap().exp() - 0.35).abs() < 1E-6);
        assert_eq!(counters.mass_messages_saved, 2);
    }

    #[test]
    fn test_structure_only() {
        let mut counters = RoundCounters::default();
        let mut out = Vec::new();
        let structure = GraphNode::StructureOnly {
            id: 8,
            adjacency: vec![0],
        };
        combine(8, [structure.clone()], &mut counters, |f| out.push(f)).unwrap();
        assert_eq!(out, vec![structure]);
        assert_eq!(counters.mass_messages_saved, 0);
    }

    #[test]
    fn test_rejects_complete() {
        let node = GraphNode::Complete {
            id: 1,
            log_mass: 0.0,
            adjacency: vec![0],
        };
        assert!(matches!(
            combine(1, [node], &mut RoundCounters::default(), |_| {}),
            Err(RoundError::UnexpectedRecord {
                stage: Stage::PreAggregation,
                ..
            })
        ));
    }
}
