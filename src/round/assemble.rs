/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{RoundError, RoundParams, Stage};
use crate::counters::RoundCounters;
use crate::log_prob::{LOG_ZERO, sum_log_probs};
use crate::node::{GraphNode, NodeId};

/// Rebuilds node `id` of the next checkpoint from all fragments addressed to
/// it.
///
/// The inbound mass ln *m* is the log-domain sum of the mass fragments; the
/// new mass is
///
/// > ln(α / |*S*| · [*id* ∈ *S*]  +  (1 − α) *m*).
///
/// If exactly one structure fragment was received, the node is returned as a
/// [complete record](GraphNode::Complete) and its mass is added to
/// [`total_log_mass`](RoundCounters::total_log_mass). If no structure
/// fragment was received, mass was sent to a node that does not exist: the
/// anomaly is logged and counted, the mass is added to
/// [`lost_log_mass`](RoundCounters::lost_log_mass) and `None` is returned.
/// An empty `fragments` is valid: for a source, its teleportation mass is
/// lost in this way.
///
/// # Errors
///
/// [`RoundError::DuplicateStructure`] if more than one structure fragment was
/// received, and [`RoundError::UnexpectedRecord`] if a complete record is
/// found among the fragments.
pub fn assemble(
    id: NodeId,
    fragments: impl IntoIterator<Item = GraphNode>,
    params: &RoundParams,
    counters: &mut RoundCounters,
) -> Result<Option<GraphNode>, RoundError> {
    let mut adjacency = None;
    let mut structures = 0_usize;
    let mut mass_messages = 0_usize;
    let mut inbound = LOG_ZERO;

    for fragment in fragments {
        debug_assert_eq!(fragment.id(), id);
        match fragment {
            GraphNode::StructureOnly {
                adjacency: succ, ..
            } => {
                structures += 1;
                adjacency = Some(succ);
            }
            GraphNode::MassOnly { log_mass, .. } => {
                inbound = sum_log_probs(inbound, log_mass);
                mass_messages += 1;
            }
            GraphNode::Complete { .. } => {
                return Err(RoundError::UnexpectedRecord {
                    id,
                    kind: fragment.kind(),
                    stage: Stage::Assembly,
                });
            }
        }
    }

    let jump = params.log_jump(id);
    let link = params.log_link() + inbound;
    let log_mass = sum_log_probs(jump, link);

    counters.mass_messages_received += mass_messages as u64;

    match (structures, adjacency) {
        (1, Some(adjacency)) => {
            counters.total_log_mass = sum_log_probs(counters.total_log_mass, log_mass);
            Ok(Some(GraphNode::Complete {
                id,
                log_mass,
                adjacency,
            }))
        }
        (0, _) => {
            // The mass was sent to a node with no structure: it vanishes
            counters.missing_structure += 1;
            counters.lost_log_mass = sum_log_probs(counters.lost_log_mass, log_mass);
            log::warn!("No structure received for node {id}, mass messages: {mass_messages}");
            Ok(None)
        }
        _ => Err(RoundError::DuplicateStructure {
            id,
            structures,
            mass_messages,
        }),
    }
}
