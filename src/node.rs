/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Graph node records.
//!
//! A [`GraphNode`] is both the unit of a checkpoint and the message exchanged
//! during a round. During a round a node is split into a
//! [structure fragment](GraphNode::StructureOnly) carrying its adjacency list
//! and a number of [mass fragments](GraphNode::MassOnly) addressed to its
//! neighbors; the assembly step glues the fragments addressed to the same id
//! back into a [complete record](GraphNode::Complete).

use std::fmt::{Display, Formatter};

/// Identifier of a node.
pub type NodeId = u32;

/// The kind of a [`GraphNode`], with its tag in the record encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum NodeKind {
    /// Mass and adjacency list.
    Complete = 0,
    /// Mass only.
    MassOnly = 1,
    /// Adjacency list only.
    StructureOnly = 2,
}

impl NodeKind {
    /// Returns the tag byte of this kind.
    #[inline(always)]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Returns the kind associated with a tag byte, if any.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(NodeKind::Complete),
            1 => Some(NodeKind::MassOnly),
            2 => Some(NodeKind::StructureOnly),
            _ => None,
        }
    }

    /// Whether records of this kind carry a mass.
    #[inline(always)]
    pub fn has_mass(self) -> bool {
        matches!(self, NodeKind::Complete | NodeKind::MassOnly)
    }

    /// Whether records of this kind carry an adjacency list.
    #[inline(always)]
    pub fn has_adjacency(self) -> bool {
        matches!(self, NodeKind::Complete | NodeKind::StructureOnly)
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Complete => f.write_str("complete"),
            NodeKind::MassOnly => f.write_str("mass"),
            NodeKind::StructureOnly => f.write_str("structure"),
        }
    }
}

/// A node record: a complete node, or one of the two fragments a node is
/// split into during a round.
///
/// Masses are natural logarithms of probabilities (see
/// [`log_prob`](crate::log_prob)).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GraphNode {
    /// A node of a checkpoint.
    Complete {
        id: NodeId,
        log_mass: f32,
        adjacency: Vec<NodeId>,
    },
    /// A share of mass addressed to node `id`.
    MassOnly { id: NodeId, log_mass: f32 },
    /// The adjacency list of node `id`, passed through a round.
    StructureOnly { id: NodeId, adjacency: Vec<NodeId> },
}

impl GraphNode {
    /// Returns the id of the node (for fragments, the destination id).
    #[inline(always)]
    pub fn id(&self) -> NodeId {
        match self {
            GraphNode::Complete { id, .. }
            | GraphNode::MassOnly { id, .. }
            | GraphNode::StructureOnly { id, .. } => *id,
        }
    }

    #[inline(always)]
    pub fn kind(&self) -> NodeKind {
        match self {
            GraphNode::Complete { .. } => NodeKind::Complete,
            GraphNode::MassOnly { .. } => NodeKind::MassOnly,
            GraphNode::StructureOnly { .. } => NodeKind::StructureOnly,
        }
    }

    /// Returns the log-domain mass, if this record carries one.
    pub fn log_mass(&self) -> Option<f32> {
        match self {
            GraphNode::Complete { log_mass, .. } | GraphNode::MassOnly { log_mass, .. } => {
                Some(*log_mass)
            }
            GraphNode::StructureOnly { .. } => None,
        }
    }

    /// Returns the adjacency list, if this record carries one.
    pub fn adjacency(&self) -> Option<&[NodeId]> {
        match self {
            GraphNode::Complete { adjacency, .. } | GraphNode::StructureOnly { adjacency, .. } => {
                Some(adjacency)
            }
            GraphNode::MassOnly { .. } => None,
        }
    }
}

impl Display for GraphNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}", self.id())?;
        if let Some(log_mass) = self.log_mass() {
            write!(f, " {log_mass:.4}")?;
        }
        match self.adjacency() {
            Some(adjacency) => write!(f, " {adjacency:?}}}"),
            None => write!(f, " []}}"),
        }
    }
}
