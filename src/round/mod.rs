/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! One round of personalized PageRank.
//!
//! A round maps checkpoint *t* to checkpoint *t* + 1 in three steps:
//!
//! 1. the [propagation step](propagate) splits every node into a structure
//!    fragment addressed to itself and a mass fragment for each neighbor,
//!    carrying an equal share of the node's mass;
//! 2. the optional [pre-aggregation step](combine) folds co-located mass
//!    fragments addressed to the same node;
//! 3. after fragments have been exchanged by destination id, the
//!    [assembly step](assemble) rebuilds each node from its fragments,
//!    applying damping and teleportation to the source set:
//!
//! > *x*ᵢ⁽*ᵗ* ⁺ ¹⁾ = α [*i* ∈ *S*] / |*S*| + (1 − α) ∑_(*j* → *i*) *x*ⱼ⁽*ᵗ*⁾ / *d*⁺(*j*).
//!
//! All steps are pure functions of their input records and of the
//! [`RoundParams`], so a step can be re-executed on the same input with
//! identical results. All masses are in the log domain.
//!
//! Dangling nodes are not allowed: an upstream preparation step must have
//! redirected them to the source set. A dangling node, or a node id
//! receiving more than one structure fragment, aborts the round with a
//! [`RoundError`]. A node id receiving mass but no structure is logged,
//! counted, and dropped.
//!
//! The [`exchange`] module provides an in-process implementation of the
//! whole round over partitioned checkpoints.

use crate::config::ConfigError;
use crate::log_prob::{LOG_ZERO, ln};
use crate::node::{NodeId, NodeKind};
use crate::sources::SourceSet;
use std::fmt::Display;
use thiserror::Error;

mod assemble;
pub use assemble::*;

mod combine;
pub use combine::*;

pub mod exchange;
pub use exchange::{RoundOutput, partition_of, run_round};

mod propagate;
pub use propagate::*;

/// The stage of a round at which a record was processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Checkpoint,
    Propagation,
    PreAggregation,
    Assembly,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Checkpoint => f.write_str("checkpoint"),
            Stage::Propagation => f.write_str("propagation"),
            Stage::PreAggregation => f.write_str("pre-aggregation"),
            Stage::Assembly => f.write_str("assembly"),
        }
    }
}

/// Anomalies that abort a round.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoundError {
    /// A node without successors reached the propagation step.
    #[error("Encountered node without neighbors: {id}")]
    DanglingNode { id: NodeId },
    /// More than one structure fragment was received for a node.
    #[error(
        "Multiple structure received for node {id}: {structures} structures, {mass_messages} mass messages"
    )]
    DuplicateStructure {
        id: NodeId,
        structures: usize,
        mass_messages: usize,
    },
    /// A record of the wrong kind was found.
    #[error("Unexpected {kind} record for node {id} during {stage}")]
    UnexpectedRecord {
        id: NodeId,
        kind: NodeKind,
        stage: Stage,
    },
}

/// The read-only parameters of a round: the damping factor α and the source
/// set.
///
/// The logarithms needed by the assembly step are computed once at
/// construction.
#[derive(Debug, Clone)]
pub struct RoundParams {
    alpha: f64,
    sources: SourceSet,
    log_jump: f32,
    log_link: f32,
}

impl RoundParams {
    /// Creates parameters for the given α and source set.
    pub fn new(alpha: f64, sources: SourceSet) -> Result<Self, ConfigError> {
        // Note that 0.0..1.0 is [0.0..1.0) in mathematical notation
        if !(0.0..1.0).contains(&alpha) {
            return Err(ConfigError::InvalidAlpha(alpha));
        }
        Ok(Self {
            alpha,
            log_jump: (alpha.ln() - (sources.len() as f64).ln()) as f32,
            log_link: ln(1.0 - alpha),
            sources,
        })
    }

    #[inline(always)]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[inline(always)]
    pub fn sources(&self) -> &SourceSet {
        &self.sources
    }

    /// Returns the teleportation mass ln(α / |*S*|) of a source node, or
    /// [`LOG_ZERO`] for other nodes.
    #[inline]
    pub fn log_jump(&self, id: NodeId) -> f32 {
        if self.sources.contains(id) {
            self.log_jump
        } else {
            LOG_ZERO
        }
    }

    /// Returns ln(1 − α).
    #[inline(always)]
    pub fn log_link(&self) -> f32 {
        self.log_link
    }
}
