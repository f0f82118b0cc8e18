/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Per-round observability counters.
//!
//! Every step of a round updates a [`RoundCounters`] owned by the partition
//! task executing it; the per-partition counters are then summed. Counters
//! are diagnostics only: no step reads them to make decisions.

use crate::log_prob::{LOG_ZERO, exp, sum_log_probs};
use std::fmt::Display;
use std::ops::{Add, AddAssign};

/// Counters of a round (or of part of a round).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundCounters {
    /// Nodes processed by the propagation step.
    pub nodes: u64,
    /// Edges traversed by the propagation step.
    pub edges: u64,
    /// Mass messages emitted by the propagation step.
    pub mass_messages: u64,
    /// Mass messages eliminated by pre-aggregation.
    pub mass_messages_saved: u64,
    /// Mass messages received by the assembly step.
    pub mass_messages_received: u64,
    /// Nodes that received mass but no structure.
    pub missing_structure: u64,
    /// Log-domain sum of the mass of the emitted nodes.
    pub total_log_mass: f32,
    /// Log-domain sum of the mass of the nodes dropped for missing structure.
    pub lost_log_mass: f32,
}

impl Default for RoundCounters {
    fn default() -> Self {
        Self {
            nodes: 0,
            edges: 0,
            mass_messages: 0,
            mass_messages_saved: 0,
            mass_messages_received: 0,
            missing_structure: 0,
            total_log_mass: LOG_ZERO,
            lost_log_mass: LOG_ZERO,
        }
    }
}

impl RoundCounters {
    /// Returns the total mass of the emitted nodes.
    pub fn total_mass(&self) -> f64 {
        exp(self.total_log_mass)
    }

    /// Returns the mass that vanished with nodes without structure.
    pub fn lost_mass(&self) -> f64 {
        exp(self.lost_log_mass)
    }

    /// Returns emitted plus vanished mass, which should be close to one.
    pub fn accounted_mass(&self) -> f64 {
        self.total_mass() + self.lost_mass()
    }

    /// Logs all counters at info level.
    pub fn log(&self) {
        log::info!("Nodes: {}", self.nodes);
        log::info!("Edges: {}", self.edges);
        log::info!("Mass messages: {}", self.mass_messages);
        log::info!("Mass messages saved: {}", self.mass_messages_saved);
        log::info!("Mass messages received: {}", self.mass_messages_received);
        log::info!("Missing structure: {}", self.missing_structure);
        log::info!("Total mass: {}", self.total_mass());
        if self.missing_structure != 0 {
            log::info!("Lost mass: {}", self.lost_mass());
        }
    }
}

impl AddAssign<&RoundCounters> for RoundCounters {
    fn add_assign(&mut self, rhs: &RoundCounters) {
        self.nodes += rhs.nodes;
        self.edges += rhs.edges;
        self.mass_messages += rhs.mass_messages;
        self.mass_messages_saved += rhs.mass_messages_saved;
        self.mass_messages_received += rhs.mass_messages_received;
        self.missing_structure += rhs.missing_structure;
        self.total_log_mass = sum_log_probs(self.total_log_mass, rhs.total_log_mass);
        self.lost_log_mass = sum_log_probs(self.lost_log_mass, rhs.lost_log_mass);
    }
}

impl AddAssign for RoundCounters {
    fn add_assign(&mut self, rhs: RoundCounters) {
        *self += &rhs;
    }
}

impl Add for RoundCounters {
    type Output = RoundCounters;

    fn add(mut self, rhs: RoundCounters) -> Self::Output {
        self += &rhs;
        self
    }
}

impl std::iter::Sum for RoundCounters {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl Display for RoundCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "nodes: {}, edges: {}, mass messages: {} (saved {}, received {}), missing structure: {}, total mass: {}",
            self.nodes,
            self.edges,
            self.mass_messages,
            self.mass_messages_saved,
            self.mass_messages_received,
            self.missing_structure,
            self.total_mass()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_prob::ln;

    #[test]
    fn test_sum() {
        let a = RoundCounters {
            nodes: 2,
            edges: 5,
            mass_messages: 5,
            total_log_mass: ln(0.25),
            ..Default::default()
        };
        let b = RoundCounters {
            nodes: 1,
            missing_structure: 1,
            total_log_mass: ln(0.5),
            lost_log_mass: ln(0.25),
            ..Default::default()
        };
        let c: RoundCounters = [a, b].into_iter().sum();
        assert_eq!(c.nodes, 3);
        assert_eq!(c.edges, 5);
        assert_eq!(c.missing_structure, 1);
        assert!((c.total_mass() - 0.75).abs() < 1E-6);
        assert!((c.accounted_mass() - 1.0).abs() < 1E-6);
    }

    #[test]
    fn test_empty() {
        let c = RoundCounters::default();
        assert_eq!(c.total_mass(), 0.0);
        assert_eq!(c.lost_mass(), 0.0);
    }
}
