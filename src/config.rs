/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Run configuration.
//!
//! A [`RunConfig`] collects the parameters of a multi-round run. It is
//! validated as a whole by [`RunConfig::validate`] (and thus by
//! [`Driver::new`](crate::driver::Driver::new)) before any checkpoint is
//! read or written.

use crate::node::NodeId;
use crate::sources::SourceSet;
use std::path::PathBuf;
use thiserror::Error;

/// Errors in the configuration of a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("The list of source nodes is empty")]
    NoSources,
    #[error("Cannot parse source node id {0:?}")]
    InvalidSource(String),
    #[error("Source node {id} is not smaller than the number of nodes ({num_nodes})")]
    SourceOutOfRange { id: NodeId, num_nodes: usize },
    #[error("The number of nodes must be positive")]
    NoNodes,
    #[error("The damping factor must be in [0 . . 1), got {0}")]
    InvalidAlpha(f64),
    #[error("The start round ({start}) is after the end round ({end})")]
    InvalidRange { start: usize, end: usize },
}

/// The configuration of a run over rounds `start..end`.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// The directory containing the checkpoints.
    pub base: PathBuf,
    /// The round of the first checkpoint read.
    pub start: usize,
    /// The round of the last checkpoint written.
    pub end: usize,
    /// The number of nodes of the graph.
    pub num_nodes: usize,
    /// Comma-separated list of source node ids.
    pub sources: String,
    /// The teleportation probability α.
    pub alpha: f64,
    /// Whether to pre-aggregate mass fragments before the exchange.
    pub combine: bool,
}

impl RunConfig {
    pub const DEFAULT_ALPHA: f64 = 0.15;

    /// Creates a configuration with default α and pre-aggregation enabled.
    pub fn new(
        base: impl Into<PathBuf>,
        start: usize,
        end: usize,
        num_nodes: usize,
        sources: impl Into<String>,
    ) -> Self {
        Self {
            base: base.into(),
            start,
            end,
            num_nodes,
            sources: sources.into(),
            alpha: Self::DEFAULT_ALPHA,
            combine: true,
        }
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn combine(mut self, combine: bool) -> Self {
        self.combine = combine;
        self
    }

    /// Checks the configuration and returns the parsed source set.
    pub fn validate(&self) -> Result<SourceSet, ConfigError> {
        if self.num_nodes == 0 {
            return Err(ConfigError::NoNodes);
        }
        // Note that 0.0..1.0 is [0.0..1.0) in mathematical notation
        if !(0.0..1.0).contains(&self.alpha) {
            return Err(ConfigError::InvalidAlpha(self.alpha));
        }
        if self.start > self.end {
            return Err(ConfigError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        let sources: SourceSet = self.sources.parse()?;
        if let Some(id) = sources.iter().find(|&id| id as usize >= self.num_nodes) {
            return Err(ConfigError::SourceOutOfRange {
                id,
                num_nodes: self.num_nodes,
            });
        }
        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::new("/tmp/pr", 0, 10, 100, "1,2");
        assert_eq!(config.alpha, 0.15);
        assert!(config.combine);
        assert_eq!(config.validate().unwrap().len(), 2);
    }

    #[test]
    fn test_errors() {
        let config = RunConfig::new("/tmp/pr", 0, 10, 100, "1,2");
        assert_eq!(
            config.clone().alpha(1.0).validate(),
            Err(ConfigError::InvalidAlpha(1.0))
        );
        assert!(matches!(
            config.clone().alpha(f64::NAN).validate(),
            Err(ConfigError::InvalidAlpha(_))
        ));
        assert_eq!(
            RunConfig::new("/tmp/pr", 3, 2, 100, "1").validate(),
            Err(ConfigError::InvalidRange { start: 3, end: 2 })
        );
        assert_eq!(
            RunConfig::new("/tmp/pr", 0, 2, 0, "1").validate(),
            Err(ConfigError::NoNodes)
        );
        assert_eq!(
            RunConfig::new("/tmp/pr", 0, 2, 10, "1,10").validate(),
            Err(ConfigError::SourceOutOfRange {
                id: 10,
                num_nodes: 10
            })
        );
        assert_eq!(
            RunConfig::new("/tmp/pr", 0, 2, 10, "").validate(),
            Err(ConfigError::NoSources)
        );
        // an empty run is fine
        assert!(RunConfig::new("/tmp/pr", 2, 2, 10, "0").validate().is_ok());
    }
}
