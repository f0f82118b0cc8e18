/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The set of source nodes the random walk teleports to.

use crate::config::ConfigError;
use crate::node::NodeId;
use std::fmt::Display;
use std::str::FromStr;

/// An immutable set of source (personalization) nodes.
///
/// The set is parsed once from a comma-separated list of ids and then shared
/// read-only by all partitions for the whole run. Duplicate ids are counted
/// once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    // sorted, without duplicates
    ids: Box<[NodeId]>,
}

impl SourceSet {
    /// Creates a source set from ids, which may be unsorted and contain
    /// duplicates.
    pub fn new(ids: impl IntoIterator<Item = NodeId>) -> Result<Self, ConfigError> {
        let mut ids: Vec<NodeId> = ids.into_iter().collect();
        if ids.is_empty() {
            return Err(ConfigError::NoSources);
        }
        ids.sort_unstable();
        ids.dedup();
        Ok(Self {
            ids: ids.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Returns the number of distinct sources.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always false: source sets are never empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the sources in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids.iter().copied()
    }
}

impl FromStr for SourceSet {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ids = s
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<NodeId>()
                    .map_err(|_| ConfigError::InvalidSource(token.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(ids)
    }
}

impl Display for SourceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, id) in self.ids.iter().enumerate() {
            if i != 0 {
                f.write_str(",")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let sources: SourceSet = " 7, 3,3 ,12".parse().unwrap();
        assert_eq!(sources.len(), 3);
        assert!(sources.contains(3) && sources.contains(7) && sources.contains(12));
        assert!(!sources.contains(0));
        assert_eq!(sources.iter().collect::<Vec<_>>(), vec![3, 7, 12]);
        assert_eq!(sources.to_string(), "3,7,12");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<SourceSet>(), Err(ConfigError::NoSources));
        assert_eq!(" , ".parse::<SourceSet>(), Err(ConfigError::NoSources));
        assert_eq!(
            "1,x".parse::<SourceSet>(),
            Err(ConfigError::InvalidSource("x".to_owned()))
        );
        assert_eq!(
            "-1".parse::<SourceSet>(),
            Err(ConfigError::InvalidSource("-1".to_owned()))
        );
    }
}
