/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Partitioned checkpoints on disk.
//!
//! The checkpoint of round *t* is the directory `iter`*tttt* (the round
//! number is zero-padded to four digits) inside a base directory. It contains
//! one file per partition, named `part-`*nnnnn*, holding the
//! [encoded](crate::codec) complete records of the partition. Other entries
//! of the directory are ignored.
//!
//! Checkpoints are written by [`write_checkpoint`] into a temporary directory
//! that is renamed into place only after all parts have been written, so a
//! checkpoint directory is either absent or complete.

use crate::codec::{NodeReader, write_node};
use crate::node::GraphNode;
use crate::round::{RoundError, Stage};
use anyhow::{Context, Result, ensure};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// The prefix of part file names.
pub const PART_PREFIX: &str = "part-";

/// Returns the directory of the checkpoint of the given round.
///
/// ```
/// use std::path::Path;
/// use pprank::checkpoint::round_dir;
///
/// assert_eq!(round_dir("/data/pr", 7), Path::new("/data/pr/iter0007"));
/// ```
pub fn round_dir(base: impl AsRef<Path>, round: usize) -> PathBuf {
    base.as_ref().join(format!("iter{round:04}"))
}

/// Returns the file name of the given part.
pub fn part_name(part: usize) -> String {
    format!("{PART_PREFIX}{part:05}")
}

/// A checkpoint on disk.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    dir: PathBuf,
    parts: Vec<PathBuf>,
}

impl Checkpoint {
    /// Opens the checkpoint of the given round, discovering its parts.
    pub fn open(base: impl AsRef<Path>, round: usize) -> Result<Self> {
        Self::open_dir(round_dir(base, round))
    }

    /// Opens a checkpoint directory, discovering its parts.
    pub fn open_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_owned();
        let mut parts = Vec::new();
        for entry in
            std::fs::read_dir(&dir).with_context(|| format!("Could not list {}", dir.display()))?
        {
            let entry = entry.with_context(|| format!("Could not list {}", dir.display()))?;
            if entry.file_name().to_string_lossy().starts_with(PART_PREFIX) {
                parts.push(entry.path());
            }
        }
        ensure!(!parts.is_empty(), "No part files in {}", dir.display());
        parts.sort();
        Ok(Self { dir, parts })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the number of parts.
    pub fn num_parts(&self) -> usize {
        self.parts.len()
    }

    /// Returns the paths of the parts, sorted by name.
    pub fn parts(&self) -> &[PathBuf] {
        &self.parts
    }

    /// Reads a part.
    ///
    /// # Errors
    ///
    /// Besides I/O and decoding errors, a [`RoundError::UnexpectedRecord`]
    /// if the part contains a record that is not complete.
    pub fn read_part(&self, part: usize) -> Result<Vec<GraphNode>> {
        let path = self
            .parts
            .get(part)
            .with_context(|| format!("No part {part} in {}", self.dir.display()))?;
        let file = File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
        let mut nodes = Vec::new();
        for node in NodeReader::new(BufReader::new(file)) {
            let node = node.with_context(|| format!("Could not read {}", path.display()))?;
            if !matches!(node, GraphNode::Complete { .. }) {
                return Err(RoundError::UnexpectedRecord {
                    id: node.id(),
                    kind: node.kind(),
                    stage: Stage::Checkpoint,
                })
                .with_context(|| format!("Invalid record in {}", path.display()));
            }
            nodes.push(node);
        }
        Ok(nodes)
    }

    /// Reads all parts in parallel.
    pub fn read(&self) -> Result<Vec<Vec<GraphNode>>> {
        (0..self.num_parts())
            .into_par_iter()
            .map(|part| self.read_part(part))
            .collect()
    }
}

/// Writes the checkpoint of the given round, one part for each element of
/// `parts`, replacing any existing checkpoint of the same round.
///
/// Parts are written in parallel into a temporary directory inside `base`,
/// which is then renamed to the checkpoint directory: if an error occurs, no
/// checkpoint directory is left behind.
pub fn write_checkpoint(
    base: impl AsRef<Path>,
    round: usize,
    parts: &[Vec<GraphNode>],
) -> Result<Checkpoint> {
    let base = base.as_ref();
    ensure!(!parts.is_empty(), "A checkpoint must have at least one part");
    std::fs::create_dir_all(base)
        .with_context(|| format!("Could not create {}", base.display()))?;

    let dir = round_dir(base, round);
    let tmp_dir = tempfile::Builder::new()
        .prefix(".tmp-iter")
        .tempdir_in(base)
        .with_context(|| format!("Could not create temporary directory in {}", base.display()))?;

    let paths = parts
        .par_iter()
        .enumerate()
        .map(|(part, nodes)| {
            let path = tmp_dir.path().join(part_name(part));
            write_part(&path, nodes)?;
            Ok(dir.join(part_name(part)))
        })
        .collect::<Result<Vec<_>>>()?;

    if dir.exists() {
        log::info!("Replacing existing checkpoint {}", dir.display());
        std::fs::remove_dir_all(&dir)
            .with_context(|| format!("Could not remove {}", dir.display()))?;
    }
    // the directory must not be deleted on drop once renamed
    let tmp_path = tmp_dir.into_path();
    if let Err(err) = std::fs::rename(&tmp_path, &dir) {
        let _ = std::fs::remove_dir_all(&tmp_path);
        return Err(err).with_context(|| {
            format!(
                "Could not rename {} to {}",
                tmp_path.display(),
                dir.display()
            )
        });
    }

    Ok(Checkpoint { dir, parts: paths })
}

fn write_part(path: &Path, nodes: &[GraphNode]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Could not create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for node in nodes {
        ensure!(
            matches!(node, GraphNode::Complete { .. }),
            "Checkpoints can contain only complete records, found {node}"
        );
        write_node(&mut writer, node)
            .with_context(|| format!("Could not write to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Could not flush {}", path.display()))?;
    Ok(())
}
