/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use pprank::prelude::*;
use std::io::Write;

fn complete(id: NodeId, adjacency: Vec<NodeId>) -> GraphNode {
    GraphNode::Complete {
        id,
        log_mass: ln(0.5),
        adjacency,
    }
}

#[test]
fn test_ignore_other_files() -> Result<()> {
    let base = tempfile::tempdir()?;
    let parts = vec![vec![complete(0, vec![1])], vec![complete(1, vec![0])]];
    write_checkpoint(base.path(), 2, &parts)?;

    let dir = round_dir(base.path(), 2);
    std::fs::write(dir.join("_SUCCESS"), b"")?;
    std::fs::write(dir.join(".part-00000.crc"), b"garbage")?;
    std::fs::create_dir(dir.join("_logs"))?;

    let checkpoint = Checkpoint::open(base.path(), 2)?;
    assert_eq!(checkpoint.num_parts(), 2);
    assert_eq!(checkpoint.read()?, parts);
    Ok(())
}

#[test]
fn test_replace() -> Result<()> {
    let base = tempfile::tempdir()?;
    write_checkpoint(base.path(), 1, &[vec![], vec![], vec![]])?;
    let parts = vec![vec![complete(0, vec![0])]];
    write_checkpoint(base.path(), 1, &parts)?;
    let checkpoint = Checkpoint::open(base.path(), 1)?;
    assert_eq!(checkpoint.num_parts(), 1);
    assert_eq!(checkpoint.read()?, parts);
    // no temporary directories are left behind
    assert_eq!(std::fs::read_dir(base.path())?.count(), 1);
    Ok(())
}

#[test]
fn test_invalid_parts() -> Result<()> {
    let base = tempfile::tempdir()?;
    let dir = round_dir(base.path(), 0);
    std::fs::create_dir_all(&dir)?;

    // no part files
    assert!(Checkpoint::open(base.path(), 0).is_err());

    // a fragment in a checkpoint
    std::fs::write(
        dir.join(part_name(0)),
        GraphNode::MassOnly {
            id: 7,
            log_mass: 0.0,
        }
        .to_bytes(),
    )?;
    let err = Checkpoint::open(base.path(), 0)?.read().unwrap_err();
    assert_eq!(
        err.downcast_ref::<RoundError>(),
        Some(&RoundError::UnexpectedRecord {
            id: 7,
            kind: NodeKind::MassOnly,
            stage: Stage::Checkpoint,
        })
    );

    // a truncated record
    let mut file = std::fs::File::create(dir.join(part_name(0)))?;
    file.write_all(&complete(3, vec![1, 2]).to_bytes()[..10])?;
    drop(file);
    let err = Checkpoint::open(base.path(), 0)?.read().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DecodeError>(),
        Some(DecodeError::Truncated { tag: 0 })
    ));
    Ok(())
}

#[test]
fn test_init_checkpoint() -> Result<()> {
    let base = tempfile::tempdir()?;
    let sources: SourceSet = "2".parse()?;
    let checkpoint = init_checkpoint(
        base.path(),
        0,
        "0 1\n1 2\n2 0\n3 0 1 2\n".as_bytes(),
        4,
        InitialMass::Sources,
        Some(&sources),
        std::num::NonZeroUsize::new(2).unwrap(),
        dsi_progress_logger::no_logging![],
    )?;
    let parts = checkpoint.read()?;
    assert_eq!(parts.len(), 2);
    let ids: Vec<Vec<NodeId>> = parts
        .iter()
        .map(|part| part.iter().map(GraphNode::id).collect())
        .collect();
    assert_eq!(ids, vec![vec![0, 2], vec![1, 3]]);
    assert_eq!(parts[0][1].log_mass(), Some(0.0));
    assert_eq!(parts[1][1].log_mass(), Some(LOG_ZERO));

    let top = top_nodes(parts.into_iter().flatten(), 1);
    assert_eq!(top.nodes, vec![(2, 0.0)]);
    assert!((exp(top.total_log_mass) - 1.0).abs() < 1E-6);
    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn test_serde() -> Result<()> {
    let node = complete(3, vec![1, 2]);
    let json = serde_json::to_string(&node)?;
    assert_eq!(serde_json::from_str::<GraphNode>(&json)?, node);

    // JSON has no infinities, so we use finite masses
    let counters = RoundCounters {
        nodes: 3,
        edges: 4,
        total_log_mass: -0.5,
        lost_log_mass: -3.0,
        ..Default::default()
    };
    let json = serde_json::to_string(&counters)?;
    assert_eq!(serde_json::from_str::<RoundCounters>(&json)?, counters);
    Ok(())
}
