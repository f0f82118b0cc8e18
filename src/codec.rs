/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Binary encoding of [`GraphNode`] records.
//!
//! A record is laid out as follows, all integers and floats being big-endian:
//!
//! | field      | size           | present for             |
//! |------------|----------------|-------------------------|
//! | tag        | 1 byte         | always                  |
//! | node id    | 4 bytes        | always                  |
//! | log mass   | 4 bytes (IEEE) | complete, mass only     |
//! | degree *d* | 4 bytes        | complete, structure only|
//! | neighbors  | 4*d* bytes     | complete, structure only|
//!
//! The tags are those of [`NodeKind`]. Records are simply concatenated in
//! checkpoint part files.

use crate::node::{GraphNode, NodeId, NodeKind};
use std::io::{ErrorKind, Read, Write};
use thiserror::Error;

/// Errors raised while decoding a record.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The tag byte does not correspond to a [`NodeKind`].
    #[error("Unknown record tag {0}")]
    UnknownTag(u8),
    /// The input ended in the middle of a record.
    #[error("Truncated record (tag {tag})")]
    Truncated { tag: u8 },
    /// A single-record buffer contains bytes after the record.
    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Writes a record.
pub fn write_node(writer: &mut impl Write, node: &GraphNode) -> std::io::Result<()> {
    writer.write_all(&[node.kind().tag()])?;
    writer.write_all(&node.id().to_be_bytes())?;
    if let Some(log_mass) = node.log_mass() {
        writer.write_all(&log_mass.to_be_bytes())?;
    }
    if let Some(adjacency) = node.adjacency() {
        let degree = u32::try_from(adjacency.len())
            .map_err(|_| std::io::Error::other("Adjacency list too long to encode"))?;
        writer.write_all(&degree.to_be_bytes())?;
        for &succ in adjacency {
            writer.write_all(&succ.to_be_bytes())?;
        }
    }
    Ok(())
}

/// Reads the next record, returning `None` at a clean end of input.
pub fn read_node(reader: &mut impl Read) -> Result<Option<GraphNode>, DecodeError> {
    let mut tag = [0u8; 1];
    loop {
        match reader.read(&mut tag) {
            Ok(0) => return Ok(None),
            Ok(_) => break,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    let tag = tag[0];
    let kind = NodeKind::from_tag(tag).ok_or(DecodeError::UnknownTag(tag))?;

    let id = NodeId::from_be_bytes(read_word(reader, tag)?);
    let log_mass = if kind.has_mass() {
        f32::from_be_bytes(read_word(reader, tag)?)
    } else {
        0.0
    };
    let adjacency = if kind.has_adjacency() {
        let degree = u32::from_be_bytes(read_word(reader, tag)?) as usize;
        // the degree comes from the input, so we do not trust it for allocation
        let mut adjacency = Vec::with_capacity(degree.min(1 << 16));
        for _ in 0..degree {
            adjacency.push(NodeId::from_be_bytes(read_word(reader, tag)?));
        }
        adjacency
    } else {
        Vec::new()
    };

    Ok(Some(match kind {
        NodeKind::Complete => GraphNode::Complete {
            id,
            log_mass,
            adjacency,
        },
        NodeKind::MassOnly => GraphNode::MassOnly { id, log_mass },
        NodeKind::StructureOnly => GraphNode::StructureOnly { id, adjacency },
    }))
}

fn read_word(reader: &mut impl Read, tag: u8) -> Result<[u8; 4], DecodeError> {
    let mut word = [0u8; 4];
    reader.read_exact(&mut word).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            DecodeError::Truncated { tag }
        } else {
            DecodeError::Io(e)
        }
    })?;
    Ok(word)
}

/// Returns the number of bytes [`write_node`] emits for a record.
pub fn encoded_len(node: &GraphNode) -> usize {
    1 + 4
        + if node.kind().has_mass() { 4 } else { 0 }
        + node.adjacency().map_or(0, |adjacency| 4 + 4 * adjacency.len())
}

impl GraphNode {
    /// Returns the encoding of this record.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(encoded_len(self));
        write_node(&mut bytes, self).expect("Writing to a vector cannot fail");
        bytes
    }

    /// Decodes a buffer containing exactly one record.
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self, DecodeError> {
        let node = read_node(&mut bytes)?.ok_or(DecodeError::Truncated { tag: 0 })?;
        if !bytes.is_empty() {
            return Err(DecodeError::TrailingBytes(bytes.len()));
        }
        Ok(node)
    }
}

/// An iterator over the records of a reader.
///
/// The iterator is fused after the first error.
#[derive(Debug)]
pub struct NodeReader<R> {
    reader: R,
    done: bool,
}

impl<R: Read> NodeReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            done: false,
        }
    }
}

impl<R: Read> Iterator for NodeReader<R> {
    type Item = Result<GraphNode, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match read_node(&mut self.reader) {
            Ok(Some(node)) => Some(Ok(node)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for NodeReader<R> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_layout() {
        let node = GraphNode::Complete {
            id: 0x01020304,
            log_mass: -1.0,
            adjacency: vec![5, 0x00000100],
        };
        let bytes = node.to_bytes();
        assert_eq!(
            bytes,
            [
                0, // tag
                1, 2, 3, 4, // id
                0xbf, 0x80, 0, 0, // -1.0f32
                0, 0, 0, 2, // degree
                0, 0, 0, 5, // neighbor
                0, 0, 1, 0, // neighbor
            ]
        );
        assert_eq!(bytes.len(), encoded_len(&node));
        assert_eq!(GraphNode::from_bytes(&bytes).unwrap(), node);
    }

    #[test]
    fn test_fragment_layouts() {
        let mass = GraphNode::MassOnly {
            id: 9,
            log_mass: 2.0,
        };
        assert_eq!(mass.to_bytes(), [1, 0, 0, 0, 9, 0x40, 0, 0, 0]);

        let structure = GraphNode::StructureOnly {
            id: 9,
            adjacency: vec![1],
        };
        assert_eq!(structure.to_bytes(), [2, 0, 0, 0, 9, 0, 0, 0, 1, 0, 0, 0, 1]);
        assert_eq!(GraphNode::from_bytes(&structure.to_bytes()).unwrap(), structure);
    }

    #[test]
    fn test_infinite_mass() {
        let node = GraphNode::Complete {
            id: 1,
            log_mass: f32::NEG_INFINITY,
            adjacency: vec![0],
        };
        assert_eq!(GraphNode::from_bytes(&node.to_bytes()).unwrap(), node);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            GraphNode::from_bytes(&[7, 0, 0, 0, 1]),
            Err(DecodeError::UnknownTag(7))
        ));
        assert!(matches!(
            GraphNode::from_bytes(&[0, 0, 0, 0, 1, 0, 0]),
            Err(DecodeError::Truncated { tag: 0 })
        ));
        assert!(matches!(
            GraphNode::from_bytes(&[2, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3]),
            Err(DecodeError::Truncated { tag: 2 })
        ));
        assert!(matches!(
            GraphNode::from_bytes(&[1, 0, 0, 0, 1, 0, 0, 0, 0, 9]),
            Err(DecodeError::TrailingBytes(1))
        ));
    }

    #[test]
    fn test_node_reader() {
        let nodes = vec![
            GraphNode::Complete {
                id: 0,
                log_mass: -0.5,
                adjacency: vec![1, 2],
            },
            GraphNode::MassOnly {
                id: 1,
                log_mass: -3.0,
            },
            GraphNode::StructureOnly {
                id: 2,
                adjacency: vec![0],
            },
        ];
        let mut buffer = Vec::new();
        for node in &nodes {
            write_node(&mut buffer, node).unwrap();
        }
        let read = NodeReader::new(buffer.as_slice())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(read, nodes);

        // a truncated tail yields an error and then stops
        buffer.pop();
        let mut reader = NodeReader::new(buffer.as_slice());
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }
}
