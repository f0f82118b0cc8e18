/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::node::{GraphNode, NodeId};
use dary_heap::PeekMut;

#[derive(Clone, Debug)]
/// Private struct ordering iterators by the id of their head record and then
/// by their position in the input, so that the merge is deterministic.
struct HeadTail<I: Iterator<Item = GraphNode>> {
    head: GraphNode,
    index: usize,
    tail: I,
}

impl<I: Iterator<Item = GraphNode>> HeadTail<I> {
    #[inline(always)]
    fn key(&self) -> (NodeId, usize) {
        (self.head.id(), self.index)
    }
}

impl<I: Iterator<Item = GraphNode>> PartialEq for HeadTail<I> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<I: Iterator<Item = GraphNode>> Eq for HeadTail<I> {}

impl<I: Iterator<Item = GraphNode>> PartialOrd for HeadTail<I> {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<I: Iterator<Item = GraphNode>> Ord for HeadTail<I> {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // reversed, as the heap is a max-heap
        other.key().cmp(&self.key())
    }
}

/// A structure using a [quaternary heap](dary_heap::QuaternaryHeap) to merge
/// iterators of records sorted by node id.
///
/// The merged iterator returns the records sorted by node id; records with
/// the same id are returned in the order of the iterators they come from.
///
/// ```
/// use pprank::node::GraphNode;
/// use pprank::utils::KMergeNodes;
///
/// let mass = |id| GraphNode::MassOnly { id, log_mass: 0.0 };
/// let merged = KMergeNodes::new([
///     vec![mass(0), mass(3)].into_iter(),
///     vec![mass(1), mass(3), mass(4)].into_iter(),
/// ]);
/// assert_eq!(merged.map(|n| n.id()).collect::<Vec<_>>(), vec![0, 1, 3, 3, 4]);
/// ```
#[derive(Clone, Debug)]
pub struct KMergeNodes<I: Iterator<Item = GraphNode>> {
    heap: dary_heap::QuaternaryHeap<HeadTail<I>>,
}

impl<I: Iterator<Item = GraphNode>> KMergeNodes<I> {
    pub fn new(iters: impl IntoIterator<Item = I>) -> Self {
        let iters = iters.into_iter();
        let mut heap = dary_heap::QuaternaryHeap::with_capacity(iters.size_hint().1.unwrap_or(10));
        for (index, mut iter) in iters.enumerate() {
            if let Some(head) = iter.next() {
                heap.push(HeadTail {
                    head,
                    index,
                    tail: iter,
                });
            }
        }
        KMergeNodes { heap }
    }
}

impl<I: Iterator<Item = GraphNode>> Iterator for KMergeNodes<I> {
    type Item = GraphNode;

    fn next(&mut self) -> Option<Self::Item> {
        let mut head_tail = self.heap.peek_mut()?;

        match head_tail.tail.next() {
            None => Some(PeekMut::pop(head_tail).head),
            Some(next) => {
                debug_assert!(next.id() >= head_tail.head.id(), "unsorted input");
                Some(std::mem::replace(&mut head_tail.head, next))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.heap.iter().fold((0, Some(0)), |(lo, hi), head_tail| {
            let (tail_lo, tail_hi) = head_tail.tail.size_hint();
            (
                lo + 1 + tail_lo,
                hi.zip(tail_hi).map(|(hi, tail_hi)| hi + 1 + tail_hi),
            )
        })
    }
}

impl<I: Iterator<Item = GraphNode>> std::iter::FusedIterator for KMergeNodes<I> {}
