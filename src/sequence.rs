//! This module defines an index addressable circular doubly linked list.
//! Nodes live in an arena and link to each other through generation checked
//! handles so that a stale handle is detected instead of dereferenced.
//! Slot 0 is the sentinel: it holds no value and closes the circle in both
//! directions.
use crate::error::{Result, SortError};
use itertools::Itertools;
use rand::Rng;
use std::fmt;
use std::iter::FromIterator;

const SENTINEL: usize = 0;
const SENTINEL_ID: NodeId = NodeId {
    slot: SENTINEL,
    generation: 0,
};

/// Handle on a node of a `Sequence`.
/// It stays valid until the node is removed, whatever happens to the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId {
    slot: usize,
    generation: u32,
}

impl NodeId {
    fn is_sentinel(self) -> bool {
        self.slot == SENTINEL
    }
}

#[derive(Debug, Clone)]
struct Node<T> {
    value: Option<T>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    generation: u32,
}

/// Ordered container backing the bars of one graph.
///
/// Pushing and popping at the tail is O(1), indexed access is O(n) (walking
/// from the nearest end). Values are swapped in place, nodes never move.
///
/// ```
/// use sortviz::Sequence;
///
/// let mut seq: Sequence<u32> = (1..=3).collect();
/// seq.swap(0, 2).unwrap();
/// assert_eq!(seq.to_string(), "[3, 2, 1]");
/// assert_eq!(seq.pop().unwrap(), 1);
/// assert_eq!(seq.len(), 2);
/// ```
#[derive(Clone)]
pub struct Sequence<T> {
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Sequence::new()
    }
}

impl<T> Sequence<T> {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Sequence {
            nodes: vec![Node {
                value: None,
                prev: Some(SENTINEL_ID),
                next: Some(SENTINEL_ID),
                generation: 0,
            }],
            free: Vec::new(),
            len: 0,
        }
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Are we empty ?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append given value at the tail.
    pub fn push(&mut self, value: T) {
        let last = self.nodes[SENTINEL].prev.unwrap_or(SENTINEL_ID);
        let id = self.alloc(value, last, SENTINEL_ID);
        self.nodes[last.slot].next = Some(id);
        self.nodes[SENTINEL].prev = Some(id);
        self.len += 1;
    }

    /// Return value at given index.
    pub fn get(&self, index: usize) -> Result<&T> {
        let id = self.node_at(index)?;
        self.node_value(id)
    }

    /// Mutable access to value at given index.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let id = self.node_at(index)?;
        self.node_mut(id)?
            .value
            .as_mut()
            .ok_or(SortError::InvalidNode)
    }

    /// Overwrite value at given index, handing the previous one back.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let slot = self.get_mut(index)?;
        Ok(std::mem::replace(slot, value))
    }

    /// Exchange the values at two indices. Nodes stay in place.
    pub fn swap(&mut self, i: usize, j: usize) -> Result<()> {
        let first = self.node_at(i)?;
        let second = self.node_at(j)?;
        if i != j {
            self.swap_slots(first.slot, second.slot);
        }
        Ok(())
    }

    /// First value.
    pub fn first(&self) -> Result<&T> {
        self.front_node()
            .ok_or(SortError::Empty)
            .and_then(|id| self.node_value(id))
    }

    /// Last value.
    pub fn last(&self) -> Result<&T> {
        self.back_node()
            .ok_or(SortError::Empty)
            .and_then(|id| self.node_value(id))
    }

    /// Remove and return the last value.
    pub fn pop(&mut self) -> Result<T> {
        if self.is_empty() {
            return Err(SortError::Empty);
        }
        self.remove_at(self.len - 1)
    }

    /// Remove and return the value at given index.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let id = self.node_at(index)?;
        let node = self.node(id)?;
        let (prev, next) = (node.prev, node.next);
        if let Some(prev) = prev {
            self.nodes[prev.slot].next = next;
        }
        if let Some(next) = next {
            self.nodes[next.slot].prev = prev;
        }
        self.len -= 1;
        self.release(id.slot).ok_or(SortError::InvalidNode)
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        for slot in 1..self.nodes.len() {
            if self.nodes[slot].value.is_some() {
                self.release(slot);
            }
        }
        self.nodes[SENTINEL].prev = Some(SENTINEL_ID);
        self.nodes[SENTINEL].next = Some(SENTINEL_ID);
        self.len = 0;
    }

    /// Fisher-Yates shuffle, from the last index down to 1.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let ids = self.node_ids();
        for i in (1..ids.len()).rev() {
            let j = rng.gen_range(0..=i);
            if i != j {
                self.swap_slots(ids[i].slot, ids[j].slot);
            }
        }
    }

    /// Iterate on all values from first to last.
    /// The iterator never yields more values than the sequence held at creation.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            sequence: self,
            next: self.front_node(),
            remaining: self.len,
        }
    }

    /// Index of the first value equal to the given one.
    pub fn position(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|v| v == value)
    }

    /// Do we hold a value equal to the given one ?
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.position(value).is_some()
    }

    /// Remove the first value equal to the given one.
    pub fn remove_item(&mut self, value: &T) -> Option<T>
    where
        T: PartialEq,
    {
        let index = self.position(value)?;
        self.remove_at(index).ok()
    }

    // ---- node level api, used by algorithms walking the links ----

    pub(crate) fn front_node(&self) -> Option<NodeId> {
        self.nodes[SENTINEL].next.filter(|id| !id.is_sentinel())
    }

    pub(crate) fn back_node(&self) -> Option<NodeId> {
        self.nodes[SENTINEL].prev.filter(|id| !id.is_sentinel())
    }

    /// Successor of given node, `None` past the last one (or on a detached end).
    pub(crate) fn next_link(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.next.filter(|n| !n.is_sentinel()))
    }

    /// Predecessor of given node, `None` before the first one (or on a detached end).
    pub(crate) fn prev_link(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.prev.filter(|p| !p.is_sentinel()))
    }

    pub(crate) fn node_value(&self, id: NodeId) -> Result<&T> {
        self.node(id)?.value.as_ref().ok_or(SortError::InvalidNode)
    }

    pub(crate) fn swap_nodes(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        self.node_value(a)?;
        self.node_value(b)?;
        if a != b {
            self.swap_slots(a.slot, b.slot);
        }
        Ok(())
    }

    /// Cut the links between the sentinel and the end nodes so that the
    /// values form an open chain.
    pub(crate) fn detach_ends(&mut self) {
        if let Some(first) = self.front_node() {
            self.nodes[first.slot].prev = None;
        }
        if let Some(last) = self.back_node() {
            self.nodes[last.slot].next = None;
        }
    }

    /// Walk to the true ends of the chain and link them back to the sentinel.
    pub(crate) fn reattach_ends(&mut self) {
        let (first, last) = match (self.front_node(), self.back_node()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                self.nodes[SENTINEL].prev = Some(SENTINEL_ID);
                self.nodes[SENTINEL].next = Some(SENTINEL_ID);
                return;
            }
        };
        let mut first = first;
        for _ in 0..self.len {
            match self.nodes[first.slot].prev.filter(|p| !p.is_sentinel()) {
                Some(prev) => first = prev,
                None => break,
            }
        }
        let mut last = last;
        for _ in 0..self.len {
            match self.nodes[last.slot].next.filter(|n| !n.is_sentinel()) {
                Some(next) => last = next,
                None => break,
            }
        }
        self.nodes[first.slot].prev = Some(SENTINEL_ID);
        self.nodes[last.slot].next = Some(SENTINEL_ID);
        self.nodes[SENTINEL].next = Some(first);
        self.nodes[SENTINEL].prev = Some(last);
    }

    /// Is the chain circular and consistent with `len` ?
    #[cfg(test)]
    pub(crate) fn is_well_linked(&self) -> bool {
        let mut current = SENTINEL_ID;
        for _ in 0..=self.len {
            let next = match self.nodes[current.slot].next {
                Some(next) => next,
                None => return false,
            };
            if self.nodes[next.slot].prev != Some(current) {
                return false;
            }
            current = next;
        }
        current.is_sentinel()
    }

    // ---- arena plumbing ----

    fn node(&self, id: NodeId) -> Result<&Node<T>> {
        self.nodes
            .get(id.slot)
            .filter(|n| n.generation == id.generation)
            .ok_or(SortError::InvalidNode)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<T>> {
        self.nodes
            .get_mut(id.slot)
            .filter(|n| n.generation == id.generation)
            .ok_or(SortError::InvalidNode)
    }

    fn node_at(&self, index: usize) -> Result<NodeId> {
        if index >= self.len {
            return Err(SortError::OutOfRange {
                index,
                len: self.len,
            });
        }
        let mut current = SENTINEL_ID;
        if index < self.len / 2 {
            for _ in 0..=index {
                current = self.node(current)?.next.ok_or(SortError::InvalidNode)?;
            }
        } else {
            for _ in index..self.len {
                current = self.node(current)?.prev.ok_or(SortError::InvalidNode)?;
            }
        }
        if current.is_sentinel() {
            Err(SortError::InvalidNode)
        } else {
            Ok(current)
        }
    }

    fn node_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.len);
        let mut current = self.front_node();
        while let Some(id) = current {
            if ids.len() == self.len {
                break;
            }
            ids.push(id);
            current = self.nodes[id.slot].next.filter(|n| !n.is_sentinel());
        }
        ids
    }

    fn swap_slots(&mut self, a: usize, b: usize) {
        let (low, high) = (a.min(b), a.max(b));
        let (head, tail) = self.nodes.split_at_mut(high);
        std::mem::swap(&mut head[low].value, &mut tail[0].value);
    }

    fn alloc(&mut self, value: T, prev: NodeId, next: NodeId) -> NodeId {
        if let Some(slot) = self.free.pop() {
            let node = &mut self.nodes[slot];
            node.value = Some(value);
            node.prev = Some(prev);
            node.next = Some(next);
            NodeId {
                slot,
                generation: node.generation,
            }
        } else {
            self.nodes.push(Node {
                value: Some(value),
                prev: Some(prev),
                next: Some(next),
                generation: 0,
            });
            NodeId {
                slot: self.nodes.len() - 1,
                generation: 0,
            }
        }
    }

    fn release(&mut self, slot: usize) -> Option<T> {
        let node = &mut self.nodes[slot];
        node.generation = node.generation.wrapping_add(1);
        node.prev = None;
        node.next = None;
        self.free.push(slot);
        node.value.take()
    }
}

/// Forward iterator on the values of a `Sequence`.
pub struct Iter<'a, T> {
    sequence: &'a Sequence<T>,
    next: Option<NodeId>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.next?;
        let node = self.sequence.node(id).ok()?;
        self.next = node.next.filter(|n| !n.is_sentinel());
        self.remaining -= 1;
        node.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut sequence = Sequence::new();
        sequence.extend(iter);
        sequence
    }
}

impl<T> Extend<T> for Sequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value)
        }
    }
}

impl<T: PartialEq> PartialEq for Sequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: fmt::Debug> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.iter().format(", "))
    }
}
