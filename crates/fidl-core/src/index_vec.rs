//! Type-safe indexed vector collection.

use std::marker::PhantomData;
use std::ops::Index;

/// A trait for types that can be used as indices.
pub trait Idx: Copy + Eq {
    fn new(raw: u32) -> Self;
    fn index(self) -> usize;
}

/// An append-only Vec indexed by a newtype index.
///
/// Declaration tables never remove entries, so an index handed out by
/// [`IndexVec::push`] stays valid for the table's lifetime.
#[derive(Debug, Clone)]
pub struct IndexVec<I: Idx, T> {
    raw: Vec<T>,
    _marker: PhantomData<fn(I) -> I>,
}

impl<I: Idx, T> Default for IndexVec<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Idx, T> IndexVec<I, T> {
    pub fn new() -> Self {
        Self {
            raw: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// The index the next [`IndexVec::push`] will return.
    pub fn next_idx(&self) -> I {
        I::new(self.raw.len() as u32)
    }

    /// Push a value and return its index.
    pub fn push(&mut self, value: T) -> I {
        let idx = self.next_idx();
        self.raw.push(value);
        idx
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn get(&self, idx: I) -> Option<&T> {
        self.raw.get(idx.index())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.raw.iter()
    }

    /// Iterate over the indices in insertion order.
    pub fn indices(&self) -> impl Iterator<Item = I> {
        (0..self.raw.len() as u32).map(I::new)
    }

    pub fn iter_enumerated(&self) -> impl Iterator<Item = (I, &T)> {
        self.raw
            .iter()
            .enumerate()
            .map(|(i, v)| (I::new(i as u32), v))
    }
}

impl<I: Idx, T> Index<I> for IndexVec<I, T> {
    type Output = T;

    fn index(&self, idx: I) -> &T {
        &self.raw[idx.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::StructId;

    #[test]
    fn test_push_and_index() {
        let mut vec: IndexVec<StructId, &str> = IndexVec::new();

        let a = vec.push("A");
        let b = vec.push("B");

        assert_eq!(a, StructId(0));
        assert_eq!(b, StructId(1));
        assert_eq!(vec.next_idx(), StructId(2));
        assert_eq!(vec[b], "B");
        assert_eq!(vec.get(StructId(2)), None);
    }

    #[test]
    fn test_indices_follow_insertion_order() {
        let mut vec: IndexVec<StructId, u8> = IndexVec::new();
        vec.push(10);
        vec.push(20);
        vec.push(30);

        let ids: Vec<_> = vec.indices().collect();
        assert_eq!(ids, vec![StructId(0), StructId(1), StructId(2)]);

        let pairs: Vec<_> = vec.iter_enumerated().map(|(id, v)| (id.0, *v)).collect();
        assert_eq!(pairs, vec![(0, 10), (1, 20), (2, 30)]);
    }
}
