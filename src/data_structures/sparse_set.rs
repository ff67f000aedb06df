//! Packed component storage keyed by entity index.
//!
//! - `sparse[index]` points into `dense` (or [`EMPTY`] when absent)
//! - `dense` keeps the components packed for iteration
//! - `ids` holds the owning index of every dense slot
//!
//! Iteration follows the dense (physical) order. Removal swaps the last
//! element into the hole, so insertion order is not preserved either.

use std::cmp::Ordering;

const EMPTY: usize = usize::MAX;

#[derive(Debug, Clone)]
pub struct SparseSet<T> {
    sparse: Vec<usize>,
    dense: Vec<T>,
    ids: Vec<u32>,
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            ids: Vec::new(),
        }
    }

    /// Insert or replace the value stored for `id`. Returns the old value if any.
    pub fn insert(&mut self, id: u32, value: T) -> Option<T> {
        let slot = id as usize;
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, EMPTY);
        }
        match self.sparse[slot] {
            EMPTY => {
                self.sparse[slot] = self.dense.len();
                self.dense.push(value);
                self.ids.push(id);
                None
            }
            idx => Some(std::mem::replace(&mut self.dense[idx], value)),
        }
    }

    fn dense_index(&self, id: u32) -> Option<usize> {
        match self.sparse.get(id as usize) {
            Some(&EMPTY) | None => None,
            Some(&idx) => Some(idx),
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.dense_index(id).is_some()
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.dense_index(id).map(|idx| &self.dense[idx])
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        self.dense_index(id).map(|idx| &mut self.dense[idx])
    }

    /// Swap-remove the value for `id`.
    pub fn remove(&mut self, id: u32) -> Option<T> {
        let idx = self.dense_index(id)?;
        let value = self.dense.swap_remove(idx);
        self.ids.swap_remove(idx);
        if let Some(&moved) = self.ids.get(idx) {
            self.sparse[moved as usize] = idx;
        }
        self.sparse[id as usize] = EMPTY;
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        debug_assert_eq!(self.ids.len(), self.dense.len());
        self.ids.iter().copied().zip(self.dense.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.ids.iter().copied().zip(self.dense.iter_mut())
    }

    /// Stable re-ordering of the packed storage. The sparse index is rebuilt
    /// afterwards so lookups keep working.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut((u32, &T), (u32, &T)) -> Ordering,
    {
        let mut order: Vec<usize> = (0..self.dense.len()).collect();
        order.sort_by(|&a, &b| {
            compare((self.ids[a], &self.dense[a]), (self.ids[b], &self.dense[b]))
        });
        if order.iter().enumerate().all(|(pos, &idx)| pos == idx) {
            return;
        }

        let mut slots: Vec<Option<T>> = self.dense.drain(..).map(Some).collect();
        let ids = std::mem::take(&mut self.ids);
        for idx in order {
            if let Some(value) = slots[idx].take() {
                self.sparse[ids[idx] as usize] = self.dense.len();
                self.dense.push(value);
                self.ids.push(ids[idx]);
            }
        }
    }
}
