//! Dense index assignment for external entity ids.
//!
//! Teachers and classes arrive with sparse database ids; the grids want small
//! contiguous indices so they can live in flat vectors.

use rustc_hash::FxHashMap;
use std::hash::Hash;

/// Dense index handed out by [`DenseIndex`].
pub type DenseId = usize;

/// Maps external ids to `0..len()` in first-seen order.
#[derive(Debug, Clone)]
pub struct DenseIndex<K> {
    to_dense: FxHashMap<K, DenseId>,
    from_dense: Vec<K>,
}

impl<K: Copy + Eq + Hash> DenseIndex<K> {
    /// Create a new index with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_dense: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            from_dense: Vec::with_capacity(capacity),
        }
    }

    /// Intern an id, returning its dense index.
    /// If already interned, returns the existing index.
    pub fn intern(&mut self, key: K) -> DenseId {
        if let Some(&idx) = self.to_dense.get(&key) {
            return idx;
        }
        let idx = self.from_dense.len();
        self.from_dense.push(key);
        self.to_dense.insert(key, idx);
        idx
    }

    #[inline]
    pub fn get(&self, key: K) -> Option<DenseId> {
        self.to_dense.get(&key).copied()
    }

    /// External id for a dense index.
    #[inline]
    pub fn resolve(&self, idx: DenseId) -> Option<K> {
        self.from_dense.get(idx).copied()
    }

    /// External ids in dense order.
    pub fn keys(&self) -> &[K] {
        &self.from_dense
    }

    pub fn len(&self) -> usize {
        self.from_dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from_dense.is_empty()
    }
}

impl<K: Copy + Eq + Hash> Default for DenseIndex<K> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<K: Copy + Eq + Hash> FromIterator<K> for DenseIndex<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut index = Self::default();
        for key in iter {
            index.intern(key);
        }
        index
    }
}
