use std::borrow::Borrow;
use std::convert::TryFrom;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::Range;
use std::ops::{Index, IndexMut};

use thiserror::Error;

/// Map keyed by a type with a dense flat index. Every key always has a value,
/// so the map is exactly `K::NUM_INDEXES` long.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct IndexMap<K, V> {
    data: Box<[V]>,
    _key: PhantomData<K>,
}

impl<K, V> IndexMap<K, V>
where
    K: FixedSizeIndex,
    V: Default,
{
    /// Construct a map with the default value under every key.
    pub fn new() -> Self {
        Self::from_fn(|_| V::default())
    }
}

impl<K, V> Default for IndexMap<K, V>
where
    K: FixedSizeIndex,
    V: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> IndexMap<K, V>
where
    K: FixedSizeIndex,
{
    /// Construct a map by computing the value for each key.
    pub fn from_fn(mut init: impl FnMut(K) -> V) -> Self {
        IndexMap {
            data: K::values().map(&mut init).collect(),
            _key: PhantomData,
        }
    }

    /// Iterator over all values paired with their keys, in index order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (K, &V)> + ExactSizeIterator + DoubleEndedIterator + FusedIterator
    {
        K::values().zip(self.data.iter())
    }

    /// Iterator over just the values of the map.
    #[inline]
    pub fn values(&self) -> std::slice::Iter<V> {
        self.data.iter()
    }

    /// Contiguous run of values for the keys in `range`.
    #[inline]
    pub fn slice(&self, range: Range<usize>) -> &[V] {
        &self.data[range]
    }

    /// Mutable contiguous run of values for the keys in `range`.
    #[inline]
    pub fn slice_mut(&mut self, range: Range<usize>) -> &mut [V] {
        &mut self.data[range]
    }
}

impl<I, K, V> Index<I> for IndexMap<K, V>
where
    K: FixedSizeIndex,
    I: Borrow<K>,
{
    type Output = V;

    fn index(&self, idx: I) -> &Self::Output {
        &self.data[idx.borrow().idx()]
    }
}

impl<I, K, V> IndexMut<I> for IndexMap<K, V>
where
    K: FixedSizeIndex,
    I: Borrow<K>,
{
    fn index_mut(&mut self, idx: I) -> &mut Self::Output {
        &mut self.data[idx.borrow().idx()]
    }
}

impl<K: FixedSizeIndex, V> TryFrom<Vec<V>> for IndexMap<K, V> {
    type Error = IncorrectSize<K>;

    fn try_from(vec: Vec<V>) -> Result<Self, Self::Error> {
        if vec.len() == K::NUM_INDEXES {
            Ok(Self {
                data: vec.into_boxed_slice(),
                _key: PhantomData,
            })
        } else {
            Err(IncorrectSize::new(vec.len()))
        }
    }
}

/// A fixed size collection was built from data of the wrong length.
#[derive(Copy, Clone, Eq, PartialEq, Error)]
#[error("tried to initialize an indexed collection from {len} elements, but it must have size {}", K::NUM_INDEXES)]
pub struct IncorrectSize<K: FixedSizeIndex> {
    len: usize,
    _key: PhantomData<K>,
}

impl<K: FixedSizeIndex> IncorrectSize<K> {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            len,
            _key: PhantomData,
        }
    }

    /// Length of the rejected data.
    pub fn len(&self) -> usize {
        self.len
    }
}

impl<K: FixedSizeIndex> fmt::Debug for IncorrectSize<K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // forward implementation to display
        write!(f, "{}", self)
    }
}

/// Types with a dense, zero based index space of known size.
pub trait FixedSizeIndex {
    /// Number of distinct indexes.
    const NUM_INDEXES: usize;

    /// Iterator over every value of this type in index order.
    fn values() -> Values<Self>
    where
        Self: Sized,
    {
        Values {
            range: 0..Self::NUM_INDEXES,
            _item: PhantomData,
        }
    }

    /// Convert to a flat index.
    fn idx(&self) -> usize;

    /// Convert from a flat index.
    fn from_idx(idx: usize) -> Self;
}

/// Iterator over all values of a [`FixedSizeIndex`] type.
#[derive(Clone, Debug)]
pub struct Values<I> {
    range: Range<usize>,
    _item: PhantomData<I>,
}

impl<I: FixedSizeIndex> Iterator for Values<I> {
    type Item = I;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(I::from_idx)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl<I: FixedSizeIndex> ExactSizeIterator for Values<I> {}

impl<I: FixedSizeIndex> DoubleEndedIterator for Values<I> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.range.next_back().map(I::from_idx)
    }
}

impl<I: FixedSizeIndex> FusedIterator for Values<I> {}

#[cfg(feature = "serde")]
mod serde {
    use std::convert::TryFrom;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{FixedSizeIndex, IndexMap};

    impl<K, V> Serialize for IndexMap<K, V>
    where
        V: Serialize,
    {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.collect_seq(self.data.iter())
        }
    }

    impl<'de, K, V> Deserialize<'de> for IndexMap<K, V>
    where
        K: FixedSizeIndex,
        V: Deserialize<'de>,
    {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let data = Vec::<V>::deserialize(deserializer)?;
            let len = data.len();
            IndexMap::try_from(data).map_err(|_| {
                D::Error::invalid_length(len, &format!("{} values", K::NUM_INDEXES).as_str())
            })
        }
    }
}
