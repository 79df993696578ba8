//! Key/value collections.
//!
//! A map is written as a `u32` entry count followed by each key immediately followed by its
//! value. Entries go out in whatever order the collection iterates: `HashMap` gives no stable
//! order, so two equal maps may produce different bytes. Only the decoded values are guaranteed
//! to round-trip. Use `IndexMap` (insertion order) or `BTreeMap` (key order) when byte-stable
//! output matters.

use std::{
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, Hash},
    io::{Read, Write},
};

use indexmap::IndexMap;
use log::debug;

use crate::{
    io::PREALLOC_LIMIT,
    mapper::{primitives::SizeType, BoxMapper},
    size, Endian, Mapper, Result,
};

/// Associative collections a [`Map`] mapper can fill and drain.
pub trait Associative: Default {
    /// Key type
    type Key;
    /// Value type
    type Value;

    /// Create an empty collection with room for `capacity` entries.
    fn with_capacity(capacity: usize) -> Self;

    /// Number of entries.
    fn entry_count(&self) -> usize;

    /// Insert an entry, returning `true` if it replaced an existing one.
    fn insert_entry(&mut self, key: Self::Key, value: Self::Value) -> bool;

    /// Iterate over all entries in the collection's natural order.
    fn entries_mut(&mut self) -> Box<dyn Iterator<Item = (&Self::Key, &mut Self::Value)> + '_>;
}

impl<K: Eq + Hash, V, S: BuildHasher + Default> Associative for HashMap<K, V, S> {
    type Key = K;
    type Value = V;

    fn with_capacity(capacity: usize) -> Self {
        HashMap::with_capacity_and_hasher(capacity, S::default())
    }

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn insert_entry(&mut self, key: K, value: V) -> bool {
        self.insert(key, value).is_some()
    }

    fn entries_mut(&mut self) -> Box<dyn Iterator<Item = (&K, &mut V)> + '_> {
        Box::new(self.iter_mut())
    }
}

impl<K: Ord, V> Associative for BTreeMap<K, V> {
    type Key = K;
    type Value = V;

    fn with_capacity(_capacity: usize) -> Self {
        BTreeMap::new()
    }

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn insert_entry(&mut self, key: K, value: V) -> bool {
        self.insert(key, value).is_some()
    }

    fn entries_mut(&mut self) -> Box<dyn Iterator<Item = (&K, &mut V)> + '_> {
        Box::new(self.iter_mut())
    }
}

impl<K: Eq + Hash, V, S: BuildHasher + Default> Associative for IndexMap<K, V, S> {
    type Key = K;
    type Value = V;

    fn with_capacity(capacity: usize) -> Self {
        IndexMap::with_capacity_and_hasher(capacity, S::default())
    }

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn insert_entry(&mut self, key: K, value: V) -> bool {
        self.insert(key, value).is_some()
    }

    fn entries_mut(&mut self) -> Box<dyn Iterator<Item = (&K, &mut V)> + '_> {
        Box::new(self.iter_mut())
    }
}

/// Mapper for an associative collection.
///
/// Created with [`map`].
pub struct Map<'a, M, KF, VF> {
    target: &'a mut M,
    key: KF,
    value: VF,
}

impl<M, KF, VF> Mapper for Map<'_, M, KF, VF>
where
    M: Associative,
    M::Key: Default + Clone,
    M::Value: Default,
    KF: for<'e> FnMut(&'e mut M::Key) -> BoxMapper<'e>,
    VF: for<'e> FnMut(&'e mut M::Value) -> BoxMapper<'e>,
{
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        let mut count = 0u32;
        size(&mut count).read(r, endian)?;
        let count = count.to_usize()?;

        let mut entries = M::with_capacity(count.min(PREALLOC_LIMIT));
        for _ in 0..count {
            let mut key = M::Key::default();
            (self.key)(&mut key).read(r, endian)?;
            let mut value = M::Value::default();
            (self.value)(&mut value).read(r, endian)?;

            if entries.insert_entry(key, value) {
                debug!("Duplicate map key on the wire, keeping the later entry");
            }
        }

        *self.target = entries;
        Ok(())
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        let mut count = u32::from_usize(self.target.entry_count())?;
        size(&mut count).write(w, endian)?;

        for (key, value) in self.target.entries_mut() {
            let mut key = key.clone();
            (self.key)(&mut key).write(w, endian)?;
            (self.value)(value).write(w, endian)?;
        }
        Ok(())
    }
}

/// Maps an associative collection through a key factory and a value factory.
///
/// Reads replace the target with a freshly built collection once every entry decoded. Duplicate
/// keys are accepted, the last one wins.
///
/// # Examples
///
/// ```rust
/// use binmap::{int, map, null_term_string, Endian, Mapper};
/// use indexmap::IndexMap;
///
/// let mut ages: IndexMap<String, u8> = IndexMap::new();
/// ages.insert("a".to_string(), 30);
///
/// let mut out = Vec::new();
/// map(&mut ages, null_term_string, int).write(&mut out, Endian::Big)?;
/// assert_eq!(out, [0, 0, 0, 1, b'a', 0, 30]);
/// # Ok::<(), binmap::Error>(())
/// ```
pub fn map<'a, M, KF, VF>(target: &'a mut M, key: KF, value: VF) -> BoxMapper<'a>
where
    M: Associative + 'a,
    M::Key: Default + Clone,
    M::Value: Default,
    KF: for<'e> FnMut(&'e mut M::Key) -> BoxMapper<'e> + 'a,
    VF: for<'e> FnMut(&'e mut M::Value) -> BoxMapper<'e> + 'a,
{
    Box::new(Map { target, key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{byte, int, null_term_string, Error};

    #[test]
    fn hash_map_round_trip() {
        let mut source: HashMap<String, u32> = HashMap::new();
        source.insert("a".to_string(), 1);
        source.insert("bb".to_string(), 2);
        source.insert("ccc".to_string(), 3);
        source.insert("dddd".to_string(), 4);

        let mut out = Vec::new();
        map(&mut source, null_term_string, int)
            .write(&mut out, Endian::Big)
            .unwrap();
        // only the count prefix has a stable position
        assert_eq!(&out[..4], &[0, 0, 0, 4]);

        let mut decoded: HashMap<String, u32> = HashMap::new();
        decoded.insert("stale".to_string(), 9);
        map(&mut decoded, null_term_string, int)
            .read(&mut out.as_slice(), Endian::Big)
            .unwrap();
        assert_eq!(decoded, source);
    }

    #[test]
    fn btree_map_key_order() {
        let mut source = BTreeMap::new();
        source.insert(2u8, 20u8);
        source.insert(1u8, 10u8);

        let mut out = Vec::new();
        map(&mut source, byte, byte)
            .write(&mut out, Endian::Little)
            .unwrap();
        assert_eq!(out, [2, 0, 0, 0, 1, 10, 2, 20]);
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let mut decoded: IndexMap<u8, u8> = IndexMap::new();
        let input: &[u8] = &[0, 0, 0, 2, 7, 1, 7, 2];
        map(&mut decoded, byte, byte)
            .read(&mut &input[..], Endian::Big)
            .unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[&7], 2);
    }

    #[test]
    fn failed_read_keeps_target() {
        let mut decoded: HashMap<u8, u16> = HashMap::new();
        decoded.insert(1, 1);
        let input: &[u8] = &[0, 0, 0, 1, 5, 0];
        let result = map(&mut decoded, byte, int).read(&mut &input[..], Endian::Big);
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(decoded.get(&1), Some(&1));
    }
}
