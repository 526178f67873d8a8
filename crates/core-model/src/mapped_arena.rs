// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A wrapper around a `typed_generational_arena::Arena` that also provides lookup by name.
//!
//! Models, non-model types, and enums are all addressed by their schema name while the
//! resolution passes run (a relationship field only knows the name of the type it points to).
//! The name map is an `IndexMap`, so iterating the arena yields entries in the order they were
//! declared in the schema, and serializing it produces a name-keyed map in that same order.

use std::ops;

use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeMap};

use typed_generational_arena::{Arena, IgnoreGeneration, Index};

pub type SerializableSlab<T> = Arena<T, usize, IgnoreGeneration>;
pub type SerializableSlabIndex<T> = Index<T, usize, IgnoreGeneration>;

#[derive(Debug, Clone)]
pub struct MappedArena<V> {
    values: SerializableSlab<V>,
    map: IndexMap<String, SerializableSlabIndex<V>>,
}

impl<V> MappedArena<V> {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(|k| k.as_str())
    }

    /// Ids in declaration order. Collecting them first lets callers mutate entries while walking.
    pub fn ids(&self) -> Vec<SerializableSlabIndex<V>> {
        self.map.values().copied().collect()
    }

    pub fn get_id(&self, key: &str) -> Option<SerializableSlabIndex<V>> {
        self.map.get(key).copied()
    }

    pub fn get_by_key(&self, key: &str) -> Option<&V> {
        self.get_id(key).map(|id| &self[id])
    }

    pub fn get_by_key_mut(&mut self, key: &str) -> Option<&mut V> {
        self.get_id(key).map(|id| &mut self.values[id])
    }

    /// Adds a value under `key` unless one is already registered, in which case the existing id
    /// is returned and `typ` is dropped.
    pub fn add(&mut self, key: &str, typ: V) -> SerializableSlabIndex<V> {
        if let Some(existing) = self.get_id(key) {
            return existing;
        }

        let id = self.values.insert(typ);
        self.map.insert(key.to_string(), id);
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = (SerializableSlabIndex<V>, &V)> {
        self.map.values().map(|id| (*id, &self.values[*id]))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.map.values().map(|id| &self.values[*id])
    }
}

impl<V> Default for MappedArena<V> {
    fn default() -> Self {
        MappedArena {
            values: SerializableSlab::new(),
            map: IndexMap::default(),
        }
    }
}

impl<V> ops::Index<SerializableSlabIndex<V>> for MappedArena<V> {
    type Output = V;

    #[inline]
    fn index(&self, id: SerializableSlabIndex<V>) -> &V {
        &self.values[id]
    }
}

impl<V> ops::IndexMut<SerializableSlabIndex<V>> for MappedArena<V> {
    #[inline]
    fn index_mut(&mut self, id: SerializableSlabIndex<V>) -> &mut V {
        &mut self.values[id]
    }
}

impl<V: Serialize> Serialize for MappedArena<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.map.len()))?;
        for (name, id) in self.map.iter() {
            map.serialize_entry(name, &self.values[*id])?;
        }
        map.end()
    }
}
