// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Key/value maps: pair count, then key and value for each pair.
//!
//! Pairs are produced by ordinary iteration, so a `HashMap` encodes in its
//! (unspecified) iteration order and a `BTreeMap` in key order. Decoding
//! inserts pairs in wire order; a repeated key is rejected.

use super::Wire;
use crate::buffer::{ReadCursor, WriteBuffer};
use crate::error::{CodecError, Result};
use crate::registry::{BuildContext, ElementCodec, Processor, Shape};
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// Container side of the map codec.
pub trait MapContainer: Sized + 'static {
    type Key: Wire;
    type Value: Wire;
    type Iter<'a>: Iterator<Item = (&'a Self::Key, &'a Self::Value)>
    where
        Self: 'a;

    fn pair_count(&self) -> usize;

    fn iter_pairs(&self) -> Self::Iter<'_>;

    fn with_pair_capacity(capacity: usize) -> Self;

    /// Insert a decoded pair; `false` if the key was already present.
    fn insert_pair(&mut self, key: Self::Key, value: Self::Value) -> bool;
}

impl<K, V, S> MapContainer for HashMap<K, V, S>
where
    K: Wire + Eq + Hash,
    V: Wire,
    S: BuildHasher + Default + 'static,
{
    type Key = K;
    type Value = V;
    type Iter<'a> = std::collections::hash_map::Iter<'a, K, V>;

    fn pair_count(&self) -> usize {
        self.len()
    }

    fn iter_pairs(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn with_pair_capacity(capacity: usize) -> Self {
        HashMap::with_capacity_and_hasher(capacity, S::default())
    }

    fn insert_pair(&mut self, key: K, value: V) -> bool {
        match self.entry(key) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }
}

impl<K: Wire + Ord, V: Wire> MapContainer for BTreeMap<K, V> {
    type Key = K;
    type Value = V;
    type Iter<'a> = std::collections::btree_map::Iter<'a, K, V>;

    fn pair_count(&self) -> usize {
        self.len()
    }

    fn iter_pairs(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn with_pair_capacity(_capacity: usize) -> Self {
        BTreeMap::new()
    }

    fn insert_pair(&mut self, key: K, value: V) -> bool {
        match self.entry(key) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }
}

fn encode_map<M: MapContainer>(
    keys: &ElementCodec<M::Key>,
    values: &ElementCodec<M::Value>,
    map: &M,
    buf: &mut WriteBuffer,
) -> Result<()> {
    buf.write_length(map.pair_count())?;
    for (key, value) in map.iter_pairs() {
        keys.encode(key, buf)?;
        values.encode(value, buf)?;
    }
    Ok(())
}

fn decode_map<M: MapContainer>(
    keys: &ElementCodec<M::Key>,
    values: &ElementCodec<M::Value>,
    cursor: &mut ReadCursor<'_>,
) -> Result<M> {
    let type_name = std::any::type_name::<M>();
    let count = cursor.read_present_length(type_name)?;
    cursor.check_count(count)?;
    let mut map = M::with_pair_capacity(count.min(cursor.remaining()));
    for _ in 0..count {
        let key = keys.decode(cursor)?;
        let value = values.decode(cursor)?;
        if !map.insert_pair(key, value) {
            return Err(CodecError::invalid_value(type_name, "duplicate key in map"));
        }
    }
    Ok(map)
}

pub(crate) fn build_map<M: MapContainer>(ctx: &mut BuildContext<'_>) -> Result<Processor<M>> {
    let keys = ctx.element::<M::Key>()?;
    let values = ctx.element::<M::Value>()?;
    let (enc_keys, enc_values) = (keys.clone(), values.clone());
    Ok(Processor::new(
        Shape::Map,
        Box::new(move |map: &M, buf: &mut WriteBuffer| {
            encode_map(&enc_keys, &enc_values, map, buf)
        }),
        Box::new(move |cursor: &mut ReadCursor<'_>| decode_map(&keys, &values, cursor)),
    ))
}

impl<K, V, S> Wire for HashMap<K, V, S>
where
    K: Wire + Eq + Hash,
    V: Wire,
    S: BuildHasher + Default + 'static,
{
    #[inline]
    fn shape() -> Shape {
        Shape::Map
    }

    fn build_processor(ctx: &mut BuildContext<'_>) -> Result<Processor<Self>> {
        build_map::<Self>(ctx)
    }
}

impl<K: Wire + Ord, V: Wire> Wire for BTreeMap<K, V> {
    #[inline]
    fn shape() -> Shape {
        Shape::Map
    }

    fn build_processor(ctx: &mut BuildContext<'_>) -> Result<Processor<Self>> {
        build_map::<Self>(ctx)
    }
}
