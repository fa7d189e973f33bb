// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::io::{Read, Write};
use std::sync::Arc;

use hashbrown::hash_map::RawEntryMut;
use hashbrown::HashMap;

use super::hybrid_rle::{encode_dictionary_indices, HybridRleDecoder};
use super::plain::{PlainDecoder, PlainEncoder};
use super::{Decoder, Encoder, Encoding};
use crate::errors::{Operation, Result};
use crate::types::NativeType;
use crate::util::bit_pack::get_bits_needed;

const DEFAULT_DEDUP_CAPACITY: usize = 4096;

/// Interns values, handing out dense ids in insertion order.
///
/// Values are hashed and compared by their bytes, so `-0.0` and `0.0` are two entries
/// and a NaN is equal to itself.
#[derive(Debug, Default)]
pub struct DictMap<T> {
    state: ahash::RandomState,
    dedup: HashMap<u32, (), ()>,
    sets: Vec<T>,
}

impl<T: NativeType> DictMap<T> {
    pub fn new() -> Self {
        Self {
            state: Default::default(),
            dedup: HashMap::with_capacity_and_hasher(DEFAULT_DEDUP_CAPACITY, ()),
            sets: vec![],
        }
    }

    pub fn entry_key(&mut self, value: &T) -> u32 {
        let bytes = bytemuck::bytes_of(value);
        let hash = self.state.hash_one(bytes);

        let entry = self
            .dedup
            .raw_entry_mut()
            .from_hash(hash, |index| {
                bytes == bytemuck::bytes_of(&self.sets[*index as usize])
            });

        match entry {
            RawEntryMut::Occupied(entry) => *entry.into_key(),
            RawEntryMut::Vacant(entry) => {
                let key = self.sets.len() as u32;
                self.sets.push(*value);
                *entry
                    .insert_with_hasher(hash, key, (), |key| {
                        self.state
                            .hash_one(bytemuck::bytes_of(&self.sets[*key as usize]))
                    })
                    .0
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn values(&self) -> &[T] {
        &self.sets
    }
}

/// Dictionary encoder.
/// The dictionary encoding builds a dictionary of values encountered in a given column.
/// The dictionary page is written first, before the data pages of the column chunk.
///
/// Dictionary page format: the entries in the dictionary - in dictionary order -
/// using the plain encoding.
///
/// Data page format: the bit width used to encode the entry ids stored as 1 byte
/// (max bit width = 32), followed by the values encoded using RLE/Bit packed described
/// above (with the given bit width).
#[derive(Debug, Default)]
pub struct DictEncoder<T> {
    interner: DictMap<T>,
    indices: Vec<u32>,
}

impl<T: NativeType> DictEncoder<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            interner: DictMap::new(),
            indices: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: &T) -> u32 {
        let key = self.interner.entry_key(value);
        self.indices.push(key);
        key
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn dictionary(&self) -> &[T] {
        self.interner.values()
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Bit width of the ids of a dictionary of this size.
    pub fn bit_width(&self) -> u32 {
        dictionary_bit_width(self.interner.len())
    }

    /// Writes the dictionary page body: the entries in the plain encoding.
    pub fn write_dictionary<W: Write>(&self, writer: W) -> Result<usize> {
        let mut encoder = PlainEncoder::new(writer);
        encoder.encode_values(self.dictionary())?;
        encoder.close()?;
        Ok(std::mem::size_of_val(self.dictionary()))
    }

    /// Writes the ids of `range` of the pushed values, as a data page body.
    pub fn write_indices<W: Write>(
        &self,
        writer: &mut W,
        range: std::ops::Range<usize>,
    ) -> Result<usize> {
        let indices = self.indices.get(range.clone()).ok_or_else(|| {
            range_err!(
                "Range {:?} out of {} dictionary ids",
                range,
                self.indices.len()
            )
        })?;
        encode_dictionary_indices(writer, indices, self.bit_width())
            .map_err(|e| e.within(Encoding::RleDictionary, Operation::Flush))
    }
}

#[inline]
pub fn dictionary_bit_width(len: usize) -> u32 {
    get_bits_needed(len.saturating_sub(1) as u64)
}

/// Reads a dictionary page body of `num_values` entries.
pub fn read_dictionary<R: Read, T: NativeType>(reader: R, num_values: usize) -> Result<Vec<T>> {
    PlainDecoder::new(reader).read_vec(num_values)
}

/// Resolves dictionary ids read from a width-prefixed hybrid stream.
#[derive(Debug)]
pub struct DictionaryDecoder<R, T> {
    indices: HybridRleDecoder<R>,
    dictionary: Arc<[T]>,
}

impl<R: Read, T: NativeType> DictionaryDecoder<R, T> {
    pub fn try_new(reader: R, dictionary: Arc<[T]>) -> Result<Self> {
        let indices = HybridRleDecoder::try_new_dictionary_indices(reader)?;
        Ok(Self {
            indices,
            dictionary,
        })
    }

    pub fn dictionary(&self) -> &[T] {
        &self.dictionary
    }

    pub fn into_inner(self) -> R {
        self.indices.into_inner()
    }

    #[inline]
    fn lookup(&self, index: u32) -> Result<T> {
        self.dictionary.get(index as usize).copied().ok_or_else(|| {
            general_err!(
                "Dictionary id {} out of a dictionary of {} entries",
                index,
                self.dictionary.len()
            )
            .within(Encoding::RleDictionary, Operation::DecodeBody)
        })
    }
}

impl<R: Read, T: NativeType> Decoder for DictionaryDecoder<R, T> {
    type Item = T;

    fn next_value(&mut self) -> Result<T> {
        let index = self.indices.next_value()?;
        self.lookup(index)
    }

    fn decode_values(&mut self, output: &mut [T]) -> Result<()> {
        let mut ids = [0u32; 64];
        for chunk in output.chunks_mut(ids.len()) {
            let ids = &mut ids[..chunk.len()];
            self.indices.decode_values(ids)?;
            for (slot, id) in chunk.iter_mut().zip(ids.iter()) {
                *slot = self.lookup(*id)?;
            }
        }
        Ok(())
    }
}
