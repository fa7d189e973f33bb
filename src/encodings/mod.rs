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

pub mod delta_bitpacked;
pub mod dictionary;
pub mod hybrid_rle;
pub mod levels;
pub mod plain;
pub mod uleb128;
pub mod zigzag_leb128;

use parquet_format_safe::Encoding as ThriftEncoding;

use crate::errors::{Error, Result};

/// Encodings of values inside a page, identified as in the page header.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, serde::Serialize, serde::Deserialize,
)]
pub enum Encoding {
    /// Default byte encoding.
    /// - NUMBER - 1-8 bytes per value, stored as little-endian.
    Plain,

    /// Deprecated dictionary encoding: a PLAIN dictionary page and RLE encoded ids.
    PlainDictionary,

    /// Run-length / bit-packed hybrid. Used for levels, booleans and dictionary ids.
    Rle,

    /// Delta encoding for integers, either INT32 or INT64.
    /// Works best on sorted data.
    DeltaBinaryPacked,

    /// Dictionary encoding.
    ///
    /// The ids are encoded using the RLE encoding.
    RleDictionary,
}

impl Default for Encoding {
    fn default() -> Self {
        Self::Plain
    }
}

impl Encoding {
    pub fn is_dictionary(&self) -> bool {
        matches!(self, Encoding::PlainDictionary | Encoding::RleDictionary)
    }

    pub fn from_codec(t: i32) -> Result<Self> {
        match t {
            0 => Ok(Encoding::Plain),
            2 => Ok(Encoding::PlainDictionary),
            3 => Ok(Encoding::Rle),
            5 => Ok(Encoding::DeltaBinaryPacked),
            8 => Ok(Encoding::RleDictionary),
            other => Err(nyi_err!("Encoding {} is not supported", other)),
        }
    }
}

impl From<Encoding> for i32 {
    fn from(value: Encoding) -> Self {
        match value {
            Encoding::Plain => 0,
            Encoding::PlainDictionary => 2,
            Encoding::Rle => 3,
            Encoding::DeltaBinaryPacked => 5,
            Encoding::RleDictionary => 8,
        }
    }
}

impl TryFrom<ThriftEncoding> for Encoding {
    type Error = Error;

    fn try_from(value: ThriftEncoding) -> Result<Self> {
        Encoding::from_codec(value.0)
    }
}

impl From<Encoding> for ThriftEncoding {
    fn from(value: Encoding) -> Self {
        ThriftEncoding(value.into())
    }
}

/// A pull based stream of values decoded from a byte source.
///
/// Decoders read from their source only when asked for a value and never read past the
/// end of the structure they decode.
pub trait Decoder {
    type Item: Copy;

    /// Decodes the next value.
    fn next_value(&mut self) -> Result<Self::Item>;

    /// Fills `output` with the next `output.len()` values.
    fn decode_values(&mut self, output: &mut [Self::Item]) -> Result<()> {
        for slot in output.iter_mut() {
            *slot = self.next_value()?;
        }
        Ok(())
    }

    /// Decodes the next `length` values. The output grows with the values actually
    /// decoded, so a length the input cannot hold fails before it is allocated.
    fn decode_vec(&mut self, length: usize) -> Result<Vec<Self::Item>>
    where
        Self::Item: Default,
    {
        let mut values = Vec::with_capacity(length.min(DECODE_CHUNK));
        let mut buffer = [<Self::Item as Default>::default(); DECODE_CHUNK];
        while values.len() < length {
            let chunk = &mut buffer[..(length - values.len()).min(DECODE_CHUNK)];
            self.decode_values(chunk)?;
            values.extend_from_slice(chunk);
        }
        Ok(values)
    }
}

/// Number of values [`Decoder::decode_vec`] decodes at a time.
pub const DECODE_CHUNK: usize = 1024;

/// An append-only sink of values.
///
/// Values may be buffered until [`Encoder::close`]; output is only complete once it
/// returned `Ok`.
pub trait Encoder {
    type Item: Copy;

    fn encode_values(&mut self, values: &[Self::Item]) -> Result<()>;

    /// Flushes every buffered run, group or block to the sink.
    fn close(&mut self) -> Result<()>;
}

/// A decoder without a byte source that yields the same value forever.
///
/// Stands in for level streams that are always zero and for columns whose every value
/// is known upfront.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantDecoder<T>(pub T);

impl<T: Copy> Decoder for ConstantDecoder<T> {
    type Item = T;

    #[inline]
    fn next_value(&mut self) -> Result<T> {
        Ok(self.0)
    }

    fn decode_values(&mut self, output: &mut [T]) -> Result<()> {
        output.fill(self.0);
        Ok(())
    }
}
