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

//! Delta binary packed encoding of 32 and 64-bit integers.
//!
//! ```text
//! <header> <block 1> <block 2> ... <block n>
//! header: <block size> <miniblocks per block> <total value count> <first value>
//! block:  <min delta> <bit width of each miniblock> <miniblock 1> ... <miniblock m>
//! ```
//!
//! Every number in the headers is a ULEB128 varint, the first value and the min delta
//! are zigzag encoded. Miniblocks hold `block size / miniblocks per block` deltas minus
//! the block's min delta, bit-packed with the miniblock's width. The last miniblock is
//! padded up to its full size; miniblocks after it still have a width byte but no body.

mod decoder;
mod encoder;

use std::fmt::Debug;

use num::traits::{PrimInt, WrappingAdd, WrappingSub};
use serde::{Deserialize, Serialize};

pub use decoder::DeltaBitPackedDecoder;
pub use encoder::DeltaBitPackedEncoder;

use crate::errors::Result;

/// Physical integer types the delta engine runs on. Arithmetic happens at this width
/// and wraps around.
pub trait DeltaInteger:
    PrimInt + WrappingAdd + WrappingSub + Debug + Default + Send + Sync + 'static
{
    /// Widest miniblock this type accepts.
    const MAX_BIT_WIDTH: usize;

    /// Converts a decoded header value, failing if it does not fit.
    fn from_i64(value: i64) -> Option<Self>;

    fn to_i64(self) -> i64;

    /// Keeps the lowest bits of an unpacked value.
    fn from_unsigned(value: u64) -> Self;

    /// The bit pattern of `self`, zero extended.
    fn to_unsigned(self) -> u64;
}

impl DeltaInteger for i32 {
    const MAX_BIT_WIDTH: usize = 32;

    #[inline]
    fn from_i64(value: i64) -> Option<Self> {
        i32::try_from(value).ok()
    }

    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }

    #[inline]
    fn from_unsigned(value: u64) -> Self {
        value as u32 as i32
    }

    #[inline]
    fn to_unsigned(self) -> u64 {
        self as u32 as u64
    }
}

impl DeltaInteger for i64 {
    const MAX_BIT_WIDTH: usize = 64;

    #[inline]
    fn from_i64(value: i64) -> Option<Self> {
        Some(value)
    }

    #[inline]
    fn to_i64(self) -> i64 {
        self
    }

    #[inline]
    fn from_unsigned(value: u64) -> Self {
        value as i64
    }

    #[inline]
    fn to_unsigned(self) -> u64 {
        self as u64
    }
}

/// Block geometry of the delta encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeltaConfig {
    pub block_size: usize,
    pub miniblocks_per_block: usize,
}

impl Default for DeltaConfig {
    fn default() -> Self {
        Self {
            block_size: 128,
            miniblocks_per_block: 4,
        }
    }
}

impl DeltaConfig {
    pub fn try_new(block_size: usize, miniblocks_per_block: usize) -> Result<Self> {
        let config = Self {
            block_size,
            miniblocks_per_block,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that blocks split into miniblocks holding a multiple of 8 values.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 || self.miniblocks_per_block == 0 {
            return Err(general_err!(
                "Invalid delta geometry: block size {} with {} miniblocks",
                self.block_size,
                self.miniblocks_per_block
            ));
        }
        if self.block_size % self.miniblocks_per_block != 0 {
            return Err(general_err!(
                "Block size {} is not a multiple of the number of miniblocks {}",
                self.block_size,
                self.miniblocks_per_block
            ));
        }
        if self.values_per_miniblock() % 8 != 0 {
            return Err(general_err!(
                "Miniblocks of {} values are not a multiple of 8",
                self.values_per_miniblock()
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn values_per_miniblock(&self) -> usize {
        self.block_size / self.miniblocks_per_block
    }
}
