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

//! The RLE / bit-packed hybrid encoding.
//!
//! A stream is a sequence of runs, each starting with a ULEB128 header `h`:
//! * `h` even: a repeated run of `h >> 1` copies of one value, stored little-endian in
//!   `ceil(num_bits / 8)` bytes;
//! * `h` odd: `h >> 1` groups of 8 values, bit-packed least significant bit first in
//!   `num_bits` bytes per group.
//!
//! The bit width is not part of the stream: it is derived from the maximum level, from the
//! dictionary size, or read from a leading byte (see [`HybridRleDecoder::try_new_dictionary_indices`]).

mod decoder;
mod encoder;

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

pub use decoder::HybridRleDecoder;
pub use encoder::HybridRleEncoder;

use super::{uleb128, Encoder, Encoding};
use crate::errors::{Operation, Result};
use crate::util::bit_pack::{ceil8, check_width, encode32};

/// Maximum bit width of hybrid encoded values.
pub const MAX_BIT_WIDTH: u32 = 32;

/// A single run of a hybrid stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Run {
    Repeated { value: u32, count: u32 },
    /// `values.len()` is a multiple of 8.
    Packed { num_bits: u8, values: Vec<u32> },
}

impl Run {
    /// Writes this run, header included. Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, writer: &mut W, num_bits: u32) -> Result<usize> {
        check_width(num_bits as usize, MAX_BIT_WIDTH as usize)?;
        match self {
            Run::Repeated { value, count } => {
                check_fits(*value, num_bits)?;
                let header = uleb128::write_u64(writer, u64::from(*count) << 1)?;
                let value_bytes = ceil8(num_bits as usize);
                if value_bytes > 0 {
                    writer.write_uint::<LittleEndian>(u64::from(*value), value_bytes)?;
                }
                Ok(header + value_bytes)
            }
            Run::Packed {
                num_bits: run_bits,
                values,
            } => {
                if u32::from(*run_bits) != num_bits {
                    return Err(general_err!(
                        "Run of {}-bit values in a {}-bit stream",
                        run_bits,
                        num_bits
                    ));
                }
                if values.len() % 8 != 0 {
                    return Err(general_err!(
                        "Bit-packed runs hold groups of 8 values, got {}",
                        values.len()
                    ));
                }
                for value in values {
                    check_fits(*value, num_bits)?;
                }
                let groups = (values.len() / 8) as u64;
                let header = uleb128::write_u64(writer, (groups << 1) | 1)?;
                let mut packed = Vec::with_capacity(values.len() * num_bits as usize / 8);
                encode32(values, num_bits as usize, &mut packed)?;
                writer.write_all(&packed)?;
                Ok(header + packed.len())
            }
        }
    }
}

#[inline]
pub(crate) fn check_fits(value: u32, num_bits: u32) -> Result<()> {
    if num_bits < 32 && value >> num_bits != 0 {
        return Err(range_err!(
            "Value {} does not fit in {} bits",
            value,
            num_bits
        ));
    }
    Ok(())
}

/// Encodes `values` and writes them prefixed by their byte length as a 4-byte
/// little-endian integer, the layout of levels in v1 data pages.
pub fn encode_length_prefixed<W: Write>(
    writer: &mut W,
    values: &[u32],
    num_bits: u32,
) -> Result<usize> {
    let mut encoder = HybridRleEncoder::try_new(vec![], num_bits)?;
    encoder.encode_values(values)?;
    encoder.close()?;
    let buffer = encoder.into_inner();
    let length = u32::try_from(buffer.len())
        .map_err(|e| crate::errors::Error::from(e).within(Encoding::Rle, Operation::Flush))?;
    writer.write_u32::<LittleEndian>(length)?;
    writer.write_all(&buffer)?;
    Ok(4 + buffer.len())
}

/// Encodes dictionary indices: a single byte with the bit width followed by the
/// hybrid encoded values.
pub fn encode_dictionary_indices<W: Write>(
    writer: &mut W,
    indices: &[u32],
    num_bits: u32,
) -> Result<usize> {
    check_width(num_bits as usize, MAX_BIT_WIDTH as usize)?;
    let mut encoder = HybridRleEncoder::try_new(vec![num_bits as u8], num_bits)?;
    encoder.encode_values(indices)?;
    encoder.close()?;
    let buffer = encoder.into_inner();
    writer.write_all(&buffer)?;
    Ok(buffer.len())
}
