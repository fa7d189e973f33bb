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

//! Bit packing of unsigned integers, least significant bit first.
//!
//! Values are packed back to back with no padding between them: for `num_bits = 3`,
//! `[0, 1, 2, 3, 4, 5, 6, 7]` becomes `0b10001000, 0b11000110, 0b11111010`.
//! A pack of `N`-bit integers always holds `N` values (32 for `u32`, 64 for `u64`) and
//! occupies exactly `num_bits * N / 8` bytes.

use crate::errors::Result;

/// Returns the ceil of value / 8
#[inline]
pub fn ceil8(value: usize) -> usize {
    value / 8 + ((value % 8 != 0) as usize)
}

/// Number of bytes `length` values take when packed with `num_bits` bits each.
#[inline]
pub fn need_bytes(length: usize, num_bits: usize) -> usize {
    ceil8(length * num_bits)
}

/// Minimal number of bits needed to represent `max`.
#[inline]
pub fn get_bits_needed(max: u64) -> u32 {
    u64::BITS - max.leading_zeros()
}

/// Fails unless `num_bits` is in `0..=max_bits`.
#[inline]
pub fn check_width(num_bits: usize, max_bits: usize) -> Result<()> {
    if num_bits > max_bits {
        return Err(general_err!(
            "Bit width {} exceeds the maximum of {} bits",
            num_bits,
            max_bits
        ));
    }
    Ok(())
}

/// Generates `pack`/`unpack` taking the number of bits as a const generic, so that every
/// shift and mask is a constant once monomorphized.
macro_rules! bit_pack_impl {
    ($t:ty, $bytes:literal, $bits:tt) => {
        #[inline]
        fn read_word(input: &[u8], index: usize) -> $t {
            let mut word = [0u8; $bytes];
            word.copy_from_slice(&input[index * $bytes..(index + 1) * $bytes]);
            <$t>::from_le_bytes(word)
        }

        #[inline]
        fn or_word(output: &mut [u8], index: usize, value: $t) {
            let bytes = value.to_le_bytes();
            output[index * $bytes..(index + 1) * $bytes]
                .iter_mut()
                .zip(bytes.iter())
                .for_each(|(o, b)| *o |= *b);
        }

        pub fn unpack<const NUM_BITS: usize>(input: &[u8], output: &mut [$t; $bits]) {
            if NUM_BITS == 0 {
                output.fill(0);
                return;
            }
            let mask = <$t>::MAX >> ($bits - NUM_BITS);

            for (i, out) in output.iter_mut().enumerate() {
                let start_bit = i * NUM_BITS;
                let word = start_bit / $bits;
                let offset = start_bit % $bits;

                let mut value = read_word(input, word) >> offset;
                if offset + NUM_BITS > $bits {
                    value |= read_word(input, word + 1) << ($bits - offset);
                }
                *out = value & mask;
            }
        }

        pub fn pack<const NUM_BITS: usize>(input: &[$t; $bits], output: &mut [u8]) {
            output[..NUM_BITS * $bytes].fill(0);
            if NUM_BITS == 0 {
                return;
            }
            let mask = <$t>::MAX >> ($bits - NUM_BITS);

            for (i, value) in input.iter().enumerate() {
                let value = *value & mask;
                let start_bit = i * NUM_BITS;
                let word = start_bit / $bits;
                let offset = start_bit % $bits;

                or_word(output, word, value << offset);
                if offset + NUM_BITS > $bits {
                    or_word(output, word + 1, value >> ($bits - offset));
                }
            }
        }
    };
}

/// Generates the width-dispatching entry points. The `seq!` chain compiles to a jump table.
macro_rules! bit_pack {
    ($module:ident, $pack:ident, $unpack:ident, $encode:ident, $decode:ident, $t:ty, $bytes:literal, $bits:tt) => {
        mod $module {
            bit_pack_impl!($t, $bytes, $bits);
        }

        /// Unpacks one pack of `num_bits`-wide values from `input` into `output`.
        ///
        /// `input` must hold at least `num_bits * size_of::<T>()` bytes.
        pub fn $unpack(input: &[u8], output: &mut [$t; $bits], num_bits: usize) -> Result<()> {
            check_width(num_bits, $bits)?;
            if input.len() < num_bits * $bytes {
                return Err(general_err!(
                    "A pack of {}-bit values needs {} bytes, got {}",
                    num_bits,
                    num_bits * $bytes,
                    input.len()
                ));
            }
            seq_macro::seq!(i in 0..=$bits {
                if i == num_bits {
                    $module::unpack::<i>(input, output);
                    return Ok(());
                }
            });
            Err(general_err!("Invalid bit width {}", num_bits))
        }

        /// Packs one pack of values into `output`, keeping the lowest `num_bits` bits of each.
        ///
        /// `output` must hold at least `num_bits * size_of::<T>()` bytes.
        pub fn $pack(input: &[$t; $bits], output: &mut [u8], num_bits: usize) -> Result<()> {
            check_width(num_bits, $bits)?;
            if output.len() < num_bits * $bytes {
                return Err(general_err!(
                    "A pack of {}-bit values needs {} bytes, got {}",
                    num_bits,
                    num_bits * $bytes,
                    output.len()
                ));
            }
            seq_macro::seq!(i in 0..=$bits {
                if i == num_bits {
                    $module::pack::<i>(input, output);
                    return Ok(());
                }
            });
            Err(general_err!("Invalid bit width {}", num_bits))
        }

        /// Appends `values` packed with `num_bits` bits to `output`, using exactly
        /// `need_bytes(values.len(), num_bits)` bytes.
        pub fn $encode(values: &[$t], num_bits: usize, output: &mut Vec<u8>) -> Result<()> {
            check_width(num_bits, $bits)?;
            let mut unpacked = [0 as $t; $bits];
            let mut packed = [0u8; $bits * $bytes];
            for chunk in values.chunks($bits) {
                unpacked[..chunk.len()].copy_from_slice(chunk);
                unpacked[chunk.len()..].fill(0);
                $pack(&unpacked, &mut packed, num_bits)?;
                output.extend_from_slice(&packed[..need_bytes(chunk.len(), num_bits)]);
            }
            Ok(())
        }

        /// Unpacks `length` values of `num_bits` bits from the start of `input`, appending
        /// them to `output`. Returns the number of bytes consumed.
        pub fn $decode(
            input: &[u8],
            num_bits: usize,
            length: usize,
            output: &mut Vec<$t>,
        ) -> Result<usize> {
            check_width(num_bits, $bits)?;
            let total = need_bytes(length, num_bits);
            if input.len() < total {
                return Err(general_err!(
                    "{} values of {} bits need {} bytes, got {}",
                    length,
                    num_bits,
                    total,
                    input.len()
                ));
            }

            let chunk_bytes = num_bits * $bytes;
            let mut unpacked = [0 as $t; $bits];
            let mut scratch = [0u8; $bits * $bytes];
            let mut offset = 0;
            let mut remaining = length;
            while remaining > 0 {
                let take = remaining.min($bits);
                let bytes = need_bytes(take, num_bits);
                let packed = if bytes == chunk_bytes {
                    &input[offset..offset + bytes]
                } else {
                    // partial pack: unpack from a zero padded copy
                    scratch[..bytes].copy_from_slice(&input[offset..offset + bytes]);
                    scratch[bytes..].fill(0);
                    &scratch[..]
                };
                $unpack(packed, &mut unpacked, num_bits)?;
                output.extend_from_slice(&unpacked[..take]);
                offset += bytes;
                remaining -= take;
            }
            Ok(total)
        }
    };
}

bit_pack!(bit_pack32, pack32, unpack32, encode32, decode32, u32, 4, 32);
bit_pack!(bit_pack64, pack64, unpack64, encode64, decode64, u64, 8, 64);
