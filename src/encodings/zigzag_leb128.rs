//! Zigzag mapped LEB128 for signed integers: `0, -1, 1, -2, ...` map to `0, 1, 2, 3, ...`.

use std::io::{Read, Write};

use super::uleb128;
use crate::errors::Result;

#[inline]
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[inline]
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

pub fn read_i64<R: Read + ?Sized>(reader: &mut R) -> Result<i64> {
    uleb128::read_u64(reader).map(zigzag_decode)
}

/// Reads a zigzag varint whose decoded value must fit in an `i32`.
pub fn read_i32<R: Read + ?Sized>(reader: &mut R) -> Result<i32> {
    let value = read_i64(reader)?;
    i32::try_from(value).map_err(|_| range_err!("Varint {} does not fit in 32 bits", value))
}

pub fn encode(value: i64, container: &mut [u8; uleb128::MAX_LEN]) -> usize {
    uleb128::encode(zigzag_encode(value), container)
}

pub fn write_i64<W: Write + ?Sized>(writer: &mut W, value: i64) -> Result<usize> {
    uleb128::write_u64(writer, zigzag_encode(value))
}
