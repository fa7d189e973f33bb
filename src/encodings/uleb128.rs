//! Unsigned LEB128: little-endian base 128 with the continuation flag in the most
//! significant bit of every byte.

use std::io::{Read, Write};

use byteorder::ReadBytesExt;

use crate::errors::Result;

/// Maximum number of bytes a `u64` takes.
pub const MAX_LEN: usize = 10;

/// Reads one varint byte by byte, so that the reader stops right after its last byte.
pub fn read_u64<R: Read + ?Sized>(reader: &mut R) -> Result<u64> {
    let mut result = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = reader.read_u8()?;
        let payload = u64::from(byte & 0x7f);
        if (shift == 63 && payload > 1) || shift > 63 {
            return Err(range_err!("Varint does not fit in 64 bits"));
        }
        result |= payload << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}

/// Reads a varint declared to be at most 32 bits wide.
pub fn read_u32<R: Read + ?Sized>(reader: &mut R) -> Result<u32> {
    let value = read_u64(reader)?;
    u32::try_from(value).map_err(|_| range_err!("Varint {} does not fit in 32 bits", value))
}

/// Encodes `value` into `container`, returning the number of bytes used. Always emits the
/// minimal number of bytes.
pub fn encode(mut value: u64, container: &mut [u8; MAX_LEN]) -> usize {
    let mut consumed = 0;
    loop {
        let mut byte = (value as u8) & 0x7f;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        container[consumed] = byte;
        consumed += 1;
        if value == 0 {
            return consumed;
        }
    }
}

/// Writes `value` and returns the number of bytes written.
pub fn write_u64<W: Write + ?Sized>(writer: &mut W, value: u64) -> Result<usize> {
    let mut container = [0u8; MAX_LEN];
    let len = encode(value, &mut container);
    writer.write_all(&container[..len])?;
    Ok(len)
}
