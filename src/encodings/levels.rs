//! Repetition and definition levels.

use std::io::{Read, Take, Write};

use super::hybrid_rle::{encode_length_prefixed, HybridRleDecoder};
use super::{ConstantDecoder, Decoder, Encoding, DECODE_CHUNK};
use crate::errors::{Operation, Result};
use crate::util::bit_pack::get_bits_needed;

/// Bit width of levels in `[0, max_level]`.
#[inline]
pub fn level_bit_width(max_level: u16) -> u32 {
    get_bits_needed(u64::from(max_level))
}

/// Where levels come from.
#[derive(Debug)]
pub enum LevelSource<R> {
    /// No bytes at all: every level is the same.
    Constant(ConstantDecoder<u32>),
    Rle(HybridRleDecoder<R>),
}

impl<R: Read> Decoder for LevelSource<R> {
    type Item = u32;

    #[inline]
    fn next_value(&mut self) -> Result<u32> {
        match self {
            LevelSource::Constant(decoder) => decoder.next_value(),
            LevelSource::Rle(decoder) => decoder.next_value(),
        }
    }

    fn decode_values(&mut self, output: &mut [u32]) -> Result<()> {
        match self {
            LevelSource::Constant(decoder) => decoder.decode_values(output),
            LevelSource::Rle(decoder) => decoder.decode_values(output),
        }
    }
}

/// A stream of levels, each within `[0, max_level]`.
#[derive(Debug)]
pub struct LevelDecoder<D> {
    source: D,
    max_level: u16,
}

impl<D: Decoder<Item = u32>> LevelDecoder<D> {
    pub fn new(source: D, max_level: u16) -> Self {
        Self { source, max_level }
    }

    pub fn max_level(&self) -> u16 {
        self.max_level
    }

    pub fn next_level(&mut self) -> Result<u16> {
        let level = self.source.next_value()?;
        self.check(level)
    }

    /// Fills `output` with the next levels.
    pub fn decode_levels(&mut self, output: &mut [u16]) -> Result<()> {
        let mut buffer = [0u32; 64];
        for chunk in output.chunks_mut(buffer.len()) {
            let buffer = &mut buffer[..chunk.len()];
            self.source.decode_values(buffer)?;
            for (slot, level) in chunk.iter_mut().zip(buffer.iter()) {
                *slot = self.check(*level)?;
            }
        }
        Ok(())
    }

    /// Reads the next `length` levels into a buffer that grows as they are decoded.
    pub fn read_levels(&mut self, length: usize) -> Result<Vec<u16>> {
        let mut levels = Vec::with_capacity(length.min(DECODE_CHUNK));
        let mut buffer = [0u16; DECODE_CHUNK];
        while levels.len() < length {
            let chunk = &mut buffer[..(length - levels.len()).min(DECODE_CHUNK)];
            self.decode_levels(chunk)?;
            levels.extend_from_slice(chunk);
        }
        Ok(levels)
    }

    pub fn into_inner(self) -> D {
        self.source
    }

    #[inline]
    fn check(&self, level: u32) -> Result<u16> {
        if level > u32::from(self.max_level) {
            return Err(general_err!(
                "Level {} exceeds the maximum level {}",
                level,
                self.max_level
            )
            .within(Encoding::Rle, Operation::DecodeBody));
        }
        Ok(level as u16)
    }
}

impl<R: Read> LevelDecoder<LevelSource<Take<R>>> {
    /// Levels of a v1 data page: nothing when `max_level` is 0, otherwise a hybrid stream
    /// prefixed by its byte length.
    pub fn try_new_v1(reader: R, max_level: u16) -> Result<Self> {
        if max_level == 0 {
            return Ok(Self::constant(0, 0));
        }
        let decoder = HybridRleDecoder::try_new_sized(reader, level_bit_width(max_level))?;
        Ok(Self::new(LevelSource::Rle(decoder), max_level))
    }
}

impl<R: Read> LevelDecoder<LevelSource<R>> {
    /// A level stream that consumes no bytes and always yields `value`.
    pub fn constant(value: u16, max_level: u16) -> Self {
        Self::new(
            LevelSource::Constant(ConstantDecoder(u32::from(value))),
            max_level,
        )
    }
}

/// Writes levels the way [`LevelDecoder::try_new_v1`] reads them.
pub fn encode_levels_v1<W: Write>(
    writer: &mut W,
    levels: &[u16],
    max_level: u16,
) -> Result<usize> {
    if max_level == 0 {
        return Ok(0);
    }
    let levels = levels.iter().map(|x| u32::from(*x)).collect::<Vec<_>>();
    encode_length_prefixed(writer, &levels, level_bit_width(max_level))
}
