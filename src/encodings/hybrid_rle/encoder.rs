use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use super::{check_fits, MAX_BIT_WIDTH};
use crate::encodings::{uleb128, Encoder, Encoding};
use crate::errors::{Error, Operation, Result};
use crate::util::bit_pack::{ceil8, check_width, encode32};

/// Maximum number of groups of 8 in a bit-packed run, so that its header takes one byte.
const MAX_GROUPS_PER_BIT_PACKED_RUN: usize = 63;

/// Longest repeated run, so that its header fits in 32 bits.
const MAX_REPEATED_RUN: usize = (u32::MAX >> 1) as usize;

/// Encodes `num_bits`-wide unsigned values as a hybrid stream.
///
/// Values are buffered by groups of 8. A value repeated at least 8 times in a row
/// (starting at a group boundary) becomes a repeated run; everything else is
/// bit-packed. Consecutive bit-packed groups share a single header.
#[derive(Debug)]
pub struct HybridRleEncoder<W> {
    writer: W,
    num_bits: u32,

    buffered_values: [u32; 8],
    num_buffered_values: usize,

    // The last value seen and how many times in a row it was seen.
    current_value: u32,
    repeat_count: usize,

    // Complete groups waiting for their bit-packed header.
    literals: Vec<u32>,
    scratch: Vec<u8>,
}

impl<W: Write> HybridRleEncoder<W> {
    pub fn try_new(writer: W, num_bits: u32) -> Result<Self> {
        check_width(num_bits as usize, MAX_BIT_WIDTH as usize)
            .map_err(|e| e.within(Encoding::Rle, Operation::EncodeBody))?;
        Ok(Self {
            writer,
            num_bits,
            buffered_values: [0; 8],
            num_buffered_values: 0,
            current_value: 0,
            repeat_count: 0,
            literals: Vec::with_capacity(MAX_GROUPS_PER_BIT_PACKED_RUN * 8),
            scratch: vec![],
        })
    }

    pub fn num_bits(&self) -> u32 {
        self.num_bits
    }

    /// Returns the sink. Runs still buffered are lost unless [`Encoder::close`] was called.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Encodes `value`, which must fit in `num_bits` bits.
    pub fn put(&mut self, value: u32) -> Result<()> {
        check_fits(value, self.num_bits)?;
        if self.current_value == value && self.repeat_count > 0 {
            self.repeat_count += 1;
            if self.repeat_count > 8 {
                // continuation of a repeated run, nothing to buffer
                if self.repeat_count == MAX_REPEATED_RUN {
                    self.flush_repeated_run()?;
                }
                return Ok(());
            }
        } else {
            if self.repeat_count >= 8 {
                self.flush_repeated_run()?;
            }
            self.repeat_count = 1;
            self.current_value = value;
        }

        self.buffered_values[self.num_buffered_values] = value;
        self.num_buffered_values += 1;
        if self.num_buffered_values == 8 {
            self.flush_buffered_values()?;
        }
        Ok(())
    }

    fn flush_repeated_run(&mut self) -> Result<()> {
        let header = (self.repeat_count as u64) << 1;
        uleb128::write_u64(&mut self.writer, header)?;
        let value_bytes = ceil8(self.num_bits as usize);
        if value_bytes > 0 {
            self.writer
                .write_uint::<LittleEndian>(u64::from(self.current_value), value_bytes)?;
        }
        log::trace!(
            "repeated run of {} x {}",
            self.repeat_count,
            self.current_value
        );
        self.num_buffered_values = 0;
        self.repeat_count = 0;
        Ok(())
    }

    fn flush_bit_packed_run(&mut self) -> Result<()> {
        if self.literals.is_empty() {
            return Ok(());
        }
        let groups = (self.literals.len() / 8) as u64;
        uleb128::write_u64(&mut self.writer, (groups << 1) | 1)?;
        self.scratch.clear();
        encode32(&self.literals, self.num_bits as usize, &mut self.scratch)?;
        self.writer.write_all(&self.scratch)?;
        log::trace!("bit-packed run of {} groups", groups);
        self.literals.clear();
        Ok(())
    }

    fn flush_buffered_values(&mut self) -> Result<()> {
        if self.repeat_count >= 8 {
            // the whole group repeats one value: it opens a repeated run
            self.num_buffered_values = 0;
            return self.flush_bit_packed_run();
        }

        self.literals
            .extend_from_slice(&self.buffered_values[..self.num_buffered_values]);
        self.num_buffered_values = 0;
        self.repeat_count = 0;
        if self.literals.len() / 8 >= MAX_GROUPS_PER_BIT_PACKED_RUN {
            self.flush_bit_packed_run()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.literals.is_empty() && self.repeat_count == 0 && self.num_buffered_values == 0 {
            return Ok(());
        }
        let all_repeat = self.literals.is_empty()
            && (self.repeat_count == self.num_buffered_values || self.num_buffered_values == 0);
        if self.repeat_count > 0 && all_repeat {
            self.flush_repeated_run()?;
        } else {
            if self.num_buffered_values > 0 {
                // pad the last group with zeros
                self.buffered_values[self.num_buffered_values..].fill(0);
                self.literals.extend_from_slice(&self.buffered_values);
                self.num_buffered_values = 0;
            }
            self.flush_bit_packed_run()?;
            self.repeat_count = 0;
        }
        Ok(())
    }
}

impl<W: Write> Encoder for HybridRleEncoder<W> {
    type Item = u32;

    fn encode_values(&mut self, values: &[u32]) -> Result<()> {
        values
            .iter()
            .try_for_each(|value| self.put(*value))
            .map_err(|e| e.within(Encoding::Rle, Operation::EncodeBody))
    }

    fn close(&mut self) -> Result<()> {
        self.flush()
            .and_then(|_| self.writer.flush().map_err(Error::from))
            .map_err(|e| e.within(Encoding::Rle, Operation::Flush))
    }
}
