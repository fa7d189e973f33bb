use std::io::{Read, Take};

use byteorder::{LittleEndian, ReadBytesExt};

use super::{check_fits, MAX_BIT_WIDTH};
use crate::encodings::{uleb128, Decoder, Encoding};
use crate::errors::{Error, Operation, Result};
use crate::util::bit_pack::{ceil8, check_width, unpack32};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// The previous run is exhausted: the next byte is a run header.
    Header,
    Repeated { value: u32, remaining: usize },
    Packed { remaining: usize },
}

/// Decodes a hybrid stream of `num_bits`-wide unsigned values.
///
/// Bit-packed runs are unpacked 32 values at a time, and only when asked for, so the
/// decoder never reads past the run holding the last requested value.
#[derive(Debug)]
pub struct HybridRleDecoder<R> {
    reader: R,
    num_bits: u32,
    state: State,
    buffer: [u32; 32],
    buffer_pos: usize,
    buffer_len: usize,
}

impl<R: Read> HybridRleDecoder<R> {
    /// Creates a decoder whose bit width was agreed upon out of band.
    pub fn try_new(reader: R, num_bits: u32) -> Result<Self> {
        check_width(num_bits as usize, MAX_BIT_WIDTH as usize)
            .map_err(|e| e.within(Encoding::Rle, Operation::DecodeHeader))?;
        Ok(Self {
            reader,
            num_bits,
            state: State::Header,
            buffer: [0; 32],
            buffer_pos: 0,
            buffer_len: 0,
        })
    }

    /// Creates a decoder over a stream prefixed by its byte length, as a 4-byte
    /// little-endian integer. The decoder cannot read past that length.
    pub fn try_new_sized(mut reader: R, num_bits: u32) -> Result<HybridRleDecoder<Take<R>>> {
        let length = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| Error::from(e).within(Encoding::Rle, Operation::DecodeHeader))?;
        HybridRleDecoder::try_new(reader.take(u64::from(length)), num_bits)
    }

    /// Creates a decoder over a stream whose first byte is the bit width.
    pub fn try_new_dictionary_indices(mut reader: R) -> Result<Self> {
        let num_bits = reader
            .read_u8()
            .map_err(|e| Error::from(e).within(Encoding::RleDictionary, Operation::DecodeHeader))?;
        Self::try_new(reader, u32::from(num_bits))
    }

    pub fn num_bits(&self) -> u32 {
        self.num_bits
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_header(&mut self) -> Result<()> {
        // a stream may end between two runs, but not inside a header
        let first = self
            .reader
            .read_u8()
            .map_err(|e| Error::from(e).within(Encoding::Rle, Operation::DecodeHeader))?;
        let header = uleb128::read_u32(&mut [first].as_slice().chain(&mut self.reader))
            .map_err(|e| match e {
                Error::Io(e) => general_err!("Truncated run header: {}", e),
                Error::OutOfRange(s) => general_err!("Invalid run header: {}", s),
                other => other,
            })
            .map_err(|e| e.within(Encoding::Rle, Operation::DecodeHeader))?;

        let length = (header >> 1) as usize;
        if header & 1 == 1 {
            log::trace!("bit-packed run of {} groups", length);
            self.state = State::Packed {
                remaining: length * 8,
            };
        } else {
            let value = self
                .read_repeated_value()
                .map_err(|e| e.within(Encoding::Rle, Operation::DecodeBody))?;
            log::trace!("repeated run of {} x {}", length, value);
            self.state = State::Repeated {
                value,
                remaining: length,
            };
        }
        Ok(())
    }

    fn read_repeated_value(&mut self) -> Result<u32> {
        let bytes = ceil8(self.num_bits as usize);
        if bytes == 0 {
            return Ok(0);
        }
        let value = self.reader.read_uint::<LittleEndian>(bytes)? as u32;
        check_fits(value, self.num_bits).map_err(|_| {
            general_err!(
                "Repeated value {} does not fit in {} bits",
                value,
                self.num_bits
            )
        })?;
        Ok(value)
    }

    /// Unpacks the next (up to) 32 values of the current bit-packed run.
    fn load_packed(&mut self, remaining: usize) -> Result<()> {
        let take = remaining.min(32);
        // `take` is a multiple of 8, so this is a whole number of bytes
        let bytes = take * self.num_bits as usize / 8;
        let mut packed = [0u8; 32 * 4];
        self.reader
            .read_exact(&mut packed[..bytes])
            .map_err(|e| Error::from(e).within(Encoding::Rle, Operation::DecodeBody))?;
        unpack32(&packed, &mut self.buffer, self.num_bits as usize)
            .map_err(|e| e.within(Encoding::Rle, Operation::DecodeBody))?;
        self.buffer_pos = 0;
        self.buffer_len = take;
        self.state = State::Packed {
            remaining: remaining - take,
        };
        Ok(())
    }
}

impl<R: Read> Decoder for HybridRleDecoder<R> {
    type Item = u32;

    fn next_value(&mut self) -> Result<u32> {
        loop {
            if self.buffer_pos < self.buffer_len {
                let value = self.buffer[self.buffer_pos];
                self.buffer_pos += 1;
                return Ok(value);
            }
            match self.state {
                State::Repeated { value, remaining } if remaining > 0 => {
                    self.state = State::Repeated {
                        value,
                        remaining: remaining - 1,
                    };
                    return Ok(value);
                }
                State::Packed { remaining } if remaining > 0 => self.load_packed(remaining)?,
                _ => self.read_header()?,
            }
        }
    }

    fn decode_values(&mut self, output: &mut [u32]) -> Result<()> {
        let mut filled = 0;
        while filled < output.len() {
            let wanted = output.len() - filled;
            if self.buffer_pos < self.buffer_len {
                let n = (self.buffer_len - self.buffer_pos).min(wanted);
                output[filled..filled + n]
                    .copy_from_slice(&self.buffer[self.buffer_pos..self.buffer_pos + n]);
                self.buffer_pos += n;
                filled += n;
                continue;
            }
            match self.state {
                State::Repeated { value, remaining } if remaining > 0 => {
                    let n = remaining.min(wanted);
                    output[filled..filled + n].fill(value);
                    filled += n;
                    self.state = State::Repeated {
                        value,
                        remaining: remaining - n,
                    };
                }
                State::Packed { remaining } if remaining > 0 => self.load_packed(remaining)?,
                _ => self.read_header()?,
            }
        }
        Ok(())
    }
}
