use std::io::Read;

use super::{DeltaConfig, DeltaInteger};
use crate::encodings::{uleb128, zigzag_leb128, Decoder, Encoding};
use crate::errors::{Error, Operation, Result};
use crate::util::bit_pack::{check_width, decode64};

/// Number of deltas unpacked at once.
const PACK: usize = 64;

/// Decodes a delta binary packed stream of `T`.
///
/// The stream header and the header of the first block are read on construction, so
/// that an invalid geometry or bit width is reported before any value. Afterwards
/// miniblocks are read one at a time, when the first of their values is requested; once
/// the last value was produced the reader is positioned right after the stream.
#[derive(Debug)]
pub struct DeltaBitPackedDecoder<R, T> {
    reader: R,
    config: DeltaConfig,
    total_values: usize,
    /// Number of values produced so far.
    emitted: usize,

    last_value: T,
    min_delta: T,
    widths: Vec<u8>,
    /// Index of the next miniblock of the current block.
    next_miniblock: usize,

    /// Packed bytes of the current miniblock.
    miniblock: Vec<u8>,
    miniblock_pos: usize,
    num_bits: usize,
    /// Deltas of the current miniblock that are used and not yet unpacked.
    pending: usize,

    /// Unpacked deltas (minus the min delta), at most one pack of them.
    deltas: Vec<u64>,
    deltas_pos: usize,
}

impl<R: Read, T: DeltaInteger> DeltaBitPackedDecoder<R, T> {
    pub fn try_new(mut reader: R) -> Result<Self> {
        let (config, total_values, first_value) = read_header::<_, T>(&mut reader)
            .map_err(|e| e.within(Encoding::DeltaBinaryPacked, Operation::DecodeHeader))?;
        log::trace!(
            "delta stream of {} values, blocks of {} in {} miniblocks",
            total_values,
            config.block_size,
            config.miniblocks_per_block
        );

        let mut decoder = Self {
            reader,
            config,
            total_values,
            emitted: 0,
            last_value: first_value,
            min_delta: T::zero(),
            widths: vec![],
            next_miniblock: config.miniblocks_per_block,
            miniblock: vec![],
            miniblock_pos: 0,
            num_bits: 0,
            pending: 0,
            deltas: Vec::with_capacity(PACK),
            deltas_pos: 0,
        };
        if total_values > 1 {
            decoder
                .read_block_header()
                .map_err(|e| e.within(Encoding::DeltaBinaryPacked, Operation::DecodeHeader))?;
        }
        Ok(decoder)
    }

    /// The number of values declared in the stream header.
    pub fn total_values(&self) -> usize {
        self.total_values
    }

    /// The number of values not yet produced.
    pub fn remaining(&self) -> usize {
        self.total_values - self.emitted
    }

    pub fn config(&self) -> DeltaConfig {
        self.config
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_block_header(&mut self) -> Result<()> {
        let min_delta = zigzag_leb128::read_i64(&mut self.reader)?;
        // deltas wrap around at the physical width
        self.min_delta = T::from_unsigned(min_delta as u64);

        // the header geometry is untrusted: buffers only grow with the bytes that exist
        self.widths.clear();
        (&mut self.reader)
            .take(self.config.miniblocks_per_block as u64)
            .read_to_end(&mut self.widths)?;
        if self.widths.len() < self.config.miniblocks_per_block {
            return Err(unexpected_eof());
        }

        // widths of miniblocks after the last value are arbitrary and never used
        let remaining_deltas = self.total_values - self.emitted.max(1);
        let per_miniblock = self.config.values_per_miniblock();
        let needed =
            (remaining_deltas.min(self.config.block_size) + per_miniblock - 1) / per_miniblock;
        for width in &self.widths[..needed] {
            check_width(*width as usize, T::MAX_BIT_WIDTH)?;
        }
        log::trace!(
            "delta block with min delta {} and widths {:?}",
            min_delta,
            &self.widths[..needed]
        );
        self.next_miniblock = 0;
        Ok(())
    }

    fn read_miniblock(&mut self) -> Result<()> {
        if self.next_miniblock == self.config.miniblocks_per_block {
            self.read_block_header()
                .map_err(|e| e.within(Encoding::DeltaBinaryPacked, Operation::DecodeHeader))?;
        }
        let num_bits = self.widths[self.next_miniblock] as usize;
        let length = self.config.values_per_miniblock();
        let bytes = length * num_bits / 8;

        self.miniblock.clear();
        (&mut self.reader)
            .take(bytes as u64)
            .read_to_end(&mut self.miniblock)
            .map_err(|e| Error::from(e).within(Encoding::DeltaBinaryPacked, Operation::DecodeBody))?;
        if self.miniblock.len() < bytes {
            return Err(
                unexpected_eof().within(Encoding::DeltaBinaryPacked, Operation::DecodeBody)
            );
        }

        self.num_bits = num_bits;
        self.miniblock_pos = 0;
        // the last miniblock is padded: its trailing deltas are never unpacked
        self.pending = length.min(self.remaining());
        self.next_miniblock += 1;
        Ok(())
    }

    /// Unpacks the next pack of deltas, moving to the next miniblock when needed.
    fn unpack_deltas(&mut self) -> Result<()> {
        if self.pending == 0 {
            self.read_miniblock()?;
        }
        let length = self.pending.min(PACK);
        self.deltas.clear();
        let consumed = decode64(
            &self.miniblock[self.miniblock_pos..],
            self.num_bits,
            length,
            &mut self.deltas,
        )
        .map_err(|e| e.within(Encoding::DeltaBinaryPacked, Operation::DecodeBody))?;
        self.miniblock_pos += consumed;
        self.pending -= length;
        self.deltas_pos = 0;
        Ok(())
    }
}

fn unexpected_eof() -> Error {
    Error::from(std::io::Error::from(std::io::ErrorKind::UnexpectedEof))
}

fn read_header<R: Read, T: DeltaInteger>(reader: &mut R) -> Result<(DeltaConfig, usize, T)> {
    let block_size = uleb128::read_u32(reader)? as usize;
    let miniblocks_per_block = uleb128::read_u32(reader)? as usize;
    let total_values = usize::try_from(uleb128::read_u64(reader)?)?;
    let first_value = zigzag_leb128::read_i64(reader)?;

    let config = DeltaConfig {
        block_size,
        miniblocks_per_block,
    };
    config.validate()?;
    let first_value = T::from_i64(first_value).ok_or_else(|| {
        range_err!(
            "First value {} does not fit in {} bits",
            first_value,
            T::MAX_BIT_WIDTH
        )
    })?;
    Ok((config, total_values, first_value))
}

impl<R: Read, T: DeltaInteger> Decoder for DeltaBitPackedDecoder<R, T> {
    type Item = T;

    fn next_value(&mut self) -> Result<T> {
        if self.emitted == self.total_values {
            return Err(Error::from(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("all {} values were decoded", self.total_values),
            ))
            .within(Encoding::DeltaBinaryPacked, Operation::DecodeBody));
        }
        if self.emitted > 0 {
            if self.deltas_pos == self.deltas.len() {
                self.unpack_deltas()?;
            }
            let delta = T::from_unsigned(self.deltas[self.deltas_pos]);
            self.deltas_pos += 1;
            self.last_value = self
                .last_value
                .wrapping_add(&self.min_delta)
                .wrapping_add(&delta);
        }
        self.emitted += 1;
        Ok(self.last_value)
    }
}

impl<R: Read, T: DeltaInteger> Iterator for DeltaBitPackedDecoder<R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted == self.total_values {
            return None;
        }
        Some(self.next_value())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}
