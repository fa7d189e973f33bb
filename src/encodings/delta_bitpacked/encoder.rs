use std::io::Write;

use super::{DeltaConfig, DeltaInteger};
use crate::encodings::{uleb128, zigzag_leb128, Encoder, Encoding};
use crate::errors::{Error, Operation, Result};
use crate::util::bit_pack::{encode64, get_bits_needed};

/// Encodes `T` as a delta binary packed stream.
///
/// The stream header holds the total number of values, so blocks are encoded into an
/// internal buffer and everything reaches the writer on [`Encoder::close`].
#[derive(Debug)]
pub struct DeltaBitPackedEncoder<W, T> {
    writer: W,
    config: DeltaConfig,

    first_value: T,
    previous: T,
    total_values: u64,
    /// Deltas of the current block, never `block_size` long between calls.
    deltas: Vec<T>,

    body: Vec<u8>,
    unpacked: Vec<u64>,
    closed: bool,
}

impl<W: Write, T: DeltaInteger> DeltaBitPackedEncoder<W, T> {
    pub fn try_new(writer: W, config: DeltaConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| e.within(Encoding::DeltaBinaryPacked, Operation::EncodeBody))?;
        Ok(Self {
            writer,
            config,
            first_value: T::zero(),
            previous: T::zero(),
            total_values: 0,
            deltas: Vec::with_capacity(config.block_size),
            body: vec![],
            unpacked: Vec::with_capacity(config.values_per_miniblock()),
            closed: false,
        })
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn put(&mut self, value: T) -> Result<()> {
        if self.closed {
            return Err(general_err!("Encoder already closed"));
        }
        if self.total_values == 0 {
            self.first_value = value;
        } else {
            self.deltas.push(value.wrapping_sub(&self.previous));
            if self.deltas.len() == self.config.block_size {
                self.flush_block()?;
            }
        }
        self.previous = value;
        self.total_values += 1;
        Ok(())
    }

    fn flush_block(&mut self) -> Result<()> {
        let min_delta = match self.deltas.iter().min() {
            Some(min_delta) => *min_delta,
            None => return Ok(()),
        };
        zigzag_leb128::write_i64(&mut self.body, min_delta.to_i64())?;

        let per_miniblock = self.config.values_per_miniblock();
        let mut widths = vec![0u8; self.config.miniblocks_per_block];
        for (width, miniblock) in widths.iter_mut().zip(self.deltas.chunks(per_miniblock)) {
            let max = miniblock
                .iter()
                .map(|delta| delta.wrapping_sub(&min_delta).to_unsigned())
                .max()
                .unwrap_or(0);
            *width = get_bits_needed(max) as u8;
        }
        self.body.extend_from_slice(&widths);

        for (width, miniblock) in widths.iter().zip(self.deltas.chunks(per_miniblock)) {
            self.unpacked.clear();
            self.unpacked.extend(
                miniblock
                    .iter()
                    .map(|delta| delta.wrapping_sub(&min_delta).to_unsigned()),
            );
            // padding is never surfaced by readers
            self.unpacked.resize(per_miniblock, 0);
            encode64(&self.unpacked, *width as usize, &mut self.body)?;
        }
        log::trace!(
            "delta block of {} deltas, min delta {:?}, widths {:?}",
            self.deltas.len(),
            min_delta,
            widths
        );
        self.deltas.clear();
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.flush_block()?;
        uleb128::write_u64(&mut self.writer, self.config.block_size as u64)?;
        uleb128::write_u64(&mut self.writer, self.config.miniblocks_per_block as u64)?;
        uleb128::write_u64(&mut self.writer, self.total_values)?;
        zigzag_leb128::write_i64(&mut self.writer, self.first_value.to_i64())?;
        self.writer.write_all(&self.body)?;
        self.writer.flush()?;
        self.body.clear();
        self.closed = true;
        Ok(())
    }
}

impl<W: Write, T: DeltaInteger> Encoder for DeltaBitPackedEncoder<W, T> {
    type Item = T;

    fn encode_values(&mut self, values: &[T]) -> Result<()> {
        values
            .iter()
            .try_for_each(|value| self.put(*value))
            .map_err(|e| e.within(Encoding::DeltaBinaryPacked, Operation::EncodeBody))
    }

    fn close(&mut self) -> Result<()> {
        self.finish()
            .map_err(|e: Error| e.within(Encoding::DeltaBinaryPacked, Operation::Flush))
    }
}
