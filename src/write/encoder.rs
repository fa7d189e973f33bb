use std::io::Write;

use crate::encodings::delta_bitpacked::{DeltaBitPackedEncoder, DeltaInteger};
use crate::encodings::hybrid_rle::encode_length_prefixed;
use crate::encodings::plain::PlainEncoder;
use crate::encodings::{Encoder, Encoding};
use crate::errors::{Operation, Result};
use crate::types::ValueType;

use super::WriteOptions;

/// Buffers boolean values (0 or 1) and writes them on close as a 1-bit hybrid stream
/// prefixed by its 4-byte byte length.
#[derive(Debug)]
pub struct RleValueEncoder<W> {
    writer: W,
    values: Vec<u32>,
}

impl<W: Write> RleValueEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            values: vec![],
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Encoder for RleValueEncoder<W> {
    type Item = u32;

    fn encode_values(&mut self, values: &[u32]) -> Result<()> {
        self.values.extend_from_slice(values);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        encode_length_prefixed(&mut self.writer, &self.values, 1)
            .map_err(|e| e.within(Encoding::Rle, Operation::Flush))?;
        self.values.clear();
        Ok(())
    }
}

/// The codec writing a page's values, the counterpart of
/// [`ValueDecoder`](crate::read::ValueDecoder).
///
/// Dictionary encoded values are written by the column writer, which owns the dictionary.
#[derive(Debug)]
pub enum ValueEncoder<W, T: ValueType> {
    Plain(PlainEncoder<W, T::Physical>),
    Rle(RleValueEncoder<W>),
    Delta(DeltaBitPackedEncoder<W, T::Physical>),
}

impl<W: Write, T: ValueType> ValueEncoder<W, T> {
    pub fn try_new(encoding: Encoding, writer: W, options: &WriteOptions) -> Result<Self> {
        Ok(match encoding {
            Encoding::Plain => Self::Plain(PlainEncoder::new(writer)),
            Encoding::Rle => Self::Rle(RleValueEncoder::new(writer)),
            Encoding::DeltaBinaryPacked => {
                Self::Delta(DeltaBitPackedEncoder::try_new(writer, options.delta)?)
            }
            Encoding::PlainDictionary | Encoding::RleDictionary => {
                return Err(nyi_err!(
                    "{:?} values are written along with their dictionary page",
                    encoding
                ))
            }
        })
    }

    pub fn into_inner(self) -> W {
        match self {
            Self::Plain(encoder) => encoder.into_inner(),
            Self::Rle(encoder) => encoder.into_inner(),
            Self::Delta(encoder) => encoder.into_inner(),
        }
    }
}

impl<W: Write, T: ValueType> Encoder for ValueEncoder<W, T> {
    type Item = T;

    fn encode_values(&mut self, values: &[T]) -> Result<()> {
        let mut physical = [T::Physical::default(); 64];
        for chunk in values.chunks(physical.len()) {
            let physical = &mut physical[..chunk.len()];
            for (slot, value) in physical.iter_mut().zip(chunk.iter()) {
                *slot = value.to_physical();
            }
            match self {
                Self::Plain(encoder) => encoder.encode_values(physical)?,
                Self::Delta(encoder) => encoder.encode_values(physical)?,
                Self::Rle(encoder) => {
                    let mut bits = [0u32; 64];
                    for (slot, value) in bits.iter_mut().zip(physical.iter()) {
                        *slot = match value.to_unsigned() {
                            bit @ (0 | 1) => bit as u32,
                            _ => {
                                return Err(range_err!("{:?} is not a boolean", value)
                                    .within(Encoding::Rle, Operation::EncodeBody))
                            }
                        };
                    }
                    encoder.encode_values(&bits[..physical.len()])?
                }
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        match self {
            Self::Plain(encoder) => encoder.close(),
            Self::Rle(encoder) => encoder.close(),
            Self::Delta(encoder) => encoder.close(),
        }
    }
}
