use std::io::{Read, Write};
use std::marker::PhantomData;

use super::{Decoder, Encoder, Encoding};
use crate::errors::{Error, Operation, Result};
use crate::types::NativeType;

/// Values stored back to back as little-endian bytes, without any control bytes.
#[derive(Debug)]
pub struct PlainDecoder<R, T> {
    reader: R,
    _data: PhantomData<T>,
}

impl<R: Read, T: NativeType> PlainDecoder<R, T> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            _data: PhantomData,
        }
    }

    /// Reads `length` values at once.
    pub fn read_vec(&mut self, length: usize) -> Result<Vec<T>> {
        self.decode_vec(length)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_into(&mut self, output: &mut [T]) -> Result<()> {
        self.reader.read_exact(bytemuck::cast_slice_mut(output))?;
        if cfg!(target_endian = "big") {
            // slow case where we must reverse bytes
            for value in output.iter_mut() {
                let bytes = <T::Bytes>::try_from(bytemuck::bytes_of(value))
                    .map_err(|e| general_err!("{}", e))?;
                *value = T::from_le_bytes(bytes);
            }
        }
        Ok(())
    }
}

impl<R: Read, T: NativeType> Decoder for PlainDecoder<R, T> {
    type Item = T;

    fn next_value(&mut self) -> Result<T> {
        let mut value = [T::default()];
        self.read_into(&mut value)
            .map_err(|e| e.within(Encoding::Plain, Operation::DecodeBody))?;
        Ok(value[0])
    }

    fn decode_values(&mut self, output: &mut [T]) -> Result<()> {
        self.read_into(output)
            .map_err(|e| e.within(Encoding::Plain, Operation::DecodeBody))
    }
}

#[derive(Debug)]
pub struct PlainEncoder<W, T> {
    writer: W,
    _data: PhantomData<T>,
}

impl<W: Write, T: NativeType> PlainEncoder<W, T> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            _data: PhantomData,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(&mut self, values: &[T]) -> Result<()> {
        if cfg!(target_endian = "little") {
            self.writer.write_all(bytemuck::cast_slice(values))?;
        } else {
            for value in values {
                self.writer.write_all(value.to_le_bytes().as_ref())?;
            }
        }
        Ok(())
    }
}

impl<W: Write, T: NativeType> Encoder for PlainEncoder<W, T> {
    type Item = T;

    fn encode_values(&mut self, values: &[T]) -> Result<()> {
        self.write(values)
            .map_err(|e| e.within(Encoding::Plain, Operation::EncodeBody))
    }

    fn close(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Error::from(e).within(Encoding::Plain, Operation::Flush))
    }
}
