use std::io::{Read, Seek, SeekFrom};

use crate::errors::Result;

/// Counts the bytes taken from a reader since it was attached.
///
/// Reads add the number of bytes returned; seeks add the distance moved, in either
/// direction, so the count never decreases. Nothing is read ahead: bytes after the
/// structure being parsed stay in the inner reader.
#[derive(Debug)]
pub struct BudgetedReader<R> {
    inner: R,
    consumed: u64,
    /// Position of `inner`, once known.
    position: Option<u64>,
}

impl<R> BudgetedReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            consumed: 0,
            position: None,
        }
    }

    /// Bytes read plus the distance seeked since attachment.
    pub fn bytes_consumed(&self) -> u64 {
        self.consumed
    }

    /// Fails unless exactly `expected` bytes were consumed.
    pub fn ensure_consumed(&self, expected: u64) -> Result<()> {
        if self.consumed != expected {
            return Err(general_err!(
                "Expected a structure of {} bytes, consumed {}",
                expected,
                self.consumed
            ));
        }
        Ok(())
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Bytes read or seeked through the returned reference are not counted.
    pub fn get_mut(&mut self) -> &mut R {
        self.position = None;
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for BudgetedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.consumed += read as u64;
        if let Some(position) = self.position.as_mut() {
            *position += read as u64;
        }
        Ok(read)
    }
}

impl<R: Seek> Seek for BudgetedReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let before = match self.position {
            Some(position) => position,
            None => self.inner.stream_position()?,
        };
        let after = self.inner.seek(pos)?;
        self.consumed += before.abs_diff(after);
        self.position = Some(after);
        Ok(after)
    }
}
