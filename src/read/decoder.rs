use std::io::{Read, Take};
use std::sync::Arc;

use crate::encodings::delta_bitpacked::{DeltaBitPackedDecoder, DeltaInteger};
use crate::encodings::dictionary::DictionaryDecoder;
use crate::encodings::hybrid_rle::HybridRleDecoder;
use crate::encodings::plain::PlainDecoder;
use crate::encodings::{ConstantDecoder, Decoder, Encoding};
use crate::errors::Result;
use crate::types::ValueType;

/// The codec of a page's values, chosen once from the page's encoding.
///
/// Every codec produces the physical type of `T`, which is then converted to `T`.
#[derive(Debug)]
pub enum ValueDecoder<R, T: ValueType> {
    Plain(PlainDecoder<R, T::Physical>),
    /// Booleans: a 1-bit hybrid stream behind its 4-byte byte length.
    Rle(HybridRleDecoder<Take<R>>),
    Delta(DeltaBitPackedDecoder<R, T::Physical>),
    Dictionary(DictionaryDecoder<R, T::Physical>),
    Constant(ConstantDecoder<T::Physical>),
}

impl<R: Read, T: ValueType> ValueDecoder<R, T> {
    /// Instantiates the codec of `encoding` over `reader`. Dictionary encodings need the
    /// column's dictionary.
    pub fn try_new(
        encoding: Encoding,
        reader: R,
        dictionary: Option<Arc<[T::Physical]>>,
    ) -> Result<Self> {
        Ok(match encoding {
            Encoding::Plain => Self::Plain(PlainDecoder::new(reader)),
            Encoding::Rle => Self::Rle(HybridRleDecoder::try_new_sized(reader, 1)?),
            Encoding::DeltaBinaryPacked => Self::Delta(DeltaBitPackedDecoder::try_new(reader)?),
            Encoding::PlainDictionary | Encoding::RleDictionary => {
                let dictionary = dictionary.ok_or_else(|| {
                    general_err!("{:?} values without a dictionary page", encoding)
                })?;
                Self::Dictionary(DictionaryDecoder::try_new(reader, dictionary)?)
            }
        })
    }

    /// A decoder reading nothing and producing `value` forever.
    pub fn constant(value: T) -> Self {
        Self::Constant(ConstantDecoder(value.to_physical()))
    }

    pub fn encoding(&self) -> Option<Encoding> {
        match self {
            Self::Plain(_) => Some(Encoding::Plain),
            Self::Rle(_) => Some(Encoding::Rle),
            Self::Delta(_) => Some(Encoding::DeltaBinaryPacked),
            Self::Dictionary(_) => Some(Encoding::RleDictionary),
            Self::Constant(_) => None,
        }
    }

    fn next_physical(&mut self) -> Result<T::Physical> {
        match self {
            Self::Plain(decoder) => decoder.next_value(),
            Self::Rle(decoder) => decoder
                .next_value()
                .map(|value| T::Physical::from_unsigned(u64::from(value))),
            Self::Delta(decoder) => decoder.next_value(),
            Self::Dictionary(decoder) => decoder.next_value(),
            Self::Constant(decoder) => decoder.next_value(),
        }
    }

    /// Decodes `length` values.
    pub fn read_vec(&mut self, length: usize) -> Result<Vec<T>> {
        self.decode_vec(length)
    }
}

impl<R: Read, T: ValueType> Decoder for ValueDecoder<R, T> {
    type Item = T;

    fn next_value(&mut self) -> Result<T> {
        self.next_physical().and_then(T::from_physical)
    }

    fn decode_values(&mut self, output: &mut [T]) -> Result<()> {
        let mut physical = [T::Physical::default(); 64];
        for chunk in output.chunks_mut(physical.len()) {
            let physical = &mut physical[..chunk.len()];
            match self {
                Self::Plain(decoder) => decoder.decode_values(physical)?,
                Self::Delta(decoder) => decoder.decode_values(physical)?,
                Self::Dictionary(decoder) => decoder.decode_values(physical)?,
                Self::Constant(decoder) => decoder.decode_values(physical)?,
                Self::Rle(decoder) => {
                    for slot in physical.iter_mut() {
                        *slot = T::Physical::from_unsigned(u64::from(decoder.next_value()?));
                    }
                }
            }
            for (slot, value) in chunk.iter_mut().zip(physical.iter()) {
                *slot = T::from_physical(*value)?;
            }
        }
        Ok(())
    }
}
