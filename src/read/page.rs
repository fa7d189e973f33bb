use std::io::Read;
use std::sync::Arc;

use parquet_format_safe::thrift::protocol::TCompactInputProtocol;
use parquet_format_safe::{Encoding as ThriftEncoding, PageHeader, PageType};

use super::{BudgetedReader, ValueDecoder};
use crate::encodings::dictionary::read_dictionary;
use crate::encodings::levels::{LevelDecoder, LevelSource};
use crate::encodings::Encoding;
use crate::errors::{Error, Result};
use crate::types::ValueType;
use crate::{count_defined, ColumnDescriptor, ColumnValues};

/// Default limit of the bytes a page header may take.
pub const DEFAULT_MAX_HEADER_SIZE: usize = 1024 * 1024;

/// A data page (v1): repetition levels, definition levels then values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPage {
    /// Number of level entries, nulls included.
    pub num_values: usize,
    pub encoding: Encoding,
    pub buffer: Vec<u8>,
}

/// The plain encoded dictionary of a column chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryPage {
    pub num_values: usize,
    pub buffer: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Data(DataPage),
    Dictionary(DictionaryPage),
}

/// Reads a thrift compact page header, returning it with the number of bytes it took.
/// The reader is left on the first byte of the page body.
///
/// Headers longer than `max_header_size` bytes are rejected.
pub fn read_page_header<R: Read>(
    reader: &mut R,
    max_header_size: usize,
) -> Result<(PageHeader, u64)> {
    let mut reader = BudgetedReader::new(reader.take(max_header_size as u64));
    let header = {
        let mut protocol = TCompactInputProtocol::new(&mut reader, max_header_size);
        PageHeader::read_from_in_protocol(&mut protocol)?
    };
    let consumed = reader.bytes_consumed();
    log::debug!("read {:?} page header of {} bytes", header.type_, consumed);
    Ok((header, consumed))
}

/// Reads a page, header and body. Returns the page and the total number of bytes read.
pub fn read_page<R: Read>(reader: &mut R, max_header_size: usize) -> Result<(Page, u64)> {
    let (header, header_size) = read_page_header(reader, max_header_size)?;

    if header.compressed_page_size != header.uncompressed_page_size {
        return Err(nyi_err!(
            "Compressed pages ({} bytes for {} uncompressed)",
            header.compressed_page_size,
            header.uncompressed_page_size
        ));
    }
    let body_size = usize::try_from(header.compressed_page_size)?;
    let mut buffer = Vec::with_capacity(body_size.min(max_header_size));
    reader.by_ref().take(body_size as u64).read_to_end(&mut buffer)?;
    if buffer.len() < body_size {
        return Err(Error::from(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("page body of {} bytes, {} available", body_size, buffer.len()),
        )));
    }

    let page = if header.type_ == PageType::DATA_PAGE {
        let data_header = header
            .data_page_header
            .ok_or_else(|| general_err!("Data page without a data page header"))?;
        for level_encoding in [
            data_header.repetition_level_encoding,
            data_header.definition_level_encoding,
        ] {
            if level_encoding != ThriftEncoding::RLE {
                return Err(nyi_err!("Levels encoded with {:?}", level_encoding));
            }
        }
        Page::Data(DataPage {
            num_values: usize::try_from(data_header.num_values)?,
            encoding: Encoding::try_from(data_header.encoding)?,
            buffer,
        })
    } else if header.type_ == PageType::DICTIONARY_PAGE {
        let dictionary_header = header
            .dictionary_page_header
            .ok_or_else(|| general_err!("Dictionary page without a dictionary page header"))?;
        match Encoding::try_from(dictionary_header.encoding)? {
            Encoding::Plain | Encoding::PlainDictionary => {}
            other => return Err(nyi_err!("Dictionary pages encoded with {:?}", other)),
        }
        Page::Dictionary(DictionaryPage {
            num_values: usize::try_from(dictionary_header.num_values)?,
            buffer,
        })
    } else {
        return Err(nyi_err!("Pages of type {:?}", header.type_));
    };
    Ok((page, header_size + body_size as u64))
}

fn read_levels(reader: &mut &[u8], max_level: u16, num_values: usize) -> Result<Vec<u16>> {
    if max_level == 0 {
        return Ok(vec![]);
    }
    let mut decoder = LevelDecoder::try_new_v1(&mut *reader, max_level)?;
    let levels = decoder.read_levels(num_values)?;
    if let LevelSource::Rle(decoder) = decoder.into_inner() {
        // the stream ends at its declared length, whatever its last run holds
        std::io::copy(&mut decoder.into_inner(), &mut std::io::sink())?;
    }
    Ok(levels)
}

/// Decodes the levels and values of a data page.
pub fn decode_data_page<T: ValueType>(
    page: &DataPage,
    descriptor: &ColumnDescriptor,
    dictionary: Option<Arc<[T::Physical]>>,
) -> Result<ColumnValues<T>> {
    let mut reader = page.buffer.as_slice();
    let rep_levels = read_levels(&mut reader, descriptor.max_rep_level, page.num_values)?;
    let def_levels = read_levels(&mut reader, descriptor.max_def_level, page.num_values)?;
    let num_defined = count_defined(&def_levels, descriptor.max_def_level, page.num_values);

    let mut decoder = ValueDecoder::<_, T>::try_new(page.encoding, &mut reader, dictionary)?;
    let values = decoder.read_vec(num_defined)?;
    drop(decoder);
    if !reader.is_empty() {
        log::debug!("{} bytes after the values of a data page", reader.len());
    }
    Ok(ColumnValues {
        rep_levels,
        def_levels,
        values,
    })
}

/// Decodes the entries of a dictionary page.
pub fn decode_dictionary_page<T: ValueType>(
    page: &DictionaryPage,
) -> Result<Arc<[T::Physical]>> {
    let expected = page.num_values * std::mem::size_of::<T::Physical>();
    if page.buffer.len() != expected {
        return Err(general_err!(
            "Dictionary of {} entries in {} bytes, expected {}",
            page.num_values,
            page.buffer.len(),
            expected
        ));
    }
    read_dictionary(page.buffer.as_slice(), page.num_values).map(Arc::from)
}
