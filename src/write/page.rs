use std::io::Write;
use std::ops::Range;

use parquet_format_safe::thrift::protocol::TCompactOutputProtocol;
use parquet_format_safe::{
    DataPageHeader, DictionaryPageHeader, Encoding as ThriftEncoding, PageHeader, PageType,
};

use super::{ValueEncoder, WriteOptions};
use crate::encodings::dictionary::DictEncoder;
use crate::encodings::levels::encode_levels_v1;
use crate::encodings::plain::PlainEncoder;
use crate::encodings::{Encoder, Encoding};
use crate::errors::Result;
use crate::types::{NativeType, ValueType};
use crate::{ColumnDescriptor, ColumnValues, PageMeta};

/// Writes `header` in the thrift compact protocol, returning the number of bytes written.
pub fn write_page_header<W: Write>(writer: &mut W, header: &PageHeader) -> Result<u64> {
    let mut protocol = TCompactOutputProtocol::new(writer);
    Ok(header.write_to_out_protocol(&mut protocol)? as u64)
}

fn write_page<W: Write>(writer: &mut W, header: PageHeader, body: &[u8]) -> Result<u64> {
    let header_size = write_page_header(writer, &header)?;
    writer.write_all(body)?;
    log::debug!(
        "wrote {:?} page: header of {} bytes, body of {} bytes",
        header.type_,
        header_size,
        body.len()
    );
    Ok(header_size + body.len() as u64)
}

fn data_page_header(num_values: usize, encoding: Encoding, body_size: usize) -> Result<PageHeader> {
    let body_size = i32::try_from(body_size)?;
    Ok(PageHeader {
        type_: PageType::DATA_PAGE,
        uncompressed_page_size: body_size,
        compressed_page_size: body_size,
        crc: None,
        data_page_header: Some(DataPageHeader {
            num_values: i32::try_from(num_values)?,
            encoding: encoding.into(),
            definition_level_encoding: ThriftEncoding::RLE,
            repetition_level_encoding: ThriftEncoding::RLE,
            statistics: None,
        }),
        index_page_header: None,
        dictionary_page_header: None,
        data_page_header_v2: None,
    })
}

fn write_levels(
    body: &mut Vec<u8>,
    rep_levels: &[u16],
    def_levels: &[u16],
    descriptor: &ColumnDescriptor,
) -> Result<()> {
    encode_levels_v1(body, rep_levels, descriptor.max_rep_level)?;
    encode_levels_v1(body, def_levels, descriptor.max_def_level)?;
    Ok(())
}

/// Writes a data page (v1) holding `column`, its values encoded with `encoding`.
pub fn write_data_page<W: Write, T: ValueType>(
    writer: &mut W,
    column: &ColumnValues<T>,
    descriptor: &ColumnDescriptor,
    encoding: Encoding,
    options: &WriteOptions,
) -> Result<PageMeta> {
    column.validate(descriptor)?;
    let num_values = column.num_entries(descriptor);

    let mut body = vec![];
    write_levels(&mut body, &column.rep_levels, &column.def_levels, descriptor)?;
    let mut encoder = ValueEncoder::<_, T>::try_new(encoding, &mut body, options)?;
    encoder.encode_values(&column.values)?;
    encoder.close()?;
    drop(encoder);

    let header = data_page_header(num_values, encoding, body.len())?;
    let length = write_page(writer, header, &body)?;
    Ok(PageMeta {
        length,
        num_values: num_values as u64,
    })
}

/// Writes a data page whose values are the dictionary ids `range` of `dictionary`.
pub fn write_dictionary_indices_page<W: Write, P: NativeType>(
    writer: &mut W,
    rep_levels: &[u16],
    def_levels: &[u16],
    num_values: usize,
    descriptor: &ColumnDescriptor,
    dictionary: &DictEncoder<P>,
    range: Range<usize>,
) -> Result<PageMeta> {
    let mut body = vec![];
    write_levels(&mut body, rep_levels, def_levels, descriptor)?;
    dictionary.write_indices(&mut body, range)?;

    let header = data_page_header(num_values, Encoding::RleDictionary, body.len())?;
    let length = write_page(writer, header, &body)?;
    Ok(PageMeta {
        length,
        num_values: num_values as u64,
    })
}

/// Writes a dictionary page holding `values` in the plain encoding.
pub fn write_dictionary_page<W: Write, P: NativeType>(
    writer: &mut W,
    values: &[P],
) -> Result<PageMeta> {
    let mut body = vec![];
    let mut encoder = PlainEncoder::new(&mut body);
    encoder.encode_values(values)?;
    encoder.close()?;

    let body_size = i32::try_from(body.len())?;
    let header = PageHeader {
        type_: PageType::DICTIONARY_PAGE,
        uncompressed_page_size: body_size,
        compressed_page_size: body_size,
        crc: None,
        data_page_header: None,
        index_page_header: None,
        dictionary_page_header: Some(DictionaryPageHeader {
            num_values: i32::try_from(values.len())?,
            encoding: Encoding::Plain.into(),
            is_sorted: None,
        }),
        data_page_header_v2: None,
    };
    let length = write_page(writer, header, &body)?;
    Ok(PageMeta {
        length,
        num_values: values.len() as u64,
    })
}
