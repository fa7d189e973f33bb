use std::io::Write;
use std::ops::Range;

use super::page::{write_data_page, write_dictionary_indices_page, write_dictionary_page};
use super::stats::{choose_encoding, gen_stats};
use super::WriteOptions;
use crate::encodings::dictionary::DictEncoder;
use crate::errors::Result;
use crate::types::ValueType;
use crate::{count_defined, ColumnDescriptor, ColumnMeta, ColumnValues};

/// Writes column chunks, one after the other, to a byte sink.
///
/// Every chunk is made of an optional dictionary page followed by data pages of at most
/// `max_page_size` level entries.
#[derive(Debug)]
pub struct ColumnWriter<W: Write> {
    writer: W,
    offset: u64,
    options: WriteOptions,
    metas: Vec<ColumnMeta>,
}

impl<W: Write> ColumnWriter<W> {
    pub fn new(writer: W, options: WriteOptions) -> Self {
        Self {
            writer,
            offset: 0,
            options,
            metas: vec![],
        }
    }

    /// Writes `column` as a column chunk and returns where its pages landed.
    pub fn write_column<T: ValueType>(
        &mut self,
        column: &ColumnValues<T>,
        descriptor: &ColumnDescriptor,
    ) -> Result<ColumnMeta> {
        column.validate(descriptor)?;

        let physical = column
            .values
            .iter()
            .map(|value| value.to_physical())
            .collect::<Vec<_>>();
        let stats = gen_stats(&physical);
        let encoding = choose_encoding(&stats, &self.options);

        let start = self.offset;
        let mut pages = vec![];
        if encoding.is_dictionary() {
            let mut dictionary = DictEncoder::with_capacity(physical.len());
            for value in physical.iter() {
                dictionary.push(value);
            }
            let meta = write_dictionary_page(&mut self.writer, dictionary.dictionary())?;
            self.offset += meta.length;
            pages.push(meta);

            for (entries, values) in self.split_pages(column, descriptor) {
                let meta = write_dictionary_indices_page(
                    &mut self.writer,
                    level_slice(&column.rep_levels, &entries),
                    level_slice(&column.def_levels, &entries),
                    entries.len(),
                    descriptor,
                    &dictionary,
                    values,
                )?;
                self.offset += meta.length;
                pages.push(meta);
            }
        } else {
            for (entries, values) in self.split_pages(column, descriptor) {
                let page = ColumnValues {
                    rep_levels: level_slice(&column.rep_levels, &entries).to_vec(),
                    def_levels: level_slice(&column.def_levels, &entries).to_vec(),
                    values: column.values[values].to_vec(),
                };
                let meta =
                    write_data_page(&mut self.writer, &page, descriptor, encoding, &self.options)?;
                self.offset += meta.length;
                pages.push(meta);
            }
        }

        let meta = ColumnMeta {
            offset: start,
            pages,
        };
        self.metas.push(meta.clone());
        Ok(meta)
    }

    /// The level entries and values of each data page. Pages only start on a new record.
    fn split_pages<T>(
        &self,
        column: &ColumnValues<T>,
        descriptor: &ColumnDescriptor,
    ) -> Vec<(Range<usize>, Range<usize>)> {
        let num_entries = column.num_entries(descriptor);
        let page_size = self.options.max_page_size.unwrap_or(num_entries).max(1);

        let mut ranges = vec![];
        let mut entry_start = 0;
        let mut value_start = 0;
        while entry_start < num_entries || ranges.is_empty() {
            let mut entry_end = (entry_start + page_size).min(num_entries);
            if descriptor.max_rep_level > 0 {
                while entry_end < num_entries && column.rep_levels[entry_end] != 0 {
                    entry_end += 1;
                }
            }
            let defined = count_defined(
                level_slice(&column.def_levels, &(entry_start..entry_end)),
                descriptor.max_def_level,
                entry_end - entry_start,
            );
            ranges.push((entry_start..entry_end, value_start..value_start + defined));
            entry_start = entry_end;
            value_start += defined;
        }
        ranges
    }

    pub fn metas(&self) -> &[ColumnMeta] {
        &self.metas
    }

    /// Number of bytes written so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn flush(&mut self) -> Result<()> {
        Ok(self.writer.flush()?)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn level_slice<'a>(levels: &'a [u16], entries: &Range<usize>) -> &'a [u16] {
    if levels.is_empty() {
        levels
    } else {
        &levels[entries.clone()]
    }
}
