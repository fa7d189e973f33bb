use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;

use super::page::{
    decode_data_page, decode_dictionary_page, read_page, Page, DEFAULT_MAX_HEADER_SIZE,
};
use crate::errors::Result;
use crate::types::ValueType;
use crate::{ColumnDescriptor, ColumnMeta, ColumnValues, PageMeta};

/// Reads the pages of a column chunk one at a time.
#[derive(Debug)]
pub struct ColumnReader<R> {
    page_reader: R,
    page_metas: Vec<PageMeta>,
    current_page: usize,
    max_header_size: usize,
}

impl<R: Read + Seek> ColumnReader<R> {
    /// Positions `page_reader` on the first page of `meta`.
    pub fn try_new(mut page_reader: R, meta: &ColumnMeta) -> Result<Self> {
        page_reader.seek(SeekFrom::Start(meta.offset))?;
        Ok(Self {
            page_reader,
            page_metas: meta.pages.clone(),
            current_page: 0,
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
        })
    }

    pub fn with_max_header_size(mut self, max_header_size: usize) -> Self {
        self.max_header_size = max_header_size;
        self
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.page_metas.len()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn into_inner(self) -> R {
        self.page_reader
    }

    /// Reads the next page, checking it spans exactly the bytes its metadata declares.
    pub fn next_page(&mut self) -> Result<Option<Page>> {
        if self.current_page == self.page_metas.len() {
            return Ok(None);
        }
        let page_meta = &self.page_metas[self.current_page];
        let (page, length) = read_page(&mut self.page_reader, self.max_header_size)?;
        if length != page_meta.length {
            return Err(general_err!(
                "Page {} spans {} bytes, its metadata declares {}",
                self.current_page,
                length,
                page_meta.length
            ));
        }
        self.current_page += 1;
        Ok(Some(page))
    }

    /// Moves to the next page without reading the current one.
    pub fn skip_page(&mut self) -> Result<()> {
        self.skip_pages(1).map(|_| ())
    }

    /// Seeks past the next `n` pages, or past every remaining one when fewer are left.
    /// Returns the number of pages skipped.
    pub fn skip_pages(&mut self, n: usize) -> Result<usize> {
        let end = self
            .page_metas
            .len()
            .min(self.current_page.saturating_add(n));
        let length = self.page_metas[self.current_page..end]
            .iter()
            .map(|page| page.length)
            .sum::<u64>();
        if length > 0 {
            self.page_reader
                .seek(SeekFrom::Current(i64::try_from(length)?))?;
        }
        let skipped = end - self.current_page;
        self.current_page = end;
        Ok(skipped)
    }

    /// Reads and decodes every remaining page.
    pub fn read_column<T: ValueType>(
        &mut self,
        descriptor: &ColumnDescriptor,
    ) -> Result<ColumnValues<T>> {
        let mut column = ColumnValues::default();
        let mut dictionary: Option<Arc<[T::Physical]>> = None;
        while let Some(page) = self.next_page()? {
            match page {
                Page::Dictionary(page) => {
                    dictionary = Some(decode_dictionary_page::<T>(&page)?);
                }
                Page::Data(page) => {
                    let decoded = decode_data_page::<T>(&page, descriptor, dictionary.clone())?;
                    column.rep_levels.extend(decoded.rep_levels);
                    column.def_levels.extend(decoded.def_levels);
                    column.values.extend(decoded.values);
                }
            }
        }
        Ok(column)
    }
}

impl<R: Read + Seek> Iterator for ColumnReader<R> {
    type Item = Result<Page>;

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        match self.skip_pages(n) {
            Ok(skipped) if skipped == n => self.next(),
            Ok(_) => None,
            Err(err) => Some(Err(err)),
        }
    }

    fn next(&mut self) -> Option<Self::Item> {
        self.next_page().transpose()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.page_metas.len() - self.current_page;
        (remaining, Some(remaining))
    }
}
