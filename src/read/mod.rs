//! APIs to read values, pages and column chunks.

mod budget;
mod decoder;
pub mod page;
mod reader;

pub use budget::BudgetedReader;
pub use decoder::ValueDecoder;
pub use page::{read_page, read_page_header, DataPage, DictionaryPage, Page};
pub use reader::ColumnReader;
