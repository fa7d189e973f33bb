//! APIs to write column chunks made of encoded pages.
mod common;
pub mod encoder;
pub mod page;
pub mod stats;
mod writer;

pub use common::WriteOptions;
pub use encoder::ValueEncoder;
pub use stats::{choose_encoding, gen_stats, IntegerStats};
pub use writer::ColumnWriter;
