//! Value encodings of columnar pages: the RLE / bit-packed hybrid, delta binary packed
//! and plain codecs, the varints framing them, and the page glue to read and write
//! column chunks made of them.

use std::ops::Range;

#[macro_use]
mod errors;

pub mod encodings;
pub mod read;
pub mod types;
pub mod util;
pub mod write;

pub use encodings::Encoding;
pub use errors::{Error, Operation, Result};

#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize,
)]
pub struct ColumnMeta {
    pub offset: u64,
    pub pages: Vec<PageMeta>,
}

impl ColumnMeta {
    /// The pages in `range`, as a chunk starting at the first of them. `None` when the
    /// range is out of bounds.
    pub fn slice(&self, range: Range<usize>) -> Option<Self> {
        let pages = self.pages.get(range.clone())?.to_vec();
        let skipped = self.pages[..range.start]
            .iter()
            .map(|page| page.length)
            .sum::<u64>();
        Some(Self {
            offset: self.offset + skipped,
            pages,
        })
    }

    pub fn total_len(&self) -> u64 {
        self.pages.iter().map(|m| m.length).sum::<u64>()
    }

    pub fn num_values(&self) -> u64 {
        self.pages.iter().map(|m| m.num_values).sum::<u64>()
    }
}

#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize,
)]
pub struct PageMeta {
    // header and body size of this page
    pub length: u64,
    // num level entries of a data page, num entries of a dictionary page
    pub num_values: u64,
}

/// Maximum levels of a column, as derived from its path in the schema.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Serialize, serde::Deserialize,
)]
pub struct ColumnDescriptor {
    pub max_def_level: u16,
    pub max_rep_level: u16,
}

impl ColumnDescriptor {
    pub fn new(max_def_level: u16, max_rep_level: u16) -> Self {
        Self {
            max_def_level,
            max_rep_level,
        }
    }

    /// A non-nullable, non-repeated column.
    pub fn required() -> Self {
        Self::default()
    }
}

/// The levels and the defined values of a column.
///
/// Level vectors are empty when the corresponding maximum level is 0. A value exists for
/// every entry whose definition level is the maximum.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnValues<T> {
    pub rep_levels: Vec<u16>,
    pub def_levels: Vec<u16>,
    pub values: Vec<T>,
}

impl<T> ColumnValues<T> {
    pub fn required(values: Vec<T>) -> Self {
        Self {
            rep_levels: vec![],
            def_levels: vec![],
            values,
        }
    }

    /// Number of level entries, i.e. values and nulls.
    pub fn num_entries(&self, descriptor: &ColumnDescriptor) -> usize {
        if descriptor.max_def_level > 0 {
            self.def_levels.len()
        } else if descriptor.max_rep_level > 0 {
            self.rep_levels.len()
        } else {
            self.values.len()
        }
    }

    /// Checks that levels and values agree with `descriptor` and with each other.
    pub fn validate(&self, descriptor: &ColumnDescriptor) -> Result<()> {
        let entries = self.num_entries(descriptor);
        for (levels, max_level, name) in [
            (&self.def_levels, descriptor.max_def_level, "definition"),
            (&self.rep_levels, descriptor.max_rep_level, "repetition"),
        ] {
            if max_level == 0 {
                if !levels.is_empty() {
                    return Err(general_err!(
                        "{} levels given for a column without {} levels",
                        levels.len(),
                        name
                    ));
                }
                continue;
            }
            if levels.len() != entries {
                return Err(general_err!(
                    "{} {} levels for {} entries",
                    levels.len(),
                    name,
                    entries
                ));
            }
            if let Some(level) = levels.iter().find(|level| **level > max_level) {
                return Err(general_err!(
                    "{} level {} exceeds the maximum {}",
                    name,
                    level,
                    max_level
                ));
            }
        }
        let defined = count_defined(&self.def_levels, descriptor.max_def_level, entries);
        if defined != self.values.len() {
            return Err(general_err!(
                "{} values for {} defined entries",
                self.values.len(),
                defined
            ));
        }
        Ok(())
    }
}

/// Number of entries with a value.
pub(crate) fn count_defined(def_levels: &[u16], max_def_level: u16, entries: usize) -> usize {
    if max_def_level == 0 {
        entries
    } else {
        def_levels
            .iter()
            .filter(|level| **level == max_def_level)
            .count()
    }
}
