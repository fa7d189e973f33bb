use serde::{Deserialize, Serialize};

use crate::encodings::delta_bitpacked::DeltaConfig;
use crate::encodings::Encoding;

/// Options declaring the behaviour of writing column chunks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WriteOptions {
    /// The encoding of values unless another one is estimated to be smaller.
    pub default_encoding: Encoding,
    /// When set, delta and dictionary encodings are estimated on every column and the
    /// one with the best ratio above this threshold replaces `default_encoding`.
    pub default_encode_ratio: Option<f64>,
    /// Encodings never chosen by the estimation.
    pub forbidden_encodings: Vec<Encoding>,
    /// Maximum number of level entries per data page, one page per column when unset.
    pub max_page_size: Option<usize>,
    pub delta: DeltaConfig,
}
