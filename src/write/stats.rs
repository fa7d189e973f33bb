use std::collections::HashMap;

use crate::encodings::delta_bitpacked::DeltaInteger;
use crate::encodings::Encoding;
use crate::types::IntegerType;
use crate::util::bit_pack::{get_bits_needed, need_bytes};

use super::WriteOptions;

#[derive(Debug, Clone)]
pub struct IntegerStats<T> {
    pub tuple_count: usize,
    pub total_bytes: usize,
    pub average_run_length: f64,
    pub is_sorted: bool,
    pub min: T,
    pub max: T,
    pub distinct_values: HashMap<T, usize>,
    pub unique_count: usize,
    /// Bits needed by the widest delta once the smallest delta is subtracted.
    pub delta_bit_width: u32,
}

pub fn gen_stats<T: DeltaInteger + IntegerType>(values: &[T]) -> IntegerStats<T> {
    let mut stats = IntegerStats::<T> {
        tuple_count: values.len(),
        total_bytes: std::mem::size_of_val(values),
        average_run_length: 0.0,
        is_sorted: true,
        min: values.first().copied().unwrap_or_default(),
        max: values.first().copied().unwrap_or_default(),
        distinct_values: HashMap::new(),
        unique_count: 0,
        delta_bit_width: 0,
    };

    let mut run_count = 0;
    let mut min_delta = None::<T>;
    let mut max_delta = None::<T>;
    let mut last_value = None::<T>;
    for current_value in values.iter().copied() {
        match last_value {
            Some(last) => {
                if current_value < last {
                    stats.is_sorted = false;
                }
                if current_value != last {
                    run_count += 1;
                }
                let delta = current_value.wrapping_sub(&last);
                min_delta = Some(min_delta.map_or(delta, |min| min.min(delta)));
                max_delta = Some(max_delta.map_or(delta, |max| max.max(delta)));
            }
            None => run_count += 1,
        }
        last_value = Some(current_value);

        *stats.distinct_values.entry(current_value).or_insert(0) += 1;

        if current_value > stats.max {
            stats.max = current_value;
        } else if current_value < stats.min {
            stats.min = current_value;
        }
    }
    stats.unique_count = stats.distinct_values.len();
    if run_count > 0 {
        stats.average_run_length = values.len() as f64 / run_count as f64;
    }
    if let (Some(min), Some(max)) = (min_delta, max_delta) {
        stats.delta_bit_width = get_bits_needed(max.wrapping_sub(&min).to_unsigned());
    }
    stats
}

/// Estimated size before encoding divided by the size after it.
pub fn encode_ratio<T: DeltaInteger + IntegerType>(
    encoding: Encoding,
    stats: &IntegerStats<T>,
    options: &WriteOptions,
) -> f64 {
    if stats.tuple_count == 0 {
        return 0.0;
    }
    let after_size = match encoding {
        Encoding::DeltaBinaryPacked => {
            let blocks = stats.tuple_count / options.delta.block_size + 1;
            // stream header, then per block a min delta and the widths
            let overhead = 20 + blocks * (10 + options.delta.miniblocks_per_block);
            overhead + need_bytes(stats.tuple_count, stats.delta_bit_width as usize)
        }
        Encoding::PlainDictionary | Encoding::RleDictionary => {
            let width = get_bits_needed(stats.unique_count as u64 - 1);
            stats.unique_count * std::mem::size_of::<T>()
                + 1
                + need_bytes(stats.tuple_count, width as usize)
        }
        Encoding::Plain | Encoding::Rle => stats.total_bytes,
    };
    stats.total_bytes as f64 / after_size as f64
}

/// Picks the encoding of a column.
pub fn choose_encoding<T: DeltaInteger + IntegerType>(
    stats: &IntegerStats<T>,
    options: &WriteOptions,
) -> Encoding {
    let basic = options.default_encoding;
    let mut result = basic;
    if let Some(ratio) = options.default_encode_ratio {
        let mut max_ratio = ratio;
        for encoding in [Encoding::DeltaBinaryPacked, Encoding::RleDictionary] {
            if options.forbidden_encodings.contains(&encoding) {
                continue;
            }
            let r = encode_ratio(encoding, stats, options);
            if r > max_ratio {
                max_ratio = r;
                result = encoding;
            }
        }
    }
    log::info!("choose integer encoding : {:?}", result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats() {
        let stats = gen_stats(&[3i32, 3, 3, 7, 7, 1]);
        assert_eq!(stats.tuple_count, 6);
        assert_eq!(stats.total_bytes, 24);
        assert!(!stats.is_sorted);
        assert_eq!(stats.min, 1);
        assert_eq!(stats.max, 7);
        assert_eq!(stats.unique_count, 3);
        assert_eq!(stats.average_run_length, 2.0);
        // deltas are [0, 0, 4, 0, -6]
        assert_eq!(stats.delta_bit_width, 4);

        let stats = gen_stats::<i64>(&[]);
        assert_eq!(stats.unique_count, 0);
        assert_eq!(stats.average_run_length, 0.0);
    }

    #[test]
    fn test_choose() {
        let options = WriteOptions {
            default_encode_ratio: Some(1.5),
            ..Default::default()
        };

        let sorted = (0..10_000i64).map(|x| x * 3).collect::<Vec<_>>();
        let stats = gen_stats(&sorted);
        assert!(stats.is_sorted);
        assert_eq!(
            choose_encoding(&stats, &options),
            Encoding::DeltaBinaryPacked
        );

        let few = (0..10_000i64)
            .map(|x| (x * 7919) % 3 * 1_000_000_007)
            .collect::<Vec<_>>();
        assert_eq!(
            choose_encoding(&gen_stats(&few), &options),
            Encoding::RleDictionary
        );

        let forbidden = WriteOptions {
            forbidden_encodings: vec![Encoding::RleDictionary, Encoding::DeltaBinaryPacked],
            ..options.clone()
        };
        assert_eq!(choose_encoding(&gen_stats(&few), &forbidden), Encoding::Plain);

        // without a ratio the default is kept
        assert_eq!(
            choose_encoding(&stats, &WriteOptions::default()),
            Encoding::Plain
        );
    }
}
