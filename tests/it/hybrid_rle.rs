use rand::{rngs::StdRng, Rng, SeedableRng};

use pagecodec::encodings::hybrid_rle::{encode_length_prefixed, HybridRleDecoder, HybridRleEncoder};
use pagecodec::encodings::{uleb128, Decoder, Encoder};
use pagecodec::{Encoding, Error, Operation};

fn encode(values: &[u32], num_bits: u32) -> Vec<u8> {
    let mut encoder = HybridRleEncoder::try_new(vec![], num_bits).unwrap();
    encoder.encode_values(values).unwrap();
    encoder.close().unwrap();
    encoder.into_inner()
}

fn decode(data: &[u8], num_bits: u32, length: usize) -> Vec<u32> {
    let mut decoder = HybridRleDecoder::try_new(data, num_bits).unwrap();
    let mut values = vec![0; length];
    decoder.decode_values(&mut values).unwrap();
    values
}

#[test]
fn test_repeated_run() {
    // header 17 << 1, then the value on one byte
    let data = [34u8, 5];
    assert_eq!(decode(&data, 3, 17), vec![5; 17]);
    assert_eq!(encode(&[5; 17], 3), data.to_vec());
}

#[test]
fn test_random_round_trip() {
    let mut rng = StdRng::seed_from_u64(42);
    for num_bits in 0..=32u32 {
        let max = if num_bits == 32 {
            u32::MAX
        } else {
            (1u32 << num_bits) - 1
        };
        let length = rng.gen_range(0..2000);
        let values = (0..length)
            .map(|_| {
                if rng.gen_bool(0.3) {
                    max
                } else {
                    rng.gen_range(0..=max)
                }
            })
            .collect::<Vec<_>>();
        let data = encode(&values, num_bits);
        assert_eq!(decode(&data, num_bits, values.len()), values, "{num_bits} bits");
    }
}

#[test]
fn test_long_runs() {
    let mut values = vec![3u32; 10_000];
    values.extend((0..10_000).map(|x| x % 4));
    values.extend(vec![1; 513]);
    let data = encode(&values, 2);
    assert!(data.len() < 2 * 10_000 / 8 + 64);
    assert_eq!(decode(&data, 2, values.len()), values);
}

#[test]
fn test_length_prefixed() {
    let values = [1u32, 1, 1, 0, 1, 0, 0, 1, 1];
    let mut data = vec![];
    encode_length_prefixed(&mut data, &values, 1).unwrap();
    data.extend_from_slice(&[0xDE, 0xAD]);

    let mut reader = data.as_slice();
    let mut decoder = HybridRleDecoder::try_new_sized(&mut reader, 1).unwrap();
    let mut decoded = vec![0; values.len()];
    decoder.decode_values(&mut decoded).unwrap();
    assert_eq!(decoded, values);
    std::io::copy(&mut decoder.into_inner(), &mut std::io::sink()).unwrap();
    assert_eq!(reader, &[0xDE, 0xAD]);
}

#[test]
fn test_width_above_maximum() {
    let err = HybridRleDecoder::try_new([0u8; 4].as_slice(), 33).unwrap_err();
    assert!(matches!(
        err,
        Error::Codec {
            encoding: Encoding::Rle,
            operation: Operation::DecodeHeader,
            ..
        }
    ));
    assert!(matches!(err.root_cause(), Error::OutOfSpec(_)));

    let data = [33u8, 2, 1];
    assert!(HybridRleDecoder::try_new_dictionary_indices(data.as_slice()).is_err());
}

#[test]
fn test_truncated_header() {
    // a varint header whose continuation byte is missing
    let mut decoder = HybridRleDecoder::try_new([0x80u8].as_slice(), 3).unwrap();
    let err = decoder.next_value().unwrap_err();
    assert!(matches!(err.root_cause(), Error::OutOfSpec(_)));
}

#[test]
fn test_truncated_body() {
    let mut data = vec![];
    uleb128::write_u64(&mut data, (4 << 1) | 1).unwrap();
    data.extend_from_slice(&[0xFF; 5]);
    let mut decoder = HybridRleDecoder::try_new(data.as_slice(), 8).unwrap();
    let mut values = vec![0; 32];
    assert!(decoder.decode_values(&mut values).unwrap_err().is_eof());
}

#[test]
fn test_value_above_width() {
    let mut encoder = HybridRleEncoder::try_new(vec![], 2).unwrap();
    let err = encoder.encode_values(&[4]).unwrap_err();
    assert!(matches!(err.root_cause(), Error::OutOfRange(_)));
}
