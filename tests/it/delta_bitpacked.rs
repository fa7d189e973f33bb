use rand::{rngs::StdRng, Rng, SeedableRng};

use pagecodec::encodings::delta_bitpacked::{
    DeltaBitPackedDecoder, DeltaBitPackedEncoder, DeltaConfig, DeltaInteger,
};
use pagecodec::encodings::{zigzag_leb128, Decoder, Encoder};
use pagecodec::Error;

fn encode<T: DeltaInteger>(values: &[T], config: DeltaConfig) -> Vec<u8> {
    let mut encoder = DeltaBitPackedEncoder::try_new(vec![], config).unwrap();
    encoder.encode_values(values).unwrap();
    encoder.close().unwrap();
    encoder.into_inner()
}

fn decode<T: DeltaInteger>(data: &[u8]) -> Vec<T> {
    DeltaBitPackedDecoder::<_, T>::try_new(data)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn test_first_value_and_deltas() {
    let values = [1i32, 2, 3, 2, 1];
    let data = encode(&values, DeltaConfig::try_new(8, 1).unwrap());

    // block size, miniblocks, total, first value
    assert_eq!(&data[..4], &[8, 1, 5, zigzag_leb128::zigzag_encode(1) as u8]);
    // min delta -1, then deltas [1, 1, -1, -1] stored as [2, 2, 0, 0] on 2 bits
    assert_eq!(data[4], zigzag_leb128::zigzag_encode(-1) as u8);
    assert_eq!(data[5], 2);
    assert_eq!(data[6], 0b00_00_10_10);
    assert_eq!(decode::<i32>(&data), values);
}

#[test]
fn test_geometries() {
    let mut rng = StdRng::seed_from_u64(7);
    let values = (0..1000)
        .map(|_| rng.gen_range(-1_000_000i64..1_000_000))
        .collect::<Vec<_>>();
    for (block_size, miniblocks) in [(8, 1), (16, 2), (64, 8), (128, 4), (128, 1), (256, 8)] {
        let config = DeltaConfig::try_new(block_size, miniblocks).unwrap();
        for length in [0, 1, 2, 7, block_size, block_size + 1, 999, 1000] {
            let data = encode(&values[..length], config);
            let decoded = decode::<i64>(&data);
            assert_eq!(decoded.len(), length, "{config:?} {length}");
            assert_eq!(decoded, &values[..length], "{config:?} {length}");
        }
    }
}

#[test]
fn test_random_walks() {
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..20 {
        let length = rng.gen_range(1..3000);
        let step = rng.gen_range(1..=i32::MAX);
        let mut current = rng.gen::<i32>();
        let values = (0..length)
            .map(|_| {
                current = current.wrapping_add(rng.gen_range(-step..=step));
                current
            })
            .collect::<Vec<_>>();
        let data = encode(&values, DeltaConfig::default());
        assert_eq!(decode::<i32>(&data), values);
    }
}

#[test]
fn test_stops_after_stream() {
    let values = (0..300i64).map(|x| x * x).collect::<Vec<_>>();
    let mut data = encode(&values, DeltaConfig::default());
    let length = data.len();
    data.extend_from_slice(b"tail");

    let mut reader = data.as_slice();
    let mut decoder = DeltaBitPackedDecoder::<_, i64>::try_new(&mut reader).unwrap();
    assert_eq!(decoder.size_hint(), (300, Some(300)));
    let mut decoded = vec![0; 300];
    decoder.decode_values(&mut decoded).unwrap();
    assert_eq!(decoded, values);
    assert!(decoder.next().is_none());
    drop(decoder);
    assert_eq!(reader, b"tail");
    assert_eq!(data.len() - reader.len(), length);
}

#[test]
fn test_invalid_width_before_values() {
    // one block of 8 values with a single miniblock of 65 bits
    let mut data = vec![8u8, 1, 4, 0, 0, 65];
    data.extend_from_slice(&[0; 65]);
    let err = DeltaBitPackedDecoder::<_, i64>::try_new(data.as_slice()).unwrap_err();
    assert!(matches!(err.root_cause(), Error::OutOfSpec(_)));

    // 33 bits is only valid on the 64-bit stream
    data[5] = 33;
    assert!(DeltaBitPackedDecoder::<_, i32>::try_new(data.as_slice()).is_err());
    DeltaBitPackedDecoder::<_, i64>::try_new(data.as_slice()).unwrap();
}

#[test]
fn test_first_value_out_of_range() {
    let data = encode(&[i64::from(i32::MAX) + 1], DeltaConfig::default());
    let err = DeltaBitPackedDecoder::<_, i32>::try_new(data.as_slice()).unwrap_err();
    assert!(matches!(err.root_cause(), Error::OutOfRange(_)));
}

#[test]
fn test_truncated_miniblock() {
    let values = (0..100i64).map(|x| x * x * 7919).collect::<Vec<_>>();
    let data = encode(&values, DeltaConfig::default());
    let mut decoder = DeltaBitPackedDecoder::<_, i64>::try_new(&data[..data.len() - 4]).unwrap();
    let mut decoded = vec![0; 100];
    assert!(decoder.decode_values(&mut decoded).unwrap_err().is_eof());
}
