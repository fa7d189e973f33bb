//! Wire compatibility with the parquet2 encoders and decoders.

use rand::{rngs::StdRng, Rng, SeedableRng};

use pagecodec::encodings::delta_bitpacked::{
    DeltaBitPackedDecoder, DeltaBitPackedEncoder, DeltaConfig,
};
use pagecodec::encodings::hybrid_rle::{HybridRleDecoder, HybridRleEncoder};
use pagecodec::encodings::{uleb128, Decoder, Encoder, Encoding};
use pagecodec::read::ValueDecoder;

fn random_values(rng: &mut StdRng, length: usize, num_bits: u32) -> Vec<u32> {
    let max = if num_bits == 32 {
        u32::MAX
    } else {
        (1u32 << num_bits) - 1
    };
    let mut values = Vec::with_capacity(length);
    while values.len() < length {
        let value = rng.gen_range(0..=max);
        let run = if rng.gen_bool(0.2) {
            rng.gen_range(1..100)
        } else {
            1
        };
        values.extend(std::iter::repeat(value).take(run.min(length - values.len())));
    }
    values
}

#[test]
fn test_hybrid_from_parquet2() {
    let mut rng = StdRng::seed_from_u64(3);
    for num_bits in [1u32, 2, 3, 7, 8, 13, 20, 31, 32] {
        let values = random_values(&mut rng, 1000, num_bits);
        let mut data = vec![];
        parquet2::encoding::hybrid_rle::encode_u32(&mut data, values.iter().copied(), num_bits)
            .unwrap();

        let mut decoder = HybridRleDecoder::try_new(data.as_slice(), num_bits).unwrap();
        let mut decoded = vec![0; values.len()];
        decoder.decode_values(&mut decoded).unwrap();
        assert_eq!(decoded, values, "{num_bits} bits");
    }
}

#[test]
fn test_hybrid_to_parquet2() {
    let mut rng = StdRng::seed_from_u64(4);
    for num_bits in [1u32, 2, 5, 8, 16, 24, 32] {
        let values = random_values(&mut rng, 2000, num_bits);
        let mut encoder = HybridRleEncoder::try_new(vec![], num_bits).unwrap();
        encoder.encode_values(&values).unwrap();
        encoder.close().unwrap();
        let data = encoder.into_inner();

        let decoded = parquet2::encoding::hybrid_rle::HybridRleDecoder::try_new(
            &data,
            num_bits,
            values.len(),
        )
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
        assert_eq!(decoded, values, "{num_bits} bits");
    }
}

#[test]
fn test_delta_from_parquet2() {
    let mut rng = StdRng::seed_from_u64(5);
    let values = (0..5000)
        .map(|_| rng.gen_range(-(1i64 << 40)..(1i64 << 40)))
        .collect::<Vec<_>>();
    let mut data = vec![];
    parquet2::encoding::delta_bitpacked::encode(values.iter().copied(), &mut data);

    let decoded = DeltaBitPackedDecoder::<_, i64>::try_new(data.as_slice())
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(decoded, values);
}

#[test]
fn test_delta_to_parquet2() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut current = 0i64;
    let values = (0..3000)
        .map(|_| {
            current += rng.gen_range(-50..1000);
            current
        })
        .collect::<Vec<_>>();
    for config in [
        DeltaConfig::default(),
        DeltaConfig::try_new(256, 8).unwrap(),
    ] {
        let mut encoder = DeltaBitPackedEncoder::try_new(vec![], config).unwrap();
        encoder.encode_values(&values).unwrap();
        encoder.close().unwrap();
        let data = encoder.into_inner();

        let decoded = parquet2::encoding::delta_bitpacked::Decoder::try_new(&data)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(decoded, values, "{config:?}");
    }
}

#[test]
fn test_rle_booleans_from_parquet2() {
    let mut rng = StdRng::seed_from_u64(9);
    let values = (0..777).map(|_| rng.gen_bool(0.3)).collect::<Vec<_>>();
    let mut stream = vec![];
    parquet2::encoding::hybrid_rle::encode_bool(&mut stream, values.iter().copied()).unwrap();
    let mut data = (stream.len() as u32).to_le_bytes().to_vec();
    data.extend_from_slice(&stream);

    let mut decoder = ValueDecoder::<_, u8>::try_new(Encoding::Rle, data.as_slice(), None).unwrap();
    let decoded = decoder.read_vec(values.len()).unwrap();
    let expected = values.iter().map(|x| u8::from(*x)).collect::<Vec<_>>();
    assert_eq!(decoded, expected);
}

#[test]
fn test_uleb128() {
    let mut rng = StdRng::seed_from_u64(8);
    for _ in 0..1000 {
        let value = rng.gen::<u64>() >> rng.gen_range(0..64);
        let mut ours = [0u8; uleb128::MAX_LEN];
        let length = uleb128::encode(value, &mut ours);
        let mut theirs = [0u8; uleb128::MAX_LEN];
        let their_length = parquet2::encoding::uleb128::encode(value, &mut theirs);
        assert_eq!(&ours[..length], &theirs[..their_length]);
    }
}
