use bytes::Bytes;
use rand::{rngs::StdRng, seq::index::sample, Rng, RngCore, SeedableRng};
use std::collections::BTreeMap;
use tessera_coding::{Config, Error, Matrix, ReedSolomon, Shards};

fn keep(shards: &Shards, indices: impl IntoIterator<Item = u16>) -> Shards {
    indices
        .into_iter()
        .map(|i| (i, shards[&i].clone()))
        .collect()
}

#[test]
fn test_text_payload_first_seven() {
    let rs = ReedSolomon::new(Config::new(10, 7)).unwrap();
    let payload = "This is test text!".as_bytes();

    let shards = rs.encode(payload);
    assert_eq!(shards.len(), 10);
    for (index, shard) in &shards {
        assert_eq!(shard.len(), 256, "shard {index}");
    }

    let decoded = rs.decode(&keep(&shards, 0..7)).unwrap();
    assert_eq!(decoded.len(), 1792);
    assert_eq!(&decoded[..payload.len()], payload);
    assert!(decoded[payload.len()..].iter().all(|&b| b == 0));
}

#[test]
fn test_text_payload_last_seven() {
    let rs = ReedSolomon::new(Config::new(10, 7)).unwrap();
    let payload = "This is test text!".as_bytes();
    let shards = rs.encode(payload);
    let decoded = rs.decode(&keep(&shards, 3..10)).unwrap();
    assert_eq!(&decoded[..payload.len()], payload);
}

#[test]
fn test_random_configs_random_erasures() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..32 {
        let total = rng.gen_range(2..=64u16);
        let minimum = rng.gen_range(1..total);
        let shard_size = rng.gen_range(1..=300usize);
        let config = Config::new(total, minimum).with_shard_size(shard_size);
        let rs = ReedSolomon::new(config).unwrap();

        let mut payload = vec![0u8; rng.gen_range(0..=config.capacity())];
        rng.fill_bytes(&mut payload);
        let shards = rs.encode(payload.as_slice());

        // Drop exactly n - k shards
        let survivors = sample(&mut rng, usize::from(total), usize::from(minimum))
            .into_iter()
            .map(|i| i as u16);
        let decoded = rs.decode(&keep(&shards, survivors)).unwrap();

        let mut expected = payload;
        expected.resize(config.capacity(), 0);
        assert_eq!(decoded, expected, "n={total} k={minimum} s={shard_size}");
    }
}

#[test]
fn test_extra_shards_do_not_change_result() {
    let rs = ReedSolomon::new(Config::new(12, 5).with_shard_size(40)).unwrap();
    let mut payload = vec![0u8; 190];
    StdRng::seed_from_u64(7).fill_bytes(&mut payload);
    let shards = rs.encode(payload.as_slice());

    let exact = rs.decode(&keep(&shards, [1, 3, 5, 7, 9])).unwrap();
    let with_extras = rs.decode(&keep(&shards, [1, 3, 5, 7, 9, 10, 11])).unwrap();
    assert_eq!(exact, with_extras);
    assert_eq!(&exact[..190], payload.as_slice());
}

#[test]
fn test_generator_submatrices_invert() {
    let rs = ReedSolomon::new(Config::new(40, 12)).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..16 {
        let mut rows: Vec<u16> = sample(&mut rng, 40, 12)
            .into_iter()
            .map(|i| i as u16)
            .collect();
        rows.sort_unstable();
        let m = rs.generator().select_rows(&rows).unwrap();
        assert_eq!(m.mul(&m.invert().unwrap()), Matrix::identity(12));
    }
}

#[test]
fn test_decode_failures() {
    let rs = ReedSolomon::new(Config::new(6, 4).with_shard_size(16)).unwrap();
    let shards = rs.encode(&b"failures"[..]);

    let err = rs.decode(&keep(&shards, 0..3)).unwrap_err();
    assert!(matches!(err, Error::InsufficientShards { have: 3, need: 4 }));
    assert_eq!(err.to_string(), "insufficient shards: have 3, need 4");

    let mut short = keep(&shards, 0..4);
    short.insert(2, Bytes::from(vec![0u8; 15]));
    assert!(matches!(
        rs.decode(&short),
        Err(Error::InvalidShard { index: 2, .. })
    ));

    let empty: BTreeMap<u16, Vec<u8>> = BTreeMap::new();
    assert!(matches!(
        rs.decode(&empty),
        Err(Error::InsufficientShards { have: 0, need: 4 })
    ));
}

#[test]
fn test_construction_failures() {
    assert!(matches!(
        ReedSolomon::new(Config::new(300, 10)),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(matches!(
        ReedSolomon::new(Config::new(10, 10)),
        Err(Error::InvalidConfiguration(_))
    ));
}
