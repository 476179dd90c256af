#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeMap;
use tessera_coding::{Config, Error, ReedSolomon, MAX_TOTAL_SHARDS};

const MAX_SHARD_SIZE: usize = 512;

#[derive(Debug)]
struct FuzzInput {
    config: Config,
    data: Vec<u8>,
    keep: Vec<u16>,
    corrupt: Option<(u16, Vec<u8>)>,
}

impl<'a> Arbitrary<'a> for FuzzInput {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let total = u.int_in_range(2..=MAX_TOTAL_SHARDS)?;
        let minimum = u.int_in_range(1..=total - 1)?; // minimum < total
        let shard_size = u.int_in_range(1..=MAX_SHARD_SIZE)?;
        let config = Config::new(total, minimum).with_shard_size(shard_size);

        // Allow payloads past capacity to exercise truncation
        let data_len = u.int_in_range(0..=config.capacity() + shard_size)?;
        let data = u.bytes(data_len)?.to_vec();

        // Partial Fisher-Yates over the shard indices
        let keep_len = u.int_in_range(0..=usize::from(total))?;
        let mut indices: Vec<u16> = (0..total).collect();
        for i in 0..keep_len {
            let j = u.int_in_range(i..=usize::from(total) - 1)?;
            indices.swap(i, j);
        }
        indices.truncate(keep_len);

        let corrupt = if u.arbitrary()? {
            let index = u.int_in_range(0..=total - 1)?;
            Some((index, u.arbitrary()?))
        } else {
            None
        };

        Ok(FuzzInput {
            config,
            data,
            keep: indices,
            corrupt,
        })
    }
}

fn fuzz(input: FuzzInput) {
    let rs = ReedSolomon::new(input.config).expect("config is valid by construction");
    let k = usize::from(input.config.minimum_shards);
    let s = input.config.shard_size;

    let shards = rs.encode(input.data.as_slice());
    assert_eq!(shards.len(), usize::from(input.config.total_shards));
    assert!(shards.values().all(|shard| shard.len() == s));

    let mut expected = input.data.clone();
    expected.resize(input.config.capacity(), 0);

    let mut selected: BTreeMap<u16, Bytes> = input
        .keep
        .iter()
        .map(|i| (*i, shards[i].clone()))
        .collect();
    let corrupted = match input.corrupt {
        Some((index, bytes)) if selected.contains_key(&index) => {
            let wrong_len = bytes.len() != s;
            let changed = bytes.as_slice() != selected[&index].as_ref();
            selected.insert(index, Bytes::from(bytes));
            let used = selected.keys().take(k).any(|i| *i == index);
            used.then_some((wrong_len, changed))
        }
        _ => None,
    };

    match rs.decode(&selected) {
        Ok(decoded) => {
            assert!(selected.len() >= k);
            assert_eq!(decoded.len(), input.config.capacity());
            match corrupted {
                None | Some((false, false)) => assert_eq!(decoded, expected),
                Some((true, _)) => panic!("wrong-length shard accepted"),
                Some((false, true)) => {}
            }
        }
        Err(Error::InsufficientShards { have, need }) => {
            assert_eq!(have, selected.len());
            assert_eq!(need, k);
            assert!(have < need);
        }
        Err(Error::InvalidShard { len, expected, .. }) => {
            assert_ne!(len, expected);
            assert!(matches!(corrupted, Some((true, _))));
        }
        Err(e) => panic!("unexpected decode failure: {e:?}"),
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
