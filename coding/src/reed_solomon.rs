//! Reed-Solomon coding over GF(2^8).
//!
//! The payload is zero-padded (or truncated) to `k * s` bytes and cut into `k` data
//! shards. Output shard `i` is the linear combination of every data shard weighted by
//! row `i` of the [Matrix::generator]. The code is not systematic: no output shard is a
//! copy of a data shard, so all `n` shards must be treated as opaque coded data.
//!
//! Decoding takes the `k` lowest supplied indices, inverts the matching `k x k`
//! submatrix of the generator and multiplies it back onto the supplied shards.

use crate::{gf256, matrix::Matrix, Config, Error};
use bytes::{Buf, Bytes};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A set of shards keyed by index.
pub type Shards = BTreeMap<u16, Bytes>;

/// A Reed-Solomon codec for a fixed [Config].
///
/// The generator matrix is built once at construction and never changes, so a single
/// instance can be shared freely across threads.
#[derive(Clone, Debug)]
pub struct ReedSolomon {
    config: Config,
    generator: Matrix,
}

impl ReedSolomon {
    /// Create a codec, rejecting invalid configurations.
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;
        let generator = Matrix::generator(
            usize::from(config.total_shards),
            usize::from(config.minimum_shards),
        );
        Ok(Self { config, generator })
    }

    /// The configuration this codec was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The `n x k` generator matrix.
    pub fn generator(&self) -> &Matrix {
        &self.generator
    }

    /// Encode `data` into `n` shards of `s` bytes each.
    ///
    /// `data` should be at most [Config::capacity] bytes long. Shorter payloads are
    /// zero-padded. Anything past the capacity is dropped without an error (a warning is
    /// logged), so callers that need lossless encoding must check the length themselves.
    pub fn encode(&self, mut data: impl Buf) -> Shards {
        let k = usize::from(self.config.minimum_shards);
        let s = self.config.shard_size;
        let capacity = self.config.capacity();

        // Pad (or truncate) into k contiguous data shards
        let mut padded = vec![0u8; capacity];
        let len = data.remaining().min(capacity);
        data.copy_to_slice(&mut padded[..len]);
        if data.has_remaining() {
            warn!(
                capacity,
                dropped = data.remaining(),
                "payload exceeds capacity, truncating"
            );
        }
        let originals: Vec<&[u8]> = padded.chunks(s).collect();

        // Combine every data shard into every output shard
        let mut shards = Shards::new();
        for index in 0..self.config.total_shards {
            let mut shard = vec![0u8; s];
            for (col, original) in originals.iter().enumerate() {
                let coeff = self.generator.get(usize::from(index), col);
                gf256::mul_acc(&mut shard, original, coeff);
            }
            shards.insert(index, Bytes::from(shard));
        }
        debug!(
            total = self.config.total_shards,
            minimum = self.config.minimum_shards,
            shard_size = s,
            len,
            "encoded payload"
        );
        shards
    }

    /// Recover the padded payload (`k * s` bytes) from at least `k` shards.
    ///
    /// Only the `k` lowest indices are used. Any further shards are ignored without being
    /// examined, even if one of the selected shards is corrupt. Shards carry no
    /// integrity check, so a corrupt selected shard yields a wrong payload rather than
    /// an error.
    pub fn decode<S: AsRef<[u8]>>(&self, shards: &BTreeMap<u16, S>) -> Result<Vec<u8>, Error> {
        let k = usize::from(self.config.minimum_shards);
        let s = self.config.shard_size;
        if shards.len() < k {
            return Err(Error::InsufficientShards {
                have: shards.len(),
                need: k,
            });
        }

        // Select the k lowest indices (BTreeMap iterates in ascending order)
        let mut indices = Vec::with_capacity(k);
        let mut inputs = Vec::with_capacity(k);
        for (&index, shard) in shards.iter().take(k) {
            if index >= self.config.total_shards {
                return Err(Error::InvalidIndex(index));
            }
            let shard = shard.as_ref();
            if shard.len() != s {
                return Err(Error::InvalidShard {
                    index,
                    len: shard.len(),
                    expected: s,
                });
            }
            indices.push(index);
            inputs.push(shard);
        }
        debug!(
            ?indices,
            ignored = shards.len() - k,
            "selected shards for decoding"
        );

        // Invert the matching rows of the generator
        let inverse = self.generator.select_rows(&indices)?.invert()?;

        // Multiply the inverse onto the selected shards
        let mut output = vec![0u8; k * s];
        for (row, dst) in output.chunks_mut(s).enumerate() {
            for (col, input) in inputs.iter().enumerate() {
                gf256::mul_acc(dst, input, inverse.get(row, col));
            }
        }
        Ok(output)
    }
}
