//! Encode data to enable recovery from a subset of fragments.
//!
//! A payload is split into `k` data shards and expanded into `n > k` coded shards over
//! GF(2^8). Any `k` of the `n` coded shards are enough to recover the payload.
//!
//! # Example
//!
//! ```
//! use tessera_coding::{Config, ReedSolomon};
//!
//! let rs = ReedSolomon::new(Config::new(10, 7)).unwrap();
//! let data = b"Hello!";
//!
//! // Turn the data into 10 shards of 256 bytes.
//! let mut shards = rs.encode(&data[..]);
//! assert_eq!(shards.len(), 10);
//!
//! // Lose any three of them.
//! shards.remove(&0);
//! shards.remove(&4);
//! shards.remove(&9);
//!
//! // The decoded buffer is the payload, zero-padded to k * s bytes.
//! let decoded = rs.decode(&shards).unwrap();
//! assert_eq!(decoded.len(), 7 * 256);
//! assert_eq!(&decoded[..data.len()], data);
//! ```
//!
//! # Caveats
//!
//! - Payloads longer than [Config::capacity] are truncated, not rejected.
//! - Shards carry no integrity check. A corrupted shard that is selected for decoding
//!   produces a wrong payload, not an error.

use bytes::{Buf, BufMut};
use thiserror::Error;

pub mod gf256;
pub mod matrix;
mod reed_solomon;

pub use gf256::DomainError;
pub use matrix::Matrix;
pub use reed_solomon::{ReedSolomon, Shards};

/// Default number of bytes in a shard.
pub const DEFAULT_SHARD_SIZE: usize = 256;

/// The largest number of shards a configuration may produce.
///
/// The generator has 255 non-zero powers, so row 255 would repeat row 0.
pub const MAX_TOTAL_SHARDS: u16 = gf256::ORDER as u16;

/// Errors that can occur when configuring, encoding, or decoding.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("field error: {0}")]
    Domain(#[from] DomainError),
    #[error("insufficient shards: have {have}, need {need}")]
    InsufficientShards { have: usize, need: usize },
    #[error("invalid shard {index}: {len} bytes, expected {expected}")]
    InvalidShard {
        index: u16,
        len: usize,
        expected: usize,
    },
    #[error("invalid index: {0}")]
    InvalidIndex(u16),
    #[error("singular matrix")]
    SingularMatrix,
    #[error("unexpected end of buffer")]
    EndOfBuffer,
}

/// Shard counts and sizes for a [ReedSolomon] codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
    /// The number of shards produced (`n`).
    pub total_shards: u16,
    /// The number of shards needed to recover the data (`k`).
    pub minimum_shards: u16,
    /// The number of bytes in every shard (`s`).
    pub shard_size: usize,
}

impl Config {
    /// Encoded length of a [Config].
    pub const SIZE: usize = 2 * std::mem::size_of::<u16>() + std::mem::size_of::<u32>();

    /// Create a configuration with the [DEFAULT_SHARD_SIZE].
    pub const fn new(total_shards: u16, minimum_shards: u16) -> Self {
        Self {
            total_shards,
            minimum_shards,
            shard_size: DEFAULT_SHARD_SIZE,
        }
    }

    /// Override the shard size.
    pub const fn with_shard_size(mut self, shard_size: usize) -> Self {
        self.shard_size = shard_size;
        self
    }

    /// The largest payload that can be encoded without truncation.
    pub fn capacity(&self) -> usize {
        usize::from(self.minimum_shards) * self.shard_size
    }

    /// Check that `0 < k < n <= 255` and that shards are non-empty.
    pub fn validate(&self) -> Result<(), Error> {
        if self.total_shards > MAX_TOTAL_SHARDS {
            return Err(Error::InvalidConfiguration("too many total shards"));
        }
        if self.minimum_shards == 0 {
            return Err(Error::InvalidConfiguration("minimum shards must be non-zero"));
        }
        if self.minimum_shards >= self.total_shards {
            return Err(Error::InvalidConfiguration(
                "minimum shards must be less than total shards",
            ));
        }
        if self.shard_size == 0 {
            return Err(Error::InvalidConfiguration("shard size must be non-zero"));
        }
        if u32::try_from(self.shard_size).is_err() {
            return Err(Error::InvalidConfiguration("shard size too large"));
        }
        Ok(())
    }

    /// Write the configuration as `n: u16 | k: u16 | s: u32` (big-endian).
    pub fn write(&self, buf: &mut impl BufMut) {
        buf.put_u16(self.total_shards);
        buf.put_u16(self.minimum_shards);
        buf.put_u32(self.shard_size as u32);
    }

    /// Read and validate a configuration written by [Config::write].
    pub fn read(buf: &mut impl Buf) -> Result<Self, Error> {
        if buf.remaining() < Self::SIZE {
            return Err(Error::EndOfBuffer);
        }
        let config = Self {
            total_shards: buf.get_u16(),
            minimum_shards: buf.get_u16(),
            shard_size: buf.get_u32() as usize,
        };
        config.validate()?;
        Ok(config)
    }
}
