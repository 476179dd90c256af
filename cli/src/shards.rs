//! Move payloads between files and directories of shard files.
//!
//! A shard directory holds a `manifest` (the [Config] wire form) and one
//! `<index>.shard` file per shard. Shard files that are missing are treated as erasures.

use bytes::{Bytes, BytesMut};
use rand::Rng;
use std::{fs, path::Path};
use tessera_coding::{Config, ReedSolomon, Shards};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Name of the file holding the codec configuration.
pub const MANIFEST: &str = "manifest";

/// Extension of shard files.
pub const SHARD_EXTENSION: &str = "shard";

/// Text encoded by the `demo` subcommand.
pub const DEMO_TEXT: &str = "This is test text!";

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("coding error: {0}")]
    Coding(#[from] tessera_coding::Error),
    #[error("payload too large: {len} > {capacity}")]
    PayloadTooLarge { len: usize, capacity: usize },
    #[error("empty input")]
    EmptyInput,
    #[error("payload is not valid utf-8")]
    InvalidUtf8,
    #[error("frame markers not found")]
    MissingFrame,
}

/// Frame `text` and return it as bytes.
fn frame(text: &str, rng: &mut impl Rng) -> Result<Vec<u8>, Error> {
    tessera_framing::prepare(text, rng)
        .map(String::into_bytes)
        .ok_or(Error::EmptyInput)
}

/// Strip the frame from a decoded (zero-padded) buffer.
fn unframe(decoded: &[u8]) -> Result<Vec<u8>, Error> {
    let text = std::str::from_utf8(decoded).map_err(|_| Error::InvalidUtf8)?;
    tessera_framing::extract(text)
        .map(|payload| payload.as_bytes().to_vec())
        .ok_or(Error::MissingFrame)
}

/// Encode `payload` with `config`, refusing payloads that would be truncated.
pub fn encode_payload(config: Config, payload: &[u8]) -> Result<Shards, Error> {
    let rs = ReedSolomon::new(config)?;
    if payload.len() > config.capacity() {
        return Err(Error::PayloadTooLarge {
            len: payload.len(),
            capacity: config.capacity(),
        });
    }
    Ok(rs.encode(payload))
}

/// Write the manifest and every shard into `dir`, creating it if needed.
pub fn write_shards(dir: &Path, config: &Config, shards: &Shards) -> Result<(), Error> {
    fs::create_dir_all(dir)?;
    let mut manifest = BytesMut::with_capacity(Config::SIZE);
    config.write(&mut manifest);
    fs::write(dir.join(MANIFEST), &manifest)?;
    for (index, shard) in shards {
        let path = dir.join(format!("{index}.{SHARD_EXTENSION}"));
        fs::write(&path, shard)?;
        debug!(index, path = %path.display(), "wrote shard");
    }
    Ok(())
}

/// Read the manifest and whatever shards are present in `dir`.
pub fn read_shards(dir: &Path) -> Result<(Config, Shards), Error> {
    let manifest = fs::read(dir.join(MANIFEST))?;
    let config = Config::read(&mut manifest.as_slice())?;

    let mut shards = Shards::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SHARD_EXTENSION) {
            continue;
        }
        let Some(index) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<u16>().ok())
        else {
            warn!(path = %path.display(), "skipping shard with unparsable index");
            continue;
        };
        shards.insert(index, Bytes::from(fs::read(&path)?));
    }
    debug!(found = shards.len(), "read shards");
    Ok((config, shards))
}

/// Encode the file at `input` into a shard directory at `output`.
pub fn encode_file(
    input: &Path,
    output: &Path,
    config: Config,
    framed: bool,
    rng: &mut impl Rng,
) -> Result<(), Error> {
    let mut payload = fs::read(input)?;
    if framed {
        let text = String::from_utf8(payload).map_err(|_| Error::InvalidUtf8)?;
        payload = frame(&text, rng)?;
    }
    let shards = encode_payload(config, &payload)?;
    write_shards(output, &config, &shards)?;
    info!(
        len = payload.len(),
        total = config.total_shards,
        minimum = config.minimum_shards,
        shard_size = config.shard_size,
        output = %output.display(),
        "encoded file"
    );
    Ok(())
}

/// Decode the shard directory at `input` and write the payload to `output`.
///
/// Without framing, the written payload is the full zero-padded buffer.
pub fn decode_file(input: &Path, output: &Path, framed: bool) -> Result<(), Error> {
    let (config, shards) = read_shards(input)?;
    let rs = ReedSolomon::new(config)?;
    let mut payload = rs.decode(&shards)?;
    if framed {
        payload = unframe(&payload)?;
    }
    fs::write(output, &payload)?;
    info!(
        len = payload.len(),
        shards = shards.len(),
        output = %output.display(),
        "decoded file"
    );
    Ok(())
}

/// Frame, encode, decode, and extract [DEMO_TEXT] with a `10`/`7` codec.
pub fn demo(rng: &mut impl Rng) -> Result<String, Error> {
    let config = Config::new(10, 7);
    let shards = encode_payload(config, &frame(DEMO_TEXT, rng)?)?;
    let decoded = ReedSolomon::new(config)?.decode(&shards)?;
    let payload = unframe(&decoded)?;
    String::from_utf8(payload).map_err(|_| Error::InvalidUtf8)
}
