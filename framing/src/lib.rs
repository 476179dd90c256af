//! Wrap text payloads in random filler and delimiters before coding.
//!
//! [prepare] surrounds a payload with [PADDING_SIZE] random characters on each side,
//! separated from it by [SEPARATOR]. [extract] recovers the payload by locating the
//! first two separators. Since a decoded buffer is zero-padded to a fixed length,
//! framing is how a text payload is recovered exactly.
//!
//! The payload must not itself contain [SEPARATOR], otherwise [extract] stops at the
//! first occurrence inside it.

use rand::Rng;

/// Characters the random filler is drawn from.
pub const CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";

/// Number of filler characters on each side of the payload.
pub const PADDING_SIZE: usize = 512;

/// Delimiter placed on both sides of the payload.
pub const SEPARATOR: &str = ":::";

/// Length of a framed payload whose trimmed text is `len` bytes.
pub const fn framed_len(len: usize) -> usize {
    2 * PADDING_SIZE + 2 * SEPARATOR.len() + len
}

/// Frame `data` as `filler + SEPARATOR + data.trim() + SEPARATOR + filler`.
///
/// Returns `None` if `data` is empty.
pub fn prepare(data: &str, rng: &mut impl Rng) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    let data = data.trim();
    let mut framed = String::with_capacity(framed_len(data.len()));
    push_filler(&mut framed, rng);
    framed.push_str(SEPARATOR);
    framed.push_str(data);
    framed.push_str(SEPARATOR);
    push_filler(&mut framed, rng);
    Some(framed)
}

/// Return the text between the first and second [SEPARATOR].
///
/// Returns `None` if `data` is empty or fewer than two separators are present.
pub fn extract(data: &str) -> Option<&str> {
    if data.is_empty() {
        return None;
    }
    let start = data.find(SEPARATOR)? + SEPARATOR.len();
    let len = data[start..].find(SEPARATOR)?;
    Some(&data[start..start + len])
}

fn push_filler(out: &mut String, rng: &mut impl Rng) {
    for _ in 0..PADDING_SIZE {
        out.push(char::from(CHARSET[rng.gen_range(0..CHARSET.len())]));
    }
}
