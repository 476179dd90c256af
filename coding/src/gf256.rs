//! Arithmetic over GF(2^8).
//!
//! The field is built from the primitive polynomial `x^8 + x^4 + x^3 + x^2 + 1` (`0x11D`)
//! with generator `2`. Addition is XOR. Multiplication, division and inversion go through
//! a pair of log/exp tables that are computed once per process, on first use, and are
//! read-only afterwards.

use std::sync::OnceLock;
use thiserror::Error;

/// The primitive polynomial used to reduce products back into 8 bits.
pub const POLYNOMIAL: u16 = 0x11D;

/// The multiplicative generator of the field.
pub const GENERATOR: u8 = 2;

/// The number of non-zero elements (the order of the multiplicative group).
pub const ORDER: usize = 255;

/// Length of the exponent table.
///
/// The first [ORDER] entries are duplicated so that the sum of two logarithms
/// (at most `2 * 254`) can be looked up without reducing modulo [ORDER].
const EXP_TABLE_SIZE: usize = 512;

/// Errors raised when an operation is undefined for the zero element.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("logarithm of zero")]
    LogOfZero,
    #[error("zero has no multiplicative inverse")]
    InverseOfZero,
}

struct Tables {
    exp: [u8; EXP_TABLE_SIZE],
    log: [u8; 256],
}

impl Tables {
    fn build() -> Self {
        let mut exp = [0u8; EXP_TABLE_SIZE];
        let mut log = [0u8; 256];

        let mut x: u16 = 1;
        for (power, slot) in exp.iter_mut().take(ORDER).enumerate() {
            *slot = x as u8;
            log[x as usize] = power as u8;
            x <<= 1;
            if x >= 256 {
                x ^= POLYNOMIAL;
            }
        }
        for i in ORDER..EXP_TABLE_SIZE {
            exp[i] = exp[i - ORDER];
        }

        Self { exp, log }
    }
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(Tables::build)
}

/// Add (or subtract) two field elements.
#[inline]
pub const fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Multiply two field elements.
#[inline]
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = tables();
    t.exp[t.log[a as usize] as usize + t.log[b as usize] as usize]
}

/// Divide `a` by `b`.
pub fn div(a: u8, b: u8) -> Result<u8, DomainError> {
    if b == 0 {
        return Err(DomainError::DivisionByZero);
    }
    if a == 0 {
        return Ok(0);
    }
    let t = tables();
    let power = (t.log[a as usize] as usize + ORDER - t.log[b as usize] as usize) % ORDER;
    Ok(t.exp[power])
}

/// Raise the generator to `power`.
///
/// Powers inside the extended table are looked up directly. Larger powers wrap
/// modulo [ORDER], which is the value the table would hold if it kept going.
#[inline]
pub fn exp(power: usize) -> u8 {
    let t = tables();
    if power < EXP_TABLE_SIZE {
        t.exp[power]
    } else {
        t.exp[power % ORDER]
    }
}

/// Discrete logarithm of `a` with respect to [GENERATOR].
pub fn log(a: u8) -> Result<u8, DomainError> {
    if a == 0 {
        return Err(DomainError::LogOfZero);
    }
    Ok(tables().log[a as usize])
}

/// Multiplicative inverse of `a`.
pub fn inv(a: u8) -> Result<u8, DomainError> {
    if a == 0 {
        return Err(DomainError::InverseOfZero);
    }
    let t = tables();
    Ok(t.exp[ORDER - t.log[a as usize] as usize])
}

/// Multiply-accumulate: `dst[i] ^= coeff * src[i]` for all `i`.
#[inline]
pub(crate) fn mul_acc(dst: &mut [u8], src: &[u8], coeff: u8) {
    debug_assert_eq!(dst.len(), src.len());
    match coeff {
        0 => {}
        1 => {
            for (d, &s) in dst.iter_mut().zip(src) {
                *d ^= s;
            }
        }
        _ => {
            for (d, &s) in dst.iter_mut().zip(src) {
                *d ^= mul(coeff, s);
            }
        }
    }
}
