//! Checksum Resolution
//!
//! Weighted sum modulo the format's modulus. A fully specified sequence
//! must sum to zero; a single wildcard is solved for.

use thiserror::Error;
use tracing::trace;

use crate::charmap::DigitSlot;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecksumError {
    #[error("wrong number of digits: {digits} given, {weights} expected")]
    LengthMismatch { digits: usize, weights: usize },

    #[error("checksum error")]
    Mismatch,

    #[error("too many wildcard digits ({0})")]
    TooManyWildcards(usize),

    #[error("no check value up to {max} satisfies the checksum")]
    Unresolvable { max: u8 },
}

/// `(Σ digit[i] * weight[i]) mod modulus`, always in `0..modulus`
pub fn remainder(digits: &[u8], weights: &[i32], modulus: i32) -> Result<i32, ChecksumError> {
    if digits.len() != weights.len() {
        return Err(ChecksumError::LengthMismatch {
            digits: digits.len(),
            weights: weights.len(),
        });
    }

    let sum: i32 = digits
        .iter()
        .zip(weights)
        .map(|(&d, &w)| i32::from(d) * w)
        .sum();

    Ok(sum.rem_euclid(modulus))
}

/// Validate or solve the digit sequence.
///
/// Returns `Ok(None)` when nothing was wild, `Ok(Some((index, value)))`
/// for the solved slot. Candidates run from 0 to `max_value` inclusive.
pub fn resolve(
    slots: &[DigitSlot],
    weights: &[i32],
    modulus: i32,
    max_value: u8,
) -> Result<Option<(usize, u8)>, ChecksumError> {
    let wild: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_wildcard())
        .map(|(i, _)| i)
        .collect();

    match wild.as_slice() {
        [] => {
            let digits: Vec<u8> = slots.iter().filter_map(|s| s.value()).collect();
            if remainder(&digits, weights, modulus)? == 0 {
                Ok(None)
            } else {
                Err(ChecksumError::Mismatch)
            }
        }
        [index] => {
            let mut digits: Vec<u8> = slots.iter().map(|s| s.value().unwrap_or(0)).collect();
            for candidate in 0..=max_value {
                digits[*index] = candidate;
                if remainder(&digits, weights, modulus)? == 0 {
                    trace!(index, candidate, "wildcard resolved");
                    return Ok(Some((*index, candidate)));
                }
            }
            Err(ChecksumError::Unresolvable { max: max_value })
        }
        many => Err(ChecksumError::TooManyWildcards(many.len())),
    }
}
