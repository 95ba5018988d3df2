//! Bar Pattern Encoding
//!
//! Digits become 7-module codes chosen by a parity pattern, wrapped in
//! guard and center patterns. Guard bars use `L` so a renderer can draw
//! them full height; data modules are `0` (space) and `1` (bar).

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// One module of a bar pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Space,
    Bar,
    /// Full-height guard bar
    Guard,
}

impl Module {
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '0' => Some(Module::Space),
            '1' => Some(Module::Bar),
            'L' => Some(Module::Guard),
            _ => None,
        }
    }
}

/// Final symbol pattern over the alphabet `0`, `1`, `L`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BitPattern(String);

impl BitPattern {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn modules(&self) -> impl Iterator<Item = Module> + '_ {
        self.0.chars().filter_map(Module::from_symbol)
    }
}

impl fmt::Display for BitPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// --- Tables ---

/// Columns O, E
pub const UPCA_BITS: [[&str; 2]; 10] = [
    ["0001101", "1110010"],
    ["0011001", "1100110"],
    ["0010011", "1101100"],
    ["0111101", "1000010"],
    ["0100011", "1011100"],
    ["0110001", "1001110"],
    ["0101111", "1010000"],
    ["0111011", "1000100"],
    ["0110111", "1001000"],
    ["0001011", "1110100"],
];

pub const UPCA_PARITY: [&str; 10] = ["OOOOOOEEEEEE"; 10];

/// Columns O, E
pub const UPC5_BITS: [[&str; 2]; 10] = [
    ["0001101", "0100111"],
    ["0011001", "0110011"],
    ["0010011", "0011011"],
    ["0111101", "0100001"],
    ["0100011", "0011101"],
    ["0110001", "0111001"],
    ["0101111", "0000101"],
    ["0111011", "0010001"],
    ["0110111", "0001001"],
    ["0001011", "0010111"],
];

pub const UPC5_PARITY: [&str; 10] = [
    "EEOOO", "EOEOO", "EOOEO", "EOOOE", "OEEOO", "OOEEO", "OOOEE", "OEOEO", "OEOOE", "OOEOE",
];

/// Columns A, B, C
pub const EAN13_BITS: [[&str; 3]; 10] = [
    ["0001101", "0100111", "1110010"],
    ["0011001", "0110011", "1100110"],
    ["0010011", "0011011", "1101100"],
    ["0111101", "0100001", "1000010"],
    ["0100011", "0011101", "1011100"],
    ["0110001", "0111001", "1001110"],
    ["0101111", "0000101", "1010000"],
    ["0111011", "0010001", "1000100"],
    ["0110111", "0001001", "1001000"],
    ["0001011", "0010111", "1110100"],
];

pub const EAN13_PARITY: [&str; 10] = [
    "AAAAAACCCCCC",
    "AABABBCCCCCC",
    "AABBABCCCCCC",
    "AABBBACCCCCC",
    "ABAABBCCCCCC",
    "ABBAABCCCCCC",
    "ABBBAACCCCCC",
    "ABABABCCCCCC",
    "ABABBACCCCCC",
    "ABBABACCCCCC",
];

const GUARD: &str = "L0L";
const CENTER: &str = "0L0L0";
const ADDON_GUARD: &str = "1011";
const DELINEATOR: &str = "01";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("expected {expected} digits, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    /// Digit outside 0-9
    #[error("digit {0} cannot be encoded")]
    BadDigit(usize),

    /// Parity selector outside 0-9
    #[error("no parity pattern for selector {0}")]
    BadSelector(u8),

    /// Parity pattern shorter than the digit run
    #[error("no parity for digit {0}")]
    ParityExhausted(usize),
}

fn column(parity: char) -> usize {
    match parity {
        'O' | 'A' => 0,
        'E' | 'B' => 1,
        _ => 2,
    }
}

/// Pick the parity pattern for a selector digit
fn parity_for(table: &[&'static str; 10], selector: u8) -> Result<&'static str, EncodeError> {
    table
        .get(usize::from(selector))
        .copied()
        .ok_or(EncodeError::BadSelector(selector))
}

/// Concatenate the 7-module code of every digit under its parity column
fn data_codes<const N: usize>(
    digits: &[u8],
    parity: &str,
    table: &[[&str; N]; 10],
) -> Result<String, EncodeError> {
    let mut parity = parity.chars();
    let mut out = String::with_capacity(digits.len() * 7);

    for (i, &digit) in digits.iter().enumerate() {
        let p = parity.next().ok_or(EncodeError::ParityExhausted(i))?;
        let code = table
            .get(usize::from(digit))
            .and_then(|row| row.get(column(p)))
            .ok_or(EncodeError::BadDigit(i))?;
        out.push_str(code);
    }

    Ok(out)
}

fn wrap_main(codes: &str) -> BitPattern {
    let (left, right) = codes.split_at(codes.len() / 2);
    BitPattern(format!("{GUARD}{left}{CENTER}{right}{GUARD}"))
}

/// 13-digit EAN; the leading digit is carried by the left-half parity
pub fn encode_ean13(digits: &[u8]) -> Result<BitPattern, EncodeError> {
    if digits.len() != 13 {
        return Err(EncodeError::WrongLength { expected: 13, actual: digits.len() });
    }
    let parity = parity_for(&EAN13_PARITY, digits[0])?;
    let codes = data_codes(&digits[1..], parity, &EAN13_BITS)?;
    Ok(wrap_main(&codes))
}

/// 12-digit UPC-A; parity keyed by the check digit
pub fn encode_upca(digits: &[u8]) -> Result<BitPattern, EncodeError> {
    if digits.len() != 12 {
        return Err(EncodeError::WrongLength { expected: 12, actual: digits.len() });
    }
    let parity = parity_for(&UPCA_PARITY, digits[11])?;
    let codes = data_codes(digits, parity, &UPCA_BITS)?;
    Ok(wrap_main(&codes))
}

/// 5-digit add-on. `digits` holds the five printed digits followed by
/// the hidden check value. No trailing guard.
pub fn encode_upc5(digits: &[u8]) -> Result<BitPattern, EncodeError> {
    if digits.len() != 6 {
        return Err(EncodeError::WrongLength { expected: 6, actual: digits.len() });
    }
    let parity = parity_for(&UPC5_PARITY, digits[5])?;
    let codes = data_codes(&digits[..5], parity, &UPC5_BITS)?;

    let mut out = String::from(ADDON_GUARD);
    for i in 0..5 {
        if i > 0 {
            out.push_str(DELINEATOR);
        }
        out.push_str(&codes[i * 7..(i + 1) * 7]);
    }
    Ok(BitPattern(out))
}
