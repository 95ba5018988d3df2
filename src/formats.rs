//! Format Configurations - Immutable Per-Format Contracts
//!
//! Every supported numbering system is a static record. The pipeline is
//! the same for all of them; only the configuration differs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::charmap::{
    CharMaps, DASHED, DASHED_OR_SPACED, DIGITS, DIGITS_OR_WILD, ISBN10_LAST, ISMN_FIRST,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormatTag {
    UpcA,
    Ean13,
    Upc5,
    Isbn10,
    Isbn13,
    Ismn,
    Ismn13,
}

impl FormatTag {
    pub const ALL: [FormatTag; 7] = [
        FormatTag::UpcA,
        FormatTag::Ean13,
        FormatTag::Upc5,
        FormatTag::Isbn10,
        FormatTag::Isbn13,
        FormatTag::Ismn,
        FormatTag::Ismn13,
    ];

    pub fn config(self) -> &'static FormatConfig {
        match self {
            FormatTag::UpcA => &UPCA,
            FormatTag::Ean13 => &EAN13,
            FormatTag::Upc5 => &UPC5,
            FormatTag::Isbn10 => &ISBN10,
            FormatTag::Isbn13 => &ISBN13,
            FormatTag::Ismn => &ISMN,
            FormatTag::Ismn13 => &ISMN13,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FormatTag::UpcA => "UPCA",
            FormatTag::Ean13 => "EAN13",
            FormatTag::Upc5 => "UPC5",
            FormatTag::Isbn10 => "ISBN10",
            FormatTag::Isbn13 => "ISBN13",
            FormatTag::Ismn => "ISMN",
            FormatTag::Ismn13 => "ISMN13",
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown product code format: {0}")]
pub struct UnknownFormat(pub String);

impl FromStr for FormatTag {
    type Err = UnknownFormat;

    /// Accepts `isbn10`, `ISBN-10`, `upc_a` and the like
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_uppercase();
        FormatTag::ALL
            .into_iter()
            .find(|tag| tag.name() == key)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// How a format turns its resolved digits into a bar pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    /// 12 digits, parity keyed by the check digit
    UpcA,
    /// 13 digits, parity keyed by the leading digit
    Ean13,
    /// 5 printed digits, parity keyed by the hidden check digit
    Upc5,
    /// No symbol of its own; printed as its EAN-13 form
    ViaEan13,
}

/// Leading characters that must match, checked against the raw input.
///
/// `allowed[i]` lists the characters accepted at position `i`; a wildcard
/// is always accepted. `zero_after` additionally pins the digit slot at
/// that index to 0.
#[derive(Debug, Clone, Copy)]
pub struct PrefixRule {
    pub allowed: &'static [&'static str],
    pub zero_after: Option<usize>,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct FormatConfig {
    pub tag: FormatTag,
    pub label: &'static str,
    pub maps: CharMaps,
    pub weights: &'static [i32],
    pub modulus: i32,
    /// Largest value a wildcard may resolve to
    pub max_check_value: u8,
    /// Display `10` as `X`
    pub ten_as_x: bool,
    /// Caller omits the check digit; a wildcard slot is appended internally
    pub hidden_check: bool,
    pub prefix: Option<PrefixRule>,
    pub symbology: Symbology,
}

impl FormatConfig {
    /// Display character for a resolved digit value
    pub fn display_char(&self, value: u8) -> Option<char> {
        match value {
            0..=9 => char::from_digit(u32::from(value), 10),
            10 if self.ten_as_x => Some('X'),
            _ => None,
        }
    }

    pub fn digit_count(&self) -> usize {
        self.weights.len()
    }

    /// Number of characters the caller sees in the display string
    pub fn printed_len(&self, normalized: &str) -> usize {
        let len = normalized.chars().count();
        if self.hidden_check {
            len.saturating_sub(1)
        } else {
            len
        }
    }
}

const EAN13_WEIGHTS: &[i32] = &[1, 3, 1, 3, 1, 3, 1, 3, 1, 3, 1, 3, 1];

const EAN_MAPS: CharMaps = CharMaps {
    first: DIGITS_OR_WILD,
    interior: DASHED,
    last: DIGITS_OR_WILD,
};

pub static UPCA: FormatConfig = FormatConfig {
    tag: FormatTag::UpcA,
    label: "",
    maps: EAN_MAPS,
    weights: &[3, 1, 3, 1, 3, 1, 3, 1, 3, 1, 3, 1],
    modulus: 10,
    max_check_value: 9,
    ten_as_x: false,
    hidden_check: false,
    prefix: None,
    symbology: Symbology::UpcA,
};

pub static EAN13: FormatConfig = FormatConfig {
    tag: FormatTag::Ean13,
    label: "EAN13",
    maps: EAN_MAPS,
    weights: EAN13_WEIGHTS,
    modulus: 10,
    max_check_value: 9,
    ten_as_x: false,
    hidden_check: false,
    prefix: None,
    symbology: Symbology::Ean13,
};

// The check digit is not printed; weight -1 on the appended slot
pub static UPC5: FormatConfig = FormatConfig {
    tag: FormatTag::Upc5,
    label: "",
    maps: CharMaps {
        first: DIGITS,
        interior: DIGITS,
        last: DIGITS_OR_WILD,
    },
    weights: &[3, 9, 3, 9, 3, -1],
    modulus: 10,
    max_check_value: 9,
    ten_as_x: false,
    hidden_check: true,
    prefix: None,
    symbology: Symbology::Upc5,
};

pub static ISBN10: FormatConfig = FormatConfig {
    tag: FormatTag::Isbn10,
    label: "ISBN",
    maps: CharMaps {
        first: DIGITS_OR_WILD,
        interior: DASHED,
        last: ISBN10_LAST,
    },
    weights: &[10, 9, 8, 7, 6, 5, 4, 3, 2, 1],
    modulus: 11,
    max_check_value: 9,
    ten_as_x: true,
    hidden_check: false,
    prefix: None,
    symbology: Symbology::ViaEan13,
};

pub static ISBN13: FormatConfig = FormatConfig {
    tag: FormatTag::Isbn13,
    label: "ISBN",
    maps: EAN_MAPS,
    weights: EAN13_WEIGHTS,
    modulus: 10,
    max_check_value: 9,
    ten_as_x: false,
    hidden_check: false,
    prefix: Some(PrefixRule {
        allowed: &["9", "7", "89"],
        zero_after: None,
        description: "978 or 979",
    }),
    symbology: Symbology::Ean13,
};

pub static ISMN: FormatConfig = FormatConfig {
    tag: FormatTag::Ismn,
    label: "ISMN",
    maps: CharMaps {
        first: ISMN_FIRST,
        interior: DASHED_OR_SPACED,
        last: DIGITS_OR_WILD,
    },
    weights: &[3, 1, 3, 1, 3, 1, 3, 1, 3, 1],
    modulus: 10,
    max_check_value: 9,
    ten_as_x: false,
    hidden_check: false,
    prefix: None,
    symbology: Symbology::ViaEan13,
};

pub static ISMN13: FormatConfig = FormatConfig {
    tag: FormatTag::Ismn13,
    label: "ISMN",
    maps: EAN_MAPS,
    weights: EAN13_WEIGHTS,
    modulus: 10,
    max_check_value: 9,
    ten_as_x: false,
    hidden_check: false,
    prefix: Some(PrefixRule {
        allowed: &["9", "7", "9"],
        zero_after: Some(3),
        description: "979-0",
    }),
    symbology: Symbology::Ean13,
};
