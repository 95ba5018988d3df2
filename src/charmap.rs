//! Character Maps - Input Character to Digit Slot
//!
//! Each format reads its first, interior and final characters through
//! three separate maps. Separators survive in the display string but
//! never reach the digit sequence.

/// What a single input character means at a given position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Digit(u8),
    Wildcard,
    Separator,
}

/// One entry in the digit sequence: a known value or the unknown check digit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitSlot {
    Digit(u8),
    Wildcard,
}

impl DigitSlot {
    pub fn value(self) -> Option<u8> {
        match self {
            DigitSlot::Digit(d) => Some(d),
            DigitSlot::Wildcard => None,
        }
    }

    pub fn is_wildcard(self) -> bool {
        matches!(self, DigitSlot::Wildcard)
    }
}

/// Character lookup table.
///
/// Overrides are consulted first; `'0'..='9'` map to themselves when
/// `digits` is set.
#[derive(Debug, Clone, Copy)]
pub struct CharMap {
    digits: bool,
    overrides: &'static [(char, Token)],
}

impl CharMap {
    pub const fn new(overrides: &'static [(char, Token)]) -> Self {
        Self { digits: true, overrides }
    }

    /// A map that accepts only the listed characters, not even digits
    pub const fn only(overrides: &'static [(char, Token)]) -> Self {
        Self { digits: false, overrides }
    }

    pub fn lookup(&self, c: char) -> Option<Token> {
        if let Some((_, token)) = self.overrides.iter().find(|(k, _)| *k == c) {
            return Some(*token);
        }
        if self.digits {
            c.to_digit(10).map(|d| Token::Digit(d as u8))
        } else {
            None
        }
    }

    pub fn accepts(&self, c: char) -> bool {
        self.lookup(c).is_some()
    }
}

pub const DIGITS: CharMap = CharMap::new(&[]);
pub const DIGITS_OR_WILD: CharMap = CharMap::new(&[('*', Token::Wildcard)]);
pub const DASHED: CharMap = CharMap::new(&[('*', Token::Wildcard), ('-', Token::Separator)]);
pub const DASHED_OR_SPACED: CharMap = CharMap::new(&[
    ('*', Token::Wildcard),
    ('-', Token::Separator),
    (' ', Token::Separator),
]);
pub const ISBN10_LAST: CharMap = CharMap::new(&[
    ('*', Token::Wildcard),
    ('X', Token::Digit(10)),
    ('x', Token::Digit(10)),
]);
/// The leading `M` of an ISMN is a fixed seed worth 3, not a digit
pub const ISMN_FIRST: CharMap = CharMap::only(&[('M', Token::Digit(3))]);

/// The first, interior and final maps of one format
#[derive(Debug, Clone, Copy)]
pub struct CharMaps {
    pub first: CharMap,
    pub interior: CharMap,
    pub last: CharMap,
}

impl CharMaps {
    pub fn for_position(&self, index: usize, len: usize) -> &CharMap {
        if index == 0 {
            &self.first
        } else if index + 1 == len {
            &self.last
        } else {
            &self.interior
        }
    }
}

/// Rejected character and its zero-based position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejected {
    pub character: char,
    pub position: usize,
}

/// Walk `input` through the maps and collect the digit slots.
///
/// Stops at the first character its map does not know.
pub fn parse(input: &str, maps: &CharMaps) -> Result<Vec<DigitSlot>, Rejected> {
    let len = input.chars().count();
    let mut slots = Vec::with_capacity(len);

    for (position, character) in input.chars().enumerate() {
        let token = maps
            .for_position(position, len)
            .lookup(character)
            .ok_or(Rejected { character, position })?;

        match token {
            Token::Digit(d) => slots.push(DigitSlot::Digit(d)),
            Token::Wildcard => slots.push(DigitSlot::Wildcard),
            Token::Separator => {}
        }
    }

    Ok(slots)
}
