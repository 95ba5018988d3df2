//! Construction Pipeline - Single Entry Point
//!
//! parse -> validate -> resolve checksum -> substitute wildcard ->
//! re-validate -> prefix -> encode. CRITICAL: every code is built through `build`, which always
//! runs structural validation. No bypass.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::charmap::{parse, DigitSlot};
use crate::checksum::{self, ChecksumError};
use crate::encoding::{encode_ean13, encode_upc5, encode_upca, BitPattern};
use crate::formats::{FormatConfig, FormatTag, PrefixRule, Symbology};
use crate::validation::{CodeCandidate, Validator};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    #[error("{format}: {character:?} invalid at position {position}")]
    Parse {
        format: FormatTag,
        character: char,
        position: usize,
    },

    /// One message per failed structural rule
    #[error("{}", .messages.join("\n"))]
    Structural {
        format: FormatTag,
        messages: Vec<String>,
    },

    #[error("{format}: checksum error")]
    Checksum { format: FormatTag },

    #[error("{format}: too many wildcard digits ({count})")]
    WildcardCount { format: FormatTag, count: usize },

    #[error("{format}: must begin with {expected}")]
    Prefix {
        format: FormatTag,
        expected: &'static str,
    },

    #[error("{format}: internal error: {message}")]
    Internal { format: FormatTag, message: String },

    #[error("{0}")]
    Unsupported(String),

    #[error("no product code format accepts {input:?}")]
    Unidentified { input: String },
}

impl CodeError {
    fn from_checksum(format: FormatTag, err: ChecksumError) -> Self {
        match err {
            ChecksumError::LengthMismatch { .. } => CodeError::Structural {
                format,
                messages: vec![format!("{}: {}", format, err)],
            },
            ChecksumError::TooManyWildcards(count) => CodeError::WildcardCount { format, count },
            ChecksumError::Mismatch | ChecksumError::Unresolvable { .. } => {
                CodeError::Checksum { format }
            }
        }
    }

    /// Format that raised the error, if any
    pub fn format(&self) -> Option<FormatTag> {
        match self {
            CodeError::Parse { format, .. }
            | CodeError::Structural { format, .. }
            | CodeError::Checksum { format }
            | CodeError::WildcardCount { format, .. }
            | CodeError::Prefix { format, .. }
            | CodeError::Internal { format, .. } => Some(*format),
            CodeError::Unsupported(_) | CodeError::Unidentified { .. } => None,
        }
    }
}

/// A validated product code. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCode {
    format: FormatTag,
    given: String,
    normalized: String,
    digits: Vec<u8>,
    check_digit: u8,
    bits: BitPattern,
}

impl ProductCode {
    pub fn new(format: FormatTag, input: &str) -> Result<Self, CodeError> {
        build(format.config(), input)
    }

    pub fn upc_a(input: &str) -> Result<Self, CodeError> {
        Self::new(FormatTag::UpcA, input)
    }

    pub fn ean13(input: &str) -> Result<Self, CodeError> {
        Self::new(FormatTag::Ean13, input)
    }

    /// The five printed add-on digits; the check value is computed
    pub fn upc5(input: &str) -> Result<Self, CodeError> {
        Self::new(FormatTag::Upc5, input)
    }

    pub fn isbn10(input: &str) -> Result<Self, CodeError> {
        Self::new(FormatTag::Isbn10, input)
    }

    pub fn isbn13(input: &str) -> Result<Self, CodeError> {
        Self::new(FormatTag::Isbn13, input)
    }

    pub fn ismn(input: &str) -> Result<Self, CodeError> {
        Self::new(FormatTag::Ismn, input)
    }

    pub fn ismn13(input: &str) -> Result<Self, CodeError> {
        Self::new(FormatTag::Ismn13, input)
    }

    pub fn format(&self) -> FormatTag {
        self.format
    }

    pub fn label(&self) -> &'static str {
        self.format.config().label
    }

    /// Input exactly as given
    pub fn given(&self) -> &str {
        &self.given
    }

    /// Uppercased, separators kept, wildcard replaced
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Resolved digit values, one per weight. An ISMN starts with the seed
    /// 3 for `M`; a UPC-5 ends with its unprinted check value.
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    pub fn check_digit(&self) -> u8 {
        self.check_digit
    }

    pub fn bits(&self) -> &BitPattern {
        &self.bits
    }

    /// Six digits printed under the left half of the symbol
    pub fn left_digits(&self) -> Option<String> {
        self.half_digits().map(|(left, _)| left)
    }

    /// Six digits printed under the right half of the symbol
    pub fn right_digits(&self) -> Option<String> {
        self.half_digits().map(|(_, right)| right)
    }

    fn half_digits(&self) -> Option<(String, String)> {
        let start = match self.format.config().symbology {
            Symbology::Ean13 => 1,
            Symbology::UpcA => 0,
            Symbology::Upc5 | Symbology::ViaEan13 => return None,
        };
        let text = |range: &[u8]| range.iter().map(|d| d.to_string()).collect::<String>();
        let left = self.digits.get(start..start + 6)?;
        let right = self.digits.get(start + 6..start + 12)?;
        Some((text(left), text(right)))
    }

    /// Canonical 13-digit form.
    ///
    /// ISBN-10, ISMN and UPC-A are rebuilt from scratch with a fresh check
    /// digit; the original check digit plays no part. Codes already in
    /// 13-digit form are returned as they are.
    pub fn as_ean13(&self) -> Result<ProductCode, CodeError> {
        match self.format {
            FormatTag::Ean13 | FormatTag::Isbn13 | FormatTag::Ismn13 => Ok(self.clone()),
            _ => {
                let (tag, input) = derive_ean13(self.format, &self.normalized).ok_or_else(|| {
                    CodeError::Unsupported(format!("{}: no EAN-13 form", self.format))
                })?;
                ProductCode::new(tag, &input)
            }
        }
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            "" => f.write_str(&self.normalized),
            label => write!(f, "{} {}", label, self.normalized),
        }
    }
}

/// The EAN-13 input string for a format that converts, check digit left wild
fn derive_ean13(format: FormatTag, normalized: &str) -> Option<(FormatTag, String)> {
    let mut chars = normalized.chars();
    chars.next_back();

    match format {
        FormatTag::Isbn10 => Some((FormatTag::Isbn13, format!("978-{}*", chars.as_str()))),
        FormatTag::Ismn => {
            // drop the M; spaces are not legal in EAN-13
            chars.next();
            let body = chars.as_str().replace(' ', "-");
            Some((FormatTag::Ismn13, format!("979-0{}*", body)))
        }
        FormatTag::UpcA => Some((FormatTag::Ean13, format!("0{}*", chars.as_str()))),
        _ => None,
    }
}

/// Resolved digit sequence with the solved value in the wildcard slot
fn fill(slots: &[DigitSlot], solved: Option<(usize, u8)>) -> Vec<u8> {
    slots
        .iter()
        .enumerate()
        .map(|(i, slot)| match (slot, solved) {
            (DigitSlot::Digit(d), _) => *d,
            (DigitSlot::Wildcard, Some((index, value))) if index == i => value,
            (DigitSlot::Wildcard, _) => 0,
        })
        .collect()
}

fn substitute_wildcard(s: &str, c: char) -> String {
    s.replace('*', c.encode_utf8(&mut [0; 4]))
}

fn check_prefix(
    rule: &PrefixRule,
    format: FormatTag,
    given: &str,
    slots: &[DigitSlot],
) -> Result<(), CodeError> {
    let err = || CodeError::Prefix {
        format,
        expected: rule.description,
    };

    let mut raw = given.chars();
    for allowed in rule.allowed {
        match raw.next() {
            Some('*') => {}
            Some(c) if allowed.contains(c) => {}
            _ => return Err(err()),
        }
    }

    if let Some(index) = rule.zero_after {
        match slots.get(index) {
            Some(DigitSlot::Digit(0)) | Some(DigitSlot::Wildcard) => {}
            _ => return Err(err()),
        }
    }

    Ok(())
}

fn validate(config: &FormatConfig, normalized: &str, slots: &[DigitSlot]) -> Result<(), CodeError> {
    let validation = Validator::new().validate(&CodeCandidate { normalized, slots }, config);
    if validation.valid {
        return Ok(());
    }
    debug!(
        format = %config.tag,
        violations = validation.violations.len(),
        "structural validation failed"
    );
    Err(CodeError::Structural {
        format: config.tag,
        messages: validation.messages(),
    })
}

fn build(config: &'static FormatConfig, given: &str) -> Result<ProductCode, CodeError> {
    let format = config.tag;
    let raw = if config.hidden_check {
        format!("{given}*")
    } else {
        given.to_string()
    };

    let wild = raw.chars().filter(|c| *c == '*').count();
    if wild > 1 {
        return Err(CodeError::WildcardCount { format, count: wild });
    }

    let slots = parse(&raw, &config.maps).map_err(|r| CodeError::Parse {
        format,
        character: r.character,
        position: r.position,
    })?;

    let upper = raw.to_uppercase();
    validate(config, &upper, &slots)?;

    let solved = checksum::resolve(&slots, config.weights, config.modulus, config.max_check_value)
        .map_err(|e| CodeError::from_checksum(format, e))?;

    let normalized = match solved {
        Some((_, value)) => {
            let c = config.display_char(value).ok_or_else(|| CodeError::Internal {
                format,
                message: format!("no display character for {}", value),
            })?;
            let substituted = substitute_wildcard(&upper, c);
            validate(config, &substituted, &slots)?;
            substituted
        }
        None => upper,
    };
    let digits = fill(&slots, solved);

    if let Some(rule) = &config.prefix {
        check_prefix(rule, format, given, &slots)?;
    }

    let check_digit = digits.last().copied().ok_or_else(|| CodeError::Internal {
        format,
        message: "empty digit sequence".to_string(),
    })?;

    let internal = |e: crate::encoding::EncodeError| CodeError::Internal {
        format,
        message: e.to_string(),
    };
    let bits = match config.symbology {
        Symbology::Ean13 => encode_ean13(&digits).map_err(internal)?,
        Symbology::UpcA => encode_upca(&digits).map_err(internal)?,
        Symbology::Upc5 => encode_upc5(&digits).map_err(internal)?,
        Symbology::ViaEan13 => {
            let (tag, input) = derive_ean13(format, &normalized).ok_or_else(|| {
                CodeError::Internal {
                    format,
                    message: "no EAN-13 form".to_string(),
                }
            })?;
            build(tag.config(), &input)?.bits
        }
    };

    let normalized = if config.hidden_check {
        normalized.chars().take(config.printed_len(&normalized)).collect()
    } else {
        normalized
    };

    debug!(%format, code = %normalized, "product code built");

    Ok(ProductCode {
        format,
        given: given.to_string(),
        normalized,
        digits,
        check_digit,
        bits,
    })
}
