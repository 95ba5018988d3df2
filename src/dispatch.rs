//! Format Dispatch
//!
//! Tries each format in a fixed priority order and returns the first that
//! builds. Failed attempts are logged and dropped.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::formats::FormatTag;
use crate::pipeline::{CodeError, ProductCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Return an ISBN-10 in its ISBN-13 form
    #[serde(default = "default_true")]
    pub normalize_isbn: bool,
    /// Return an ISMN in its ISMN-13 form. Not implemented yet.
    #[serde(default)]
    pub normalize_ismn: bool,
}

fn default_true() -> bool { true }

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            normalize_isbn: true,
            normalize_ismn: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Attempt {
    format: FormatTag,
    normalize: bool,
}

impl Attempt {
    fn run(self, input: &str) -> Result<ProductCode, CodeError> {
        let code = ProductCode::new(self.format, input)?;
        if self.normalize {
            code.as_ean13()
        } else {
            Ok(code)
        }
    }
}

fn attempts(config: &DispatchConfig) -> [Attempt; 4] {
    [
        Attempt { format: FormatTag::Isbn13, normalize: false },
        Attempt { format: FormatTag::Isbn10, normalize: config.normalize_isbn },
        Attempt { format: FormatTag::Ismn, normalize: config.normalize_ismn },
        Attempt { format: FormatTag::Ean13, normalize: false },
    ]
}

/// Identify `input` as ISBN-13, ISBN-10, ISMN or EAN-13, in that order
pub fn identify(input: &str, config: &DispatchConfig) -> Result<ProductCode, CodeError> {
    if config.normalize_ismn {
        return Err(CodeError::Unsupported(
            "ISMN to ISMN-13 normalization is not implemented".to_string(),
        ));
    }

    for attempt in attempts(config) {
        match attempt.run(input) {
            Ok(code) => {
                debug!(input, format = %code.format(), "identified");
                return Ok(code);
            }
            Err(e) => debug!(input, format = %attempt.format, error = %e, "attempt failed"),
        }
    }

    Err(CodeError::Unidentified {
        input: input.to_string(),
    })
}
