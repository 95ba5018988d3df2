//! Product Code Engine
//!
//! Validates ISBN-10/13, ISMN, UPC-A, EAN-13 and UPC-5 add-on codes,
//! solves a single unknown check digit, and emits the bar pattern.
//!
//! # Guarantees
//! 1. Every code is built through one pipeline
//! 2. Structural validation always runs and reports every violation
//! 3. At most one wildcard, and it is solved before the code exists
//! 4. Codes are immutable values
//! 5. Guard bars keep their own symbol in the pattern

pub mod charmap;
pub mod checksum;
pub mod validation;
pub mod formats;
pub mod encoding;
pub mod pipeline;
pub mod dispatch;

pub use charmap::{CharMap, DigitSlot, Token};
pub use validation::{ValidationResult, ValidationRule, ValidationViolation};
pub use formats::{FormatConfig, FormatTag, Symbology};
pub use encoding::{BitPattern, Module};
pub use pipeline::{CodeError, ProductCode};
pub use dispatch::{identify, DispatchConfig};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
