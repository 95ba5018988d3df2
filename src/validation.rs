//! Structural Validation - Rules Produce Violations
//!
//! Runs on the parsed code and again on the display string once the
//! wildcard is substituted. Every rule is evaluated; all violations are
//! reported together.

use crate::charmap::DigitSlot;
use crate::formats::{FormatConfig, FormatTag};

#[cfg(feature = "test-hooks")]
use std::cell::Cell;

#[cfg(feature = "test-hooks")]
thread_local! {
    // per-thread so parallel tests don't see each other's runs
    static VALIDATION_CALL_COUNT: Cell<u32> = const { Cell::new(0) };
}

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.with(|c| c.get())
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.with(|c| c.set(0));
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolation {
    pub rule: String,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl ValidationViolation {
    fn new(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
    pub format: FormatTag,
}

impl ValidationResult {
    pub fn success(config: &FormatConfig) -> Self {
        Self {
            valid: true,
            violations: vec![],
            format: config.tag,
        }
    }

    pub fn failure(config: &FormatConfig, violations: Vec<ValidationViolation>) -> Self {
        Self {
            valid: false,
            violations,
            format: config.tag,
        }
    }

    /// `"<FORMAT>: <message>"` per violation
    pub fn messages(&self) -> Vec<String> {
        self.violations
            .iter()
            .map(|v| format!("{}: {}", self.format, v.message))
            .collect()
    }
}

/// A parsed code awaiting structural checks
#[derive(Debug, Clone, Copy)]
pub struct CodeCandidate<'a> {
    /// Uppercased; the wildcard is substituted on the second pass
    pub normalized: &'a str,
    pub slots: &'a [DigitSlot],
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, input: &CodeCandidate<'_>, config: &FormatConfig) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

pub struct DigitCountRule;

impl ValidationRule for DigitCountRule {
    fn name(&self) -> &'static str { "digit_count" }

    fn validate(&self, input: &CodeCandidate<'_>, config: &FormatConfig) -> Vec<ValidationViolation> {
        let expected = config.digit_count();
        let actual = input.slots.len();

        let message = if actual > expected {
            "Too many digits"
        } else if actual < expected {
            "Not enough digits"
        } else {
            return vec![];
        };

        vec![ValidationViolation {
            expected: Some(expected.to_string()),
            actual: Some(actual.to_string()),
            ..ValidationViolation::new(self.name(), message)
        }]
    }
}

pub struct FirstCharacterRule;

impl ValidationRule for FirstCharacterRule {
    fn name(&self) -> &'static str { "first_character" }

    fn validate(&self, input: &CodeCandidate<'_>, config: &FormatConfig) -> Vec<ValidationViolation> {
        match input.normalized.chars().next() {
            Some(c) if config.maps.first.accepts(c) => vec![],
            Some(c) => vec![ValidationViolation {
                actual: Some(c.to_string()),
                ..ValidationViolation::new(self.name(), "Illegal first character")
            }],
            None => vec![ValidationViolation::new(self.name(), "Empty code")],
        }
    }
}

pub struct FinalCharacterRule;

impl ValidationRule for FinalCharacterRule {
    fn name(&self) -> &'static str { "final_character" }

    fn validate(&self, input: &CodeCandidate<'_>, config: &FormatConfig) -> Vec<ValidationViolation> {
        match input.normalized.chars().last() {
            Some(c) if config.maps.last.accepts(c) => vec![],
            Some(c) => vec![ValidationViolation {
                actual: Some(c.to_string()),
                ..ValidationViolation::new(self.name(), "Illegal final character")
            }],
            // reported by the first character rule
            None => vec![],
        }
    }
}

pub struct InteriorCharacterRule;

impl ValidationRule for InteriorCharacterRule {
    fn name(&self) -> &'static str { "interior_character" }

    fn validate(&self, input: &CodeCandidate<'_>, config: &FormatConfig) -> Vec<ValidationViolation> {
        let len = input.normalized.chars().count();
        input
            .normalized
            .chars()
            .enumerate()
            .filter(|(i, _)| *i > 0 && *i + 1 < len)
            .filter(|(_, c)| !config.maps.interior.accepts(*c))
            .map(|(i, c)| ValidationViolation {
                actual: Some(format!("{:?} at {}", c, i)),
                ..ValidationViolation::new(self.name(), "Illegal character")
            })
            .collect()
    }
}

pub struct RepeatedSeparatorRule;

impl ValidationRule for RepeatedSeparatorRule {
    fn name(&self) -> &'static str { "repeated_separator" }

    fn validate(&self, input: &CodeCandidate<'_>, _config: &FormatConfig) -> Vec<ValidationViolation> {
        if input.normalized.contains("--") || input.normalized.contains("  ") {
            vec![ValidationViolation::new(self.name(), "Repeated separator")]
        } else {
            vec![]
        }
    }
}

/// Validator orchestrates rules
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(DigitCountRule),
                Box::new(FirstCharacterRule),
                Box::new(FinalCharacterRule),
                Box::new(InteriorCharacterRule),
                Box::new(RepeatedSeparatorRule),
            ],
        }
    }

    pub fn validate(&self, input: &CodeCandidate<'_>, config: &FormatConfig) -> ValidationResult {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.with(|c| c.set(c.get() + 1));

        let mut all_violations = vec![];

        for rule in &self.rules {
            let violations = rule.validate(input, config);
            all_violations.extend(violations);
        }

        if all_violations.is_empty() {
            ValidationResult::success(config)
        } else {
            ValidationResult::failure(config, all_violations)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
