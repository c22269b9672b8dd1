//! Error types for register definitions, descriptors, values and transport.

use thiserror::Error;

use crate::point::RegisterClass;

/// Data-integrity errors in the Register Map.
///
/// Any of these aborts the registry build; a registry is either complete or
/// not built at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// Two points share the same key
    #[error("Duplicate point key: {0}")]
    DuplicateKey(String),

    /// Two points claim overlapping addresses within one register class
    #[error("Points {first} and {second} overlap in {class} at {start}..={end}")]
    Overlap {
        class: RegisterClass,
        first: String,
        second: String,
        start: u16,
        end: u16,
    },

    /// A word register declared without a datatype
    #[error("Point {0} is a word register but declares no datatype")]
    MissingDataType(String),

    /// Occupied range runs past the end of the 16-bit address space
    #[error("Point {key} at address {address} does not fit in the address space")]
    AddressOverflow { key: String, address: u16 },
}

/// Reasons a single point cannot be turned into an entity descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// `value_enum` is declared but has no entries besides the default sentinel
    #[error("Enumeration has no entries")]
    EmptyEnumeration,
}

/// A point that was skipped during the registry build.
///
/// Gaps are reported and collected; they never abort the build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Point {key} skipped: {reason}")]
pub struct ClassificationGap {
    pub key: String,
    pub reason: DescriptorError,
}

/// Errors at the decode/encode boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("Raw value {raw} does not fit {data_type}")]
    OutOfRange { raw: i64, data_type: String },

    #[error("Value {value} is below the declared minimum {min}")]
    BelowMinimum { value: f64, min: f64 },

    #[error("Value {value} is above the declared maximum {max}")]
    AboveMaximum { value: f64, max: f64 },

    #[error("Raw value {0} is not part of the enumeration")]
    UnknownEnumValue(i64),

    #[error("Label '{0}' is not part of the enumeration")]
    UnknownLabel(String),

    #[error("Raw value {0} is neither the off nor the on value")]
    UnexpectedSwitchValue(i64),

    #[error("Expected a {expected} value, got {actual}")]
    KindMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Expected {expected} register words, got {actual}")]
    MissingWords { expected: usize, actual: usize },

    #[error("Value {0} is not a finite number")]
    NotFinite(f64),

    #[error("Cannot parse '{text}' as a {expected} value")]
    Unparsable { text: String, expected: &'static str },
}

/// Errors raised by a register transport.
///
/// The core neither retries nor suppresses these; they are surfaced to the
/// caller unchanged.
#[derive(Debug, Error)]
pub enum CommunicationError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Timeout waiting for response")]
    Timeout,

    #[error("Device returned exception: {0}")]
    Exception(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Unsupported request: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for registry construction.
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// Result type for codec operations.
pub type ValueResult<T> = Result<T, ValueError>;

/// Result type for transport operations.
pub type CommunicationResult<T> = Result<T, CommunicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_message_names_both_points() {
        let err = DefinitionError::Overlap {
            class: RegisterClass::HoldingRegister,
            first: "a".to_string(),
            second: "b".to_string(),
            start: 2,
            end: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("a"));
        assert!(msg.contains("b"));
        assert!(msg.contains("holding_register"));
        assert!(msg.contains("2..=3"));
    }

    #[test]
    fn test_gap_display() {
        let gap = ClassificationGap {
            key: "mode".to_string(),
            reason: DescriptorError::EmptyEnumeration,
        };
        assert_eq!(gap.to_string(), "Point mode skipped: Enumeration has no entries");
    }
}
