use std::io;

use thiserror::Error;

use crate::value::ValueTag;

/// Errors raised while reading or writing persisted values
#[derive(Error, Debug)]
pub enum DataError {
    /// I/O error during reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream does not start with the expected magic bytes
    #[error("Invalid magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },

    /// The stream uses a format version this reader does not understand
    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(u16),

    /// Entries are order-significant; the next entry has a different key
    #[error("Unexpected key: expected '{expected}', found '{found}'")]
    UnexpectedKey { expected: String, found: String },

    /// The entry exists but holds a different kind of value
    #[error("Unexpected value type for '{key}': expected {expected:?}, found {found:?}")]
    UnexpectedType {
        key: String,
        expected: ValueTag,
        found: ValueTag,
    },

    /// The type tag byte is not a known value type
    #[error("Invalid value tag: 0x{0:02X}")]
    InvalidTag(u8),

    /// An enum-valued entry holds a discriminant with no matching variant
    #[error("Unknown {type_name} value for '{key}': {value}")]
    UnknownVariant {
        key: String,
        type_name: &'static str,
        value: u32,
    },

    /// A key or string payload is not valid UTF-8
    #[error("Invalid string: {0}")]
    InvalidString(#[from] std::string::FromUtf8Error),

    /// A block or list was closed without being opened, or closed with the wrong kind
    #[error("Unbalanced nesting: {0}")]
    UnbalancedNesting(String),

    /// A key is longer than the format can encode
    #[error("Key too long: {0} bytes")]
    KeyTooLong(usize),
}

/// Result type using DataError
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DataError::UnexpectedKey {
            expected: "Budget".to_string(),
            found: "BlendMode".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Unexpected key: expected 'Budget', found 'BlendMode'"
        );

        let error = DataError::UnexpectedType {
            key: "Budget".to_string(),
            expected: ValueTag::I32,
            found: ValueTag::F32,
        };
        assert_eq!(
            format!("{}", error),
            "Unexpected value type for 'Budget': expected I32, found F32"
        );

        let error = DataError::InvalidTag(0xAB);
        assert_eq!(format!("{}", error), "Invalid value tag: 0xAB");
    }
}
