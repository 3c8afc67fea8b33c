//! Error type for key and signature text codecs.

use thiserror::Error;

/// Errors from converting keys and signatures between text and binary form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KeyError {
    /// A hex string has an odd length or a non-hex digit.
    #[error("malformed hex: {0}")]
    MalformedHex(#[from] hex::FromHexError),

    /// A character outside the base-58 alphabet.
    #[error("invalid base-58 symbol {symbol:?} at position {position}")]
    InvalidBase58Symbol {
        /// The offending character.
        symbol: char,
        /// Its character position in the input.
        position: usize,
    },

    /// A fixed-size base-58 decode overflowed the target width.
    #[error("base-58 value does not fit in {size} bytes")]
    ValueOutOfRange {
        /// The fixed decode width in bytes.
        size: usize,
    },

    /// The trailing 4-byte checksum does not match the key data.
    #[error("checksum doesn't match")]
    ChecksumMismatch,

    /// The text form carries none of the known prefixes.
    #[error("unrecognized key format")]
    UnrecognizedKeyFormat,

    /// The binary form has a variant/length combination no codec accepts.
    #[error("unsupported key format: {0}")]
    UnsupportedKeyFormat(&'static str),
}
