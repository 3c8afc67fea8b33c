//! Typed, checksummed text encodings for chain public keys and signatures.
//!
//! Binary key material travels as base-58 text with a role/variant prefix
//! and a 4-byte RIPEMD-160 checksum, so keys survive copy-paste and a
//! corrupted character is caught before any cryptographic use. Three
//! variants are covered: K1 (secp256k1), R1 (P-256), and WA
//! (WebAuthn-wrapped P-256), plus the legacy suffix-less `EOS` public-key
//! form.

pub mod base58;
mod checksum;
mod error;
mod key;

pub use error::KeyError;
pub use key::{
    KeyVariant, LEGACY_PUBLIC_KEY_PREFIX, PUBLIC_KEY_DATA_SIZE, PublicKey, SIGNATURE_DATA_SIZE,
    Signature, sort_public_keys,
};

/// Decode a hex string into bytes.
///
/// # Errors
///
/// Fails with [`KeyError::MalformedHex`] on an odd digit count or a
/// non-hex character.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, KeyError> {
    Ok(::hex::decode(hex)?)
}

/// Encode bytes as uppercase hex, the form credential ids travel in.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    ::hex::encode_upper(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips_uppercase() {
        assert_eq!(bytes_to_hex(&[0xde, 0xad, 0x01]), "DEAD01");
        assert_eq!(hex_to_bytes("DEAD01").unwrap(), vec![0xde, 0xad, 0x01]);
        // Lowercase input decodes to the same bytes.
        assert_eq!(hex_to_bytes("dead01").unwrap(), vec![0xde, 0xad, 0x01]);
    }

    #[test]
    fn hex_rejects_odd_lengths_and_bad_digits() {
        assert!(matches!(
            hex_to_bytes("abc").unwrap_err(),
            KeyError::MalformedHex(_)
        ));
        assert!(matches!(
            hex_to_bytes("zz").unwrap_err(),
            KeyError::MalformedHex(_)
        ));
    }
}
