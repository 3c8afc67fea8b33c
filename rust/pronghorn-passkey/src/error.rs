//! Error type for passkey registration and signing.

use pronghorn_keys::KeyError;
use pronghorn_serial::SerialBufferError;
use thiserror::Error;

/// Errors from decoding attestations and assembling signatures.
#[derive(Debug, Error)]
pub enum PasskeyError {
    /// The attestation object or COSE key is not well-formed CBOR.
    #[error("malformed CBOR: {0}")]
    Cbor(String),

    /// The attestation object carries no `authData` byte string.
    #[error("attestation object has no authData entry")]
    MissingAuthData,

    /// The attested-credential flag is not set in the authenticator data.
    #[error("attested credential data flag not set")]
    AttestedCredentialMissing,

    /// The attested credential id differs from the one the caller expects.
    #[error("credential id does not match: expected {expected}, got {actual}")]
    CredentialIdMismatch {
        /// Credential id the caller registered, in hex.
        expected: String,
        /// Credential id found in the attestation, in hex.
        actual: String,
    },

    /// The COSE public key is not an ES256 key on P-256.
    #[error("unsupported COSE public key: {0}")]
    UnsupportedCoseAlgorithm(&'static str),

    /// A COSE point coordinate has the wrong width.
    #[error("COSE {axis} coordinate is {length} bytes, expected 32")]
    InvalidCoordinateLength {
        /// Which coordinate, `x` or `y`.
        axis: char,
        /// The width found.
        length: usize,
    },

    /// The stored public key does not contain a valid P-256 point.
    #[error("invalid P-256 public key: {0}")]
    InvalidPublicKey(String),

    /// The assertion signature is not the DER shape authenticators emit.
    #[error("bad DER signature: {0}")]
    BadSignatureEncoding(&'static str),

    /// The DER length byte disagrees with the actual signature size.
    #[error("DER signature declares a length that does not match its size")]
    BadSignatureLength,

    /// A DER integer's magnitude exceeds 32 bytes.
    #[error("signature component {0} is too large")]
    SignatureComponentTooLarge(char),

    /// No recovery id in `0..=3` reproduces the credential's public key.
    #[error("no recovery id reproduces the credential public key")]
    RecoveryIdNotFound,

    /// The platform authenticator refused or failed the ceremony.
    #[error("authenticator failure: {0}")]
    Authenticator(String),

    /// A wire-format read ran past the end of its buffer.
    #[error(transparent)]
    Buffer(#[from] SerialBufferError),

    /// A key or signature codec failure.
    #[error(transparent)]
    Key(#[from] KeyError),
}
