//! Registration: attestation objects into compact WA public keys.
//!
//! A registration ceremony yields a CBOR attestation object whose
//! `authData` embeds the new credential and its COSE public key. Only
//! ES256 on P-256 is accepted, the dominant passkey algorithm. The result
//! is the compact WA key payload: compressed point, user-presence level,
//! and the relying-party id, so one physical passkey yields a distinct
//! chain key per relying party and presence requirement.

use crate::error::PasskeyError;
use ciborium::value::{Integer, Value};
use pronghorn_keys::{KeyVariant, PublicKey, bytes_to_hex};
use pronghorn_serial::SerialBuffer;

const FLAG_USER_PRESENT: u8 = 0x01;
const FLAG_USER_VERIFIED: u8 = 0x04;
const FLAG_ATTESTED_CREDENTIAL: u8 = 0x40;

const RP_ID_HASH_SIZE: usize = 32;
const SIGN_COUNT_SIZE: usize = 4;
const AAGUID_SIZE: usize = 16;
const COORDINATE_SIZE: usize = 32;

/// COSE map labels and the values required of an ES256 P-256 key.
const COSE_LABEL_KEY_TYPE: i64 = 1;
const COSE_LABEL_ALGORITHM: i64 = 3;
const COSE_LABEL_CURVE: i64 = -1;
const COSE_LABEL_X: i64 = -2;
const COSE_LABEL_Y: i64 = -3;
const COSE_KEY_TYPE_EC2: i128 = 2;
const COSE_ALGORITHM_ES256: i128 = -7;
const COSE_CURVE_P256: i128 = 1;

/// How strongly the authenticator vouched for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UserPresence {
    /// No user gesture was recorded.
    None = 0,
    /// A user was present (touch, click).
    Present = 1,
    /// The user was verified (biometric, PIN).
    Verified = 2,
}

impl UserPresence {
    fn from_flags(flags: u8) -> Self {
        if flags & FLAG_USER_VERIFIED != 0 {
            UserPresence::Verified
        } else if flags & FLAG_USER_PRESENT != 0 {
            UserPresence::Present
        } else {
            UserPresence::None
        }
    }
}

/// A credential decoded out of a registration ceremony.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedCredential {
    /// The credential id the authenticator assigned, in uppercase hex.
    pub credential_id: String,
    /// The compact WA public key binding point, presence, and RP id.
    pub public_key: PublicKey,
}

/// Decode an attestation object into an [`AttestedCredential`].
///
/// `expected_credential_id` is the hex id the platform reported alongside
/// the attestation; the id embedded in `authData` must match it exactly.
///
/// # Errors
///
/// Fails when the CBOR envelope is malformed, the attested-credential
/// flag is clear, the credential id differs, the COSE key is not ES256 on
/// P-256, or a coordinate is not 32 bytes wide.
pub fn decode_attested_credential(
    rp_id: &str,
    expected_credential_id: &str,
    attestation_object: &[u8],
) -> Result<AttestedCredential, PasskeyError> {
    let attestation: Value = ciborium::de::from_reader(attestation_object)
        .map_err(|error| PasskeyError::Cbor(error.to_string()))?;
    let Value::Map(entries) = attestation else {
        return Err(PasskeyError::Cbor("attestation object is not a map".into()));
    };
    let auth_data = entries
        .iter()
        .find_map(|(key, value)| match (key, value) {
            (Value::Text(name), Value::Bytes(bytes)) if name == "authData" => {
                Some(bytes.as_slice())
            }
            _ => None,
        })
        .ok_or(PasskeyError::MissingAuthData)?;

    let mut auth = SerialBuffer::from_bytes(auth_data.to_vec());
    auth.read_bytes(RP_ID_HASH_SIZE)?;
    let flags = auth.read_byte()?;
    auth.read_bytes(SIGN_COUNT_SIZE)?;

    if flags & FLAG_ATTESTED_CREDENTIAL == 0 {
        return Err(PasskeyError::AttestedCredentialMissing);
    }

    auth.read_bytes(AAGUID_SIZE)?;
    let length_bytes = auth.read_bytes(2)?;
    let credential_id_length = usize::from(length_bytes[0]) << 8 | usize::from(length_bytes[1]);
    let credential_id = bytes_to_hex(auth.read_bytes(credential_id_length)?);

    let cose_key: Value = ciborium::de::from_reader(auth.remaining())
        .map_err(|error| PasskeyError::Cbor(error.to_string()))?;
    let Value::Map(cose_entries) = cose_key else {
        return Err(PasskeyError::Cbor("COSE public key is not a map".into()));
    };

    if credential_id != expected_credential_id {
        return Err(PasskeyError::CredentialIdMismatch {
            expected: expected_credential_id.to_string(),
            actual: credential_id,
        });
    }

    if cose_integer(&cose_entries, COSE_LABEL_KEY_TYPE) != Some(COSE_KEY_TYPE_EC2) {
        return Err(PasskeyError::UnsupportedCoseAlgorithm("key type is not EC2"));
    }
    if cose_integer(&cose_entries, COSE_LABEL_ALGORITHM) != Some(COSE_ALGORITHM_ES256) {
        return Err(PasskeyError::UnsupportedCoseAlgorithm(
            "algorithm is not ES256",
        ));
    }
    if cose_integer(&cose_entries, COSE_LABEL_CURVE) != Some(COSE_CURVE_P256) {
        return Err(PasskeyError::UnsupportedCoseAlgorithm("curve is not P-256"));
    }

    let x = cose_bytes(&cose_entries, COSE_LABEL_X)
        .ok_or(PasskeyError::UnsupportedCoseAlgorithm("missing x coordinate"))?;
    let y = cose_bytes(&cose_entries, COSE_LABEL_Y)
        .ok_or(PasskeyError::UnsupportedCoseAlgorithm("missing y coordinate"))?;
    if x.len() != COORDINATE_SIZE {
        return Err(PasskeyError::InvalidCoordinateLength {
            axis: 'x',
            length: x.len(),
        });
    }
    if y.len() != COORDINATE_SIZE {
        return Err(PasskeyError::InvalidCoordinateLength {
            axis: 'y',
            length: y.len(),
        });
    }

    let mut compact = SerialBuffer::new();
    // Standard point compression: the prefix carries the parity of y.
    compact.push_byte(if y[COORDINATE_SIZE - 1] & 1 == 1 { 3 } else { 2 });
    compact.push_bytes(x);
    compact.push_byte(UserPresence::from_flags(flags) as u8);
    compact.push_string(rp_id);

    let public_key = PublicKey::new(KeyVariant::Wa, compact.into_bytes())?;
    Ok(AttestedCredential {
        credential_id,
        public_key,
    })
}

fn cose_entry<'a>(entries: &'a [(Value, Value)], label: i64) -> Option<&'a Value> {
    entries.iter().find_map(|(key, value)| match key {
        Value::Integer(integer) if *integer == Integer::from(label) => Some(value),
        _ => None,
    })
}

fn cose_integer(entries: &[(Value, Value)], label: i64) -> Option<i128> {
    match cose_entry(entries, label)? {
        Value::Integer(integer) => Some(i128::from(*integer)),
        _ => None,
    }
}

fn cose_bytes<'a>(entries: &'a [(Value, Value)], label: i64) -> Option<&'a [u8]> {
    match cose_entry(entries, label)? {
        Value::Bytes(bytes) => Some(bytes.as_slice()),
        _ => None,
    }
}
