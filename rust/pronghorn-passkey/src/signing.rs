//! Signing: transaction digests and recoverable WA signatures.
//!
//! The chain signs `chain_id ++ transaction ++ zero32` hashed with
//! SHA-256; that digest becomes the WebAuthn challenge. The authenticator
//! itself signs `authenticatorData ++ SHA256(clientDataJSON)` — the
//! transaction digest only appears inside the clientDataJSON challenge
//! field — so the recovery search runs over the hash of that
//! concatenation, not over the transaction digest.

use crate::authenticator::AssertionResponse;
use crate::error::PasskeyError;
use ecdsa::RecoveryId;
use p256::FieldBytes;
use p256::ecdsa::{Signature as EcdsaSignature, VerifyingKey};
use pronghorn_keys::{KeyVariant, Signature};
use pronghorn_serial::SerialBuffer;
use sha2::{Digest, Sha256};

/// Width of a chain id.
pub const CHAIN_ID_SIZE: usize = 32;

const COMPONENT_SIZE: usize = 32;
const DER_SEQUENCE_TAG: u8 = 0x30;
const DER_INTEGER_TAG: u8 = 0x02;

/// Legacy scheme offset plus the compressed-key marker.
const RECOVERY_HEADER_BASE: u8 = 27 + 4;

/// Build the digest a transaction is signed under.
///
/// The trailing 32 zero bytes stand in for the context-free-data digest;
/// no context-free data is carried yet.
pub fn signing_digest(
    chain_id: &[u8; CHAIN_ID_SIZE],
    serialized_transaction: &[u8],
) -> [u8; 32] {
    let mut message = SerialBuffer::new();
    message.push_bytes(chain_id);
    message.push_bytes(serialized_transaction);
    message.push_bytes(&[0u8; 32]);
    Sha256::digest(message.as_bytes()).into()
}

/// The hash the authenticator actually signed:
/// `SHA256(authenticatorData ++ SHA256(clientDataJSON))`.
pub fn assertion_digest(authenticator_data: &[u8], client_data_json: &[u8]) -> [u8; 32] {
    let mut signed = SerialBuffer::new();
    signed.push_bytes(authenticator_data);
    signed.push_bytes(&Sha256::digest(client_data_json));
    Sha256::digest(signed.as_bytes()).into()
}

/// Split a DER `SEQUENCE { INTEGER r, INTEGER s }` signature into 32-byte
/// components.
///
/// # Errors
///
/// Fails with [`PasskeyError::BadSignatureEncoding`] on a missing sequence
/// tag or integer marker, [`PasskeyError::BadSignatureLength`] when the
/// declared length disagrees with the actual size, and
/// [`PasskeyError::SignatureComponentTooLarge`] when a magnitude exceeds
/// 32 bytes.
pub fn parse_der_signature(der: &[u8]) -> Result<([u8; 32], [u8; 32]), PasskeyError> {
    let total = der.len();
    let mut buffer = SerialBuffer::from_bytes(der.to_vec());
    if buffer.read_byte()? != DER_SEQUENCE_TAG {
        return Err(PasskeyError::BadSignatureEncoding(
            "missing DER sequence prefix",
        ));
    }
    if usize::from(buffer.read_byte()?) != total - 2 {
        return Err(PasskeyError::BadSignatureLength);
    }
    let r = read_component(&mut buffer, 'r')?;
    let s = read_component(&mut buffer, 's')?;
    Ok((r, s))
}

fn read_component(buffer: &mut SerialBuffer, which: char) -> Result<[u8; 32], PasskeyError> {
    if buffer.read_byte()? != DER_INTEGER_TAG {
        return Err(PasskeyError::BadSignatureEncoding(match which {
            'r' => "bad r marker",
            _ => "bad s marker",
        }));
    }
    let length = usize::from(buffer.read_byte()?);
    let raw = buffer.read_bytes(length)?;

    // Strip leading zero sign-guard bytes, left-pad short magnitudes.
    let mut magnitude = raw;
    while magnitude.len() > COMPONENT_SIZE {
        if magnitude[0] != 0 {
            return Err(PasskeyError::SignatureComponentTooLarge(which));
        }
        magnitude = &magnitude[1..];
    }
    let mut component = [0u8; COMPONENT_SIZE];
    component[COMPONENT_SIZE - magnitude.len()..].copy_from_slice(magnitude);
    Ok(component)
}

/// Find the recovery id that reproduces `public_key` from `(r, s, digest)`.
///
/// Tries the four candidates in order and returns the first whose
/// recovered point equals the known key.
///
/// # Errors
///
/// Fails with [`PasskeyError::RecoveryIdNotFound`] when no candidate
/// matches, which means the signature does not belong to the claimed key.
pub fn recovery_id_search(
    public_key: &VerifyingKey,
    r: &[u8; 32],
    s: &[u8; 32],
    digest: &[u8; 32],
) -> Result<u8, PasskeyError> {
    let signature = EcdsaSignature::from_scalars(FieldBytes::from(*r), FieldBytes::from(*s))
        .map_err(|_| PasskeyError::BadSignatureEncoding("r or s is not a valid curve scalar"))?;
    for candidate in 0..=3u8 {
        let Some(recovery_id) = RecoveryId::from_byte(candidate) else {
            break;
        };
        if let Ok(recovered) = VerifyingKey::recover_from_prehash(digest, &signature, recovery_id) {
            if recovered == *public_key {
                return Ok(candidate);
            }
        }
    }
    Err(PasskeyError::RecoveryIdNotFound)
}

/// Assemble the recoverable WA signature for an assertion.
///
/// Packs `header ++ r ++ s` followed by the length-prefixed authenticator
/// data and clientDataJSON, where `header = recovery_id + 31`.
pub fn assemble_signature(
    public_key: &VerifyingKey,
    assertion: &AssertionResponse,
) -> Result<Signature, PasskeyError> {
    let (r, s) = parse_der_signature(&assertion.signature)?;
    let digest = assertion_digest(&assertion.authenticator_data, &assertion.client_data_json);
    let recovery_id = recovery_id_search(public_key, &r, &s, &digest)?;

    let mut data = SerialBuffer::new();
    data.push_byte(recovery_id + RECOVERY_HEADER_BASE);
    data.push_bytes(&r);
    data.push_bytes(&s);
    data.push_length_prefixed(&assertion.authenticator_data);
    data.push_length_prefixed(&assertion.client_data_json);
    Ok(Signature::new(KeyVariant::Wa, data.into_bytes())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::SigningKey;
    use p256::ecdsa::signature::hazmat::PrehashSigner;

    fn test_key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32].into()).unwrap()
    }

    fn der_sign(key: &SigningKey, digest: &[u8; 32]) -> Vec<u8> {
        let signature: EcdsaSignature = key.sign_prehash(digest).unwrap();
        signature.to_der().as_bytes().to_vec()
    }

    #[test]
    fn signing_digest_covers_all_three_fields() {
        let chain_id = [0x11u8; CHAIN_ID_SIZE];
        let digest = signing_digest(&chain_id, b"transaction");

        let mut expected = Vec::new();
        expected.extend_from_slice(&chain_id);
        expected.extend_from_slice(b"transaction");
        expected.extend_from_slice(&[0u8; 32]);
        assert_eq!(digest, <[u8; 32]>::from(Sha256::digest(&expected)));

        // A different chain id yields a different digest for the same
        // transaction bytes.
        let other = signing_digest(&[0x22u8; CHAIN_ID_SIZE], b"transaction");
        assert_ne!(digest, other);
    }

    #[test]
    fn der_parse_round_trips_real_signatures() {
        let key = test_key(7);
        let digest = [0xabu8; 32];
        let der = der_sign(&key, &digest);

        let (r, s) = parse_der_signature(&der).unwrap();
        let rebuilt =
            EcdsaSignature::from_scalars(FieldBytes::from(r), FieldBytes::from(s)).unwrap();
        assert_eq!(rebuilt.to_der().as_bytes(), der.as_slice());
    }

    #[test]
    fn der_missing_sequence_prefix_is_rejected() {
        let mut der = der_sign(&test_key(7), &[0xabu8; 32]);
        der[0] = 0x31;
        assert!(matches!(
            parse_der_signature(&der).unwrap_err(),
            PasskeyError::BadSignatureEncoding("missing DER sequence prefix")
        ));
    }

    #[test]
    fn der_inconsistent_length_is_rejected() {
        let mut der = der_sign(&test_key(7), &[0xabu8; 32]);
        der[1] = der[1].wrapping_add(1);
        assert!(matches!(
            parse_der_signature(&der).unwrap_err(),
            PasskeyError::BadSignatureLength
        ));

        // Truncation desynchronizes the declared length the same way.
        let der = der_sign(&test_key(7), &[0xabu8; 32]);
        assert!(matches!(
            parse_der_signature(&der[..der.len() - 1]).unwrap_err(),
            PasskeyError::BadSignatureLength
        ));
    }

    #[test]
    fn der_bad_integer_marker_is_rejected() {
        let mut der = der_sign(&test_key(7), &[0xabu8; 32]);
        der[2] = 0x03;
        assert!(matches!(
            parse_der_signature(&der).unwrap_err(),
            PasskeyError::BadSignatureEncoding("bad r marker")
        ));
    }

    #[test]
    fn der_oversized_component_is_rejected() {
        // SEQUENCE { INTEGER (33 bytes, non-zero lead), INTEGER 0x01 }
        let mut der = vec![DER_SEQUENCE_TAG, 38, DER_INTEGER_TAG, 33];
        der.extend_from_slice(&[0x01; 33]);
        der.extend_from_slice(&[DER_INTEGER_TAG, 1, 0x01]);
        assert!(matches!(
            parse_der_signature(&der).unwrap_err(),
            PasskeyError::SignatureComponentTooLarge('r')
        ));
    }

    #[test]
    fn der_sign_guard_byte_is_stripped() {
        // INTEGER of 33 bytes whose lead is the 0x00 sign guard.
        let mut high = [0xffu8; 33];
        high[0] = 0x00;
        let mut der = vec![DER_SEQUENCE_TAG, 38, DER_INTEGER_TAG, 33];
        der.extend_from_slice(&high);
        der.extend_from_slice(&[DER_INTEGER_TAG, 1, 0x05]);

        let (r, s) = parse_der_signature(&der).unwrap();
        assert_eq!(r, [0xffu8; 32]);
        // The one-byte s is left-padded out to 32 bytes.
        let mut expected_s = [0u8; 32];
        expected_s[31] = 0x05;
        assert_eq!(s, expected_s);
    }

    #[test]
    fn recovery_search_finds_the_unique_id() {
        let key = test_key(9);
        let digest = [0x5au8; 32];
        let der = der_sign(&key, &digest);
        let (r, s) = parse_der_signature(&der).unwrap();

        let found = recovery_id_search(key.verifying_key(), &r, &s, &digest).unwrap();
        assert!(found <= 3);

        // No other candidate recovers the same point.
        let signature =
            EcdsaSignature::from_scalars(FieldBytes::from(r), FieldBytes::from(s)).unwrap();
        for candidate in 0..=3u8 {
            if candidate == found {
                continue;
            }
            let recovery_id = RecoveryId::from_byte(candidate).unwrap();
            if let Ok(recovered) =
                VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)
            {
                assert_ne!(recovered, *key.verifying_key());
            }
        }
    }

    #[test]
    fn recovery_search_rejects_a_foreign_signature() {
        let key = test_key(9);
        let stranger = test_key(10);
        let digest = [0x5au8; 32];
        let (r, s) = parse_der_signature(&der_sign(&stranger, &digest)).unwrap();

        assert!(matches!(
            recovery_id_search(key.verifying_key(), &r, &s, &digest).unwrap_err(),
            PasskeyError::RecoveryIdNotFound
        ));
    }

    #[test]
    fn assembled_signature_layout() {
        let key = test_key(3);
        let authenticator_data = vec![0xadu8; 37];
        let client_data_json = br#"{"type":"webauthn.get"}"#.to_vec();
        let digest = assertion_digest(&authenticator_data, &client_data_json);
        let assertion = AssertionResponse {
            authenticator_data: authenticator_data.clone(),
            client_data_json: client_data_json.clone(),
            signature: der_sign(&key, &digest),
        };

        let signature = assemble_signature(key.verifying_key(), &assertion).unwrap();
        assert_eq!(signature.variant(), KeyVariant::Wa);
        assert!(signature.to_string().starts_with("SIG_WA_"));

        let data = signature.data();
        let header = data[0];
        assert!((31..=34).contains(&header));

        let (r, s) = parse_der_signature(&assertion.signature).unwrap();
        assert_eq!(&data[1..33], &r);
        assert_eq!(&data[33..65], &s);

        // The two assertion blobs ride at the tail, each length-prefixed.
        let mut tail = SerialBuffer::from_bytes(data[65..].to_vec());
        let length = tail.read_varuint32().unwrap() as usize;
        assert_eq!(tail.read_bytes(length).unwrap(), authenticator_data.as_slice());
        let length = tail.read_varuint32().unwrap() as usize;
        assert_eq!(tail.read_bytes(length).unwrap(), client_data_json.as_slice());
        assert!(tail.remaining().is_empty());

        // The packaged recovery id really does recover the signer's key.
        let recovery_id = RecoveryId::from_byte(header - RECOVERY_HEADER_BASE).unwrap();
        let rebuilt =
            EcdsaSignature::from_scalars(FieldBytes::from(r), FieldBytes::from(s)).unwrap();
        let recovered =
            VerifyingKey::recover_from_prehash(&digest, &rebuilt, recovery_id).unwrap();
        assert_eq!(recovered, *key.verifying_key());
    }
}
