//! Passkey-backed transaction signer.

use crate::attestation::decode_attested_credential;
use crate::authenticator::{AssertionRequest, AttestationRequest, Authenticator};
use crate::error::PasskeyError;
use crate::signing::{CHAIN_ID_SIZE, assemble_signature, signing_digest};
use p256::ecdsa::VerifyingKey;
use pronghorn_keys::{KeyVariant, PublicKey, Signature, bytes_to_hex};

/// Signs transactions with a passkey held by a platform authenticator.
///
/// A signer binds one credential to one relying party and one WA public
/// key. Build one either by running a registration ceremony with
/// [`PasskeySigner::register`] or by rehydrating stored registration data
/// with [`PasskeySigner::from_raw_parts`].
#[derive(Debug, Clone)]
pub struct PasskeySigner<A: Authenticator> {
    authenticator: A,
    credential_id: Vec<u8>,
    public_key: PublicKey,
    verifying_key: VerifyingKey,
}

impl<A: Authenticator> PasskeySigner<A> {
    /// Register a new passkey and bind a signer to it.
    ///
    /// Runs the attestation ceremony through the authenticator port and
    /// decodes the result into a compact WA key scoped to
    /// `request.rp_id`.
    ///
    /// # Errors
    ///
    /// Fails when the ceremony is refused or the attestation does not
    /// decode to an ES256 P-256 credential.
    pub async fn register(
        authenticator: A,
        request: AttestationRequest,
    ) -> Result<Self, PasskeyError> {
        let rp_id = request.rp_id.clone();
        let response = authenticator.request_attestation(request).await?;
        let credential = decode_attested_credential(
            &rp_id,
            &bytes_to_hex(&response.raw_id),
            &response.attestation_object,
        )?;
        Self::from_raw_parts(authenticator, response.raw_id, credential.public_key)
    }

    /// Rehydrate a signer from a stored credential id and public key.
    ///
    /// # Errors
    ///
    /// Fails with [`PasskeyError::InvalidPublicKey`] when the key is not a
    /// WA key or its leading 33 bytes are not a valid P-256 point.
    pub fn from_raw_parts(
        authenticator: A,
        credential_id: Vec<u8>,
        public_key: PublicKey,
    ) -> Result<Self, PasskeyError> {
        let verifying_key = credential_point(&public_key)?;
        Ok(Self {
            authenticator,
            credential_id,
            public_key,
            verifying_key,
        })
    }

    /// The raw credential id.
    pub fn credential_id(&self) -> &[u8] {
        &self.credential_id
    }

    /// The bound WA public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Sign a serialized transaction for the given chain.
    ///
    /// Builds the transaction digest, presents it to the authenticator as
    /// the challenge, and assembles the recoverable WA signature from the
    /// assertion.
    ///
    /// # Errors
    ///
    /// Fails when the ceremony is refused, the assertion signature is
    /// malformed, or no recovery id reproduces the bound key.
    pub async fn sign_transaction(
        &self,
        chain_id: &[u8; CHAIN_ID_SIZE],
        serialized_transaction: &[u8],
    ) -> Result<Signature, PasskeyError> {
        let digest = signing_digest(chain_id, serialized_transaction);
        let assertion = self
            .authenticator
            .request_assertion(AssertionRequest {
                credential_id: self.credential_id.clone(),
                challenge: digest,
            })
            .await?;
        assemble_signature(&self.verifying_key, &assertion)
    }
}

/// Extract the P-256 point a compact WA key opens with.
fn credential_point(public_key: &PublicKey) -> Result<VerifyingKey, PasskeyError> {
    if public_key.variant() != KeyVariant::Wa {
        return Err(PasskeyError::InvalidPublicKey(
            "expected a WA public key".into(),
        ));
    }
    let point = &public_key.data()[..33];
    VerifyingKey::from_sec1_bytes(point)
        .map_err(|error| PasskeyError::InvalidPublicKey(error.to_string()))
}
