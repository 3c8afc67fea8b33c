//! Platform authenticator port.
//!
//! The host's credential API (browser `navigator.credentials`, an OS
//! passkey service, a hardware token) is injected behind this trait. The
//! codec pipeline only ever sees the opaque byte fields of the responses,
//! so it stays unit-testable with a software authenticator.

use crate::error::PasskeyError;
use std::future::Future;

/// Parameters for a registration (attestation) ceremony.
#[derive(Debug, Clone)]
pub struct AttestationRequest {
    /// The relying party identifier, typically a domain.
    pub rp_id: String,
    /// A human-readable relying party name.
    pub rp_name: String,
    /// An opaque user identifier, unique per user on this relying party.
    pub user_id: Vec<u8>,
    /// The user's account name.
    pub user_name: String,
    /// A human-readable display name for the user.
    pub user_display_name: String,
    /// The registration challenge supplied by the caller's session layer.
    pub challenge: [u8; 32],
}

/// The authenticator's answer to a registration ceremony.
#[derive(Debug, Clone)]
pub struct AttestationResponse {
    /// The raw credential id the authenticator assigned.
    pub raw_id: Vec<u8>,
    /// The CBOR attestation object embedding the new public key.
    pub attestation_object: Vec<u8>,
}

/// Parameters for a signing (assertion) ceremony.
#[derive(Debug, Clone)]
pub struct AssertionRequest {
    /// The credential allowed to answer.
    pub credential_id: Vec<u8>,
    /// The challenge, here always a transaction digest.
    pub challenge: [u8; 32],
}

/// The authenticator's answer to a signing ceremony.
#[derive(Debug, Clone)]
pub struct AssertionResponse {
    /// The authenticator data covered by the signature.
    pub authenticator_data: Vec<u8>,
    /// The client data JSON carrying the challenge.
    pub client_data_json: Vec<u8>,
    /// DER-encoded ECDSA signature over
    /// `authenticatorData ++ SHA256(clientDataJSON)`.
    pub signature: Vec<u8>,
}

/// A platform authenticator capable of passkey ceremonies.
///
/// Each call prompts the user once; implementations surface refusals and
/// timeouts as [`PasskeyError::Authenticator`].
pub trait Authenticator {
    /// Run a registration ceremony, creating a new credential.
    fn request_attestation(
        &self,
        request: AttestationRequest,
    ) -> impl Future<Output = Result<AttestationResponse, PasskeyError>>;

    /// Run a signing ceremony with an existing credential.
    fn request_assertion(
        &self,
        request: AssertionRequest,
    ) -> impl Future<Output = Result<AssertionResponse, PasskeyError>>;
}
