//! Passkey registration and transaction signing for chain accounts.
//!
//! A platform authenticator (passkey) replaces the raw private key: a
//! registration ceremony binds the authenticator's P-256 point, its
//! user-presence level, and the relying-party id into a compact WA public
//! key, and each signing ceremony is rebuilt into a recoverable WA
//! signature the chain can verify. Text forms come from
//! [`pronghorn_keys`]; wire layouts from [`pronghorn_serial`].
//!
//! The platform credential API is injected through the
//! [`Authenticator`] port, so the whole pipeline runs against a software
//! authenticator in tests.

pub mod attestation;
pub mod authenticator;
mod error;
mod signer;
pub mod signing;

pub use attestation::{AttestedCredential, UserPresence, decode_attested_credential};
pub use authenticator::{
    AssertionRequest, AssertionResponse, AttestationRequest, AttestationResponse, Authenticator,
};
pub use error::PasskeyError;
pub use signer::PasskeySigner;
pub use signing::{
    CHAIN_ID_SIZE, assemble_signature, assertion_digest, parse_der_signature, recovery_id_search,
    signing_digest,
};
