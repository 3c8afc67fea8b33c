//! Typed keys and signatures with checksummed base-58 text forms.
//!
//! A text key is `<prefix><base58(data ++ checksum4)>` where the prefix
//! names the role and curve variant (`PUB_K1_`, `SIG_WA_`, ...) and the
//! checksum is the first four bytes of `RIPEMD160(data ++ suffix)`. The
//! legacy `EOS` public-key form hashes the bare data with no suffix; that
//! asymmetry is part of the wire format and is kept as-is.

use crate::base58;
use crate::checksum::{CHECKSUM_SIZE, ripemd160_checksum};
use crate::error::KeyError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Data width of a K1 or R1 public key (compressed point).
pub const PUBLIC_KEY_DATA_SIZE: usize = 33;

/// Data width of a K1 or R1 signature (header byte plus r and s).
pub const SIGNATURE_DATA_SIZE: usize = 65;

/// Smallest possible WA public key: compressed point plus presence byte.
const WA_PUBLIC_KEY_MIN_SIZE: usize = 34;

/// Prefix of the legacy public-key text form.
pub const LEGACY_PUBLIC_KEY_PREFIX: &str = "EOS";

/// Curve/scheme variant of a key or signature.
///
/// The declaration order is the canonical authority ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyVariant {
    /// secp256k1.
    K1,
    /// secp256r1 (P-256).
    R1,
    /// WebAuthn-wrapped P-256.
    Wa,
}

impl KeyVariant {
    /// The two-letter suffix mixed into checksums and embedded in prefixes.
    fn suffix(self) -> &'static str {
        match self {
            KeyVariant::K1 => "K1",
            KeyVariant::R1 => "R1",
            KeyVariant::Wa => "WA",
        }
    }
}

/// A public key or signature in binary form.
///
/// Immutable once built; codecs create keys, nothing mutates them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    variant: KeyVariant,
    data: Vec<u8>,
}

impl Key {
    /// The curve/scheme variant.
    pub fn variant(&self) -> KeyVariant {
        self.variant
    }

    /// The raw key or signature data, excluding the variant tag.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A public key with a checksummed text form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKey(Key);

/// A signature with a checksummed text form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature(Key);

impl PublicKey {
    /// Wrap public-key data in the given variant.
    ///
    /// # Errors
    ///
    /// Fails with [`KeyError::UnsupportedKeyFormat`] when the data length
    /// does not fit the variant: K1/R1 need exactly 33 bytes, WA at least
    /// a compressed point and a presence byte.
    pub fn new(variant: KeyVariant, data: Vec<u8>) -> Result<Self, KeyError> {
        match variant {
            KeyVariant::K1 | KeyVariant::R1 if data.len() != PUBLIC_KEY_DATA_SIZE => Err(
                KeyError::UnsupportedKeyFormat("public key data must be 33 bytes"),
            ),
            KeyVariant::Wa if data.len() < WA_PUBLIC_KEY_MIN_SIZE => Err(
                KeyError::UnsupportedKeyFormat("WA public key data is too short"),
            ),
            _ => Ok(Self(Key { variant, data })),
        }
    }

    /// The curve/scheme variant.
    pub fn variant(&self) -> KeyVariant {
        self.0.variant()
    }

    /// The raw key data.
    pub fn data(&self) -> &[u8] {
        self.0.data()
    }
}

impl Signature {
    /// Wrap signature data in the given variant.
    ///
    /// # Errors
    ///
    /// Fails with [`KeyError::UnsupportedKeyFormat`] when K1/R1 data is
    /// not exactly 65 bytes.
    pub fn new(variant: KeyVariant, data: Vec<u8>) -> Result<Self, KeyError> {
        match variant {
            KeyVariant::K1 | KeyVariant::R1 if data.len() != SIGNATURE_DATA_SIZE => Err(
                KeyError::UnsupportedKeyFormat("signature data must be 65 bytes"),
            ),
            _ => Ok(Self(Key { variant, data })),
        }
    }

    /// The curve/scheme variant.
    pub fn variant(&self) -> KeyVariant {
        self.0.variant()
    }

    /// The raw signature data.
    pub fn data(&self) -> &[u8] {
        self.0.data()
    }
}

fn encode_with_checksum(data: &[u8], suffix: &str) -> String {
    let checksum = ripemd160_checksum(data, suffix);
    let mut whole = Vec::with_capacity(data.len() + CHECKSUM_SIZE);
    whole.extend_from_slice(data);
    whole.extend_from_slice(&checksum);
    base58::encode(&whole)
}

/// Decode `text` into key data, verifying the trailing checksum.
///
/// `size` is the expected data width for fixed-size forms, or `None` for
/// the variable-size WA forms.
fn decode_checked(
    text: &str,
    size: Option<usize>,
    suffix: &str,
) -> Result<Vec<u8>, KeyError> {
    let whole = match size {
        Some(size) => base58::decode_fixed(size + CHECKSUM_SIZE, text)?,
        None => base58::decode_var(text)?,
    };
    if whole.len() < CHECKSUM_SIZE {
        return Err(KeyError::ChecksumMismatch);
    }
    let (data, checksum) = whole.split_at(whole.len() - CHECKSUM_SIZE);
    if *checksum != ripemd160_checksum(data, suffix) {
        return Err(KeyError::ChecksumMismatch);
    }
    Ok(data.to_vec())
}

/// Decode the legacy `EOS` public-key body. The checksum hashes the bare
/// key data with no suffix.
fn decode_legacy(text: &str) -> Result<Vec<u8>, KeyError> {
    decode_checked(text, Some(PUBLIC_KEY_DATA_SIZE), "")
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.0.variant {
            KeyVariant::K1 => "PUB_K1_",
            KeyVariant::R1 => "PUB_R1_",
            KeyVariant::Wa => "PUB_WA_",
        };
        let body = encode_with_checksum(&self.0.data, self.0.variant.suffix());
        write!(f, "{prefix}{body}")
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.0.variant {
            KeyVariant::K1 => "SIG_K1_",
            KeyVariant::R1 => "SIG_R1_",
            KeyVariant::Wa => "SIG_WA_",
        };
        let body = encode_with_checksum(&self.0.data, self.0.variant.suffix());
        write!(f, "{prefix}{body}")
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix("PUB_K1_") {
            let data = decode_checked(rest, Some(PUBLIC_KEY_DATA_SIZE), "K1")?;
            Self::new(KeyVariant::K1, data)
        } else if let Some(rest) = s.strip_prefix("PUB_R1_") {
            let data = decode_checked(rest, Some(PUBLIC_KEY_DATA_SIZE), "R1")?;
            Self::new(KeyVariant::R1, data)
        } else if let Some(rest) = s.strip_prefix("PUB_WA_") {
            let data = decode_checked(rest, None, "WA")?;
            Self::new(KeyVariant::Wa, data)
        } else if let Some(rest) = s.strip_prefix(LEGACY_PUBLIC_KEY_PREFIX) {
            let data = decode_legacy(rest)?;
            Self::new(KeyVariant::K1, data)
        } else {
            Err(KeyError::UnrecognizedKeyFormat)
        }
    }
}

impl FromStr for Signature {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix("SIG_K1_") {
            let data = decode_checked(rest, Some(SIGNATURE_DATA_SIZE), "K1")?;
            Self::new(KeyVariant::K1, data)
        } else if let Some(rest) = s.strip_prefix("SIG_R1_") {
            let data = decode_checked(rest, Some(SIGNATURE_DATA_SIZE), "R1")?;
            Self::new(KeyVariant::R1, data)
        } else if let Some(rest) = s.strip_prefix("SIG_WA_") {
            let data = decode_checked(rest, None, "WA")?;
            Self::new(KeyVariant::Wa, data)
        } else {
            Err(KeyError::UnrecognizedKeyFormat)
        }
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PublicKeyVisitor;

        impl serde::de::Visitor<'_> for PublicKeyVisitor {
            type Value = PublicKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a text-form public key")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(PublicKeyVisitor)
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SignatureVisitor;

        impl serde::de::Visitor<'_> for SignatureVisitor {
            type Value = Signature;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a text-form signature")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(SignatureVisitor)
    }
}

/// Sort `(text key, weight)` pairs into the canonical authority order:
/// variant class first (K1 < R1 < WA), then the raw key bytes compared as
/// unsigned, shorter prefixes first on ties.
///
/// # Errors
///
/// Fails with the first [`KeyError`] hit while decoding a key.
pub fn sort_public_keys<W>(keys: Vec<(String, W)>) -> Result<Vec<(String, W)>, KeyError> {
    let mut decorated = keys
        .into_iter()
        .map(|(text, weight)| {
            let key: PublicKey = text.parse()?;
            Ok((key, text, weight))
        })
        .collect::<Result<Vec<_>, KeyError>>()?;
    decorated.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(decorated
        .into_iter()
        .map(|(_, text, weight)| (text, weight))
        .collect())
}
