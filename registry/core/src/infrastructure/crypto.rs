// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Registration Cryptography
//!
//! Production implementations of the signature collaborators:
//!
//! - [`Sha256CanonicalHasher`]: serialises a JSON document with recursively
//!   sorted object keys and no insignificant whitespace, then hashes it with
//!   SHA-256. Equivalent documents hash identically regardless of key order.
//! - [`Ed25519SignatureVerifier`]: owner keys are hex-encoded 32-byte Ed25519
//!   public keys; signatures are base64-encoded 64-byte Ed25519 signatures
//!   over the raw payload hash bytes.
//! - [`sign_metadata`]: client-side counterpart used by the CLI and tests.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand_core::OsRng;
use sha2::{Digest, Sha256};
use serde_json::Value;

use crate::domain::agent::AgentMetadata;
use crate::domain::collaborators::{CanonicalHasher, PayloadHash, SignatureVerifier};
use crate::domain::registration::{signing_document, RegistrationRequest};
use crate::domain::repository::RepositoryError;

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256CanonicalHasher;

impl Sha256CanonicalHasher {
    pub fn canonical_bytes(value: &Value) -> Vec<u8> {
        let mut out = Vec::new();
        write_canonical(value, &mut out);
        out
    }
}

impl CanonicalHasher for Sha256CanonicalHasher {
    fn hash(&self, metadata: &Value) -> PayloadHash {
        let digest = Sha256::digest(Self::canonical_bytes(metadata));
        PayloadHash(digest.to_vec())
    }
}

fn write_canonical(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push(b'{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_scalar(&Value::String((*key).clone()), out);
                out.push(b':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push(b'}');
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out);
            }
            out.push(b']');
        }
        scalar => write_scalar(scalar, out),
    }
}

fn write_scalar(value: &Value, out: &mut Vec<u8>) {
    // Scalars serialise deterministically; this cannot fail for a Value.
    if let Ok(bytes) = serde_json::to_vec(value) {
        out.extend_from_slice(&bytes);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519SignatureVerifier;

impl Ed25519SignatureVerifier {
    fn parse_key(owner_key: &str) -> Option<VerifyingKey> {
        let bytes = hex::decode(owner_key.trim()).ok()?;
        let bytes: [u8; 32] = bytes.try_into().ok()?;
        VerifyingKey::from_bytes(&bytes).ok()
    }

    fn parse_signature(signature: &str) -> Option<Signature> {
        let bytes = STANDARD.decode(signature.trim()).ok()?;
        let bytes: [u8; 64] = bytes.try_into().ok()?;
        Some(Signature::from_bytes(&bytes))
    }
}

impl SignatureVerifier for Ed25519SignatureVerifier {
    fn verify(&self, owner_key: &str, payload_hash: &PayloadHash, signature: &str) -> bool {
        let Some(key) = Self::parse_key(owner_key) else {
            tracing::debug!("Owner key is not a hex-encoded Ed25519 public key");
            return false;
        };
        let Some(signature) = Self::parse_signature(signature) else {
            tracing::debug!("Signature is not a base64-encoded Ed25519 signature");
            return false;
        };
        key.verify(payload_hash.as_bytes(), &signature).is_ok()
    }
}

/// Fresh signing key from the operating system's RNG.
pub fn generate_signing_key() -> SigningKey {
    SigningKey::generate(&mut OsRng)
}

/// Hex form of a signing key's public half, as used in `AgentMetadata::owner`.
pub fn owner_key(signing_key: &SigningKey) -> String {
    hex::encode(signing_key.verifying_key().as_bytes())
}

/// Parse a hex-encoded 32-byte Ed25519 secret key.
pub fn signing_key_from_hex(secret_hex: &str) -> anyhow::Result<SigningKey> {
    let bytes = hex::decode(secret_hex.trim())?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("Invalid secret key length (must be 32 bytes)"))?;
    Ok(SigningKey::from_bytes(&bytes))
}

/// Sign `metadata` and wrap it in a [`RegistrationRequest`].
///
/// The owner field is set from the signing key before hashing so the
/// signature always matches the submitted owner.
pub fn sign_metadata(
    mut metadata: AgentMetadata,
    signing_key: &SigningKey,
    hasher: &dyn CanonicalHasher,
) -> Result<RegistrationRequest, RepositoryError> {
    metadata.owner = owner_key(signing_key);
    let hash = hasher.hash(&signing_document(&metadata)?);
    let signature = signing_key.sign(hash.as_bytes());
    Ok(RegistrationRequest {
        metadata,
        signature: STANDARD.encode(signature.to_bytes()),
    })
}
