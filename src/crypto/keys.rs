//! ECDSA key management for the ledger
//!
//! Provides key pair generation, signing, verification, and address
//! derivation using the secp256k1 elliptic curve.

use rand::rngs::OsRng;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::hash::{sha256, sha256_hex};

/// Length of a ledger address in hex characters
pub const ADDRESS_LEN: usize = 32;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Malformed public key encoding")]
    MalformedKeyEncoding,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key = SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Get the public key as a hex string (compressed format)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// Derive the ledger address from the public key
    pub fn address(&self) -> String {
        derive_address(&self.public_key)
    }

    /// Sign a message with the private key
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        sign_message(&self.secret_key, message)
    }

    /// Verify a signature against this key pair's public key
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        verify_signature(&self.public_key, message, signature)
    }
}

/// Derive a ledger address from a public key.
///
/// The address is the SHA-256 digest of the compressed public-key encoding,
/// truncated to a fixed 32 hex characters. Two different public keys never
/// share an address under the collision resistance of SHA-256.
pub fn derive_address(public_key: &PublicKey) -> String {
    let digest = sha256_hex(&public_key.serialize());
    digest[..ADDRESS_LEN].to_string()
}

/// Derive a ledger address from a hex-encoded public key
pub fn derive_address_from_hex(public_key_hex: &str) -> Result<String, KeyError> {
    let public_key = public_key_from_hex(public_key_hex)?;
    Ok(derive_address(&public_key))
}

/// Parse a public key from a hex string
pub fn public_key_from_hex(hex_key: &str) -> Result<PublicKey, KeyError> {
    let bytes = hex::decode(hex_key).map_err(|_| KeyError::MalformedKeyEncoding)?;
    PublicKey::from_slice(&bytes).map_err(|_| KeyError::MalformedKeyEncoding)
}

/// Sign a message with a secret key.
///
/// The message is digested with SHA-256 before signing so callers pass the
/// raw canonical message bytes.
pub fn sign_message(secret_key: &SecretKey, message: &[u8]) -> Vec<u8> {
    let secp = Secp256k1::new();
    let digest = sha256(message);
    let message = Message::from_digest_slice(&digest).expect("SHA-256 digest is 32 bytes");
    let signature = secp.sign_ecdsa(&message, secret_key);
    signature.serialize_compact().to_vec()
}

/// Verify a signature against a public key.
///
/// Fails closed: malformed signature bytes or a cryptographic mismatch both
/// return `false`, never an error or a panic.
pub fn verify_signature(public_key: &PublicKey, message: &[u8], signature: &[u8]) -> bool {
    let secp = Secp256k1::new();
    let digest = sha256(message);
    let message = match Message::from_digest_slice(&digest) {
        Ok(m) => m,
        Err(_) => return false,
    };
    let sig = match secp256k1::ecdsa::Signature::from_compact(signature) {
        Ok(s) => s,
        Err(_) => return false,
    };
    secp.verify_ecdsa(&message, &sig, public_key).is_ok()
}
