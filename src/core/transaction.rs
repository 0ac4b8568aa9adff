//! Value-transfer transactions
//!
//! One canonical transaction type is used everywhere: in the pending pool,
//! inside confirmed blocks, and on the wire. Confirmation only moves a
//! transaction from the pool into a block, it never changes its shape.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::crypto::{canonical_json, derive_address, public_key_from_hex, verify_signature, KeyError};

/// Reserved sender address for mint (mining reward) transactions
pub const MINT_ADDRESS: &str = "0";

/// Coins issued to the miner per mined block
pub const MINING_REWARD: u64 = 1;

/// Transaction validation errors
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Transaction must be signed and include a public key")]
    MissingCredentials,
    #[error("Invalid transaction signature")]
    InvalidSignature,
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
}

/// A signed value transfer between two addresses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Sender's address (`MINT_ADDRESS` for mining rewards)
    pub sender: String,
    /// Recipient's address
    pub recipient: String,
    /// Amount transferred, in whole coins
    pub amount: u64,
    /// Creation time, Unix seconds
    pub timestamp: f64,
    /// Hex-encoded ECDSA signature over the signing payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Hex-encoded compressed public key of the sender
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

impl Transaction {
    /// Create a new unsigned transaction
    pub fn new(sender: &str, recipient: &str, amount: u64) -> Self {
        Self {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            amount,
            timestamp: now_unix(),
            signature: None,
            public_key: None,
        }
    }

    /// Create a mint transaction rewarding a miner
    pub fn reward(miner_address: &str) -> Self {
        Self::new(MINT_ADDRESS, miner_address, MINING_REWARD)
    }

    /// Whether this transaction issues new coins (mining reward)
    pub fn is_mint(&self) -> bool {
        self.sender == MINT_ADDRESS
    }

    /// The canonical byte payload that is signed and verified.
    ///
    /// Exactly `{amount, recipient, sender}` in sorted-key JSON. Signer and
    /// verifier share this single construction so the two can never drift.
    pub fn signing_payload(&self) -> Vec<u8> {
        signing_payload(&self.sender, &self.recipient, self.amount)
    }

    /// Verify this transaction's signature against its claimed sender.
    ///
    /// Mint transactions are exempt; for everything else the signature and
    /// public key must be present, the public key must derive to `sender`,
    /// and the signature must verify over the canonical payload.
    pub fn verify(&self) -> Result<(), TransactionError> {
        if self.is_mint() {
            return Ok(());
        }

        let (signature, public_key_hex) = match (&self.signature, &self.public_key) {
            (Some(s), Some(p)) => (s, p),
            _ => return Err(TransactionError::MissingCredentials),
        };

        let public_key = public_key_from_hex(public_key_hex)?;

        // The signer must actually own the claimed sender address.
        if derive_address(&public_key) != self.sender {
            return Err(TransactionError::InvalidSignature);
        }

        let signature = hex::decode(signature).map_err(|_| TransactionError::InvalidSignature)?;
        if !verify_signature(&public_key, &self.signing_payload(), &signature) {
            return Err(TransactionError::InvalidSignature);
        }

        Ok(())
    }

    /// Wire/persistence view of this transaction: `{amount, recipient, sender}`
    pub fn view(&self) -> serde_json::Value {
        json!({
            "sender": self.sender,
            "recipient": self.recipient,
            "amount": self.amount,
        })
    }
}

/// Build the canonical signed-message bytes for a transfer
pub fn signing_payload(sender: &str, recipient: &str, amount: u64) -> Vec<u8> {
    let message = json!({
        "sender": sender,
        "recipient": recipient,
        "amount": amount,
    });
    canonical_json(&message)
        .expect("JSON value serialization cannot fail")
        .into_bytes()
}

/// Current time as Unix seconds with sub-second precision
pub fn now_unix() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
