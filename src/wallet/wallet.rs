//! Wallet implementation
//!
//! Holds a key pair and its derived address, builds and signs transactions,
//! and persists key material to a wallet file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::core::Transaction;
use crate::crypto::{derive_address_from_hex, KeyError, KeyPair};

/// Wallet-related errors
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Stored address does not match the public key")]
    AddressMismatch,
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Serializable wallet data for persistence.
///
/// The private key never leaves this file; the public key and address are
/// shareable.
#[derive(Debug, Serialize, Deserialize)]
struct WalletData {
    private_key: String,
    public_key: String,
    address: String,
}

/// A wallet: a key pair and the address derived from it
pub struct Wallet {
    key_pair: KeyPair,
    address: String,
}

impl Wallet {
    /// Create a new wallet with a fresh key pair
    pub fn new() -> Self {
        let key_pair = KeyPair::generate();
        let address = key_pair.address();
        Self { key_pair, address }
    }

    /// Import a wallet from a hex-encoded private key
    pub fn from_private_key(private_key_hex: &str) -> Result<Self, WalletError> {
        let key_pair = KeyPair::from_private_key_hex(private_key_hex)?;
        let address = key_pair.address();
        Ok(Self { key_pair, address })
    }

    /// The wallet's ledger address
    pub fn address(&self) -> String {
        self.address.clone()
    }

    /// The wallet's public key (hex, shareable)
    pub fn public_key(&self) -> String {
        self.key_pair.public_key_hex()
    }

    /// Create a signed transaction sending `amount` to `recipient`.
    ///
    /// The signature covers the canonical payload of
    /// [`Transaction::signing_payload`] and the transaction carries the
    /// public key the verifier needs.
    pub fn create_transaction(&self, recipient: &str, amount: u64) -> Transaction {
        let mut tx = Transaction::new(&self.address, recipient, amount);
        self.sign_transaction(&mut tx);
        tx
    }

    /// Sign a transaction in place, attaching signature and public key
    pub fn sign_transaction(&self, tx: &mut Transaction) {
        let signature = self.key_pair.sign(&tx.signing_payload());
        tx.signature = Some(hex::encode(signature));
        tx.public_key = Some(self.public_key());
    }

    /// Save the wallet to a file
    pub fn save(&self, path: &Path) -> Result<(), WalletError> {
        let data = WalletData {
            private_key: self.key_pair.private_key_hex(),
            public_key: self.public_key(),
            address: self.address(),
        };
        let json = serde_json::to_string_pretty(&data)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a wallet from a file.
    ///
    /// The address is re-derived from the stored key material; any
    /// disagreement fails with [`WalletError::AddressMismatch`].
    pub fn load(path: &Path) -> Result<Self, WalletError> {
        let json = fs::read_to_string(path)?;
        let data: WalletData = serde_json::from_str(&json)?;

        if derive_address_from_hex(&data.public_key)? != data.address {
            return Err(WalletError::AddressMismatch);
        }

        let wallet = Self::from_private_key(&data.private_key)?;
        // The stored public key must belong to the stored private key.
        if wallet.public_key() != data.public_key {
            return Err(WalletError::AddressMismatch);
        }
        Ok(wallet)
    }

    /// Check that an address matches a public key
    pub fn verify_address(address: &str, public_key_hex: &str) -> bool {
        derive_address_from_hex(public_key_hex)
            .map(|derived| derived == address)
            .unwrap_or(false)
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}
