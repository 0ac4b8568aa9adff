//! Blocks of the ledger
//!
//! A block bundles the transactions confirmed at one chain position
//! together with the proof-of-work that sealed it and the hash link to
//! its predecessor.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::transaction::{now_unix, Transaction};
use crate::crypto::canonical_hash;

/// Index of the genesis block
pub const GENESIS_INDEX: u64 = 1;

/// Proof recorded in the genesis block (no puzzle was solved for it)
pub const GENESIS_PROOF: u64 = 100;

/// Previous-hash marker of the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// A block in the chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    /// Position in the chain, starting at 1 for genesis
    pub index: u64,
    /// Creation time, Unix seconds
    pub timestamp: f64,
    /// Proof-of-work solution for this block
    pub proof: u64,
    /// Canonical hash of the previous block (`"0"` for genesis)
    pub previous_hash: String,
    /// Transactions confirmed by this block
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Create a block at the given chain position
    pub fn new(index: u64, proof: u64, previous_hash: String, transactions: Vec<Transaction>) -> Self {
        Self {
            index,
            timestamp: now_unix(),
            proof,
            previous_hash,
            transactions,
        }
    }

    /// Create the genesis block
    pub fn genesis() -> Self {
        Self::new(
            GENESIS_INDEX,
            GENESIS_PROOF,
            GENESIS_PREVIOUS_HASH.to_string(),
            Vec::new(),
        )
    }

    /// Canonical SHA-256 hash of this block.
    ///
    /// The digest covers the semantic fields (index, timestamp, proof,
    /// previous hash, transaction transfers) serialized as sorted-key JSON,
    /// so the same logical block always hashes identically.
    pub fn hash(&self) -> String {
        canonical_hash(&self.canonical_view()).expect("JSON value serialization cannot fail")
    }

    /// The externally-visible view of this block, matching the wire shape
    /// exchanged with peers and handed to the persistence layer.
    pub fn canonical_view(&self) -> serde_json::Value {
        json!({
            "index": self.index,
            "timestamp": self.timestamp,
            "proof": self.proof,
            "previous_hash": self.previous_hash,
            "transactions": self
                .transactions
                .iter()
                .map(Transaction::view)
                .collect::<Vec<_>>(),
        })
    }
}
