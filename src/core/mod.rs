//! Core ledger components
//!
//! This module contains the fundamental building blocks:
//! - Transactions (signed value transfers, one canonical shape)
//! - Blocks (hash-chained bundles of transactions)
//! - Proof-of-work puzzle (fixed difficulty, cancellable search)
//! - Blockchain (append-only store with validation and balances)

pub mod block;
pub mod blockchain;
pub mod pow;
pub mod transaction;

pub use block::{Block, GENESIS_INDEX, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
pub use blockchain::Blockchain;
pub use pow::{solve, solve_until, valid_proof, CancelToken, PowError, DIFFICULTY_PREFIX};
pub use transaction::{
    signing_payload, Transaction, TransactionError, MINING_REWARD, MINT_ADDRESS,
};
