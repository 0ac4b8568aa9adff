//! Replichain: a minimal replicated ledger in Rust
//!
//! This crate provides the core of a small proof-of-work ledger:
//! - Hash-chained blocks of signed value-transfer transactions
//! - A fixed-difficulty proof-of-work puzzle with cancellable search
//! - ECDSA transaction signing and verification (secp256k1)
//! - A pending-transaction pool with chain-replay balance accounting
//! - Longest-valid-chain fork resolution against peer chains
//!
//! The network transport, peer discovery, storage schema tooling, and any
//! interactive surface live outside this crate; the core reaches them
//! through the capability traits in [`network`].
//!
//! # Example
//!
//! ```rust
//! use replichain::node::Node;
//! use replichain::wallet::Wallet;
//!
//! # async fn demo() {
//! let node = Node::new();
//! let wallet = Wallet::new();
//!
//! // Mine a block; the reward lands on the wallet's address.
//! let block = node.mine(&wallet.address()).await.unwrap();
//! assert_eq!(block.index, 2);
//! assert_eq!(node.balance_of(&wallet.address()).await, 1);
//!
//! // Send a coin to someone else.
//! let tx = wallet.create_transaction("some-recipient", 1);
//! node.submit_transaction(&tx.sender, &tx.recipient, tx.amount, tx.signature, tx.public_key)
//!     .await
//!     .unwrap();
//! # }
//! ```

pub mod core;
pub mod crypto;
pub mod mining;
pub mod network;
pub mod node;
pub mod wallet;

// Re-export commonly used types
pub use self::core::{
    Block, Blockchain, CancelToken, PowError, Transaction, TransactionError, DIFFICULTY_PREFIX,
    MINING_REWARD, MINT_ADDRESS,
};
pub use crypto::KeyPair;
pub use mining::{Mempool, MempoolError, Miner};
pub use network::{ChainFetcher, FetchError, Peer, RemoteChain, Resolution, Resolver};
pub use node::{ChainInfo, Node, NodeError};
pub use wallet::Wallet;
