//! Node context
//!
//! An explicit context object owning one ledger, one pending pool, and one
//! peer set. Every operation the inbound network layer exposes goes
//! through here; tests build as many independent nodes as they need.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task;

use crate::core::{Block, Blockchain, CancelToken, PowError, Transaction};
use crate::mining::{Mempool, MempoolError, Miner};
use crate::network::{ChainFetcher, Peer, Resolver};

/// Node operation errors
#[derive(Error, Debug)]
pub enum NodeError {
    #[error(transparent)]
    Mempool(#[from] MempoolError),
    #[error(transparent)]
    Pow(#[from] PowError),
    #[error("A puzzle search is already in flight")]
    MiningBusy,
    #[error("Mining worker failed: {0}")]
    Worker(String),
}

/// Full chain export: the `GET /chain` response shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainInfo {
    pub length: u64,
    pub chain: Vec<Block>,
}

/// A single ledger node
pub struct Node {
    ledger: Arc<RwLock<Blockchain>>,
    pool: Mutex<Mempool>,
    peers: RwLock<HashSet<Peer>>,
    /// Cancellation handle for the puzzle search currently in flight, if any
    mining_cancel: Mutex<Option<CancelToken>>,
}

impl Node {
    /// Create a node with a fresh chain (genesis only), empty pool, and no
    /// known peers
    pub fn new() -> Self {
        Self {
            ledger: Arc::new(RwLock::new(Blockchain::new())),
            pool: Mutex::new(Mempool::new()),
            peers: RwLock::new(HashSet::new()),
            mining_cancel: Mutex::new(None),
        }
    }

    /// Validate and queue a transaction for the next block.
    ///
    /// Returns the index of the block the transaction will land in.
    pub async fn submit_transaction(
        &self,
        sender: &str,
        recipient: &str,
        amount: u64,
        signature: Option<String>,
        public_key: Option<String>,
    ) -> Result<u64, MempoolError> {
        let mut tx = Transaction::new(sender, recipient, amount);
        tx.signature = signature;
        tx.public_key = public_key;

        let ledger = self.ledger.read().await;
        let mut pool = self.pool.lock().await;
        pool.submit(tx, &ledger)
    }

    /// Mine the next block, crediting the reward to `miner_address`.
    ///
    /// The puzzle search runs on a blocking worker so submissions and
    /// queries stay responsive, and it carries a cancellation token so a
    /// consensus replacement can abandon it.
    pub async fn mine(&self, miner_address: &str) -> Result<Block, NodeError> {
        let (last_proof, last_hash) = {
            let ledger = self.ledger.read().await;
            let last = ledger.last_block();
            (last.proof, last.hash())
        };

        let cancel = CancelToken::new();
        {
            // One puzzle search at a time; a second caller would otherwise
            // displace the token resolve() needs to cancel the first.
            let mut slot = self.mining_cancel.lock().await;
            if slot.is_some() {
                return Err(NodeError::MiningBusy);
            }
            *slot = Some(cancel.clone());
        }

        let tip_hash = last_hash.clone();
        let solved = task::spawn_blocking(move || {
            Miner::solve_detached(last_proof, &tip_hash, &cancel)
        })
        .await;
        *self.mining_cancel.lock().await = None;

        let proof = solved.map_err(|e| NodeError::Worker(e.to_string()))??;

        let mut ledger = self.ledger.write().await;
        // A replacement may land between solving and appending; a proof for
        // a stale tip is discarded.
        if ledger.last_block().hash() != last_hash {
            return Err(PowError::Aborted.into());
        }

        let mut pool = self.pool.lock().await;
        pool.submit(Transaction::reward(miner_address), &ledger)?;
        let transactions = pool.drain();
        Ok(ledger.create_block(proof, last_hash, transactions).clone())
    }

    /// Export the full chain with its length
    pub async fn chain_info(&self) -> ChainInfo {
        let ledger = self.ledger.read().await;
        ChainInfo {
            length: ledger.len() as u64,
            chain: ledger.chain().to_vec(),
        }
    }

    /// Chain-confirmed balance of an address
    pub async fn balance_of(&self, address: &str) -> i64 {
        self.ledger.read().await.balance_of(address)
    }

    /// Transactions queued for the next block
    pub async fn pending_transactions(&self) -> Vec<Transaction> {
        self.pool.lock().await.pending().to_vec()
    }

    /// Add a peer to the known set. Returns `false` when it was already
    /// registered (the operation is idempotent).
    pub async fn register_peer(&self, address: &str) -> bool {
        let added = self.peers.write().await.insert(Peer::new(address));
        if added {
            log::info!("Registered peer {address}");
        }
        added
    }

    /// The currently known peers
    pub async fn peers(&self) -> Vec<Peer> {
        self.peers.read().await.iter().cloned().collect()
    }

    /// Run one consensus round against all known peers.
    ///
    /// Returns whether the local chain was replaced. On replacement, an
    /// in-flight puzzle search is cancelled since its tip is gone.
    pub async fn resolve<F: ChainFetcher>(&self, fetcher: &F) -> bool {
        let peers = self.peers().await;
        let resolver = Resolver::new(self.ledger.clone());
        let outcome = resolver.resolve(&peers, fetcher).await;

        if outcome.replaced() {
            if let Some(cancel) = self.mining_cancel.lock().await.take() {
                cancel.cancel();
            }
        }
        outcome.replaced()
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
