//! Mining engine
//!
//! Solves the proof-of-work puzzle for the current chain tip, issues the
//! mining reward, and flushes the pending pool into a new block.

use log::info;
use std::time::Instant;

use crate::core::{pow, Block, Blockchain, CancelToken, PowError, Transaction};
use crate::mining::mempool::{Mempool, MempoolError};

/// Mining statistics
#[derive(Debug, Clone)]
pub struct MineStats {
    /// The winning proof
    pub proof: u64,
    /// Number of candidates tried (the search starts at 0)
    pub hash_attempts: u64,
    /// Time taken in milliseconds
    pub time_ms: u128,
}

/// Mining errors
#[derive(thiserror::Error, Debug)]
pub enum MinerError {
    #[error(transparent)]
    Pow(#[from] PowError),
    #[error(transparent)]
    Mempool(#[from] MempoolError),
}

/// Miner bound to a reward address
pub struct Miner {
    /// Address credited with the mining reward
    pub address: String,
}

impl Miner {
    /// Create a new miner
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
        }
    }

    /// Mine the next block: solve the puzzle, queue the reward transaction,
    /// and confirm everything pending into a new block.
    pub fn mine(
        &self,
        chain: &mut Blockchain,
        pool: &mut Mempool,
    ) -> Result<(Block, MineStats), MinerError> {
        self.mine_until(chain, pool, &CancelToken::new())
    }

    /// Like [`Miner::mine`], but abandons the puzzle search when the token
    /// is cancelled (e.g. after consensus replaced the chain).
    pub fn mine_until(
        &self,
        chain: &mut Blockchain,
        pool: &mut Mempool,
        cancel: &CancelToken,
    ) -> Result<(Block, MineStats), MinerError> {
        let last = chain.last_block();
        let last_proof = last.proof;
        let last_hash = last.hash();

        info!("Mining block {}...", chain.len() + 1);
        let start = Instant::now();
        let proof = pow::solve_until(last_proof, &last_hash, cancel)?;
        let stats = MineStats {
            proof,
            hash_attempts: proof + 1,
            time_ms: start.elapsed().as_millis(),
        };

        pool.submit(Transaction::reward(&self.address), chain)?;
        let transactions = pool.drain();
        let block = chain.create_block(proof, last_hash, transactions).clone();

        info!(
            "Block {} mined in {}ms ({} attempts)",
            block.index, stats.time_ms, stats.hash_attempts
        );
        Ok((block, stats))
    }

    /// Solve the puzzle for a snapshot of the chain tip without holding any
    /// lock. The caller appends the block afterwards under the write lock.
    pub fn solve_detached(
        last_proof: u64,
        last_hash: &str,
        cancel: &CancelToken,
    ) -> Result<u64, PowError> {
        pow::solve_until(last_proof, last_hash, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MINING_REWARD, MINT_ADDRESS};

    #[test]
    fn test_mine_empty_pool_yields_single_reward() {
        let mut chain = Blockchain::new();
        let mut pool = Mempool::new();
        let miner = Miner::new("miner_address");

        let (block, stats) = miner.mine(&mut chain, &mut pool).unwrap();

        assert_eq!(block.index, 2);
        assert_eq!(block.transactions.len(), 1);
        let reward = &block.transactions[0];
        assert_eq!(reward.sender, MINT_ADDRESS);
        assert_eq!(reward.recipient, "miner_address");
        assert_eq!(reward.amount, MINING_REWARD);
        assert_eq!(stats.proof, block.proof);
        assert!(stats.hash_attempts > 0);
    }

    #[test]
    fn test_mined_chain_validates() {
        let mut chain = Blockchain::new();
        let mut pool = Mempool::new();
        let miner = Miner::new("miner_address");

        for _ in 0..3 {
            miner.mine(&mut chain, &mut pool).unwrap();
        }

        assert_eq!(chain.len(), 4);
        assert!(Blockchain::validate(chain.chain()));
        assert_eq!(chain.balance_of("miner_address"), 3);
    }

    #[test]
    fn test_mining_flushes_pending_pool() {
        let mut chain = Blockchain::new();
        let mut pool = Mempool::new();
        let miner = Miner::new("miner_address");

        pool.submit(Transaction::reward("someone"), &chain).unwrap();
        let (block, _) = miner.mine(&mut chain, &mut pool).unwrap();

        // The queued transaction plus this block's reward.
        assert_eq!(block.transactions.len(), 2);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_cancelled_mining_leaves_state_untouched() {
        let mut chain = Blockchain::new();
        let mut pool = Mempool::new();
        let miner = Miner::new("miner_address");

        let cancel = CancelToken::new();
        cancel.cancel();
        let err = miner.mine_until(&mut chain, &mut pool, &cancel).unwrap_err();

        assert!(matches!(err, MinerError::Pow(PowError::Aborted)));
        assert_eq!(chain.len(), 1);
        assert!(pool.is_empty());
    }
}
