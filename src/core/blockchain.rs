//! The ledger store
//!
//! Owns the append-only sequence of blocks. The genesis block is created
//! eagerly, so an empty chain is never observable.

use crate::core::block::Block;
use crate::core::pow::valid_proof;
use crate::core::transaction::Transaction;

/// The append-only chain of blocks
#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: Vec<Block>,
}

impl Blockchain {
    /// Create a new chain holding only the genesis block
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::genesis()],
        }
    }

    /// Number of blocks in the chain (always at least 1)
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The most recently appended block
    pub fn last_block(&self) -> &Block {
        self.blocks
            .last()
            .expect("chain always holds the genesis block")
    }

    /// The full ordered chain
    pub fn chain(&self) -> &[Block] {
        &self.blocks
    }

    /// Append a new block carrying `transactions`, sealed by `proof` and
    /// linked to `previous_hash`. The index is assigned sequentially.
    pub fn create_block(
        &mut self,
        proof: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
    ) -> &Block {
        let block = Block::new(
            self.blocks.len() as u64 + 1,
            proof,
            previous_hash,
            transactions,
        );
        log::info!(
            "Block {} created with {} transactions",
            block.index,
            block.transactions.len()
        );
        self.blocks.push(block);
        self.last_block()
    }

    /// Validate a candidate chain.
    ///
    /// Every adjacent pair must be hash-linked (`cur.previous_hash` equals
    /// the canonical hash of `prev`) and puzzle-sealed
    /// (`valid_proof(prev.proof, cur.proof, cur.previous_hash)`). Stops at
    /// the first failing pair; callers only learn true or false, the
    /// failing index is logged here.
    pub fn validate(chain: &[Block]) -> bool {
        for pair in chain.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);

            if cur.previous_hash != prev.hash() {
                log::warn!("Invalid previous hash at block {}", cur.index);
                return false;
            }

            if !valid_proof(prev.proof, cur.proof, &cur.previous_hash) {
                log::warn!("Invalid proof of work at block {}", cur.index);
                return false;
            }
        }
        true
    }

    /// Atomically replace the chain with a candidate.
    ///
    /// The swap is all-or-nothing; readers never observe a partially
    /// replaced chain (callers serialize through the ledger write lock).
    pub fn replace(&mut self, chain: Vec<Block>) {
        self.blocks = chain;
        log::info!("Chain replaced, new length {}", self.blocks.len());
    }

    /// Balance of an address, computed by replaying the confirmed chain.
    ///
    /// Pending transactions are excluded; spendable balance is
    /// chain-confirmed only. Amounts beyond the i64 range saturate instead
    /// of wrapping, so a debit can never read as a credit.
    pub fn balance_of(&self, address: &str) -> i64 {
        let mut balance = 0i64;
        for block in &self.blocks {
            for tx in &block.transactions {
                if tx.recipient == address {
                    balance = balance.saturating_add_unsigned(tx.amount);
                }
                if tx.sender == address {
                    balance = balance.saturating_sub_unsigned(tx.amount);
                }
            }
        }
        balance
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

/// Append a properly mined block carrying the given transactions
#[cfg(test)]
pub(crate) fn mine_next(chain: &mut Blockchain, transactions: Vec<Transaction>) {
    use crate::core::pow::solve;

    let last = chain.last_block();
    let proof = solve(last.proof, &last.hash());
    let previous_hash = last.hash();
    chain.create_block(proof, previous_hash, transactions);
}
