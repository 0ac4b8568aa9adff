//! Pending-transaction pool
//!
//! Holds unconfirmed transactions in memory until they are drained into a
//! newly created block. The pool is never persisted on its own; the
//! confirmed chain is the only durable record.

use thiserror::Error;

use crate::core::{Blockchain, Transaction, TransactionError};

/// Pool submission errors
#[derive(Error, Debug)]
pub enum MempoolError {
    #[error("Insufficient balance: {balance} < {amount}")]
    InsufficientBalance { balance: i64, amount: u64 },
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

/// Memory pool of transactions waiting for the next block
#[derive(Debug, Default)]
pub struct Mempool {
    pending: Vec<Transaction>,
}

impl Mempool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a transaction and queue it for the next block.
    ///
    /// Mint transactions (reward issuance) bypass all checks. Every other
    /// transaction must carry credentials, be covered by the sender's
    /// chain-confirmed balance, and verify against its claimed sender.
    ///
    /// Returns the index of the block the transaction will land in (an
    /// optimistic prediction, not a confirmation).
    pub fn submit(&mut self, tx: Transaction, chain: &Blockchain) -> Result<u64, MempoolError> {
        if !tx.is_mint() {
            if tx.signature.is_none() || tx.public_key.is_none() {
                return Err(TransactionError::MissingCredentials.into());
            }

            // Amounts beyond i64 can never be covered by a replayed balance,
            // so the failed conversion is itself an insufficient-balance case.
            let balance = chain.balance_of(&tx.sender);
            let covered = i64::try_from(tx.amount).is_ok_and(|amount| balance >= amount);
            if !covered {
                return Err(MempoolError::InsufficientBalance {
                    balance,
                    amount: tx.amount,
                });
            }

            tx.verify()?;
        }

        log::info!(
            "Transaction from {} to {} for {} queued",
            tx.sender,
            tx.recipient,
            tx.amount
        );
        self.pending.push(tx);
        Ok(chain.len() as u64 + 1)
    }

    /// Empty the pool and return its contents for inclusion in a block.
    ///
    /// Callers serialize `submit` and `drain` through one lock so a
    /// transaction is never lost nor included in two blocks.
    pub fn drain(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.pending)
    }

    /// The queued transactions, oldest first
    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    /// Number of queued transactions
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blockchain::mine_next;
    use crate::crypto::KeyPair;

    fn signed_transfer(kp: &KeyPair, recipient: &str, amount: u64) -> Transaction {
        let mut tx = Transaction::new(&kp.address(), recipient, amount);
        tx.signature = Some(hex::encode(kp.sign(&tx.signing_payload())));
        tx.public_key = Some(kp.public_key_hex());
        tx
    }

    /// Chain where `kp`'s address holds `blocks` coins from mining rewards
    fn funded_chain(kp: &KeyPair, blocks: usize) -> Blockchain {
        let mut chain = Blockchain::new();
        for _ in 0..blocks {
            mine_next(&mut chain, vec![Transaction::reward(&kp.address())]);
        }
        chain
    }

    #[test]
    fn test_mint_enqueued_without_checks() {
        let chain = Blockchain::new();
        let mut pool = Mempool::new();

        let index = pool.submit(Transaction::reward("miner"), &chain).unwrap();
        assert_eq!(index, 2);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_unsigned_transfer_rejected_pool_unchanged() {
        let kp = KeyPair::generate();
        let chain = funded_chain(&kp, 2);
        let mut pool = Mempool::new();

        let tx = Transaction::new(&kp.address(), "bob", 1);
        let err = pool.submit(tx, &chain).unwrap_err();
        assert!(matches!(
            err,
            MempoolError::Transaction(TransactionError::MissingCredentials)
        ));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_insufficient_balance_rejected() {
        let kp = KeyPair::generate();
        let chain = funded_chain(&kp, 2);
        let mut pool = Mempool::new();

        let tx = signed_transfer(&kp, "bob", 10);
        let err = pool.submit(tx, &chain).unwrap_err();
        assert!(matches!(
            err,
            MempoolError::InsufficientBalance {
                balance: 2,
                amount: 10
            }
        ));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_oversized_amount_rejected() {
        // An amount above i64::MAX must not slip past the balance check via
        // a wrapping conversion.
        let kp = KeyPair::generate();
        let chain = Blockchain::new();
        let mut pool = Mempool::new();

        let tx = signed_transfer(&kp, "bob", u64::MAX);
        let err = pool.submit(tx, &chain).unwrap_err();
        assert!(matches!(
            err,
            MempoolError::InsufficientBalance {
                balance: 0,
                amount: u64::MAX
            }
        ));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_bad_signature_rejected() {
        let kp = KeyPair::generate();
        let chain = funded_chain(&kp, 2);
        let mut pool = Mempool::new();

        let mut tx = signed_transfer(&kp, "bob", 1);
        tx.recipient = "mallory".to_string();
        let err = pool.submit(tx, &chain).unwrap_err();
        assert!(matches!(
            err,
            MempoolError::Transaction(TransactionError::InvalidSignature)
        ));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_valid_transfer_queued_with_predicted_index() {
        let kp = KeyPair::generate();
        let chain = funded_chain(&kp, 2);
        let mut pool = Mempool::new();

        let index = pool.submit(signed_transfer(&kp, "bob", 1), &chain).unwrap();
        assert_eq!(index, 4); // genesis + 2 mined + the block being built
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_drain_empties_pool() {
        let chain = Blockchain::new();
        let mut pool = Mempool::new();

        pool.submit(Transaction::reward("a"), &chain).unwrap();
        pool.submit(Transaction::reward("b"), &chain).unwrap();

        let drained = pool.drain();
        assert_eq!(drained.len(), 2);
        assert!(pool.is_empty());
        assert!(pool.drain().is_empty());
    }

    #[test]
    fn test_pending_balance_not_spendable() {
        // A queued (unconfirmed) reward does not fund a transfer.
        let kp = KeyPair::generate();
        let chain = Blockchain::new();
        let mut pool = Mempool::new();

        pool.submit(Transaction::reward(&kp.address()), &chain).unwrap();
        let err = pool.submit(signed_transfer(&kp, "bob", 1), &chain).unwrap_err();
        assert!(matches!(err, MempoolError::InsufficientBalance { .. }));
    }
}
