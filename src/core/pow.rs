//! Proof-of-work puzzle
//!
//! A candidate proof is valid when the SHA-256 digest of
//! `"{last_proof}{proof}{last_hash}"` starts with four zero hex digits.
//! The difficulty is fixed; there is no adjustment algorithm.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::crypto::sha256_hex;

/// Required hex prefix of a winning digest (fixed difficulty)
pub const DIFFICULTY_PREFIX: &str = "0000";

/// Puzzle search errors
#[derive(Error, Debug)]
pub enum PowError {
    #[error("Puzzle search aborted")]
    Aborted,
}

/// Cooperative cancellation handle for an in-flight puzzle search.
///
/// The search has no intrinsic upper bound, so this is the only way to stop
/// it early, e.g. when consensus replaces the chain the proof was meant to
/// extend.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the search stop at the next candidate
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Check whether `proof` solves the puzzle chained to the previous block
pub fn valid_proof(last_proof: u64, proof: u64, last_hash: &str) -> bool {
    let guess = format!("{last_proof}{proof}{last_hash}");
    sha256_hex(guess.as_bytes()).starts_with(DIFFICULTY_PREFIX)
}

/// Search for a proof, incrementing candidates from 0 until one validates.
///
/// CPU-bound and unbounded; run it on a dedicated worker.
pub fn solve(last_proof: u64, last_hash: &str) -> u64 {
    let mut proof = 0u64;
    while !valid_proof(last_proof, proof, last_hash) {
        proof += 1;
    }
    proof
}

/// Search for a proof, checking the cancellation token between candidates
pub fn solve_until(last_proof: u64, last_hash: &str, cancel: &CancelToken) -> Result<u64, PowError> {
    let mut proof = 0u64;
    while !valid_proof(last_proof, proof, last_hash) {
        if cancel.is_cancelled() {
            return Err(PowError::Aborted);
        }
        proof += 1;
    }
    Ok(proof)
}
