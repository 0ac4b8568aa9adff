//! Mining module for block creation and transaction pooling

pub mod mempool;
pub mod miner;

pub use mempool::{Mempool, MempoolError};
pub use miner::{MineStats, Miner, MinerError};
