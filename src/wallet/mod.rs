//! Wallet module for key ownership and transaction signing

pub mod wallet;

pub use wallet::{Wallet, WalletError};
