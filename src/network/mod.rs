//! Consensus-facing view of the network
//!
//! The transport itself (request/response handling, peer discovery, health
//! monitoring) lives outside this crate. This module holds what the core
//! needs from it: the peer value type and the fork resolver with its
//! chain-fetching capability.

pub mod peer;
pub mod sync;

pub use peer::Peer;
pub use sync::{ChainFetcher, FetchError, RemoteChain, Resolution, Resolver};
