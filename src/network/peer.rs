//! Peers known to this node
//!
//! Peer discovery, health monitoring, and the transport itself live in the
//! network layer outside this crate; the consensus resolver only needs a
//! set of peer addresses to ask for chains.

use serde::{Deserialize, Serialize};

/// A peer node, identified by its reachable address (URL-like string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Peer {
    pub address: String,
}

impl Peer {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
        }
    }
}

impl std::fmt::Display for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.address)
    }
}
