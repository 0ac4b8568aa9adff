//! Fork resolution against peer chains
//!
//! Implements the longest-valid-chain rule: the local chain is replaced
//! only by a strictly longer candidate that passes full validation. How
//! chains travel over the wire is the transport layer's business; the
//! resolver only depends on the [`ChainFetcher`] capability.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::core::{Block, Blockchain};
use crate::network::peer::Peer;

/// Errors surfaced by a chain fetch against one peer
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Peer unreachable: {0}")]
    Unreachable(String),
    #[error("Malformed chain response: {0}")]
    Malformed(String),
}

/// A peer's view of its chain, as returned by `GET {peer}/chain`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteChain {
    pub length: u64,
    pub chain: Vec<Block>,
}

impl RemoteChain {
    pub fn new(chain: Vec<Block>) -> Self {
        Self {
            length: chain.len() as u64,
            chain,
        }
    }
}

/// Capability for fetching a peer's chain, implemented by the transport
/// layer outside this crate
pub trait ChainFetcher: Send + Sync {
    fn fetch_chain(
        &self,
        peer: &Peer,
    ) -> impl Future<Output = Result<RemoteChain, FetchError>> + Send;
}

/// Outcome of one resolution round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No strictly longer valid chain was found; ours stands
    Authoritative,
    /// The local chain was replaced by a longer valid candidate
    Replaced { length: u64 },
}

impl Resolution {
    pub fn replaced(&self) -> bool {
        matches!(self, Resolution::Replaced { .. })
    }
}

/// Reconciles the local ledger with chains fetched from peers
pub struct Resolver {
    ledger: Arc<RwLock<Blockchain>>,
}

impl Resolver {
    pub fn new(ledger: Arc<RwLock<Blockchain>>) -> Self {
        Self { ledger }
    }

    /// Run one resolution round: fetch every peer's chain and adopt the
    /// best strictly-longer valid candidate, if any.
    ///
    /// Unreachable or malformed peers are skipped; one bad peer never
    /// aborts resolution of the others.
    pub async fn resolve<F: ChainFetcher>(&self, peers: &[Peer], fetcher: &F) -> Resolution {
        let mut candidates = Vec::new();
        for peer in peers {
            match fetcher.fetch_chain(peer).await {
                Ok(remote) => candidates.push((peer.clone(), remote)),
                Err(e) => log::warn!("Skipping peer {peer}: {e}"),
            }
        }
        self.adopt_best(candidates).await
    }

    /// Compare fetched candidates against the local chain and replace it
    /// atomically when a strictly longer valid one exists.
    pub async fn adopt_best(&self, candidates: Vec<(Peer, RemoteChain)>) -> Resolution {
        let mut ledger = self.ledger.write().await;
        let mut best_length = ledger.len() as u64;
        let mut best_chain: Option<Vec<Block>> = None;

        for (peer, remote) in candidates {
            // Strictly greater only; equal-length alternatives are never
            // adopted.
            if remote.length <= best_length {
                continue;
            }
            // The reported length must match the chain actually sent.
            if remote.chain.len() as u64 != remote.length {
                log::warn!(
                    "Peer {} reported length {} but sent {} blocks, skipping",
                    peer,
                    remote.length,
                    remote.chain.len()
                );
                continue;
            }
            if !Blockchain::validate(&remote.chain) {
                log::warn!("Chain from peer {peer} failed validation, skipping");
                continue;
            }
            best_length = remote.length;
            best_chain = Some(remote.chain);
        }

        match best_chain {
            Some(chain) => {
                ledger.replace(chain);
                log::info!("Chain was replaced, new length {best_length}");
                Resolution::Replaced {
                    length: best_length,
                }
            }
            None => {
                log::info!("No conflicts detected, our chain is authoritative");
                Resolution::Authoritative
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blockchain::mine_next;
    use std::collections::HashMap;

    /// Fetcher serving fixed responses, standing in for the transport layer
    struct StaticFetcher {
        chains: HashMap<String, RemoteChain>,
    }

    impl StaticFetcher {
        fn new() -> Self {
            Self {
                chains: HashMap::new(),
            }
        }

        fn with_chain(mut self, address: &str, remote: RemoteChain) -> Self {
            self.chains.insert(address.to_string(), remote);
            self
        }
    }

    impl ChainFetcher for StaticFetcher {
        async fn fetch_chain(&self, peer: &Peer) -> Result<RemoteChain, FetchError> {
            self.chains
                .get(&peer.address)
                .cloned()
                .ok_or_else(|| FetchError::Unreachable(peer.address.clone()))
        }
    }

    fn chain_of_length(len: usize) -> Blockchain {
        let mut chain = Blockchain::new();
        for _ in 1..len {
            mine_next(&mut chain, vec![]);
        }
        chain
    }

    fn shared(chain: Blockchain) -> Arc<RwLock<Blockchain>> {
        Arc::new(RwLock::new(chain))
    }

    #[tokio::test]
    async fn test_longer_valid_chain_adopted() {
        let ledger = shared(chain_of_length(3));
        let longer = chain_of_length(5);
        let fetcher = StaticFetcher::new()
            .with_chain("http://peer-a", RemoteChain::new(longer.chain().to_vec()));

        let resolver = Resolver::new(ledger.clone());
        let outcome = resolver
            .resolve(&[Peer::new("http://peer-a")], &fetcher)
            .await;

        assert_eq!(outcome, Resolution::Replaced { length: 5 });
        let ledger = ledger.read().await;
        assert_eq!(ledger.len(), 5);
        assert_eq!(ledger.chain(), longer.chain());
    }

    #[tokio::test]
    async fn test_equal_length_chain_not_adopted() {
        let local = chain_of_length(3);
        let ledger = shared(local.clone());
        let alternative = chain_of_length(3);
        let fetcher = StaticFetcher::new()
            .with_chain("http://peer-a", RemoteChain::new(alternative.chain().to_vec()));

        let resolver = Resolver::new(ledger.clone());
        let outcome = resolver
            .resolve(&[Peer::new("http://peer-a")], &fetcher)
            .await;

        assert_eq!(outcome, Resolution::Authoritative);
        assert_eq!(ledger.read().await.chain(), local.chain());
    }

    #[tokio::test]
    async fn test_invalid_longer_chain_never_adopted() {
        let ledger = shared(chain_of_length(3));
        let mut blocks = chain_of_length(6).chain().to_vec();
        blocks[4].proof += 1;
        let fetcher =
            StaticFetcher::new().with_chain("http://peer-a", RemoteChain::new(blocks));

        let resolver = Resolver::new(ledger.clone());
        let outcome = resolver
            .resolve(&[Peer::new("http://peer-a")], &fetcher)
            .await;

        assert_eq!(outcome, Resolution::Authoritative);
        assert_eq!(ledger.read().await.len(), 3);
    }

    #[tokio::test]
    async fn test_misreported_length_never_shrinks_chain() {
        let ledger = shared(chain_of_length(3));
        let short = chain_of_length(2).chain().to_vec();
        let fetcher = StaticFetcher::new().with_chain(
            "http://peer-a",
            RemoteChain {
                length: 10,
                chain: short,
            },
        );

        let resolver = Resolver::new(ledger.clone());
        let outcome = resolver
            .resolve(&[Peer::new("http://peer-a")], &fetcher)
            .await;

        assert_eq!(outcome, Resolution::Authoritative);
        assert_eq!(ledger.read().await.len(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_peer_skipped() {
        let ledger = shared(chain_of_length(3));
        let longer = chain_of_length(5);
        let fetcher = StaticFetcher::new()
            .with_chain("http://peer-b", RemoteChain::new(longer.chain().to_vec()));

        let resolver = Resolver::new(ledger.clone());
        let outcome = resolver
            .resolve(
                &[Peer::new("http://peer-dead"), Peer::new("http://peer-b")],
                &fetcher,
            )
            .await;

        // The dead peer is skipped, the good one still wins the round.
        assert_eq!(outcome, Resolution::Replaced { length: 5 });
    }

    #[tokio::test]
    async fn test_best_of_multiple_candidates_wins() {
        let ledger = shared(chain_of_length(2));
        let mid = chain_of_length(4);
        let long = chain_of_length(6);
        let fetcher = StaticFetcher::new()
            .with_chain("http://peer-a", RemoteChain::new(mid.chain().to_vec()))
            .with_chain("http://peer-b", RemoteChain::new(long.chain().to_vec()));

        let resolver = Resolver::new(ledger.clone());
        let outcome = resolver
            .resolve(
                &[Peer::new("http://peer-a"), Peer::new("http://peer-b")],
                &fetcher,
            )
            .await;

        assert_eq!(outcome, Resolution::Replaced { length: 6 });
        assert_eq!(ledger.read().await.chain(), long.chain());
    }
}
