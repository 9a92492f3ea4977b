//! SeqMemoHash cache builder (spec §4.C): a sequential-memory-hard
//! construction over 64-byte nodes. Cheap to verify, ASIC-unfriendly to
//! shortcut, and the base every DAG item is derived from.

use crate::error::{EtchashError, Result};
use crate::primitives::{fix_endian_arr32, keccak512, Node, H256, NODE_BYTES};

/// Immutable array of `cache_size / 64` nodes, built once from a seed and
/// never mutated again.
pub struct Cache {
    nodes: Vec<Node>,
}

impl Cache {
    /// Builds a cache of `cache_size` bytes from `seed` via SeqMemoHash.
    /// Fails only if `cache_size` isn't a multiple of the node size — a
    /// caller bug, never a runtime condition triggered by valid epoch data.
    pub fn build(cache_size: u64, seed: &H256) -> Result<Cache> {
        if cache_size % NODE_BYTES as u64 != 0 {
            return Err(EtchashError::PreconditionFailure(
                "cache_size must be a multiple of 64",
            ));
        }
        let n = (cache_size / NODE_BYTES as u64) as usize;
        if n == 0 {
            return Err(EtchashError::PreconditionFailure("cache_size must be non-zero"));
        }

        let mut nodes = seed_chain(seed, n);
        mix_rounds(&mut nodes);

        for node in nodes.iter_mut() {
            let mut words = node.as_words();
            fix_endian_arr32(&mut words);
            node.set_words(&words);
        }

        Ok(Cache { nodes })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, i: usize) -> &Node {
        &self.nodes[i % self.nodes.len()]
    }
}

/// Step 1: `nodes[0] = keccak512(seed)`, then `nodes[i] = keccak512(nodes[i-1])`
/// for the rest of the chain. The literal, pre-mixing value of each slot.
fn seed_chain(seed: &H256, n: usize) -> Vec<Node> {
    let mut nodes = vec![Node::zeroed(); n];
    nodes[0] = Node::from_bytes(keccak512(seed));
    for i in 1..n {
        let prev = *nodes[i - 1].as_bytes();
        nodes[i] = Node::from_bytes(keccak512(&prev));
    }
    nodes
}

/// Step 3: `CACHE_ROUNDS` passes mixing each slot against its predecessor and
/// a pseudo-random peer, rehashing in place.
fn mix_rounds(nodes: &mut [Node]) {
    const CACHE_ROUNDS: usize = 3;
    let n = nodes.len();
    for _ in 0..CACHE_ROUNDS {
        for i in 0..n {
            let idx = (nodes[i].word(0) as usize) % n;
            let prev_idx = (i + n - 1) % n;
            let tmp = nodes[prev_idx].xor_words(&nodes[idx]);
            nodes[i] = Node::from_bytes(keccak512(tmp.as_bytes()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::H256_ZERO;

    #[test]
    fn rejects_misaligned_cache_size() {
        let err = Cache::build(100, &H256_ZERO).unwrap_err();
        assert!(matches!(err, EtchashError::PreconditionFailure(_)));
    }

    // The chain-build step (before the CACHE_ROUNDS mixing passes) seeds
    // slot 0 directly from keccak512(seed); that value gets fully rewritten
    // by the mixing rounds, so this pins the literal step-1 output rather
    // than the final cache contents.
    #[test]
    fn seed_chain_first_slot_is_keccak512_of_seed() {
        let seed = H256_ZERO;
        let chain = seed_chain(&seed, 16);
        let digest = keccak512(&seed);
        assert_eq!(chain[0].as_bytes(), &digest);
    }

    #[test]
    fn is_deterministic_across_independent_builds() {
        let seed = [7u8; 32];
        let a = Cache::build(64 * 64, &seed).unwrap();
        let b = Cache::build(64 * 64, &seed).unwrap();
        for i in 0..a.len() {
            assert_eq!(a.node(i).as_bytes(), b.node(i).as_bytes());
        }
    }
}
