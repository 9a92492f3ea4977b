//! The hashimoto mix loop (spec §4.F): header + nonce -> mix -> result,
//! parameterised over a page source so the same loop serves both the
//! light (on-the-fly `dag_item`) and full (materialized DAG) compute paths.

use crate::dag::dag_item;
use crate::error::{EtchashError, Result};
use crate::primitives::{
    fix_endian_arr32, fnv_hash, keccak256, keccak512, Node, ACCESSES, H256, MIX_NODES, MIX_WORDS,
    NODE_BYTES, NODE_WORDS,
};

/// Supplies DAG pages (pairs of adjacent nodes) by node index, either from a
/// materialized DAG or derived on the fly from a cache.
pub trait PageSource {
    /// Number of nodes available, i.e. `dag_size / 64`.
    fn node_count(&self) -> u64;
    /// Returns the node at index `i`.
    fn node(&self, i: u64) -> Node;
}

/// `hashimoto(header_hash, nonce, dag_size, page_source) -> (mix_hash, result)`.
pub fn hashimoto<P: PageSource>(
    header_hash: &H256,
    nonce: u64,
    dag_size: u64,
    page_source: &P,
) -> Result<(H256, H256)> {
    const MIX_BYTES: u64 = (MIX_WORDS * 4) as u64;
    if dag_size % MIX_BYTES != 0 {
        return Err(EtchashError::PreconditionFailure(
            "dag_size must be a multiple of MIX_WORDS * 4",
        ));
    }
    let num_full_pages = dag_size / MIX_BYTES;

    let mut seed_input = [0u8; 40];
    seed_input[0..32].copy_from_slice(header_hash);
    seed_input[32..40].copy_from_slice(&nonce.to_le_bytes());
    let s64 = keccak512(&seed_input);

    let mut s_words = [0u32; NODE_WORDS];
    for (i, chunk) in s64.chunks_exact(4).enumerate() {
        s_words[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    let mut mix = [0u32; MIX_WORDS];
    for rep in 0..MIX_NODES {
        mix[rep * NODE_WORDS..(rep + 1) * NODE_WORDS].copy_from_slice(&s_words);
    }

    for i in 0..ACCESSES as u32 {
        let p = (fnv_hash(s_words[0] ^ i, mix[(i as usize) % MIX_WORDS]) as u64) % num_full_pages;
        for n in 0..MIX_NODES {
            let dag_node = page_source.node(p * MIX_NODES as u64 + n as u64);
            let dag_words = dag_node.as_words();
            for w in 0..NODE_WORDS {
                let idx = n * NODE_WORDS + w;
                mix[idx] = fnv_hash(mix[idx], dag_words[w]);
            }
        }
    }

    let mut cmix = [0u32; MIX_WORDS / 4];
    for (out_idx, chunk) in mix.chunks_exact(4).enumerate() {
        let mut acc = fnv_hash(chunk[0], chunk[1]);
        acc = fnv_hash(acc, chunk[2]);
        acc = fnv_hash(acc, chunk[3]);
        cmix[out_idx] = acc;
    }
    fix_endian_arr32(&mut cmix);

    let mut mix_hash = [0u8; 32];
    for (i, word) in cmix.iter().enumerate() {
        mix_hash[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
    }

    let mut result_input = [0u8; 64 + 32];
    result_input[0..64].copy_from_slice(&s64);
    result_input[64..96].copy_from_slice(&mix_hash);
    let result = keccak256(&result_input);

    Ok((mix_hash, result))
}

/// Adapter so a materialized DAG buffer (as `&[Node]` or raw bytes) can act
/// as a [`PageSource`].
pub struct SliceDag<'a> {
    nodes: &'a [u8],
}

impl<'a> SliceDag<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        SliceDag { nodes: bytes }
    }
}

impl<'a> PageSource for SliceDag<'a> {
    fn node_count(&self) -> u64 {
        (self.nodes.len() / NODE_BYTES) as u64
    }

    fn node(&self, i: u64) -> Node {
        let start = (i as usize) * NODE_BYTES;
        let mut bytes = [0u8; NODE_BYTES];
        bytes.copy_from_slice(&self.nodes[start..start + NODE_BYTES]);
        Node::from_bytes(bytes)
    }
}

/// Adapter deriving pages on the fly from a cache via [`dag_item`].
pub struct LightDag<'a> {
    cache: &'a crate::cache::Cache,
    dag_size: u64,
}

impl<'a> LightDag<'a> {
    pub fn new(cache: &'a crate::cache::Cache, dag_size: u64) -> Self {
        LightDag { cache, dag_size }
    }
}

impl<'a> PageSource for LightDag<'a> {
    fn node_count(&self) -> u64 {
        self.dag_size / NODE_BYTES as u64
    }

    fn node(&self, i: u64) -> Node {
        dag_item(i, self.cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::primitives::H256_ZERO;

    fn small_dag_bytes(dag_size: u64, cache: &Cache) -> Vec<u8> {
        let mut dest = vec![0u8; dag_size as usize];
        crate::dag::compute_full_data(&mut dest, dag_size, cache, None).unwrap();
        dest
    }

    // Same (header, nonce) against the same page source always yields the
    // same (mix_hash, result).
    #[test]
    fn hashimoto_is_deterministic() {
        let cache = Cache::build(64 * 32, &H256_ZERO).unwrap();
        let light = LightDag::new(&cache, 128 * 16);
        let a = hashimoto(&H256_ZERO, 42, 128 * 16, &light).unwrap();
        let b = hashimoto(&H256_ZERO, 42, 128 * 16, &light).unwrap();
        assert_eq!(a, b);
    }

    // A materialized DAG and an on-the-fly cache must agree for the same
    // (header, nonce) pair.
    #[test]
    fn light_and_full_page_sources_agree() {
        let cache = Cache::build(64 * 32, &H256_ZERO).unwrap();
        let dag_size = 128 * 16;
        let dag_bytes = small_dag_bytes(dag_size, &cache);
        let full = SliceDag::new(&dag_bytes);
        let light = LightDag::new(&cache, dag_size);

        let header = [9u8; 32];
        let nonce = 0xabcdef0123456789u64;
        let from_full = hashimoto(&header, nonce, dag_size, &full).unwrap();
        let from_light = hashimoto(&header, nonce, dag_size, &light).unwrap();
        assert_eq!(from_full, from_light);
    }

    #[test]
    fn rejects_misaligned_dag_size() {
        let cache = Cache::build(64 * 32, &H256_ZERO).unwrap();
        let light = LightDag::new(&cache, 100);
        let err = hashimoto(&H256_ZERO, 0, 100, &light).unwrap_err();
        assert!(matches!(err, EtchashError::PreconditionFailure(_)));
    }
}
