//! Quick verification path (spec §4.I): a verifier that already has the mix
//! hash needs only the primitives, not a cache or DAG.

use crate::primitives::{keccak256, keccak512, H256};

/// `keccak256(keccak512(header_hash || nonce_le) || mix_hash)`.
pub fn quick_hash(header_hash: &H256, nonce: u64, mix_hash: &H256) -> H256 {
    let mut seed_input = [0u8; 40];
    seed_input[0..32].copy_from_slice(header_hash);
    seed_input[32..40].copy_from_slice(&nonce.to_le_bytes());
    let s64 = keccak512(&seed_input);

    let mut result_input = [0u8; 64 + 32];
    result_input[0..64].copy_from_slice(&s64);
    result_input[64..96].copy_from_slice(mix_hash);
    keccak256(&result_input)
}

/// Big-endian 256-bit unsigned `hash <= boundary` comparison. A verifier's
/// difficulty check; not a library big-int, just a fixed-width byte compare.
pub fn check_difficulty(hash: &H256, boundary: &H256) -> bool {
    hash.as_slice() <= boundary.as_slice()
}

/// `quick_hash(...)` compared against `boundary` as big-endian 256-bit
/// integers.
pub fn quick_check_difficulty(header_hash: &H256, nonce: u64, mix_hash: &H256, boundary: &H256) -> bool {
    check_difficulty(&quick_hash(header_hash, nonce, mix_hash), boundary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightContext;
    use crate::primitives::H256_ZERO;

    // quick_hash(h, n, mix_hash) must reproduce the result a full compute
    // already derived for (h, n).
    #[test]
    fn quick_hash_matches_compute_result() {
        let ctx = LightContext::with_sizes(0, 64 * 32, 128 * 16, &H256_ZERO).unwrap();
        let header = [3u8; 32];
        let nonce = 99u64;
        let computed = ctx.compute(&header, nonce).unwrap();
        let recomputed = quick_hash(&header, nonce, &computed.mix_hash);
        assert_eq!(recomputed, computed.result);
    }

    #[test]
    fn check_difficulty_is_inclusive_big_endian_compare() {
        let low = [0u8; 32];
        let mut high = [0u8; 32];
        high[31] = 1;
        assert!(check_difficulty(&low, &low));
        assert!(check_difficulty(&low, &high));
        assert!(!check_difficulty(&high, &low));
    }
}
