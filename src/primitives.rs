//! Keccak wrappers, FNV mixing, endian fixups, and the 64-byte `Node` type.
//!
//! `Node` is the unit of both the cache and the DAG: 64 bytes, viewable as
//! 16 little-endian `u32` words or 8 little-endian `u64` double-words. A
//! `[u8; 64]` backing array keeps the byte/word views trivially safe —
//! `as_words`/`as_words_mut` just reinterpret the slice via `byteorder`
//! rather than transmuting a union, per the aliasing note in the design.

use byteorder::{ByteOrder, LittleEndian};
use sha3::{Digest, Keccak256, Keccak512};

/// FNV offset/prime pair used pervasively as a cheap non-cryptographic mixer.
pub const FNV_PRIME: u32 = 0x0100_0193;

pub const NODE_WORDS: usize = 16;
pub const NODE_BYTES: usize = 64;
pub const MIX_NODES: usize = 2;
pub const MIX_WORDS: usize = MIX_NODES * NODE_WORDS;
pub const CACHE_ROUNDS: usize = 3;
pub const DATASET_PARENTS: usize = 256;
pub const ACCESSES: usize = 64;

/// Opaque 32-byte value. The reset state is all zeros.
pub type H256 = [u8; 32];

pub const H256_ZERO: H256 = [0u8; 32];

/// `(a * FNV_PRIME) XOR b`, wrapping on 32-bit overflow.
#[inline]
pub fn fnv_hash(a: u32, b: u32) -> u32 {
    a.wrapping_mul(FNV_PRIME) ^ b
}

/// No-op on a little-endian host; present for API parity with the reference
/// fixup and so a big-endian build stays correct without touching callers.
#[inline]
pub fn fix_endian32(x: u32) -> u32 {
    u32::from_le(x.to_le())
}

#[inline]
pub fn fix_endian64(x: u64) -> u64 {
    u64::from_le(x.to_le())
}

/// Byte-swaps every word of a little-endian `u32` array in place when run on
/// a big-endian host; a no-op elsewhere. Used after cache construction (§4.C
/// step 4) and when finishing the mix compression (§4.F step 6).
pub fn fix_endian_arr32(words: &mut [u32]) {
    for w in words.iter_mut() {
        *w = fix_endian32(*w);
    }
}

pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

pub fn keccak512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Keccak512::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut out = [0u8; 64];
    out.copy_from_slice(&digest);
    out
}

/// A 64-byte DAG/cache item, viewable as bytes, 16 LE `u32` words, or 8 LE
/// `u64` double-words. All views alias the same backing storage.
#[derive(Clone, Copy)]
#[repr(C, align(8))]
pub struct Node {
    bytes: [u8; NODE_BYTES],
}

impl Node {
    pub const fn zeroed() -> Self {
        Node { bytes: [0u8; NODE_BYTES] }
    }

    pub fn from_bytes(bytes: [u8; NODE_BYTES]) -> Self {
        Node { bytes }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; NODE_BYTES] {
        &self.bytes
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8; NODE_BYTES] {
        &mut self.bytes
    }

    pub fn as_words(&self) -> [u32; NODE_WORDS] {
        let mut words = [0u32; NODE_WORDS];
        LittleEndian::read_u32_into(&self.bytes, &mut words);
        words
    }

    pub fn set_words(&mut self, words: &[u32; NODE_WORDS]) {
        LittleEndian::write_u32_into(words, &mut self.bytes);
    }

    #[inline]
    pub fn word(&self, i: usize) -> u32 {
        LittleEndian::read_u32(&self.bytes[i * 4..])
    }

    #[inline]
    pub fn set_word(&mut self, i: usize, v: u32) {
        LittleEndian::write_u32(&mut self.bytes[i * 4..], v);
    }

    pub fn as_dwords(&self) -> [u64; 8] {
        let mut dwords = [0u64; 8];
        LittleEndian::read_u64_into(&self.bytes, &mut dwords);
        dwords
    }

    /// `self ^= other`, word-wise over all 16 words.
    pub fn xor_words(&self, other: &Node) -> Node {
        let a = self.as_words();
        let b = other.as_words();
        let mut out = [0u32; NODE_WORDS];
        for i in 0..NODE_WORDS {
            out[i] = a[i] ^ b[i];
        }
        let mut node = Node::zeroed();
        node.set_words(&out);
        node
    }

    /// Re-hash this node's bytes through Keccak-512, replacing its contents.
    pub fn keccak512_self(&mut self) {
        self.bytes = keccak512(&self.bytes);
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::zeroed()
    }
}
