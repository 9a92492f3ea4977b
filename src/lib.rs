//! # Etchash
//!
//! A Rust implementation of the Etchash (ECIP-1099) proof-of-work core — the
//! Ethereum Classic variant of Ethash. Given a block height, a header hash,
//! and a nonce, this crate produces a deterministic 256-bit PoW result and a
//! 256-bit mix hash that a verifier can check against a difficulty boundary.
//!
//! ## Scope
//!
//! This crate covers the memory-hard hash itself: epoch/seed derivation,
//! cache construction, DAG item derivation, the hashimoto mix loop, and the
//! light/full compute paths including full-mode DAG file persistence. It
//! does not cover block validation beyond the PoW check, networking, or GPU
//! execution.
//!
//! ## Note
//! This implementation targets ECIP-1099 (Etchash). Pre-fork, its behavior
//! matches classic Ethash exactly.

pub mod cache;
pub mod dag;
pub mod epoch;
pub mod error;
pub mod full;
pub mod io;
pub mod light;
pub mod mix;
pub mod primitives;
pub mod verify;

pub use cache::Cache;
pub use dag::{compute_full_data, dag_item, ProgressCallback};
pub use error::{EtchashError, Result};
pub use full::FullContext;
pub use light::{ComputeResult, LightContext};
pub use primitives::H256;
pub use verify::{check_difficulty, quick_check_difficulty, quick_hash};

use std::path::Path;

/// `epoch(block_number)`.
pub fn get_epoch_number(block_number: u64) -> u64 {
    epoch::epoch(block_number)
}

/// DAG size in bytes for `block_number`'s epoch.
pub fn get_datasize(block_number: u64) -> Result<u64> {
    epoch::dag_size(block_number)
}

/// Cache size in bytes for `block_number`'s epoch.
pub fn get_cachesize(block_number: u64) -> Result<u64> {
    epoch::cache_size(block_number)
}

/// Seed hash for `block_number`'s epoch.
pub fn get_seedhash(block_number: u64) -> H256 {
    epoch::seedhash(block_number)
}

/// Builds a [`LightContext`] for `block_number`.
pub fn light_new(block_number: u64) -> Result<LightContext> {
    LightContext::new(block_number)
}

/// Builds a [`LightContext`] from an explicit `(cache_size, seed)` pair,
/// bypassing the epoch tables entirely. The resulting context has no real
/// `dag_size` of its own — pair it with [`full_new_internal`] (which takes
/// an explicit size) rather than [`full_new`] if a full context is needed.
pub fn light_new_internal(cache_size: u64, seed: &H256) -> Result<LightContext> {
    LightContext::with_sizes(0, cache_size, 0, seed)
}

pub fn light_compute(light: &LightContext, header_hash: &H256, nonce: u64) -> Result<ComputeResult> {
    light.compute(header_hash, nonce)
}

/// Explicit release point for API parity with the reference design; a
/// [`LightContext`] also releases its cache when dropped normally.
pub fn light_delete(light: LightContext) {
    drop(light);
}

/// Builds a [`FullContext`] for `light`'s block, preparing/mmapping the DAG
/// file under the default directory (see [`full::default_dag_dir`]).
pub fn full_new(light: &LightContext, callback: Option<&mut dag::ProgressCallback<'_>>) -> Result<FullContext> {
    let dirname = full::default_dag_dir();
    FullContext::new(&dirname, light, callback)
}

/// Builds a [`FullContext`] under an explicit directory and seed/size,
/// bypassing the epoch tables.
pub fn full_new_internal(
    dirname: &Path,
    seed: &H256,
    full_size: u64,
    light: &LightContext,
    callback: Option<&mut dag::ProgressCallback<'_>>,
) -> Result<FullContext> {
    FullContext::new_internal(dirname, seed, full_size, light, callback)
}

pub fn full_compute(full: &FullContext, header_hash: &H256, nonce: u64) -> Result<ComputeResult> {
    full.compute(header_hash, nonce)
}

pub fn full_dag(full: &FullContext) -> &[u8] {
    full.dag()
}

pub fn full_dag_size(full: &FullContext) -> u64 {
    full.dag_size()
}

/// Explicit release point for API parity with the reference design; a
/// [`FullContext`] also releases its mmap and file when dropped normally.
pub fn full_delete(full: FullContext) {
    drop(full);
}
