//! Block-to-epoch mapping, per-epoch cache/DAG sizes, and seed-hash derivation
//! (spec §4.B). The 2048-entry size tables are generated at build time by
//! `build.rs` from the canonical prime formula; see `epoch_tables.rs` in
//! `OUT_DIR`.

use crate::error::{EtchashError, Result};
use crate::primitives::{keccak256, H256, H256_ZERO};

include!(concat!(env!("OUT_DIR"), "/epoch_tables.rs"));

pub const EPOCH_LENGTH: u64 = 30_000;
pub const NEW_EPOCH_LENGTH: u64 = 60_000;

/// ECIP-1099 hard-fork height on Ethereum Classic mainnet.
pub const ACTIVATION_BLOCK: u64 = 11_700_000;

/// `epoch(b)`: pre-fork, 30000-block epochs; post-fork, 60000-block epochs.
pub fn epoch(block_number: u64) -> u64 {
    if block_number < ACTIVATION_BLOCK {
        block_number / EPOCH_LENGTH
    } else {
        block_number / NEW_EPOCH_LENGTH
    }
}

fn checked_epoch(block_number: u64) -> Result<u64> {
    let e = epoch(block_number);
    if e as usize >= NUM_EPOCHS {
        return Err(EtchashError::EpochOutOfRange {
            epoch: e,
            max: NUM_EPOCHS as u64,
        });
    }
    Ok(e)
}

/// Cache size in bytes for the epoch containing `block_number`.
pub fn cache_size(block_number: u64) -> Result<u64> {
    let e = checked_epoch(block_number)?;
    Ok(CACHE_SIZES[e as usize])
}

/// DAG size in bytes for the epoch containing `block_number`.
pub fn dag_size(block_number: u64) -> Result<u64> {
    let e = checked_epoch(block_number)?;
    Ok(DAG_SIZES[e as usize])
}

/// The ECIP-1099 seed rule: pre-fork this is the classic Ethash "hash the
/// zero block thrice per 30k blocks"; post-fork the chain of hashes is frozen
/// at a redefined coordinate so miners can keep mining from a known seed.
pub fn seedhash(block_number: u64) -> H256 {
    let e = epoch(block_number);
    let k = if block_number >= ACTIVATION_BLOCK {
        e * NEW_EPOCH_LENGTH + 1
    } else {
        e * EPOCH_LENGTH + 1
    };
    let iter = k / EPOCH_LENGTH;

    let mut ret = H256_ZERO;
    for _ in 0..iter {
        ret = keccak256(&ret);
    }
    ret
}
