//! DAG item derivation (spec §4.D) and full-DAG materialization (spec §4.E).

use crate::cache::Cache;
use crate::error::{EtchashError, Result};
use crate::primitives::{fnv_hash, Node, DATASET_PARENTS, NODE_BYTES, NODE_WORDS};

/// Derives one 64-byte DAG node on demand from `cache`. `i` is the DAG item
/// index in `[0, dag_size/64)`.
///
/// Step 4's parent-index sequence reads `ret.words[k mod 16]` *after* earlier
/// iterations have already rewritten `ret`, so parent selection is
/// feedback-dependent — there is no way to precompute the 256 parent
/// indices ahead of the mixing loop.
pub fn dag_item(i: u64, cache: &Cache) -> Node {
    let p = cache.len();
    let mut ret = *cache.node((i as usize) % p);
    ret.set_word(0, ret.word(0) ^ i as u32);
    ret.keccak512_self();

    let mut words = ret.as_words();
    for k in 0..DATASET_PARENTS {
        let parent_idx = fnv_hash(i as u32 ^ k as u32, words[k % NODE_WORDS]) as usize % p;
        let parent = cache.node(parent_idx).as_words();
        for w in 0..NODE_WORDS {
            words[w] = fnv_hash(words[w], parent[w]);
        }
    }
    ret.set_words(&words);
    ret.keccak512_self();
    ret
}

/// Progress callback invoked roughly once per percent of items written.
/// Returning non-zero cancels materialization.
pub type ProgressCallback<'a> = dyn FnMut(u32) -> i32 + 'a;

/// Fills `dest` (exactly `dag_size` bytes) with DAG items derived from
/// `cache`, invoking `callback` every `M/100` items when `M >= 100` (the
/// threshold is preserved so small test DAGs never trigger callback storms).
///
/// The DAG may be generated in any order across threads so long as each slot
/// is written exactly once; this reference path writes in order `0..M`.
pub fn compute_full_data(
    dest: &mut [u8],
    dag_size: u64,
    cache: &Cache,
    mut callback: Option<&mut ProgressCallback<'_>>,
) -> Result<()> {
    if dag_size % 128 != 0 || dag_size % NODE_BYTES as u64 != 0 {
        return Err(EtchashError::PreconditionFailure(
            "dag_size must be a multiple of 128 and of 64",
        ));
    }
    if dest.len() as u64 != dag_size {
        return Err(EtchashError::PreconditionFailure(
            "dest buffer length must equal dag_size",
        ));
    }

    let m = dag_size / NODE_BYTES as u64;
    let report_every = if m >= 100 { m / 100 } else { 0 };

    for n in 0..m {
        let item = dag_item(n, cache);
        let start = (n as usize) * NODE_BYTES;
        dest[start..start + NODE_BYTES].copy_from_slice(item.as_bytes());

        if report_every != 0 && (n + 1) % report_every == 0 {
            if let Some(cb) = callback.as_mut() {
                let percent = (((n + 1) * 100) / m) as u32;
                if cb(percent) != 0 {
                    log::warn!("DAG generation cancelled by progress callback at {percent}%");
                    return Err(EtchashError::Cancelled);
                }
            }
        }
    }

    Ok(())
}

/// Parallel variant of [`compute_full_data`] behind the `parallel` feature.
/// Fills disjoint node ranges concurrently; byte-identical to the serial
/// path since every slot's value depends only on `cache` and its own index.
/// Progress reporting is skipped (no single thread owns a monotonic counter
/// worth reporting against) — callers needing progress should use the serial
/// path.
#[cfg(feature = "parallel")]
pub fn compute_full_data_parallel(dest: &mut [u8], dag_size: u64, cache: &Cache) -> Result<()> {
    use rayon::prelude::*;

    if dag_size % 128 != 0 || dag_size % NODE_BYTES as u64 != 0 {
        return Err(EtchashError::PreconditionFailure(
            "dag_size must be a multiple of 128 and of 64",
        ));
    }
    if dest.len() as u64 != dag_size {
        return Err(EtchashError::PreconditionFailure(
            "dest buffer length must equal dag_size",
        ));
    }

    dest.par_chunks_mut(NODE_BYTES)
        .enumerate()
        .for_each(|(n, slot)| {
            let item = dag_item(n as u64, cache);
            slot.copy_from_slice(item.as_bytes());
        });

    Ok(())
}
