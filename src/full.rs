//! Full verification/mining context (spec §4.H): owns an open DAG file and
//! its mmap, preparing/recovering/finalizing the file as needed.

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::MmapMut;

use crate::dag::{compute_full_data, ProgressCallback};
use crate::epoch::{dag_size, seedhash};
use crate::error::{EtchashError, Result};
use crate::io::{self, PrepareStatus, MAGIC_SIZE};
use crate::light::{ComputeResult, LightContext};
use crate::mix::{hashimoto, SliceDag};
use crate::primitives::H256;

/// Owns an open file handle and a read-write mmap of length
/// `dag_size + MAGIC_SIZE`. The DAG body view starts at offset `MAGIC_SIZE`.
pub struct FullContext {
    _file: File,
    mmap: MmapMut,
    dag_size: u64,
    block_number: u64,
}

impl FullContext {
    /// Prepares (creating/rebuilding as needed) and mmaps the DAG file for
    /// `light.block_number()`'s epoch, under `dirname`.
    pub fn new(
        dirname: &Path,
        light: &LightContext,
        callback: Option<&mut ProgressCallback<'_>>,
    ) -> Result<FullContext> {
        let block_number = light.block_number();
        let size = dag_size(block_number)?;
        let seed = seedhash(block_number);
        FullContext::new_internal(dirname, &seed, size, light, callback)
    }

    /// Lower-level constructor taking an explicit `(seed, full_size)` pair
    /// instead of deriving them from `light.block_number()` — used by tests
    /// that exercise a reduced-parameter fixture, and by [`FullContext::new`].
    pub fn new_internal(
        dirname: &Path,
        seed: &H256,
        full_size: u64,
        light: &LightContext,
        callback: Option<&mut ProgressCallback<'_>>,
    ) -> Result<FullContext> {
        let mapped_len = full_size + MAGIC_SIZE;

        let (mut file, mut status) = io::prepare(dirname, seed, mapped_len, false)?;

        if status == PrepareStatus::SizeMismatch {
            let (f, s) = io::prepare(dirname, seed, mapped_len, true)?;
            file = f;
            status = s;
        }

        let mut mmap = unsafe {
            MmapMut::map_mut(&file).map_err(|source| EtchashError::IoFailure {
                context: "mmap DAG file",
                source,
            })?
        };

        if status != PrepareStatus::Match {
            let body = &mut mmap[MAGIC_SIZE as usize..];
            if let Err(e) = compute_full_data(body, full_size, light.cache(), callback) {
                log::error!("DAG materialization failed: {e}");
                return Err(e);
            }
            if let Err(e) = io::finalize(&mut file) {
                log::error!("DAG finalize write failed: {e}");
                return Err(e);
            }
            if let Err(e) = mmap.flush() {
                log::error!("mmap flush failed: {e}");
                return Err(EtchashError::IoFailure {
                    context: "flushing mmap after finalize",
                    source: e,
                });
            }
        }

        Ok(FullContext {
            _file: file,
            mmap,
            dag_size: full_size,
            block_number: light.block_number(),
        })
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn dag_size(&self) -> u64 {
        self.dag_size
    }

    /// The DAG body, starting after the magic number.
    pub fn dag(&self) -> &[u8] {
        &self.mmap[MAGIC_SIZE as usize..]
    }

    pub fn compute(&self, header_hash: &H256, nonce: u64) -> Result<ComputeResult> {
        let page_source = SliceDag::new(self.dag());
        let (mix_hash, result) = hashimoto(header_hash, nonce, self.dag_size, &page_source)?;
        Ok(ComputeResult { mix_hash, result })
    }
}

/// Resolves the default DAG cache directory, falling back to a path under
/// the process's current directory if no user cache directory can be
/// determined (headless/CI environments).
pub fn default_dag_dir() -> PathBuf {
    io::default_dirname().unwrap_or_else(|| PathBuf::from(".etchash-dags"))
}
